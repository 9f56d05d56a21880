//! Habit ramp position across weeks.
//!
//! A ramp leaf's `current_value` is this week's count and resets every week.
//! Closed weeks are banked into `banked_value` from snapshot history, where
//! the latest snapshot of a week holds that week's final count.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use goal_catalog::GoalType;

use crate::curve::{compute_active_ramp_target, ramp_completions, ActiveRampTarget};
use crate::metrics::week_key;
use crate::types::{GoalInstance, ProgressSnapshot};

/// Where a ramp goal stands with this week's count included.
///
/// `None` for goals without ramp steps.
pub fn ramp_position(goal: &GoalInstance) -> Option<ActiveRampTarget> {
    let steps = goal.ramp_steps.as_deref()?;
    let total = ramp_completions(steps, goal.banked_value, &[goal.current_value]).ok()?;
    compute_active_ramp_target(steps, total).ok()
}

/// Proposed bank and target update for a ramp goal after a week closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RampRollover {
    pub goal_id: String,
    pub previous_banked: f64,
    pub banked_value: f64,
    pub previous_target: f64,
    /// Weekly frequency of the active stage
    pub target_value: f64,
    pub step_index: usize,
    pub complete: bool,
}

/// Final count of every closed week before `today`'s week, oldest first.
fn closed_week_counts(snapshots: &[&ProgressSnapshot], today: NaiveDate) -> Vec<f64> {
    let current = week_key(today);
    let mut latest: BTreeMap<String, (NaiveDate, f64)> = BTreeMap::new();
    for snapshot in snapshots {
        let key = week_key(snapshot.snapshot_date);
        if key >= current {
            continue;
        }
        let entry = latest
            .entry(key)
            .or_insert((snapshot.snapshot_date, snapshot.current_value));
        if snapshot.snapshot_date >= entry.0 {
            *entry = (snapshot.snapshot_date, snapshot.current_value);
        }
    }
    latest.into_values().map(|(_, count)| count).collect()
}

/// Recompute the bank of every live ramp goal from its full history.
///
/// Only goals whose bank or target would change are returned. The result
/// depends on the history alone, so rerunning it is harmless; callers must
/// pass snapshots back to the goal's creation.
pub fn ramp_rollovers(
    goals: &[GoalInstance],
    snapshots: &[ProgressSnapshot],
    today: NaiveDate,
) -> Vec<RampRollover> {
    let mut by_goal: HashMap<&str, Vec<&ProgressSnapshot>> = HashMap::new();
    for snapshot in snapshots {
        by_goal
            .entry(snapshot.goal_id.as_str())
            .or_default()
            .push(snapshot);
    }

    let rollovers: Vec<RampRollover> = goals
        .iter()
        .filter(|g| g.is_live() && g.goal_type == GoalType::HabitRamp)
        .filter_map(|goal| {
            let steps = goal.ramp_steps.as_deref()?;
            let history = by_goal.get(goal.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let counts = closed_week_counts(history, today);

            let banked = ramp_completions(steps, 0.0, &counts).ok()?;
            let active = compute_active_ramp_target(steps, banked).ok()?;
            let target = f64::from(active.frequency_per_week);

            let changed = banked != goal.banked_value || target != goal.target_value;
            changed.then(|| RampRollover {
                goal_id: goal.id.clone(),
                previous_banked: goal.banked_value,
                banked_value: banked,
                previous_target: goal.target_value,
                target_value: target,
                step_index: active.step_index,
                complete: active.complete,
            })
        })
        .collect();

    debug!(
        week = %week_key(today),
        updates = rollovers.len(),
        "Ramp rollovers computed"
    );

    rollovers
}
