//! Linked-metric resolution.
//!
//! Goals with a `linked_metric` take their current value from the user's
//! tracking counters instead of manual input. Weekly metrics only count when
//! the counters belong to the week being evaluated; a stale week reads as 0.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use goal_catalog::LinkedMetric;

use crate::types::{GoalInstance, TrackingStats};

/// ISO week key for a date, e.g. `2026-W42`.
pub fn week_key(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Live value of a linked metric for `evaluation_week`.
///
/// No metric, an unknown metric, or a weekly metric whose counters belong to
/// another week all resolve to 0.
pub fn get_metric_value(
    stats: &TrackingStats,
    linked_metric: Option<LinkedMetric>,
    evaluation_week: &str,
) -> f64 {
    let Some(metric) = linked_metric else {
        return 0.0;
    };
    let Some(counter) = metric.counter() else {
        return 0.0;
    };

    if metric.is_weekly() {
        if stats.current_week != evaluation_week {
            return 0.0;
        }
        stats.weekly(counter) as f64
    } else {
        stats.total(counter) as f64
    }
}

/// A proposed update of a linked goal's current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MetricSync {
    pub goal_id: String,
    pub linked_metric: LinkedMetric,
    pub previous_value: f64,
    pub new_value: f64,
}

/// Propose value updates for live goals whose linked metric moved.
///
/// Nothing is written; the caller persists the returned updates.
pub fn sync_linked_goals(
    goals: &[GoalInstance],
    stats: &TrackingStats,
    evaluation_week: &str,
) -> Vec<MetricSync> {
    let syncs: Vec<MetricSync> = goals
        .iter()
        .filter(|g| g.is_live())
        .filter_map(|goal| {
            let metric = goal.linked_metric?;
            let new_value = get_metric_value(stats, Some(metric), evaluation_week);
            (new_value != goal.current_value).then(|| MetricSync {
                goal_id: goal.id.clone(),
                linked_metric: metric,
                previous_value: goal.current_value,
                new_value,
            })
        })
        .collect();

    debug!(
        week = %evaluation_week,
        stats_week = %stats.current_week,
        updates = syncs.len(),
        "Linked goals synced"
    );

    syncs
}
