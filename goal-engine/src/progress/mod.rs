//! Progress aggregation.
//!
//! Leaf progress is a percent of target (or of ramp stages cleared). A habit
//! ramp counts the completions banked from closed weeks plus this week's,
//! see [`ramp_position`]. An
//! achievement's progress is the weighted sum of its live leaves, using the
//! static template weights. Weights are NOT renormalized over the leaves the
//! user actually has active: an achievement with only some of its leaves
//! active tops out below 100%. Displayed percentages depend on this.

mod badges;
mod hierarchy;
mod ramp;

pub use badges::{compute_badges, BadgeStatus, BadgeTier};
pub use hierarchy::{group_goals_by_hierarchy, GoalSection, GroupedGoals};
pub use ramp::{ramp_position, ramp_rollovers, RampRollover};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use goal_catalog::{GoalLevel, GoalType, TemplateCatalog};

use crate::types::GoalInstance;

/// Percent complete of a single leaf goal (0 - 100).
pub fn leaf_progress_percent(goal: &GoalInstance) -> f64 {
    if goal.goal_type == GoalType::HabitRamp {
        if let Some(steps) = goal.ramp_steps.as_deref().filter(|s| !s.is_empty()) {
            return match ramp_position(goal) {
                Some(active) => active.steps_completed as f64 / steps.len() as f64 * 100.0,
                None => 0.0,
            };
        }
    }

    if !goal.target_value.is_finite() || goal.target_value <= 0.0 {
        return 0.0;
    }
    (goal.current_value / goal.target_value * 100.0).clamp(0.0, 100.0)
}

/// Rolled-up progress of one achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementProgress {
    /// Percent complete (0 - 100)
    pub progress_percent: f64,
    /// Goal ids of the leaves that contributed
    pub contributing_leaf_ids: Vec<String>,
}

impl AchievementProgress {
    /// Zero progress, no contributors.
    pub fn empty() -> Self {
        Self {
            progress_percent: 0.0,
            contributing_leaf_ids: Vec::new(),
        }
    }
}

/// Weighted progress of an achievement from the user's leaves.
///
/// `leaves` may contain any goals; only live leaves whose template lists the
/// achievement's template as a parent contribute. If the same leaf template
/// appears more than once, the most advanced instance counts. Achievements
/// without a resolvable template get an empty result.
pub fn compute_achievement_progress(
    catalog: &TemplateCatalog,
    achievement: &GoalInstance,
    leaves: &[GoalInstance],
) -> AchievementProgress {
    let Some(template_id) = achievement.template_id.as_deref() else {
        return AchievementProgress::empty();
    };
    if !catalog
        .get(template_id)
        .is_some_and(|t| t.level == GoalLevel::Achievement)
    {
        return AchievementProgress::empty();
    }

    // leaf template id -> (progress, weight, goal id)
    let mut best: HashMap<&str, (f64, f64, &str)> = HashMap::new();
    for leaf in leaves.iter().filter(|l| l.is_live()) {
        let Some(leaf_template) = leaf.template_id.as_deref().and_then(|id| catalog.get(id))
        else {
            continue;
        };
        if leaf_template.level != GoalLevel::Leaf || !leaf_template.has_parent(template_id) {
            continue;
        }

        let percent = leaf_progress_percent(leaf);
        best.entry(leaf_template.id.as_str())
            .and_modify(|entry| {
                if percent > entry.0 {
                    *entry = (percent, leaf_template.weight, leaf.id.as_str());
                }
            })
            .or_insert((percent, leaf_template.weight, leaf.id.as_str()));
    }

    let mut contributors: Vec<(&str, f64)> = best
        .values()
        .map(|&(percent, weight, goal_id)| (goal_id, percent / 100.0 * weight))
        .collect();
    contributors.sort_by(|a, b| a.0.cmp(b.0));

    let total: f64 = contributors.iter().map(|(_, share)| share).sum();

    trace!(
        achievement = %template_id,
        contributors = contributors.len(),
        progress = total,
        "Achievement progress computed"
    );

    AchievementProgress {
        progress_percent: total.min(100.0),
        contributing_leaf_ids: contributors
            .into_iter()
            .map(|(goal_id, _)| goal_id.to_string())
            .collect(),
    }
}
