//! Badge status for achievement goals.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use goal_catalog::{GoalLevel, TemplateCatalog};

use super::compute_achievement_progress;
use crate::config::BadgeTiers;
use crate::types::GoalInstance;

/// Badge tier reached by an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    None,
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl BadgeTier {
    /// Highest tier whose threshold `progress_percent` reaches.
    pub fn for_progress(progress_percent: f64, tiers: &BadgeTiers) -> Self {
        if progress_percent >= tiers.platinum {
            Self::Platinum
        } else if progress_percent >= tiers.gold {
            Self::Gold
        } else if progress_percent >= tiers.silver {
            Self::Silver
        } else if progress_percent >= tiers.bronze {
            Self::Bronze
        } else {
            Self::None
        }
    }
}

/// Derived badge view of one achievement instance. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BadgeStatus {
    pub goal_id: String,
    pub template_id: String,
    pub progress_percent: f64,
    pub contributing_leaf_ids: Vec<String>,
    pub tier: BadgeTier,
}

/// Badge status for every live achievement in `goals`, in display order.
pub fn compute_badges(
    catalog: &TemplateCatalog,
    goals: &[GoalInstance],
    tiers: &BadgeTiers,
) -> Vec<BadgeStatus> {
    let mut achievements: Vec<&GoalInstance> = goals
        .iter()
        .filter(|g| g.is_live() && g.goal_level == Some(GoalLevel::Achievement))
        .filter(|g| g.template_id.is_some())
        .collect();
    achievements.sort_by(|a, b| a.display_key().cmp(&b.display_key()));

    achievements
        .into_iter()
        .filter_map(|achievement| {
            let template_id = achievement.template_id.clone()?;
            let progress = compute_achievement_progress(catalog, achievement, goals);
            Some(BadgeStatus {
                goal_id: achievement.id.clone(),
                template_id,
                tier: BadgeTier::for_progress(progress.progress_percent, tiers),
                progress_percent: progress.progress_percent,
                contributing_leaf_ids: progress.contributing_leaf_ids,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_thresholds() {
        let tiers = BadgeTiers::default();
        assert_eq!(BadgeTier::for_progress(0.0, &tiers), BadgeTier::None);
        assert_eq!(BadgeTier::for_progress(24.9, &tiers), BadgeTier::None);
        assert_eq!(BadgeTier::for_progress(25.0, &tiers), BadgeTier::Bronze);
        assert_eq!(BadgeTier::for_progress(50.0, &tiers), BadgeTier::Silver);
        assert_eq!(BadgeTier::for_progress(99.9, &tiers), BadgeTier::Gold);
        assert_eq!(BadgeTier::for_progress(100.0, &tiers), BadgeTier::Platinum);
    }

    #[test]
    fn test_custom_tiers() {
        let tiers = BadgeTiers {
            bronze: 10.0,
            silver: 20.0,
            gold: 30.0,
            platinum: 40.0,
        };
        assert_eq!(BadgeTier::for_progress(35.0, &tiers), BadgeTier::Gold);
        assert_eq!(BadgeTier::for_progress(40.0, &tiers), BadgeTier::Platinum);
    }

    #[test]
    fn test_badges_for_live_achievements() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let goals = vec![
            GoalInstance::new("ach-2", "u", "Find the one")
                .with_template("l2_find_the_one", GoalLevel::Achievement)
                .with_position(1),
            GoalInstance::new("ach-1", "u", "Master daygame")
                .with_template("l2_master_daygame", GoalLevel::Achievement)
                .with_position(0),
            GoalInstance::new("ach-3", "u", "Casual")
                .with_template("l2_casual_abundance", GoalLevel::Achievement)
                .archived(),
            GoalInstance::new("volume", "u", "Approaches")
                .with_template("l3_approach_volume", GoalLevel::Leaf)
                .with_values(1000.0, 1000.0),
            GoalInstance::new("partner", "u", "Partner")
                .with_template("l3_exclusive_partner", GoalLevel::Leaf)
                .with_values(1.0, 1.0),
            GoalInstance::new("second", "u", "Second dates")
                .with_template("l3_second_dates", GoalLevel::Leaf)
                .with_values(10.0, 10.0),
        ];

        let badges = compute_badges(&catalog, &goals, &BadgeTiers::default());
        assert_eq!(badges.len(), 2);

        assert_eq!(badges[0].goal_id, "ach-1");
        assert_eq!(badges[0].progress_percent, 20.0);
        assert_eq!(badges[0].tier, BadgeTier::None);

        assert_eq!(badges[1].goal_id, "ach-2");
        assert_eq!(badges[1].progress_percent, 40.0);
        assert_eq!(badges[1].tier, BadgeTier::Bronze);
        assert_eq!(badges[1].contributing_leaf_ids, vec!["partner", "second"]);
    }
}
