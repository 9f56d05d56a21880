//! Reconstruct display sections from a flat list of goal rows.
//!
//! A section is rooted at a big goal (L1), or at an achievement (L2) whose
//! big goal is not in the list. Leaves (L3) are grouped under their
//! section by display category. Rows whose lineage cannot be resolved are
//! returned as custom goals rather than dropped.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use goal_catalog::{DisplayCategory, GoalLevel, TemplateCatalog};

use crate::types::GoalInstance;

/// One rendered section of the goal hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSection {
    /// The L1 goal, or a standalone L2
    pub root: GoalInstance,
    /// Achievements under the root (empty when the root is itself an L2)
    pub achievements: Vec<GoalInstance>,
    /// Leaves keyed by display category
    pub leaves: BTreeMap<DisplayCategory, Vec<GoalInstance>>,
}

impl GoalSection {
    fn new(root: GoalInstance) -> Self {
        Self {
            root,
            achievements: Vec::new(),
            leaves: BTreeMap::new(),
        }
    }

    /// Leaves across all categories, in category order.
    pub fn all_leaves(&self) -> impl Iterator<Item = &GoalInstance> {
        self.leaves.values().flatten()
    }
}

/// Goals grouped for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedGoals {
    pub sections: Vec<GoalSection>,
    /// L0 goals
    pub visions: Vec<GoalInstance>,
    /// Goals without a resolvable lineage
    pub custom_goals: Vec<GoalInstance>,
}

impl GroupedGoals {
    /// Total number of goals across all groups.
    pub fn len(&self) -> usize {
        self.visions.len()
            + self.custom_goals.len()
            + self
                .sections
                .iter()
                .map(|s| 1 + s.achievements.len() + s.all_leaves().count())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group a flat goal list into sections.
///
/// Output depends only on the set of goals, not their order: everything is
/// ordered by `(position, created_at, id)`. A row resolves only if its
/// template is in the catalog at the row's level and its parent (where one
/// is needed) is present, belongs to the same user and sits one level up.
pub fn group_goals_by_hierarchy(catalog: &TemplateCatalog, goals: &[GoalInstance]) -> GroupedGoals {
    let mut sorted: Vec<&GoalInstance> = goals.iter().collect();
    sorted.sort_by(|a, b| a.display_key().cmp(&b.display_key()));

    let by_id: HashMap<&str, &GoalInstance> = goals.iter().map(|g| (g.id.as_str(), g)).collect();

    let mut grouped = GroupedGoals::default();
    // goal id -> section index, for L1 and L2 goals placed so far
    let mut placed: HashMap<&str, usize> = HashMap::new();

    let level_of = |goal: &GoalInstance| -> Option<GoalLevel> {
        let level = goal.goal_level?;
        let template = catalog.get(goal.template_id.as_deref()?)?;
        (template.level == level).then_some(level)
    };

    let parent_section = |goal: &GoalInstance, placed: &HashMap<&str, usize>| -> Option<usize> {
        let parent = by_id.get(goal.parent_goal_id.as_deref()?)?;
        if parent.user_id != goal.user_id || parent.goal_level?.child() != goal.goal_level {
            return None;
        }
        placed.get(parent.id.as_str()).copied()
    };

    // Visions and big goals first, so achievements can find their section.
    for &goal in &sorted {
        match level_of(goal) {
            Some(GoalLevel::Vision) => grouped.visions.push(goal.clone()),
            Some(GoalLevel::BigGoal) => {
                placed.insert(goal.id.as_str(), grouped.sections.len());
                grouped.sections.push(GoalSection::new(goal.clone()));
            }
            Some(_) => {}
            None => grouped.custom_goals.push(goal.clone()),
        }
    }

    for &goal in &sorted {
        if level_of(goal) != Some(GoalLevel::Achievement) {
            continue;
        }
        let index = match parent_section(goal, &placed) {
            Some(index) => {
                grouped.sections[index].achievements.push(goal.clone());
                index
            }
            None => {
                grouped.sections.push(GoalSection::new(goal.clone()));
                grouped.sections.len() - 1
            }
        };
        placed.insert(goal.id.as_str(), index);
    }

    for &goal in &sorted {
        if level_of(goal) != Some(GoalLevel::Leaf) {
            continue;
        }
        match parent_section(goal, &placed) {
            Some(index) => grouped.sections[index]
                .leaves
                .entry(goal.display_category.unwrap_or_default())
                .or_default()
                .push(goal.clone()),
            None => grouped.custom_goals.push(goal.clone()),
        }
    }

    grouped
        .sections
        .sort_by(|a, b| a.root.display_key().cmp(&b.root.display_key()));
    grouped
        .custom_goals
        .sort_by(|a, b| a.display_key().cmp(&b.display_key()));

    let unplaced = grouped
        .custom_goals
        .iter()
        .filter(|g| g.template_id.is_some())
        .count();
    if unplaced > 0 {
        warn!(unplaced, "Templated goals could not be placed in the hierarchy");
    }

    debug!(
        goals = goals.len(),
        sections = grouped.sections.len(),
        visions = grouped.visions.len(),
        custom = grouped.custom_goals.len(),
        "Grouped goals by hierarchy"
    );

    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::builtin().unwrap()
    }

    fn goal(id: &str, template_id: &str, level: GoalLevel) -> GoalInstance {
        GoalInstance::new(id, "user-1", id)
            .with_template(template_id, level)
            .created(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())
    }

    fn sample() -> Vec<GoalInstance> {
        vec![
            goal("vision", "l0_dating_life", GoalLevel::Vision),
            goal("gf", "l1_girlfriend", GoalLevel::BigGoal).with_parent("vision"),
            goal("daygame", "l2_master_daygame", GoalLevel::Achievement).with_parent("gf"),
            goal("one", "l2_find_the_one", GoalLevel::Achievement)
                .with_parent("gf")
                .with_position(1),
            goal("volume", "l3_approach_volume", GoalLevel::Leaf)
                .with_parent("daygame")
                .with_category(DisplayCategory::FieldWork),
            goal("numbers", "l3_phone_numbers", GoalLevel::Leaf)
                .with_parent("daygame")
                .with_category(DisplayCategory::Results)
                .with_position(1),
            goal("dates", "l3_first_dates", GoalLevel::Leaf)
                .with_parent("one")
                .with_category(DisplayCategory::Results),
            goal("casual", "l2_casual_abundance", GoalLevel::Achievement),
            goal("rotation", "l3_rotation_size", GoalLevel::Leaf).with_parent("casual"),
            GoalInstance::new("custom", "user-1", "Read 10 books"),
        ]
    }

    #[test]
    fn test_sections() {
        let grouped = group_goals_by_hierarchy(&catalog(), &sample());

        assert_eq!(grouped.visions.len(), 1);
        assert_eq!(grouped.sections.len(), 2);
        assert_eq!(grouped.custom_goals.len(), 1);
        assert_eq!(grouped.len(), 10);

        let gf = grouped.sections.iter().find(|s| s.root.id == "gf").unwrap();
        let achievement_ids: Vec<_> = gf.achievements.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(achievement_ids, vec!["daygame", "one"]);
        assert_eq!(gf.leaves[&DisplayCategory::FieldWork].len(), 1);
        let results: Vec<_> = gf.leaves[&DisplayCategory::Results]
            .iter()
            .map(|g| g.id.as_str())
            .collect();
        assert_eq!(results, vec!["dates", "numbers"]);
    }

    #[test]
    fn test_standalone_achievement_roots_section() {
        let grouped = group_goals_by_hierarchy(&catalog(), &sample());
        let casual = grouped
            .sections
            .iter()
            .find(|s| s.root.id == "casual")
            .unwrap();
        assert!(casual.achievements.is_empty());
        assert_eq!(casual.all_leaves().count(), 1);
        // No category stamped, falls back to Other
        assert_eq!(casual.leaves[&DisplayCategory::Other][0].id, "rotation");
    }

    #[test]
    fn test_permutation_invariance() {
        let catalog = catalog();
        let goals = sample();
        let expected = group_goals_by_hierarchy(&catalog, &goals);

        let mut reversed = goals.clone();
        reversed.reverse();
        assert_eq!(group_goals_by_hierarchy(&catalog, &reversed), expected);

        let mut rotated = goals.clone();
        rotated.rotate_left(4);
        assert_eq!(group_goals_by_hierarchy(&catalog, &rotated), expected);
    }

    #[test]
    fn test_unresolvable_rows_become_custom() {
        let goals = vec![
            // parent missing
            goal("orphan", "l3_instadates", GoalLevel::Leaf).with_parent("gone"),
            // template not in catalog
            goal("retired", "l2_retired", GoalLevel::Achievement),
            // level disagrees with template
            goal("mislevel", "l3_instadates", GoalLevel::Achievement),
            // level without template
            GoalInstance {
                template_id: None,
                goal_level: Some(GoalLevel::Leaf),
                ..GoalInstance::new("no-template", "user-1", "x")
            },
        ];
        let grouped = group_goals_by_hierarchy(&catalog(), &goals);
        assert!(grouped.sections.is_empty());
        assert_eq!(grouped.custom_goals.len(), 4);
    }

    #[test]
    fn test_parent_of_other_user_not_followed() {
        let mut goals = vec![
            goal("daygame", "l2_master_daygame", GoalLevel::Achievement),
            goal("volume", "l3_approach_volume", GoalLevel::Leaf).with_parent("daygame"),
        ];
        goals[0].user_id = "user-2".to_string();

        let grouped = group_goals_by_hierarchy(&catalog(), &goals);
        assert_eq!(grouped.sections.len(), 1);
        assert_eq!(grouped.sections[0].all_leaves().count(), 0);
        assert_eq!(grouped.custom_goals[0].id, "volume");
    }

    #[test]
    fn test_empty_input() {
        let grouped = group_goals_by_hierarchy(&catalog(), &[]);
        assert!(grouped.is_empty());
    }
}
