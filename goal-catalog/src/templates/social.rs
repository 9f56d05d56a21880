//! Social life templates.

use crate::templates::TemplateProvider;
use crate::types::{
    DisplayCategory, GoalNature, GoalPeriod, GoalTemplate, LifeArea, MilestoneCurveConfig,
};

const AREA: LifeArea = LifeArea::Social;

/// Provider for the social life area.
pub struct SocialTemplates;

impl TemplateProvider for SocialTemplates {
    fn life_area(&self) -> LifeArea {
        AREA
    }

    fn templates(&self) -> Vec<GoalTemplate> {
        vec![
            GoalTemplate::vision("l0_social_freedom", "Never run out of people to see", AREA),
            GoalTemplate::big_goal(
                "l1_social_circle",
                "Build a strong social circle",
                AREA,
                &["l0_social_freedom"],
            ),
            GoalTemplate::achievement(
                "l2_social_butterfly",
                "Social butterfly",
                AREA,
                &["l1_social_circle"],
            ),
            GoalTemplate::leaf(
                "l3_social_events",
                "Social events per week",
                AREA,
                &["l2_social_butterfly"],
                DisplayCategory::Social,
                GoalNature::Input,
                40.0,
            )
            .recurring(GoalPeriod::Weekly, 1.0),
            GoalTemplate::leaf(
                "l3_new_friends",
                "New friends made",
                AREA,
                &["l2_social_butterfly"],
                DisplayCategory::Social,
                GoalNature::Outcome,
                35.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 20.0, 5)),
            GoalTemplate::leaf(
                "l3_host_events",
                "Events hosted",
                AREA,
                &["l2_social_butterfly"],
                DisplayCategory::Social,
                GoalNature::Outcome,
                25.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 6.0, 3)),
        ]
    }
}
