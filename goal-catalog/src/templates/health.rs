//! Health and routine templates.

use crate::templates::TemplateProvider;
use crate::types::{
    DisplayCategory, GoalNature, GoalPeriod, GoalTemplate, LifeArea, MilestoneCurveConfig,
    RampStep,
};

const AREA: LifeArea = LifeArea::Health;

/// Provider for the health life area.
pub struct HealthTemplates;

impl TemplateProvider for HealthTemplates {
    fn life_area(&self) -> LifeArea {
        AREA
    }

    fn templates(&self) -> Vec<GoalTemplate> {
        vec![
            GoalTemplate::vision("l0_peak_state", "Feel great in my body", AREA),
            GoalTemplate::big_goal("l1_get_in_shape", "Get in shape", AREA, &["l0_peak_state"]),
            GoalTemplate::achievement(
                "l2_gym_consistency",
                "Gym consistency",
                AREA,
                &["l1_get_in_shape"],
            ),
            GoalTemplate::leaf(
                "l3_gym_sessions",
                "Gym sessions per week",
                AREA,
                &["l2_gym_consistency"],
                DisplayCategory::Lifestyle,
                GoalNature::Input,
                50.0,
            )
            .with_ramp(vec![
                RampStep::new(2, 4),
                RampStep::new(3, 4),
                RampStep::new(4, 8),
            ]),
            GoalTemplate::leaf(
                "l3_sleep_routine",
                "In bed before midnight",
                AREA,
                &["l2_gym_consistency"],
                DisplayCategory::Lifestyle,
                GoalNature::Input,
                25.0,
            )
            .recurring(GoalPeriod::Daily, 1.0),
            GoalTemplate::leaf(
                "l3_cardio_minutes",
                "Cardio minutes",
                AREA,
                &["l2_gym_consistency"],
                DisplayCategory::Lifestyle,
                GoalNature::Input,
                25.0,
            )
            // Easy start, most of the volume comes once the habit is set.
            .with_milestones(MilestoneCurveConfig::new(0.0, 1500.0, 6).with_tension(-1.0)),
        ]
    }
}
