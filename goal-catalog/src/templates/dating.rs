//! Dating life templates.
//!
//! The core of the catalog: one vision, two big goals and three achievements
//! whose leaves overlap. Shared leaves (numbers, instadates, first dates,
//! kiss closes) are instantiated once per tree and count toward every
//! achievement that lists them.

use crate::templates::TemplateProvider;
use crate::types::{
    DisplayCategory, GoalNature, GoalPeriod, GoalTemplate, LifeArea, LinkedMetric,
    MilestoneCurveConfig, RampStep,
};

const AREA: LifeArea = LifeArea::Dating;

/// Provider for the dating life area.
pub struct DatingTemplates;

impl TemplateProvider for DatingTemplates {
    fn life_area(&self) -> LifeArea {
        AREA
    }

    fn templates(&self) -> Vec<GoalTemplate> {
        vec![
            GoalTemplate::vision("l0_dating_life", "Build the dating life I want", AREA),
            GoalTemplate::big_goal("l1_girlfriend", "Get a girlfriend", AREA, &["l0_dating_life"]),
            GoalTemplate::big_goal(
                "l1_abundance",
                "Build dating abundance",
                AREA,
                &["l0_dating_life"],
            ),
            GoalTemplate::achievement(
                "l2_master_daygame",
                "Master daygame",
                AREA,
                &["l1_girlfriend", "l1_abundance"],
            ),
            GoalTemplate::achievement("l2_find_the_one", "Find the one", AREA, &["l1_girlfriend"]),
            GoalTemplate::achievement(
                "l2_casual_abundance",
                "Casual abundance",
                AREA,
                &["l1_abundance"],
            ),
            // Master daygame: weights sum to 100
            GoalTemplate::leaf(
                "l3_approach_volume",
                "Total approaches",
                AREA,
                &["l2_master_daygame"],
                DisplayCategory::FieldWork,
                GoalNature::Input,
                20.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 1000.0, 10).with_tension(1.5))
            .with_metric(LinkedMetric::ApproachesCumulative),
            GoalTemplate::leaf(
                "l3_approach_frequency",
                "Approaches per week",
                AREA,
                &["l2_master_daygame"],
                DisplayCategory::FieldWork,
                GoalNature::Input,
                15.0,
            )
            .with_ramp(vec![
                RampStep::new(10, 4),
                RampStep::new(15, 4),
                RampStep::new(20, 4),
                RampStep::new(25, 4),
            ])
            .with_metric(LinkedMetric::ApproachesWeekly),
            GoalTemplate::leaf(
                "l3_session_frequency",
                "Sessions per week",
                AREA,
                &["l2_master_daygame"],
                DisplayCategory::FieldWork,
                GoalNature::Input,
                15.0,
            )
            .with_ramp(vec![
                RampStep::new(1, 4),
                RampStep::new(2, 4),
                RampStep::new(3, 8),
            ])
            .with_metric(LinkedMetric::SessionsWeekly),
            GoalTemplate::leaf(
                "l3_field_reports",
                "Field reports per week",
                AREA,
                &["l2_master_daygame"],
                DisplayCategory::FieldWork,
                GoalNature::Input,
                10.0,
            )
            .recurring(GoalPeriod::Weekly, 2.0)
            .with_metric(LinkedMetric::FieldReportsWeekly),
            GoalTemplate::leaf(
                "l3_total_sessions",
                "Total sessions",
                AREA,
                &["l2_master_daygame"],
                DisplayCategory::FieldWork,
                GoalNature::Input,
                10.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 100.0, 8))
            .with_metric(LinkedMetric::SessionsCumulative),
            GoalTemplate::leaf(
                "l3_phone_numbers",
                "Phone numbers",
                AREA,
                &["l2_master_daygame", "l2_find_the_one"],
                DisplayCategory::Results,
                GoalNature::Outcome,
                10.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 100.0, 10).with_tension(0.5))
            .with_metric(LinkedMetric::NumbersCumulative),
            GoalTemplate::leaf(
                "l3_instadates",
                "Instadates",
                AREA,
                &["l2_master_daygame", "l2_find_the_one"],
                DisplayCategory::Results,
                GoalNature::Outcome,
                10.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 25.0, 5))
            .with_metric(LinkedMetric::InstadatesCumulative),
            GoalTemplate::leaf(
                "l3_kiss_closes",
                "Kiss closes",
                AREA,
                &["l2_master_daygame", "l2_casual_abundance"],
                DisplayCategory::DirtyDog,
                GoalNature::Outcome,
                10.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 20.0, 5)),
            // Find the one: numbers + instadates above, plus these
            GoalTemplate::leaf(
                "l3_first_dates",
                "First dates",
                AREA,
                &["l2_find_the_one", "l2_casual_abundance"],
                DisplayCategory::Results,
                GoalNature::Outcome,
                25.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 30.0, 6)),
            GoalTemplate::leaf(
                "l3_second_dates",
                "Second dates",
                AREA,
                &["l2_find_the_one"],
                DisplayCategory::Results,
                GoalNature::Outcome,
                20.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 10.0, 5)),
            GoalTemplate::leaf(
                "l3_date_frequency",
                "Dates per week",
                AREA,
                &["l2_find_the_one"],
                DisplayCategory::Results,
                GoalNature::Input,
                15.0,
            )
            .recurring(GoalPeriod::Weekly, 1.0),
            GoalTemplate::leaf(
                "l3_exclusive_partner",
                "Exclusive relationship",
                AREA,
                &["l2_find_the_one"],
                DisplayCategory::Results,
                GoalNature::Outcome,
                20.0,
            )
            .with_target(1.0),
            // Casual abundance: first dates + kiss closes above, plus these
            GoalTemplate::leaf(
                "l3_intimate_closes",
                "Intimate closes",
                AREA,
                &["l2_casual_abundance"],
                DisplayCategory::DirtyDog,
                GoalNature::Outcome,
                40.0,
            )
            .with_milestones(MilestoneCurveConfig::new(0.0, 10.0, 5).with_tension(-1.0)),
            GoalTemplate::leaf(
                "l3_rotation_size",
                "Women in rotation",
                AREA,
                &["l2_casual_abundance"],
                DisplayCategory::DirtyDog,
                GoalNature::Outcome,
                25.0,
            )
            .with_target(3.0),
        ]
    }
}
