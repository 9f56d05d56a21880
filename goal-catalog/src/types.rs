//! Core types for the goal template graph.
//!
//! These types model the four-level goal hierarchy (vision, big goal,
//! achievement, trackable leaf) and the default configuration a leaf carries
//! into every instance generated from it.
//!
//! With the `typescript` feature enabled, these types can be exported to TypeScript
//! using ts-rs for consistency with the web frontend.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Goal hierarchy level.
///
/// Serialized as the bare integer stored in the `goal_level` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GoalLevel {
    /// L0 - aspirational vision
    Vision = 0,
    /// L1 - big goal
    BigGoal = 1,
    /// L2 - achievement / badge
    Achievement = 2,
    /// L3 - trackable leaf goal
    Leaf = 3,
}

impl GoalLevel {
    /// Numeric level as stored.
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Level of this level's children, if any.
    pub fn child(&self) -> Option<Self> {
        match self {
            Self::Vision => Some(Self::BigGoal),
            Self::BigGoal => Some(Self::Achievement),
            Self::Achievement => Some(Self::Leaf),
            Self::Leaf => None,
        }
    }

    /// Level of this level's parents, if any.
    pub fn parent(&self) -> Option<Self> {
        match self {
            Self::Vision => None,
            Self::BigGoal => Some(Self::Vision),
            Self::Achievement => Some(Self::BigGoal),
            Self::Leaf => Some(Self::Achievement),
        }
    }

    /// Short label ("L0".."L3").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vision => "L0",
            Self::BigGoal => "L1",
            Self::Achievement => "L2",
            Self::Leaf => "L3",
        }
    }
}

impl TryFrom<u8> for GoalLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Vision),
            1 => Ok(Self::BigGoal),
            2 => Ok(Self::Achievement),
            3 => Ok(Self::Leaf),
            other => Err(format!("goal level must be 0-3, got {}", other)),
        }
    }
}

impl From<GoalLevel> for u8 {
    fn from(level: GoalLevel) -> Self {
        level.as_u8()
    }
}

/// Life area a goal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum LifeArea {
    Dating,
    Social,
    Health,
    Personal,
}

impl LifeArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dating => "dating",
            Self::Social => "social",
            Self::Health => "health",
            Self::Personal => "personal",
        }
    }
}

/// Category a leaf is displayed under inside its section.
///
/// Ordering is display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum DisplayCategory {
    /// Effort put in the field (approaches, sessions, reports)
    FieldWork,
    /// Results of that effort (numbers, dates)
    Results,
    /// Intimacy outcomes
    DirtyDog,
    /// Social life
    Social,
    /// Health and routines
    Lifestyle,
    Other,
}

impl Default for DisplayCategory {
    fn default() -> Self {
        Self::Other
    }
}

/// Whether a goal measures effort or outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum GoalNature {
    /// Controllable effort (leading indicator)
    Input,
    /// Result of effort (lagging indicator)
    Outcome,
}

impl Default for GoalNature {
    fn default() -> Self {
        Self::Outcome
    }
}

/// How a goal's target is structured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    /// Cumulative target paced by a milestone curve
    Milestone,
    /// Graduated sequence of periodic frequency targets
    HabitRamp,
    /// Same target every period
    Recurring,
}

impl Default for GoalType {
    fn default() -> Self {
        Self::Milestone
    }
}

/// Reset period of a goal's counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
    None,
}

impl Default for GoalPeriod {
    fn default() -> Self {
        Self::None
    }
}

/// External counter that drives a goal's current value.
///
/// Unrecognized strings deserialize to [`LinkedMetric::Unknown`], which
/// always resolves to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum LinkedMetric {
    ApproachesWeekly,
    ApproachesCumulative,
    SessionsWeekly,
    SessionsCumulative,
    NumbersWeekly,
    NumbersCumulative,
    InstadatesWeekly,
    InstadatesCumulative,
    FieldReportsWeekly,
    FieldReportsCumulative,
    #[serde(other)]
    Unknown,
}

/// The tracked counter family behind a linked metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricCounter {
    Approaches,
    Sessions,
    Numbers,
    Instadates,
    FieldReports,
}

impl LinkedMetric {
    /// Whether the metric only counts the current week.
    pub fn is_weekly(&self) -> bool {
        matches!(
            self,
            Self::ApproachesWeekly
                | Self::SessionsWeekly
                | Self::NumbersWeekly
                | Self::InstadatesWeekly
                | Self::FieldReportsWeekly
        )
    }

    /// Counter family, `None` for unknown metrics.
    pub fn counter(&self) -> Option<MetricCounter> {
        match self {
            Self::ApproachesWeekly | Self::ApproachesCumulative => Some(MetricCounter::Approaches),
            Self::SessionsWeekly | Self::SessionsCumulative => Some(MetricCounter::Sessions),
            Self::NumbersWeekly | Self::NumbersCumulative => Some(MetricCounter::Numbers),
            Self::InstadatesWeekly | Self::InstadatesCumulative => Some(MetricCounter::Instadates),
            Self::FieldReportsWeekly | Self::FieldReportsCumulative => {
                Some(MetricCounter::FieldReports)
            }
            Self::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApproachesWeekly => "approaches_weekly",
            Self::ApproachesCumulative => "approaches_cumulative",
            Self::SessionsWeekly => "sessions_weekly",
            Self::SessionsCumulative => "sessions_cumulative",
            Self::NumbersWeekly => "numbers_weekly",
            Self::NumbersCumulative => "numbers_cumulative",
            Self::InstadatesWeekly => "instadates_weekly",
            Self::InstadatesCumulative => "instadates_cumulative",
            Self::FieldReportsWeekly => "field_reports_weekly",
            Self::FieldReportsCumulative => "field_reports_cumulative",
            Self::Unknown => "unknown",
        }
    }
}

/// A hard pin on a milestone curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ControlPoint {
    /// Milestone index (1-based, the target sits at `steps`)
    pub step: u32,
    /// Exact value at that milestone
    pub value: f64,
}

/// Milestone curve configuration for a cumulative goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct MilestoneCurveConfig {
    /// Starting value (not emitted as a milestone)
    pub start: f64,
    /// Final target (always the last milestone)
    pub target: f64,
    /// Number of milestones
    pub steps: u32,
    /// Negative = back-loaded, positive = front-loaded, 0 = linear
    #[serde(default)]
    pub curve_tension: f64,
    /// Optional pins, ordered by step
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub control_points: Vec<ControlPoint>,
    /// Allow fractional milestone values (two decimals)
    #[serde(default)]
    pub fractional: bool,
}

impl MilestoneCurveConfig {
    /// Create a linear integer curve.
    pub fn new(start: f64, target: f64, steps: u32) -> Self {
        Self {
            start,
            target,
            steps,
            curve_tension: 0.0,
            control_points: Vec::new(),
            fractional: false,
        }
    }

    /// Builder: set curve tension.
    pub fn with_tension(mut self, tension: f64) -> Self {
        self.curve_tension = tension;
        self
    }

    /// Builder: pin a milestone to an exact value.
    pub fn with_control_point(mut self, step: u32, value: f64) -> Self {
        self.control_points.push(ControlPoint { step, value });
        self
    }

    /// Builder: allow fractional milestones.
    pub fn fractional(mut self) -> Self {
        self.fractional = true;
        self
    }
}

/// One stage of a habit ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RampStep {
    /// Required completions per week during this stage
    pub frequency_per_week: u32,
    /// How many weeks the stage lasts
    pub weeks: u32,
}

impl RampStep {
    pub fn new(frequency_per_week: u32, weeks: u32) -> Self {
        Self {
            frequency_per_week,
            weeks,
        }
    }

    /// Total completions this stage asks for.
    pub fn requirement(&self) -> u64 {
        u64::from(self.frequency_per_week) * u64::from(self.weeks)
    }
}

/// A node of the template graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct GoalTemplate {
    /// Unique identifier (e.g. `l3_approach_volume`)
    pub id: String,
    /// Default title for generated goals
    pub title: String,
    /// Hierarchy level
    #[cfg_attr(feature = "typescript", ts(type = "number"))]
    pub level: GoalLevel,
    /// Parent template ids, one level up
    #[serde(default)]
    pub parent_ids: Vec<String>,
    pub life_area: LifeArea,
    #[serde(default)]
    pub display_category: DisplayCategory,
    #[serde(default)]
    pub nature: GoalNature,
    #[serde(default)]
    pub goal_type: GoalType,
    #[serde(default)]
    pub linked_metric: Option<LinkedMetric>,
    /// Contribution to every parent achievement's rollup (parents sum to 100)
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub period: GoalPeriod,
    /// Target used when neither a curve nor a ramp is configured
    #[serde(default)]
    pub default_target: Option<f64>,
    #[serde(default)]
    pub milestone_config: Option<MilestoneCurveConfig>,
    #[serde(default)]
    pub ramp_steps: Option<Vec<RampStep>>,
}

impl GoalTemplate {
    fn base(id: &str, title: &str, level: GoalLevel, life_area: LifeArea) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            level,
            parent_ids: Vec::new(),
            life_area,
            display_category: DisplayCategory::Other,
            nature: GoalNature::Outcome,
            goal_type: GoalType::Milestone,
            linked_metric: None,
            weight: 0.0,
            period: GoalPeriod::None,
            default_target: None,
            milestone_config: None,
            ramp_steps: None,
        }
    }

    /// An L0 vision.
    pub fn vision(id: &str, title: &str, life_area: LifeArea) -> Self {
        Self::base(id, title, GoalLevel::Vision, life_area)
    }

    /// An L1 big goal under one or more visions.
    pub fn big_goal(id: &str, title: &str, life_area: LifeArea, parents: &[&str]) -> Self {
        Self::base(id, title, GoalLevel::BigGoal, life_area).with_parents(parents)
    }

    /// An L2 achievement under one or more big goals.
    pub fn achievement(id: &str, title: &str, life_area: LifeArea, parents: &[&str]) -> Self {
        Self::base(id, title, GoalLevel::Achievement, life_area).with_parents(parents)
    }

    /// An L3 trackable leaf.
    pub fn leaf(
        id: &str,
        title: &str,
        life_area: LifeArea,
        parents: &[&str],
        display_category: DisplayCategory,
        nature: GoalNature,
        weight: f64,
    ) -> Self {
        Self {
            display_category,
            nature,
            weight,
            ..Self::base(id, title, GoalLevel::Leaf, life_area).with_parents(parents)
        }
    }

    fn with_parents(mut self, parents: &[&str]) -> Self {
        self.parent_ids = parents.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Builder: milestone goal paced by a curve.
    pub fn with_milestones(mut self, config: MilestoneCurveConfig) -> Self {
        self.goal_type = GoalType::Milestone;
        self.milestone_config = Some(config);
        self
    }

    /// Builder: weekly habit ramp.
    pub fn with_ramp(mut self, steps: Vec<RampStep>) -> Self {
        self.goal_type = GoalType::HabitRamp;
        self.period = GoalPeriod::Weekly;
        self.ramp_steps = Some(steps);
        self
    }

    /// Builder: recurring target every period.
    pub fn recurring(mut self, period: GoalPeriod, target: f64) -> Self {
        self.goal_type = GoalType::Recurring;
        self.period = period;
        self.default_target = Some(target);
        self
    }

    /// Builder: plain target without a curve.
    pub fn with_target(mut self, target: f64) -> Self {
        self.default_target = Some(target);
        self
    }

    /// Builder: drive the value from a tracked counter.
    pub fn with_metric(mut self, metric: LinkedMetric) -> Self {
        self.linked_metric = Some(metric);
        self
    }

    /// Whether this template is a root of the graph.
    pub fn is_root(&self) -> bool {
        self.parent_ids.is_empty()
    }

    /// Whether `parent_id` is one of this template's parents.
    pub fn has_parent(&self, parent_id: &str) -> bool {
        self.parent_ids.iter().any(|p| p == parent_id)
    }

    /// Target value a freshly generated goal starts with.
    ///
    /// Curve target first, then the first ramp stage, then the default.
    pub fn initial_target(&self) -> f64 {
        if let Some(config) = &self.milestone_config {
            return config.target;
        }
        if let Some(first) = self.ramp_steps.as_ref().and_then(|steps| steps.first()) {
            return f64::from(first.frequency_per_week);
        }
        self.default_target.unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_navigation() {
        assert_eq!(GoalLevel::Vision.child(), Some(GoalLevel::BigGoal));
        assert_eq!(GoalLevel::Leaf.child(), None);
        assert_eq!(GoalLevel::Achievement.parent(), Some(GoalLevel::BigGoal));
        assert!(GoalLevel::try_from(4).is_err());
    }

    #[test]
    fn test_level_serializes_as_integer() {
        let json = serde_json::to_string(&GoalLevel::Achievement).unwrap();
        assert_eq!(json, "2");
        let parsed: GoalLevel = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, GoalLevel::Leaf);
    }

    #[test]
    fn test_unknown_metric_deserializes() {
        let metric: LinkedMetric = serde_json::from_str("\"push_ups_weekly\"").unwrap();
        assert_eq!(metric, LinkedMetric::Unknown);
        assert_eq!(metric.counter(), None);

        let metric: LinkedMetric = serde_json::from_str("\"numbers_weekly\"").unwrap();
        assert!(metric.is_weekly());
        assert_eq!(metric.counter(), Some(MetricCounter::Numbers));
    }

    #[test]
    fn test_initial_target_precedence() {
        let curve = GoalTemplate::leaf(
            "l3_a",
            "A",
            LifeArea::Dating,
            &["l2_x"],
            DisplayCategory::FieldWork,
            GoalNature::Input,
            10.0,
        )
        .with_milestones(MilestoneCurveConfig::new(0.0, 500.0, 5));
        assert_eq!(curve.initial_target(), 500.0);

        let ramp = curve
            .clone()
            .with_ramp(vec![RampStep::new(3, 4), RampStep::new(5, 4)]);
        // Curve config still wins when both are present.
        assert_eq!(ramp.initial_target(), 500.0);

        let mut ramp_only = ramp.clone();
        ramp_only.milestone_config = None;
        assert_eq!(ramp_only.initial_target(), 3.0);

        let plain = GoalTemplate::vision("l0_v", "V", LifeArea::Health);
        assert_eq!(plain.initial_target(), 1.0);
    }
}
