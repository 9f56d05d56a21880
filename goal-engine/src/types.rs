//! Core types for the goal engine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use goal_catalog::{
    CatalogError, DisplayCategory, GoalLevel, GoalNature, GoalPeriod, GoalTemplate, GoalType,
    LifeArea, LinkedMetric, MetricCounter, MilestoneCurveConfig, RampStep,
};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::curve::CurveError;
use crate::store::StoreError;

/// Lifecycle phase of a goal that has a phase model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum GoalPhase {
    /// Building the habit up
    Acquisition,
    /// Habit mostly holds, still fragile
    Consolidation,
    /// Habit is automatic
    Maintenance,
}

impl GoalPhase {
    /// Phase reached by advancing, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Acquisition => Some(Self::Consolidation),
            Self::Consolidation => Some(Self::Maintenance),
            Self::Maintenance => None,
        }
    }

    /// Phase reached by regressing, if any.
    pub fn previous(&self) -> Option<Self> {
        match self {
            Self::Acquisition => None,
            Self::Consolidation => Some(Self::Acquisition),
            Self::Maintenance => Some(Self::Consolidation),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acquisition => "acquisition",
            Self::Consolidation => "consolidation",
            Self::Maintenance => "maintenance",
        }
    }
}

/// A persisted, per-user goal row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct GoalInstance {
    pub id: String,
    pub user_id: String,
    /// Source template (`None` for custom goals)
    pub template_id: Option<String>,
    pub parent_goal_id: Option<String>,
    /// Hierarchy level (`None` for custom goals)
    #[cfg_attr(feature = "typescript", ts(type = "number | null"))]
    pub goal_level: Option<GoalLevel>,
    pub title: String,
    pub life_area: Option<LifeArea>,
    pub display_category: Option<DisplayCategory>,
    pub goal_nature: Option<GoalNature>,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub current_value: f64,
    /// Completions carried over from closed weeks (habit ramps)
    #[serde(default)]
    pub banked_value: f64,
    pub milestone_config: Option<MilestoneCurveConfig>,
    pub ramp_steps: Option<Vec<RampStep>>,
    pub linked_metric: Option<LinkedMetric>,
    pub period: GoalPeriod,
    pub period_start_date: Option<NaiveDate>,
    /// Present only for goals with a phase model
    pub goal_phase: Option<GoalPhase>,
    pub is_active: bool,
    pub is_archived: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl GoalInstance {
    /// Create an active custom goal with a target of 1.
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            template_id: None,
            parent_goal_id: None,
            goal_level: None,
            title: title.into(),
            life_area: None,
            display_category: None,
            goal_nature: None,
            goal_type: GoalType::Milestone,
            target_value: 1.0,
            current_value: 0.0,
            banked_value: 0.0,
            milestone_config: None,
            ramp_steps: None,
            linked_metric: None,
            period: GoalPeriod::None,
            period_start_date: None,
            goal_phase: None,
            is_active: true,
            is_archived: false,
            position: 0,
            created_at: Utc::now(),
        }
    }

    /// Materialize a generated insert with its real ids.
    pub fn from_insert(
        insert: &GoalInsert,
        id: impl Into<String>,
        user_id: impl Into<String>,
        parent_goal_id: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            template_id: Some(insert.template_id.clone()),
            parent_goal_id,
            goal_level: Some(insert.goal_level),
            title: insert.title.clone(),
            life_area: Some(insert.life_area),
            display_category: Some(insert.display_category),
            goal_nature: Some(insert.goal_nature),
            goal_type: insert.goal_type,
            target_value: insert.target_value,
            current_value: 0.0,
            banked_value: 0.0,
            milestone_config: insert.milestone_config.clone(),
            ramp_steps: insert.ramp_steps.clone(),
            linked_metric: insert.linked_metric,
            period: insert.period,
            period_start_date: None,
            goal_phase: insert.goal_phase,
            is_active: true,
            is_archived: false,
            position: insert.position,
            created_at,
        }
    }

    /// Builder: link to a template at a level.
    pub fn with_template(mut self, template_id: impl Into<String>, level: GoalLevel) -> Self {
        self.template_id = Some(template_id.into());
        self.goal_level = Some(level);
        self
    }

    /// Builder: set the parent goal.
    pub fn with_parent(mut self, parent_goal_id: impl Into<String>) -> Self {
        self.parent_goal_id = Some(parent_goal_id.into());
        self
    }

    /// Builder: set current and target values.
    pub fn with_values(mut self, current_value: f64, target_value: f64) -> Self {
        self.current_value = current_value;
        self.target_value = target_value;
        self
    }

    /// Builder: completions banked from closed weeks.
    pub fn with_banked(mut self, banked_value: f64) -> Self {
        self.banked_value = banked_value;
        self
    }

    /// Builder: set goal type.
    pub fn with_type(mut self, goal_type: GoalType) -> Self {
        self.goal_type = goal_type;
        self
    }

    /// Builder: habit ramp stages.
    pub fn with_ramp(mut self, steps: Vec<RampStep>) -> Self {
        self.goal_type = GoalType::HabitRamp;
        self.ramp_steps = Some(steps);
        self
    }

    /// Builder: linked metric.
    pub fn with_metric(mut self, metric: LinkedMetric) -> Self {
        self.linked_metric = Some(metric);
        self
    }

    /// Builder: reset period.
    pub fn with_period(mut self, period: GoalPeriod) -> Self {
        self.period = period;
        self
    }

    /// Builder: lifecycle phase.
    pub fn with_phase(mut self, phase: GoalPhase) -> Self {
        self.goal_phase = Some(phase);
        self
    }

    /// Builder: display category.
    pub fn with_category(mut self, category: DisplayCategory) -> Self {
        self.display_category = Some(category);
        self
    }

    /// Builder: display position.
    pub fn with_position(mut self, position: i32) -> Self {
        self.position = position;
        self
    }

    /// Builder: creation time.
    pub fn created(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Builder: mark inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Builder: mark archived.
    pub fn archived(mut self) -> Self {
        self.is_archived = true;
        self
    }

    /// Active and not archived.
    pub fn is_live(&self) -> bool {
        self.is_active && !self.is_archived
    }

    /// Level and template both present.
    pub fn has_lineage(&self) -> bool {
        self.goal_level.is_some() && self.template_id.is_some()
    }

    /// Sort key used everywhere goals are displayed.
    pub fn display_key(&self) -> (i32, DateTime<Utc>, &str) {
        (self.position, self.created_at, self.id.as_str())
    }
}

/// One row of a generated tree, before persistence assigns real ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct GoalInsert {
    #[serde(rename = "_tempId")]
    pub temp_id: String,
    /// Temp id of the parent row, always emitted earlier in the batch
    #[serde(rename = "_tempParentId")]
    pub temp_parent_id: Option<String>,
    pub template_id: String,
    #[cfg_attr(feature = "typescript", ts(type = "number"))]
    pub goal_level: GoalLevel,
    pub title: String,
    pub life_area: LifeArea,
    pub display_category: DisplayCategory,
    pub goal_nature: GoalNature,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub milestone_config: Option<MilestoneCurveConfig>,
    pub ramp_steps: Option<Vec<RampStep>>,
    pub linked_metric: Option<LinkedMetric>,
    pub period: GoalPeriod,
    /// Starting phase for periodic leaves
    pub goal_phase: Option<GoalPhase>,
    /// Index among siblings
    pub position: i32,
}

/// Prefix of every temporary id.
pub const TEMP_ID_PREFIX: &str = "__temp_";

/// Temporary id for a template's row.
pub fn temp_id_for(template_id: &str) -> String {
    format!("{}{}", TEMP_ID_PREFIX, template_id)
}

impl GoalInsert {
    /// Stamp template metadata onto a new insert.
    pub fn from_template(
        template: &GoalTemplate,
        temp_parent_id: Option<String>,
        position: i32,
    ) -> Self {
        Self {
            temp_id: temp_id_for(&template.id),
            temp_parent_id,
            template_id: template.id.clone(),
            goal_level: template.level,
            title: template.title.clone(),
            life_area: template.life_area,
            display_category: template.display_category,
            goal_nature: template.nature,
            goal_type: template.goal_type,
            target_value: template.initial_target(),
            milestone_config: template.milestone_config.clone(),
            ramp_steps: template.ramp_steps.clone(),
            linked_metric: template.linked_metric,
            period: template.period,
            goal_phase: initial_phase(template),
            position,
        }
    }
}

/// Phase a new goal starts in. Only periodic leaves have a phase model.
pub fn initial_phase(template: &GoalTemplate) -> Option<GoalPhase> {
    let periodic = matches!(template.goal_type, GoalType::HabitRamp | GoalType::Recurring);
    (template.level == GoalLevel::Leaf && periodic).then_some(GoalPhase::Acquisition)
}

/// Daily progress snapshot written by the external snapshot job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ProgressSnapshot {
    pub goal_id: String,
    pub snapshot_date: NaiveDate,
    pub current_value: f64,
    pub target_value: f64,
    pub was_complete: bool,
}

impl ProgressSnapshot {
    pub fn new(goal_id: impl Into<String>, snapshot_date: NaiveDate, was_complete: bool) -> Self {
        Self {
            goal_id: goal_id.into(),
            snapshot_date,
            current_value: if was_complete { 1.0 } else { 0.0 },
            target_value: 1.0,
            was_complete,
        }
    }
}

/// Per-user counters from the tracking provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct TrackingStats {
    /// ISO week the weekly counters belong to (e.g. `2026-W42`)
    pub current_week: String,
    pub current_week_approaches: u64,
    pub total_approaches: u64,
    pub current_week_sessions: u64,
    pub total_sessions: u64,
    pub current_week_numbers: u64,
    pub total_numbers: u64,
    pub current_week_instadates: u64,
    pub total_instadates: u64,
    pub current_week_field_reports: u64,
    pub total_field_reports: u64,
}

impl TrackingStats {
    /// Weekly counter for a family (not checked against the week).
    pub fn weekly(&self, counter: MetricCounter) -> u64 {
        match counter {
            MetricCounter::Approaches => self.current_week_approaches,
            MetricCounter::Sessions => self.current_week_sessions,
            MetricCounter::Numbers => self.current_week_numbers,
            MetricCounter::Instadates => self.current_week_instadates,
            MetricCounter::FieldReports => self.current_week_field_reports,
        }
    }

    /// All-time counter for a family.
    pub fn total(&self, counter: MetricCounter) -> u64 {
        match counter {
            MetricCounter::Approaches => self.total_approaches,
            MetricCounter::Sessions => self.total_sessions,
            MetricCounter::Numbers => self.total_numbers,
            MetricCounter::Instadates => self.total_instadates,
            MetricCounter::FieldReports => self.total_field_reports,
        }
    }
}

/// Error types for the goal engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Catalog could not be built
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Invalid curve or ramp configuration
    #[error("Curve error: {0}")]
    Curve(#[from] CurveError),

    /// Persistence collaborator failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Picked template id is not in the catalog
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// An insert references a parent that was not emitted before it
    #[error("Insert {temp_id} references unresolved parent {temp_parent_id}")]
    UnresolvedParent {
        temp_id: String,
        temp_parent_id: String,
    },

    /// No real id was assigned to an insert
    #[error("No id assigned for insert {0}")]
    MissingAssignedId(String),

    /// Engine configuration is inconsistent
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
