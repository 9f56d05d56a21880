//! GoalEngine - the entry point for callers.
//!
//! Holds the template catalog and engine configuration and exposes every
//! engine operation over them. The engine keeps no per-user state; persisted
//! data flows in through arguments or a [`GoalStore`].

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use goal_catalog::{GoalType, LinkedMetric, MilestoneCurveConfig, RampStep, TemplateCatalog};

use crate::analysis::{detect_all_phase_transitions, PhaseTransition};
use crate::config::EngineConfig;
use crate::curve::{
    compute_active_ramp_target, compute_milestones_with_precision, validate_ramp, ActiveRampTarget,
};
use crate::metrics::{get_metric_value, sync_linked_goals, MetricSync};
use crate::progress::{
    compute_achievement_progress, compute_badges, group_goals_by_hierarchy, ramp_rollovers,
    AchievementProgress, BadgeStatus, GroupedGoals, RampRollover,
};
use crate::review::{build_review, ReviewPeriod, ReviewSummary};
use crate::store::GoalStore;
use crate::tree::generate_tree;
use crate::types::{
    EngineError, GoalInsert, GoalInstance, ProgressSnapshot, Result, TrackingStats,
};

/// The goal engine.
pub struct GoalEngine {
    catalog: Arc<TemplateCatalog>,
    config: EngineConfig,
}

impl GoalEngine {
    /// Create an engine over a catalog. Fails on inconsistent configuration.
    pub fn new(catalog: Arc<TemplateCatalog>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        info!(
            templates = catalog.len(),
            catalog = %catalog.fingerprint(),
            "GoalEngine initialized"
        );
        Ok(Self { catalog, config })
    }

    /// Engine over the built-in catalog with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(Arc::new(TemplateCatalog::builtin()?), EngineConfig::default())
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Expand a picked template into its tree of inserts.
    pub fn generate_tree(&self, picked_template_id: &str) -> Vec<GoalInsert> {
        generate_tree(&self.catalog, picked_template_id)
    }

    /// Generate a tree and persist it for a user.
    ///
    /// Every curve and ramp in the batch is validated before the store is
    /// touched.
    pub async fn setup_tree(
        &self,
        store: &dyn GoalStore,
        user_id: &str,
        picked_template_id: &str,
    ) -> Result<Vec<GoalInstance>> {
        let inserts = self.generate_tree(picked_template_id);
        if inserts.is_empty() {
            return Err(EngineError::UnknownTemplate(picked_template_id.to_string()));
        }

        for insert in &inserts {
            if let Some(curve) = &insert.milestone_config {
                self.milestones(curve)?;
            }
            if let Some(steps) = &insert.ramp_steps {
                validate_ramp(steps, self.config.curve.allow_decreasing_ramps)?;
            }
        }

        let rows = store.insert_tree(user_id, &inserts).await?;
        info!(
            user_id = %user_id,
            template_id = %picked_template_id,
            rows = rows.len(),
            "Goal tree set up"
        );
        Ok(rows)
    }

    /// Milestone values for a curve at the configured precision.
    pub fn milestones(&self, curve: &MilestoneCurveConfig) -> Result<Vec<f64>> {
        Ok(compute_milestones_with_precision(
            curve,
            self.config.curve.fractional_decimals,
        )?)
    }

    /// Active stage of a habit ramp.
    pub fn ramp_target(&self, steps: &[RampStep], current_value: f64) -> Result<ActiveRampTarget> {
        validate_ramp(steps, self.config.curve.allow_decreasing_ramps)?;
        Ok(compute_active_ramp_target(steps, current_value)?)
    }

    /// Weighted progress of one achievement.
    pub fn achievement_progress(
        &self,
        achievement: &GoalInstance,
        goals: &[GoalInstance],
    ) -> AchievementProgress {
        compute_achievement_progress(&self.catalog, achievement, goals)
    }

    /// Badge status of every live achievement.
    pub fn badges(&self, goals: &[GoalInstance]) -> Vec<BadgeStatus> {
        compute_badges(&self.catalog, goals, &self.config.badges)
    }

    /// Group goals into display sections.
    pub fn group(&self, goals: &[GoalInstance]) -> GroupedGoals {
        group_goals_by_hierarchy(&self.catalog, goals)
    }

    /// Live value of a linked metric.
    pub fn metric_value(
        &self,
        stats: &TrackingStats,
        linked_metric: Option<LinkedMetric>,
        evaluation_week: &str,
    ) -> f64 {
        get_metric_value(stats, linked_metric, evaluation_week)
    }

    /// Proposed current-value updates for linked goals.
    pub fn sync_linked(
        &self,
        goals: &[GoalInstance],
        stats: &TrackingStats,
        evaluation_week: &str,
    ) -> Vec<MetricSync> {
        sync_linked_goals(goals, stats, evaluation_week)
    }

    /// Proposed phase transitions as of `today`.
    pub fn phase_transitions(
        &self,
        goals: &[GoalInstance],
        snapshots: &[ProgressSnapshot],
        today: NaiveDate,
    ) -> Vec<PhaseTransition> {
        detect_all_phase_transitions(goals, snapshots, &self.config.phase, today)
    }

    /// Proposed bank and target updates for habit ramps.
    pub fn ramp_rollovers(
        &self,
        goals: &[GoalInstance],
        snapshots: &[ProgressSnapshot],
        today: NaiveDate,
    ) -> Vec<RampRollover> {
        ramp_rollovers(goals, snapshots, today)
    }

    /// Review for the period containing `today`.
    pub fn review(
        &self,
        goals: &[GoalInstance],
        snapshots: &[ProgressSnapshot],
        stats: &TrackingStats,
        today: NaiveDate,
        period: ReviewPeriod,
    ) -> ReviewSummary {
        build_review(
            &self.catalog,
            &self.config,
            goals,
            snapshots,
            stats,
            today,
            period,
        )
    }

    /// Load a user's goals and history from the store and build the
    /// weekly review.
    pub async fn weekly_review(
        &self,
        store: &dyn GoalStore,
        user_id: &str,
        stats: &TrackingStats,
        today: NaiveDate,
    ) -> Result<ReviewSummary> {
        let goals = store.list_goals(user_id).await?;

        // Long enough for the phase window even on monthly goals, and back to
        // the oldest ramp so its bank can be rebuilt.
        let phase_since = today - Duration::days(31 * self.config.phase.lookback_periods as i64);
        let since = goals
            .iter()
            .filter(|g| g.is_live() && g.goal_type == GoalType::HabitRamp)
            .map(|g| g.created_at.date_naive())
            .fold(phase_since, NaiveDate::min);
        let snapshots = store.snapshot_history(user_id, since).await?;
        debug!(
            user_id = %user_id,
            goals = goals.len(),
            snapshots = snapshots.len(),
            "Loaded review inputs"
        );

        Ok(self.review(&goals, &snapshots, stats, today, ReviewPeriod::Weekly))
    }
}
