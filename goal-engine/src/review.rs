//! Weekly and monthly review synthesis.
//!
//! A review bundles everything the periodic check-in shows: badge status,
//! proposed phase transitions, linked-metric and ramp updates, and the
//! completion heatmap for the period.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use goal_catalog::{GoalLevel, TemplateCatalog};

use crate::analysis::{completion_heatmap, detect_all_phase_transitions, HeatmapDay, PhaseTransition};
use crate::config::EngineConfig;
use crate::metrics::{sync_linked_goals, week_key, MetricSync};
use crate::progress::{
    compute_badges, leaf_progress_percent, ramp_rollovers, BadgeStatus, RampRollover,
};
use crate::types::{GoalInstance, ProgressSnapshot, TrackingStats};

/// Length of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPeriod {
    Weekly,
    Monthly,
}

impl ReviewPeriod {
    /// First and last day of the period containing `date`.
    pub fn bounds(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Self::Weekly => {
                let start = date - Duration::days(date.weekday().num_days_from_monday() as i64);
                (start, start + Duration::days(6))
            }
            Self::Monthly => {
                let start = date.with_day(1).unwrap_or(date);
                let next_month = if start.month() == 12 {
                    NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
                };
                let end = next_month
                    .and_then(|d| d.pred_opt())
                    .unwrap_or(start);
                (start, end)
            }
        }
    }

    /// Display label, `2026-W42` or `2026-10`.
    pub fn label(&self, date: NaiveDate) -> String {
        match self {
            Self::Weekly => week_key(date),
            Self::Monthly => date.format("%Y-%m").to_string(),
        }
    }
}

/// Everything a periodic review shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub period: ReviewPeriod,
    pub label: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Live trackable goals (leaves and custom goals)
    pub active_goals: usize,
    /// Live trackable goals at or above target
    pub completed_goals: usize,
    pub badges: Vec<BadgeStatus>,
    pub phase_transitions: Vec<PhaseTransition>,
    pub metric_syncs: Vec<MetricSync>,
    pub ramp_updates: Vec<RampRollover>,
    pub heatmap: Vec<HeatmapDay>,
}

impl ReviewSummary {
    /// Share of tracked goal-days completed within the period.
    pub fn completion_rate(&self) -> f64 {
        let (completed, total) = self
            .heatmap
            .iter()
            .fold((0u32, 0u32), |(c, t), day| (c + day.completed, t + day.total));
        if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64
        }
    }
}

/// Build the review for the period containing `today`.
///
/// Linked metrics are evaluated against the ISO week of `today`; phases and
/// ramps treat the period containing `today` as still open.
pub fn build_review(
    catalog: &TemplateCatalog,
    config: &EngineConfig,
    goals: &[GoalInstance],
    snapshots: &[ProgressSnapshot],
    stats: &TrackingStats,
    today: NaiveDate,
    period: ReviewPeriod,
) -> ReviewSummary {
    let (period_start, period_end) = period.bounds(today);

    let trackable: Vec<&GoalInstance> = goals
        .iter()
        .filter(|g| g.is_live())
        .filter(|g| matches!(g.goal_level, None | Some(GoalLevel::Leaf)))
        .collect();
    let completed_goals = trackable
        .iter()
        .filter(|g| leaf_progress_percent(g) >= 100.0)
        .count();

    let summary = ReviewSummary {
        period,
        label: period.label(today),
        period_start,
        period_end,
        active_goals: trackable.len(),
        completed_goals,
        badges: compute_badges(catalog, goals, &config.badges),
        phase_transitions: detect_all_phase_transitions(goals, snapshots, &config.phase, today),
        metric_syncs: sync_linked_goals(goals, stats, &week_key(today)),
        ramp_updates: ramp_rollovers(goals, snapshots, today),
        heatmap: completion_heatmap(snapshots, period_start, period_end),
    };

    info!(
        label = %summary.label,
        active = summary.active_goals,
        completed = summary.completed_goals,
        transitions = summary.phase_transitions.len(),
        syncs = summary.metric_syncs.len(),
        ramps = summary.ramp_updates.len(),
        "Review built"
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use goal_catalog::{GoalPeriod, LinkedMetric, RampStep};

    use crate::types::GoalPhase;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).unwrap()
    }

    #[test]
    fn test_period_bounds() {
        // Thursday
        let (start, end) = ReviewPeriod::Weekly.bounds(date(10, 15));
        assert_eq!((start, end), (date(10, 12), date(10, 18)));

        let (start, end) = ReviewPeriod::Monthly.bounds(date(2, 14));
        assert_eq!((start, end), (date(2, 1), date(2, 28)));

        let (start, end) = ReviewPeriod::Monthly.bounds(date(12, 31));
        assert_eq!((start, end), (date(12, 1), date(12, 31)));
    }

    #[test]
    fn test_labels() {
        assert_eq!(ReviewPeriod::Weekly.label(date(10, 15)), "2026-W42");
        assert_eq!(ReviewPeriod::Monthly.label(date(10, 15)), "2026-10");
    }

    #[test]
    fn test_weekly_review() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let goals = vec![
            GoalInstance::new("ach", "u", "Master daygame")
                .with_template("l2_master_daygame", GoalLevel::Achievement),
            GoalInstance::new("volume", "u", "Approaches")
                .with_template("l3_approach_volume", GoalLevel::Leaf)
                .with_parent("ach")
                .with_metric(LinkedMetric::ApproachesCumulative)
                .with_values(1000.0, 1000.0),
            GoalInstance::new("reports", "u", "Field reports")
                .with_template("l3_field_reports", GoalLevel::Leaf)
                .with_parent("ach")
                .with_period(GoalPeriod::Weekly)
                .with_phase(GoalPhase::Acquisition)
                .with_values(1.0, 2.0),
            GoalInstance::new("custom", "u", "Read more"),
        ];

        let mut snapshots = Vec::new();
        for week in 0..4 {
            let day = date(9, 20) + Duration::weeks(week);
            snapshots.push(ProgressSnapshot::new("reports", day, true));
        }
        snapshots.push(ProgressSnapshot::new("volume", date(10, 13), true));
        snapshots.push(ProgressSnapshot::new("reports", date(10, 14), false));

        let stats = TrackingStats {
            current_week: "2026-W42".to_string(),
            total_approaches: 1010,
            ..Default::default()
        };

        let review = build_review(
            &catalog,
            &EngineConfig::default(),
            &goals,
            &snapshots,
            &stats,
            date(10, 15),
            ReviewPeriod::Weekly,
        );

        assert_eq!(review.label, "2026-W42");
        assert_eq!(review.active_goals, 3);
        assert_eq!(review.completed_goals, 1);
        assert_eq!(review.badges.len(), 1);
        assert_eq!(review.badges[0].progress_percent, 25.0);
        assert_eq!(review.metric_syncs.len(), 1);
        assert_eq!(review.metric_syncs[0].new_value, 1010.0);
        assert_eq!(review.heatmap.len(), 7);
        assert_eq!(review.completion_rate(), 0.5);
        assert!(review.ramp_updates.is_empty());
        // This week's incomplete snapshot is still open; 4 closed weeks met
        assert_eq!(review.phase_transitions.len(), 1);
        assert_eq!(review.phase_transitions[0].goal_id, "reports");
        assert_eq!(review.phase_transitions[0].new_phase, GoalPhase::Consolidation);
    }

    #[test]
    fn test_review_banks_ramp_weeks() {
        let catalog = TemplateCatalog::builtin().unwrap();
        let ramp = vec![RampStep::new(2, 4), RampStep::new(3, 4), RampStep::new(4, 8)];
        let goals = vec![
            GoalInstance::new("ach", "u", "Gym consistency")
                .with_template("l2_gym_consistency", GoalLevel::Achievement),
            GoalInstance::new("gym", "u", "Gym sessions per week")
                .with_template("l3_gym_sessions", GoalLevel::Leaf)
                .with_parent("ach")
                .with_ramp(ramp)
                .with_period(GoalPeriod::Weekly)
                .with_values(1.0, 2.0),
        ];

        // Two sessions every week for four weeks, Sundays W38..W41
        let snapshots: Vec<_> = (0..4)
            .map(|week| ProgressSnapshot {
                current_value: 2.0,
                ..ProgressSnapshot::new("gym", date(9, 20) + Duration::weeks(week), true)
            })
            .collect();

        let review = build_review(
            &catalog,
            &EngineConfig::default(),
            &goals,
            &snapshots,
            &TrackingStats::default(),
            date(10, 15),
            ReviewPeriod::Weekly,
        );

        assert_eq!(review.ramp_updates.len(), 1);
        let update = &review.ramp_updates[0];
        assert_eq!(update.banked_value, 8.0);
        assert_eq!(update.target_value, 3.0);
        assert_eq!(update.step_index, 1);
    }
}
