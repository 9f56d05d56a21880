//! Phase transition detection.
//!
//! Snapshots are bucketed into the goal's periods; a period is met when its
//! latest snapshot was complete. The trailing window of periods decides
//! whether a goal advances or regresses one phase. Periods without any
//! snapshot are ignored rather than counted as missed. The period containing
//! the evaluation date is still open: it only counts once it is met.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use goal_catalog::GoalPeriod;

use crate::config::PhaseRules;
use crate::metrics::week_key;
use crate::types::{GoalInstance, GoalPhase, ProgressSnapshot};

/// A proposed phase change for one goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PhaseTransition {
    pub goal_id: String,
    pub previous_phase: GoalPhase,
    pub new_phase: GoalPhase,
    /// Share of met periods in the inspected window (0.0 - 1.0)
    pub completion_rate: f64,
    /// Number of periods inspected
    pub periods_considered: usize,
}

impl PhaseTransition {
    pub fn is_advance(&self) -> bool {
        self.new_phase > self.previous_phase
    }
}

/// Bucket key of a snapshot date for a goal period.
pub fn period_key(period: GoalPeriod, date: NaiveDate) -> String {
    match period {
        GoalPeriod::Daily => date.format("%Y-%m-%d").to_string(),
        GoalPeriod::Monthly => date.format("%Y-%m").to_string(),
        GoalPeriod::Weekly | GoalPeriod::None => week_key(date),
    }
}

/// Detector applying [`PhaseRules`] to snapshot history.
pub struct PhaseDetector {
    rules: PhaseRules,
}

impl PhaseDetector {
    pub fn new(rules: PhaseRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &PhaseRules {
        &self.rules
    }

    /// Met/missed outcome per period up to `today`, oldest first.
    fn period_outcomes(
        &self,
        period: GoalPeriod,
        snapshots: &[&ProgressSnapshot],
        today: NaiveDate,
    ) -> Vec<bool> {
        let current = period_key(period, today);
        let mut latest: BTreeMap<String, (NaiveDate, bool)> = BTreeMap::new();
        for snapshot in snapshots {
            let key = period_key(period, snapshot.snapshot_date);
            if key > current {
                continue;
            }
            let entry = latest
                .entry(key)
                .or_insert((snapshot.snapshot_date, snapshot.was_complete));
            if snapshot.snapshot_date >= entry.0 {
                *entry = (snapshot.snapshot_date, snapshot.was_complete);
            }
        }
        if latest.get(&current).is_some_and(|&(_, met)| !met) {
            latest.remove(&current);
        }
        latest.into_values().map(|(_, met)| met).collect()
    }

    /// Evaluate one goal against its own snapshots as of `today`.
    ///
    /// Returns `None` for goals without a phase, inactive goals, goals with too
    /// little history, and goals whose phase holds.
    pub fn detect(
        &self,
        goal: &GoalInstance,
        snapshots: &[&ProgressSnapshot],
        today: NaiveDate,
    ) -> Option<PhaseTransition> {
        let phase = goal.goal_phase?;
        if !goal.is_live() {
            return None;
        }

        let outcomes = self.period_outcomes(goal.period, snapshots, today);
        let window = &outcomes[outcomes.len().saturating_sub(self.rules.lookback_periods)..];
        if window.len() < self.rules.min_history_periods {
            trace!(goal_id = %goal.id, periods = window.len(), "Not enough history for phase check");
            return None;
        }

        let met = window.iter().filter(|&&m| m).count();
        let completion_rate = met as f64 / window.len() as f64;
        let trailing_met = window.iter().rev().take_while(|&&m| m).count();
        let trailing_missed = window.iter().rev().take_while(|&&m| !m).count();

        let advance = trailing_met >= self.rules.advance_streak
            && completion_rate >= self.rules.advance_rate;
        let regress = trailing_missed >= self.rules.regress_streak
            || completion_rate <= self.rules.regress_rate;

        let candidate = if advance {
            phase.next()
        } else if regress {
            phase.previous()
        } else {
            None
        };
        let new_phase = candidate?;

        Some(PhaseTransition {
            goal_id: goal.id.clone(),
            previous_phase: phase,
            new_phase,
            completion_rate,
            periods_considered: window.len(),
        })
    }
}

/// Propose phase transitions for every phased goal as of `today`.
///
/// Side-effect free; the caller decides whether to apply them.
pub fn detect_all_phase_transitions(
    goals: &[GoalInstance],
    snapshots: &[ProgressSnapshot],
    rules: &PhaseRules,
    today: NaiveDate,
) -> Vec<PhaseTransition> {
    let mut by_goal: HashMap<&str, Vec<&ProgressSnapshot>> = HashMap::new();
    for snapshot in snapshots {
        by_goal
            .entry(snapshot.goal_id.as_str())
            .or_default()
            .push(snapshot);
    }

    let detector = PhaseDetector::new(rules.clone());
    let transitions: Vec<PhaseTransition> = goals
        .iter()
        .filter(|g| g.goal_phase.is_some())
        .filter_map(|goal| {
            let history = by_goal.get(goal.id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            detector.detect(goal, history, today)
        })
        .collect();

    debug!(
        goals = goals.len(),
        snapshots = snapshots.len(),
        transitions = transitions.len(),
        "Phase transitions detected"
    );

    transitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn monday() -> NaiveDate {
        // 2026-W30
        NaiveDate::from_ymd_opt(2026, 7, 20).unwrap()
    }

    /// One snapshot per week, oldest first.
    fn weekly_history(goal_id: &str, outcomes: &[bool]) -> Vec<ProgressSnapshot> {
        outcomes
            .iter()
            .enumerate()
            .map(|(week, &met)| {
                ProgressSnapshot::new(goal_id, monday() + Duration::weeks(week as i64), met)
            })
            .collect()
    }

    fn phased(id: &str, phase: GoalPhase) -> GoalInstance {
        GoalInstance::new(id, "u", id)
            .with_period(GoalPeriod::Weekly)
            .with_phase(phase)
    }

    /// Well after every fixture week.
    fn later() -> NaiveDate {
        monday() + Duration::weeks(30)
    }

    fn detect(goal: &GoalInstance, snapshots: &[ProgressSnapshot]) -> Option<PhaseTransition> {
        detect_all_phase_transitions(
            std::slice::from_ref(goal),
            snapshots,
            &PhaseRules::default(),
            later(),
        )
        .pop()
    }

    #[test]
    fn test_advance_after_streak() {
        let goal = phased("g", GoalPhase::Acquisition);
        let history = weekly_history("g", &[false, true, true, true, true, true]);

        let transition = detect(&goal, &history).unwrap();
        assert_eq!(transition.new_phase, GoalPhase::Consolidation);
        assert!(transition.is_advance());
        assert!((transition.completion_rate - 5.0 / 6.0).abs() < 1e-9);
        assert_eq!(transition.periods_considered, 6);
    }

    #[test]
    fn test_streak_without_rate_holds() {
        let goal = phased("g", GoalPhase::Acquisition);
        // 4 met in a row but only 4 of 8 overall
        let history = weekly_history("g", &[false, false, false, false, true, true, true, true]);
        assert!(detect(&goal, &history).is_none());
    }

    #[test]
    fn test_regress_after_missed_streak() {
        let goal = phased("g", GoalPhase::Maintenance);
        let history = weekly_history("g", &[true, true, true, true, true, false, false, false]);

        let transition = detect(&goal, &history).unwrap();
        assert_eq!(transition.new_phase, GoalPhase::Consolidation);
        assert!(!transition.is_advance());
    }

    #[test]
    fn test_regress_on_low_rate() {
        let goal = phased("g", GoalPhase::Consolidation);
        let history = weekly_history("g", &[false, false, true, false, false, false, true, false]);
        let transition = detect(&goal, &history).unwrap();
        assert_eq!(transition.new_phase, GoalPhase::Acquisition);
        assert_eq!(transition.completion_rate, 0.25);
    }

    #[test]
    fn test_no_move_past_ends() {
        let top = phased("g", GoalPhase::Maintenance);
        assert!(detect(&top, &weekly_history("g", &[true; 8])).is_none());

        let bottom = phased("g", GoalPhase::Acquisition);
        assert!(detect(&bottom, &weekly_history("g", &[false; 8])).is_none());
    }

    #[test]
    fn test_short_history_skipped() {
        let goal = phased("g", GoalPhase::Acquisition);
        assert!(detect(&goal, &weekly_history("g", &[true, true, true])).is_none());
    }

    #[test]
    fn test_only_window_is_inspected() {
        let goal = phased("g", GoalPhase::Consolidation);
        // Old misses fall outside the 8-period window
        let mut outcomes = vec![false; 6];
        outcomes.extend([true; 8]);
        let transition = detect(&goal, &weekly_history("g", &outcomes)).unwrap();
        assert_eq!(transition.new_phase, GoalPhase::Maintenance);
        assert_eq!(transition.periods_considered, 8);
        assert_eq!(transition.completion_rate, 1.0);
    }

    #[test]
    fn test_latest_snapshot_in_period_wins() {
        let goal = phased("g", GoalPhase::Acquisition);
        let mut history = Vec::new();
        for week in 0..4 {
            let start = monday() + Duration::weeks(week);
            // Incomplete early in the week, complete by Sunday
            history.push(ProgressSnapshot::new("g", start + Duration::days(6), true));
            history.push(ProgressSnapshot::new("g", start, false));
        }
        let transition = detect(&goal, &history).unwrap();
        assert_eq!(transition.periods_considered, 4);
        assert_eq!(transition.new_phase, GoalPhase::Consolidation);
    }

    #[test]
    fn test_unphased_and_inactive_goals_ignored() {
        let history = weekly_history("g", &[true; 8]);
        let unphased = GoalInstance::new("g", "u", "g");
        assert!(detect(&unphased, &history).is_none());

        let inactive = phased("g", GoalPhase::Acquisition).inactive();
        assert!(detect(&inactive, &history).is_none());
    }

    #[test]
    fn test_open_period_counts_only_when_met() {
        let goal = phased("g", GoalPhase::Maintenance);
        // 5 met, 2 missed, then Monday of the current week not done yet
        let mut history =
            weekly_history("g", &[true, true, true, true, true, false, false]);
        let current_monday = monday() + Duration::weeks(7);
        history.push(ProgressSnapshot::new("g", current_monday, false));
        let rules = PhaseRules::default();
        let goals = std::slice::from_ref(&goal);

        let midweek = current_monday + Duration::days(2);
        assert!(detect_all_phase_transitions(goals, &history, &rules, midweek).is_empty());

        // Once the week is over the miss counts.
        let next_week = current_monday + Duration::weeks(1);
        let transition = detect_all_phase_transitions(goals, &history, &rules, next_week)
            .pop()
            .unwrap();
        assert_eq!(transition.new_phase, GoalPhase::Consolidation);
        assert_eq!(transition.periods_considered, 8);
    }

    #[test]
    fn test_open_period_met_early_counts() {
        let goal = phased("g", GoalPhase::Acquisition);
        let mut history = weekly_history("g", &[false, true, true, true]);
        let current_monday = monday() + Duration::weeks(4);
        history.push(ProgressSnapshot::new("g", current_monday + Duration::days(1), true));
        let today = current_monday + Duration::days(3);

        let transition =
            detect_all_phase_transitions(&[goal], &history, &PhaseRules::default(), today)
                .pop()
                .unwrap();
        assert_eq!(transition.new_phase, GoalPhase::Consolidation);
        assert_eq!(transition.periods_considered, 5);
    }

    #[test]
    fn test_future_snapshots_ignored() {
        let goal = phased("g", GoalPhase::Acquisition);
        let history = weekly_history("g", &[true; 6]);
        // Evaluated in the third fixture week: two closed weeks plus an open met one
        let today = monday() + Duration::weeks(2);
        assert!(
            detect_all_phase_transitions(&[goal], &history, &PhaseRules::default(), today)
                .is_empty()
        );
    }

    #[test]
    fn test_period_keys() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(period_key(GoalPeriod::Daily, date), "2026-10-15");
        assert_eq!(period_key(GoalPeriod::Weekly, date), "2026-W42");
        assert_eq!(period_key(GoalPeriod::None, date), "2026-W42");
        assert_eq!(period_key(GoalPeriod::Monthly, date), "2026-10");
    }

    #[test]
    fn test_snapshots_matched_by_goal() {
        let goals = vec![
            phased("a", GoalPhase::Acquisition),
            phased("b", GoalPhase::Acquisition),
        ];
        let mut snapshots = weekly_history("a", &[true; 5]);
        snapshots.extend(weekly_history("b", &[true, false, true, false, true]));

        let transitions =
            detect_all_phase_transitions(&goals, &snapshots, &PhaseRules::default(), later());
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].goal_id, "a");
    }
}
