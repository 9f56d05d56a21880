//! Snapshot history views: completion heatmap and streaks.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::types::ProgressSnapshot;

/// Completion counts for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
}

impl HeatmapDay {
    /// Share of goals completed that day (0.0 when nothing was tracked).
    pub fn intensity(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// One entry per day in `from..=to`, days without snapshots included.
///
/// A goal counts at most once per day.
pub fn completion_heatmap(
    snapshots: &[ProgressSnapshot],
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<HeatmapDay> {
    if from > to {
        return Vec::new();
    }

    let mut days: BTreeMap<NaiveDate, HeatmapDay> = from
        .iter_days()
        .take_while(|d| *d <= to)
        .map(|date| {
            (
                date,
                HeatmapDay {
                    date,
                    completed: 0,
                    total: 0,
                },
            )
        })
        .collect();

    let mut seen: HashSet<(NaiveDate, &str)> = HashSet::new();
    for snapshot in snapshots {
        let Some(day) = days.get_mut(&snapshot.snapshot_date) else {
            continue;
        };
        if !seen.insert((snapshot.snapshot_date, snapshot.goal_id.as_str())) {
            continue;
        }
        day.total += 1;
        if snapshot.was_complete {
            day.completed += 1;
        }
    }

    days.into_values().collect()
}

/// Consecutive complete days for a goal, ending today.
///
/// A streak still counts if today has no complete snapshot yet but
/// yesterday does.
pub fn current_streak(snapshots: &[ProgressSnapshot], goal_id: &str, today: NaiveDate) -> u32 {
    let complete: HashSet<NaiveDate> = snapshots
        .iter()
        .filter(|s| s.goal_id == goal_id && s.was_complete)
        .map(|s| s.snapshot_date)
        .collect();

    let mut day = if complete.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while complete.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    #[test]
    fn test_heatmap_fills_every_day() {
        let snapshots = vec![
            ProgressSnapshot::new("a", date(2), true),
            ProgressSnapshot::new("b", date(2), false),
            ProgressSnapshot::new("a", date(4), true),
            // outside range
            ProgressSnapshot::new("a", date(9), true),
        ];
        let heatmap = completion_heatmap(&snapshots, date(1), date(5));

        assert_eq!(heatmap.len(), 5);
        assert_eq!(heatmap[0].total, 0);
        assert_eq!(heatmap[1].completed, 1);
        assert_eq!(heatmap[1].total, 2);
        assert_eq!(heatmap[1].intensity(), 0.5);
        assert_eq!(heatmap[3].completed, 1);
        assert_eq!(heatmap[4].date, date(5));
    }

    #[test]
    fn test_heatmap_counts_goal_once_per_day() {
        let snapshots = vec![
            ProgressSnapshot::new("a", date(2), true),
            ProgressSnapshot::new("a", date(2), true),
        ];
        let heatmap = completion_heatmap(&snapshots, date(2), date(2));
        assert_eq!(heatmap[0].total, 1);
    }

    #[test]
    fn test_heatmap_empty_range() {
        assert!(completion_heatmap(&[], date(5), date(1)).is_empty());
    }

    #[test]
    fn test_streak() {
        let snapshots: Vec<_> = (10..=14)
            .map(|d| ProgressSnapshot::new("a", date(d), d != 11))
            .collect();

        // 12, 13, 14 complete; 11 broke the streak
        assert_eq!(current_streak(&snapshots, "a", date(14)), 3);
        // Today not logged yet
        assert_eq!(current_streak(&snapshots, "a", date(15)), 3);
        // Two days without a snapshot
        assert_eq!(current_streak(&snapshots, "a", date(16)), 0);
        assert_eq!(current_streak(&snapshots, "b", date(14)), 0);
    }
}
