//! Time-series analysis over progress snapshots.
//!
//! - **Phase transitions**: advance or regress a goal's lifecycle phase
//! - **History**: completion heatmap and streaks

mod history;
mod phase;

pub use history::{completion_heatmap, current_streak, HeatmapDay};
pub use phase::{detect_all_phase_transitions, period_key, PhaseDetector, PhaseTransition};
