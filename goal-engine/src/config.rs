//! Configuration for the goal engine.

use serde::{Deserialize, Serialize};

use crate::curve::DEFAULT_FRACTIONAL_DECIMALS;
use crate::types::{EngineError, Result};

/// Configuration for a [`GoalEngine`](crate::GoalEngine).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Milestone curve settings
    pub curve: CurveSettings,
    /// Phase transition rules
    pub phase: PhaseRules,
    /// Badge tier thresholds
    pub badges: BadgeTiers,
}

impl EngineConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Reject inconsistent settings.
    pub fn validate(&self) -> Result<()> {
        self.curve.validate()?;
        self.phase.validate()?;
        self.badges.validate()
    }
}

/// Milestone curve settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSettings {
    /// Decimals kept on curves that allow fractional values
    pub fractional_decimals: u32,
    /// Accept habit ramps whose frequency goes down
    pub allow_decreasing_ramps: bool,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            fractional_decimals: DEFAULT_FRACTIONAL_DECIMALS,
            allow_decreasing_ramps: false,
        }
    }
}

impl CurveSettings {
    fn validate(&self) -> Result<()> {
        if self.fractional_decimals > 6 {
            return Err(EngineError::ConfigError(format!(
                "fractional_decimals must be at most 6, got {}",
                self.fractional_decimals
            )));
        }
        Ok(())
    }
}

/// Thresholds for phase transition detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseRules {
    /// Trailing periods inspected
    pub lookback_periods: usize,
    /// Goals with fewer periods of history are skipped
    pub min_history_periods: usize,
    /// Consecutive met periods required to advance
    pub advance_streak: usize,
    /// Minimum window completion rate to advance (0.0 - 1.0)
    pub advance_rate: f64,
    /// Consecutive missed periods that force a regression
    pub regress_streak: usize,
    /// Window completion rate at or below which a goal regresses (0.0 - 1.0)
    pub regress_rate: f64,
}

impl Default for PhaseRules {
    fn default() -> Self {
        Self {
            lookback_periods: 8, // two months of weekly reviews
            min_history_periods: 4,
            advance_streak: 4,
            advance_rate: 0.75,
            regress_streak: 3,
            regress_rate: 0.25,
        }
    }
}

impl PhaseRules {
    fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(EngineError::ConfigError(msg)) };

        if self.lookback_periods == 0 {
            return fail("lookback_periods must be positive".to_string());
        }
        if self.min_history_periods == 0 || self.min_history_periods > self.lookback_periods {
            return fail(format!(
                "min_history_periods must be in 1..={}",
                self.lookback_periods
            ));
        }
        for (name, streak) in [
            ("advance_streak", self.advance_streak),
            ("regress_streak", self.regress_streak),
        ] {
            if streak == 0 || streak > self.lookback_periods {
                return fail(format!("{} must be in 1..={}", name, self.lookback_periods));
            }
        }
        for (name, rate) in [
            ("advance_rate", self.advance_rate),
            ("regress_rate", self.regress_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return fail(format!("{} must be between 0 and 1, got {}", name, rate));
            }
        }
        if self.regress_rate >= self.advance_rate {
            return fail("regress_rate must be below advance_rate".to_string());
        }
        Ok(())
    }
}

/// Minimum progress percent for each badge tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeTiers {
    pub bronze: f64,
    pub silver: f64,
    pub gold: f64,
    pub platinum: f64,
}

impl Default for BadgeTiers {
    fn default() -> Self {
        Self {
            bronze: 25.0,
            silver: 50.0,
            gold: 75.0,
            platinum: 100.0,
        }
    }
}

impl BadgeTiers {
    fn validate(&self) -> Result<()> {
        let ordered = 0.0 < self.bronze
            && self.bronze < self.silver
            && self.silver < self.gold
            && self.gold < self.platinum
            && self.platinum <= 100.0;
        if !ordered {
            return Err(EngineError::ConfigError(
                "badge tiers must increase within (0, 100]".to_string(),
            ));
        }
        Ok(())
    }
}
