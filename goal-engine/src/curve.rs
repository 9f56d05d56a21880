//! Milestone curve and habit ramp math.
//!
//! A milestone curve maps step `1..=steps` to a target value between `start`
//! (exclusive) and `target` (inclusive). Tension bends the curve:
//!
//! - `tension = 0`: linear
//! - `tension > 0`: front-loaded, `p^(1/(1+t))`
//! - `tension < 0`: back-loaded, `1 - (1-p)^(1/(1+|t|))`
//!
//! Control points pin exact values; the curve is evaluated piecewise between
//! consecutive anchors with the same shape scaled to each sub-range.
//!
//! Values are computed in integer units of the rounding precision, so the
//! strict-monotonicity guarantee survives rounding.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use goal_catalog::{MilestoneCurveConfig, RampStep};

/// Decimals kept for fractional curves unless configured otherwise.
pub const DEFAULT_FRACTIONAL_DECIMALS: u32 = 2;

/// Largest magnitude, in rounding units, that converts to `i64` and back exactly.
const MAX_UNITS: f64 = 9_007_199_254_740_992.0; // 2^53

/// Invalid curve or ramp configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("A curve needs at least 2 steps, got {0}")]
    TooFewSteps(u32),

    #[error("Target {target} is below start {start}")]
    TargetBelowStart { start: f64, target: f64 },

    #[error("Target equals start ({0}), nothing to pace")]
    EmptyRange(f64),

    #[error("Curve value {0} is not finite")]
    NonFinite(f64),

    #[error("Value {value} is not representable with {decimals} decimals")]
    NotRepresentable { value: f64, decimals: u32 },

    #[error("Steps {from_step}..{to_step} cannot hold distinct values between {from_value} and {to_value}")]
    RangeTooNarrow {
        from_step: u32,
        to_step: u32,
        from_value: f64,
        to_value: f64,
    },

    #[error("Invalid control point at step {step}: {reason}")]
    InvalidControlPoint { step: u32, reason: String },

    #[error("Habit ramp has no steps")]
    EmptyRamp,

    #[error("Ramp step {0} must have a positive frequency and duration")]
    InvalidRampStep(usize),

    #[error("Ramp step {index} lowers frequency from {from} to {to}")]
    DecreasingRamp { index: usize, from: u32, to: u32 },
}

/// Shape function: maps progress `p` in `[0, 1]` to curve progress in `[0, 1]`.
pub fn shape(p: f64, tension: f64) -> f64 {
    if tension > 0.0 {
        p.powf(1.0 / (1.0 + tension))
    } else if tension < 0.0 {
        1.0 - (1.0 - p).powf(1.0 / (1.0 + tension.abs()))
    } else {
        p
    }
}

/// Compute milestone values with the default fractional precision.
pub fn compute_milestones(config: &MilestoneCurveConfig) -> Result<Vec<f64>, CurveError> {
    compute_milestones_with_precision(config, DEFAULT_FRACTIONAL_DECIMALS)
}

/// Compute milestone values.
///
/// `fractional_decimals` applies only when the config allows fractional
/// values; integer curves always round to whole numbers.
pub fn compute_milestones_with_precision(
    config: &MilestoneCurveConfig,
    fractional_decimals: u32,
) -> Result<Vec<f64>, CurveError> {
    if config.steps < 2 {
        return Err(CurveError::TooFewSteps(config.steps));
    }
    for value in [config.start, config.target, config.curve_tension] {
        if !value.is_finite() {
            return Err(CurveError::NonFinite(value));
        }
    }
    if config.target < config.start {
        return Err(CurveError::TargetBelowStart {
            start: config.start,
            target: config.target,
        });
    }
    if config.target == config.start {
        return Err(CurveError::EmptyRange(config.start));
    }

    let decimals = if config.fractional { fractional_decimals } else { 0 };
    let scale = 10f64.powi(decimals as i32);
    let anchors = anchors(config, scale, decimals)?;

    let mut milestones = Vec::with_capacity(config.steps as usize);
    for pair in anchors.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let span = to.step - from.step;
        let range = (to.units - from.units) as f64;
        let mut previous = from.units;

        for step in from.step + 1..=to.step {
            let p = f64::from(step - from.step) / f64::from(span);
            let raw = from.units as f64 + range * shape(p, config.curve_tension);
            // Leave room for one unit per remaining step up to the anchor.
            let upper = to.units - i64::from(to.step - step);
            let units = (raw.round() as i64).clamp(previous + 1, upper);
            milestones.push(units as f64 / scale);
            previous = units;
        }
    }

    Ok(milestones)
}

#[derive(Debug, Clone, Copy)]
struct Anchor {
    step: u32,
    units: i64,
}

fn to_units(value: f64, scale: f64, decimals: u32) -> Result<i64, CurveError> {
    let scaled = value * scale;
    let rounded = scaled.round();
    // 0 * inf is NaN when the precision overflows the scale.
    if rounded.is_nan() || rounded.abs() > MAX_UNITS || (scaled - rounded).abs() > 1e-6 {
        return Err(CurveError::NotRepresentable { value, decimals });
    }
    Ok(rounded as i64)
}

/// Start, pins and target as integer anchors, validated.
fn anchors(
    config: &MilestoneCurveConfig,
    scale: f64,
    decimals: u32,
) -> Result<Vec<Anchor>, CurveError> {
    let mut anchors = Vec::with_capacity(config.control_points.len() + 2);
    anchors.push(Anchor {
        step: 0,
        units: to_units(config.start, scale, decimals)?,
    });

    for point in &config.control_points {
        let invalid = |reason: &str| CurveError::InvalidControlPoint {
            step: point.step,
            reason: reason.to_string(),
        };
        if point.step == 0 || point.step >= config.steps {
            return Err(invalid("step must be between 1 and steps - 1"));
        }
        if !point.value.is_finite() || point.value <= config.start || point.value >= config.target
        {
            return Err(invalid("value must lie strictly between start and target"));
        }
        let units = to_units(point.value, scale, decimals)?;
        if let Some(previous) = anchors.last() {
            if point.step <= previous.step || units <= previous.units {
                return Err(invalid("control points must increase in step and value"));
            }
        }
        anchors.push(Anchor {
            step: point.step,
            units,
        });
    }

    anchors.push(Anchor {
        step: config.steps,
        units: to_units(config.target, scale, decimals)?,
    });

    for pair in anchors.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let gap = to
            .units
            .checked_sub(from.units)
            .ok_or(CurveError::NotRepresentable {
                value: config.target,
                decimals,
            })?;
        if gap < i64::from(to.step - from.step) {
            return Err(CurveError::RangeTooNarrow {
                from_step: from.step,
                to_step: to.step,
                from_value: from.units as f64 / scale,
                to_value: to.units as f64 / scale,
            });
        }
    }

    Ok(anchors)
}

/// Index of the first milestone not yet reached (`len` when all are met).
pub fn milestone_index_for(current_value: f64, milestones: &[f64]) -> usize {
    milestones
        .iter()
        .position(|&m| current_value < m)
        .unwrap_or(milestones.len())
}

/// Value of the next milestone to hit, `None` once the target is reached.
pub fn next_milestone_target(current_value: f64, milestones: &[f64]) -> Option<f64> {
    milestones.get(milestone_index_for(current_value, milestones)).copied()
}

/// SHA-256 of a curve configuration, for keying caches on content.
pub fn curve_fingerprint(config: &MilestoneCurveConfig) -> String {
    let json = serde_json::to_vec(config).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&json);
    hex::encode(hasher.finalize())
}

/// Position on a habit ramp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRampTarget {
    /// Index of the active stage (last stage once complete)
    pub step_index: usize,
    /// Weekly frequency currently asked for
    pub frequency_per_week: u32,
    /// Completions needed to clear the active stage
    pub cumulative_requirement: u64,
    /// Stages fully cleared
    pub steps_completed: usize,
    /// Every stage cleared
    pub complete: bool,
}

/// Active stage of a habit ramp given total completions so far.
///
/// A stage is cleared once `current_value` reaches the cumulative requirement
/// of every stage up to and including it. After the last stage the ramp holds
/// at its final frequency.
pub fn compute_active_ramp_target(
    steps: &[RampStep],
    current_value: f64,
) -> Result<ActiveRampTarget, CurveError> {
    let last = steps.last().ok_or(CurveError::EmptyRamp)?;

    let mut cumulative = 0u64;
    for (index, step) in steps.iter().enumerate() {
        cumulative += step.requirement();
        if current_value < cumulative as f64 {
            return Ok(ActiveRampTarget {
                step_index: index,
                frequency_per_week: step.frequency_per_week,
                cumulative_requirement: cumulative,
                steps_completed: index,
                complete: false,
            });
        }
    }

    Ok(ActiveRampTarget {
        step_index: steps.len() - 1,
        frequency_per_week: last.frequency_per_week,
        cumulative_requirement: cumulative,
        steps_completed: steps.len(),
        complete: true,
    })
}

/// Completions banked on a ramp after some more weeks of counts.
///
/// Starts from `banked` and walks `weekly_counts` oldest first. Each week
/// credits at most the frequency of the stage active at its start, so one
/// heavy week cannot clear a stage meant to span several weeks.
pub fn ramp_completions(
    steps: &[RampStep],
    banked: f64,
    weekly_counts: &[f64],
) -> Result<f64, CurveError> {
    let mut total = banked.max(0.0);
    for &count in weekly_counts {
        let active = compute_active_ramp_target(steps, total)?;
        if active.complete {
            break;
        }
        total += count.clamp(0.0, f64::from(active.frequency_per_week));
    }
    Ok(total)
}

/// Check an authored ramp.
pub fn validate_ramp(steps: &[RampStep], allow_decreasing: bool) -> Result<(), CurveError> {
    if steps.is_empty() {
        return Err(CurveError::EmptyRamp);
    }
    for (index, step) in steps.iter().enumerate() {
        if step.frequency_per_week == 0 || step.weeks == 0 {
            return Err(CurveError::InvalidRampStep(index));
        }
    }
    if !allow_decreasing {
        for (index, pair) in steps.windows(2).enumerate() {
            if pair[1].frequency_per_week < pair[0].frequency_per_week {
                return Err(CurveError::DecreasingRamp {
                    index: index + 1,
                    from: pair[0].frequency_per_week,
                    to: pair[1].frequency_per_week,
                });
            }
        }
    }
    Ok(())
}
