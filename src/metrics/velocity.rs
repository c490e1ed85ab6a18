//! POC velocity and the maturity-dependent expectation curve.
//!
//! Projects slow down as they approach completion. Comparing velocity with
//! what is expected at the current maturity avoids penalising late-stage
//! projects against flat thresholds.

use serde::{Deserialize, Serialize};

use crate::config::{Metric, ThresholdTable};
use crate::core::metrics::ratio_or;
use crate::scoring::{classify_tier, StatusTier};

/// Expected points of progress per period at a given completion level.
pub fn expected_velocity(poc: f64) -> f64 {
    if poc >= 95.0 {
        1.0
    } else if poc >= 90.0 {
        2.0
    } else if poc >= 80.0 {
        3.0
    } else if poc >= 60.0 {
        5.0
    } else if poc >= 40.0 {
        7.0
    } else {
        10.0
    }
}

pub fn maturity_adjusted_tier(velocity_ratio: f64) -> StatusTier {
    if velocity_ratio >= 1.2 {
        StatusTier::Excellent
    } else if velocity_ratio >= 0.8 {
        StatusTier::Good
    } else if velocity_ratio >= 0.5 {
        StatusTier::Warning
    } else {
        StatusTier::Critical
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PocVelocity {
    pub current_poc: f64,
    pub previous_poc: f64,
    /// Percentage points gained since the previous period
    pub velocity: f64,
    pub expected_velocity: f64,
    pub velocity_ratio: f64,
    /// Raw velocity against the flat `poc_velocity` band
    pub raw_status: StatusTier,
    pub adjusted_status: StatusTier,
    /// The maturity curve moved the project to a different tier
    pub maturity_adjusted: bool,
}

pub fn analyze_velocity(current_poc: f64, previous_poc: f64, thresholds: &ThresholdTable) -> PocVelocity {
    let velocity = current_poc - previous_poc;
    let expected = expected_velocity(current_poc);
    let velocity_ratio = ratio_or(velocity, expected, 0.0);

    let metric = Metric::PocVelocity;
    let raw_status = classify_tier(velocity, thresholds.band(metric), metric.polarity());
    let adjusted_status = maturity_adjusted_tier(velocity_ratio);

    PocVelocity {
        current_poc,
        previous_poc,
        velocity,
        expected_velocity: expected,
        velocity_ratio,
        raw_status,
        adjusted_status,
        maturity_adjusted: raw_status != adjusted_status,
    }
}
