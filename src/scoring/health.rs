//! Normalised 0-100 project health score.
//!
//! Components are scaled so that the nominal target scores 100, with a bonus
//! up to 120 for overperformance before weighting:
//!
//! | Component | 100 points at | Weight |
//! |-----------|---------------|--------|
//! | CPI       | 1.0           | 30%    |
//! | SPI       | 1.0           | 30%    |
//! | CM2       | 15%           | 25%    |
//! | Velocity  | 5 pts/period  | 15%    |
//!
//! Without a velocity the weights become 35/35/30.

use serde::{Deserialize, Serialize};

const COMPONENT_CAP: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub cpi_score: f64,
    pub spi_score: f64,
    pub cm2_score: f64,
    pub velocity_score: Option<f64>,
    pub total: f64,
}

fn index_score(index: f64) -> f64 {
    (index * 100.0).min(COMPONENT_CAP)
}

/// Linear up to `target`, then +20 points per `bonus_step` above it.
fn scaled_score(value: f64, target: f64, bonus_step: f64) -> f64 {
    if value <= 0.0 {
        0.0
    } else if value <= target {
        value / target * 100.0
    } else {
        (100.0 + (value - target) / bonus_step * 20.0).min(COMPONENT_CAP)
    }
}

pub fn project_health_score(cpi: f64, spi: f64, cm2_pct: f64, velocity: Option<f64>) -> HealthScore {
    let cpi_score = index_score(cpi);
    let spi_score = index_score(spi);
    let cm2_score = scaled_score(cm2_pct, 15.0, 5.0);
    let velocity_score = velocity.map(|v| scaled_score(v, 5.0, 2.0));

    let weighted = match velocity_score {
        Some(v) => cpi_score * 0.30 + spi_score * 0.30 + cm2_score * 0.25 + v * 0.15,
        None => cpi_score * 0.35 + spi_score * 0.35 + cm2_score * 0.30,
    };
    let total = if weighted.is_nan() {
        0.0
    } else {
        weighted.clamp(0.0, 100.0)
    };

    HealthScore {
        cpi_score,
        spi_score,
        cm2_score,
        velocity_score,
        total,
    }
}
