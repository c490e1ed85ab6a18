//! Threshold presets for common portfolio policies.
//!
//! - **Strict**: higher margin expectations, tighter cost tolerance
//! - **Balanced**: the documented defaults
//! - **Lenient**: relaxed margins for low-margin or turnaround portfolios
//!
//! # Example
//!
//! ```rust,ignore
//! use portfolio_lens::config::presets::PresetLevel;
//!
//! let table = PresetLevel::Strict.thresholds();
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::thresholds::{ThresholdBand, ThresholdTable};

/// Preset threshold levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PresetLevel {
    Strict,
    /// Documented defaults (recommended)
    Balanced,
    Lenient,
}

impl PresetLevel {
    /// Threshold table for this preset.
    pub fn thresholds(self) -> ThresholdTable {
        match self {
            PresetLevel::Strict => ThresholdTable {
                cm2_margin: ThresholdBand::new(18.0, 12.0, 7.0, 2.0),
                cm1_margin: ThresholdBand::new(28.0, 23.0, 18.0, 13.0),
                committed_vs_budget: ThresholdBand::new(0.85, 0.95, 1.05, 1.15),
                cost_variance: ThresholdBand::new(-5.0, 3.0, 10.0, 20.0),
                ..Default::default()
            },
            PresetLevel::Balanced => ThresholdTable::default(),
            PresetLevel::Lenient => ThresholdTable {
                cm2_margin: ThresholdBand::new(12.0, 8.0, 3.0, 0.0),
                cm1_margin: ThresholdBand::new(20.0, 15.0, 10.0, 5.0),
                committed_vs_budget: ThresholdBand::new(0.95, 1.05, 1.15, 1.3),
                cost_variance: ThresholdBand::new(0.0, 10.0, 20.0, 30.0),
                ..Default::default()
            },
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Some(PresetLevel::Strict),
            "balanced" => Some(PresetLevel::Balanced),
            "lenient" | "permissive" => Some(PresetLevel::Lenient),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PresetLevel::Strict => "strict",
            PresetLevel::Balanced => "balanced",
            PresetLevel::Lenient => "lenient",
        }
    }
}

impl fmt::Display for PresetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
