//! Traffic-light classification of a value against a [`ThresholdBand`].
//!
//! Every higher-level component maps its metrics through [`classify`], so the
//! tier a value lands in depends only on the value, the band and the polarity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Polarity, ThresholdBand};

/// Classification tier, ordered best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    Excellent,
    Good,
    Stable,
    Warning,
    Critical,
}

impl StatusTier {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "excellent" => Some(StatusTier::Excellent),
            "good" => Some(StatusTier::Good),
            "stable" => Some(StatusTier::Stable),
            "warning" => Some(StatusTier::Warning),
            "critical" => Some(StatusTier::Critical),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            StatusTier::Excellent => "excellent",
            StatusTier::Good => "good",
            StatusTier::Stable => "stable",
            StatusTier::Warning => "warning",
            StatusTier::Critical => "critical",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusTier::Excellent => "Excellent",
            StatusTier::Good => "Good",
            StatusTier::Stable => "Stable",
            StatusTier::Warning => "Warning",
            StatusTier::Critical => "Critical",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            StatusTier::Excellent | StatusTier::Good => "🟢",
            StatusTier::Stable => "🟦",
            StatusTier::Warning => "🟡",
            StatusTier::Critical => "🔴",
        }
    }

    /// Score used when several tiers are blended into one status (4 = best).
    ///
    /// Stable only occurs on growth-style metrics, none of which take part in
    /// the blended project status; it scores like Good.
    pub fn score(self) -> u8 {
        match self {
            StatusTier::Excellent => 4,
            StatusTier::Good | StatusTier::Stable => 3,
            StatusTier::Warning => 2,
            StatusTier::Critical => 1,
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: StatusTier,
    pub icon: &'static str,
    pub label: &'static str,
}

impl From<StatusTier> for Classification {
    fn from(tier: StatusTier) -> Self {
        Self {
            tier,
            icon: tier.icon(),
            label: tier.label(),
        }
    }
}

/// Map `value` onto a tier of `band`.
///
/// NaN always lands in the worst tier.
pub fn classify(value: f64, band: &ThresholdBand, polarity: Polarity) -> Classification {
    classify_tier(value, band, polarity).into()
}

pub fn classify_tier(value: f64, band: &ThresholdBand, polarity: Polarity) -> StatusTier {
    if value.is_nan() {
        return StatusTier::Critical;
    }

    match polarity {
        Polarity::HigherIsBetter => {
            if value >= band.excellent {
                StatusTier::Excellent
            } else if value >= band.good {
                StatusTier::Good
            } else if band.stable.is_some_and(|stable| value >= stable) {
                StatusTier::Stable
            } else if value >= band.warning {
                StatusTier::Warning
            } else {
                StatusTier::Critical
            }
        }
        Polarity::LowerIsBetter => {
            if value <= band.excellent {
                StatusTier::Excellent
            } else if value <= band.good {
                StatusTier::Good
            } else if value <= band.warning {
                StatusTier::Warning
            } else {
                StatusTier::Critical
            }
        }
    }
}
