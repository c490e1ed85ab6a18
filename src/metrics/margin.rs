//! Margin variability across the as-sold, previous and current snapshots.
//!
//! Erosion is signed so that a positive value is an improvement for both
//! CM1 and CM2.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ThresholdBand;
use crate::core::metrics::std_dev;
use crate::metrics::cost::CostAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarginTrend {
    Improving,
    Stable,
    Declining,
    #[serde(rename = "Severely Declining")]
    SeverelyDeclining,
    Volatile,
}

impl MarginTrend {
    pub fn classify(total_erosion: f64, recent_change: f64) -> Self {
        if total_erosion > 2.0 {
            MarginTrend::Improving
        } else if total_erosion < -5.0 {
            MarginTrend::SeverelyDeclining
        } else if total_erosion < -2.0 {
            MarginTrend::Declining
        } else if recent_change.abs() <= 1.0 {
            MarginTrend::Stable
        } else {
            MarginTrend::Volatile
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarginTrend::Improving => "Improving",
            MarginTrend::Stable => "Stable",
            MarginTrend::Declining => "Declining",
            MarginTrend::SeverelyDeclining => "Severely Declining",
            MarginTrend::Volatile => "Volatile",
        }
    }
}

impl fmt::Display for MarginTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarginRisk {
    Low,
    Medium,
    High,
    Critical,
}

impl MarginRisk {
    /// Blend the current CM2 level with the direction it is moving in.
    ///
    /// Improving margins sit one tier better than stable margins at the same
    /// level; deteriorating margins sit one tier worse and turn Critical once
    /// the level drops below warning or erosion passes ten points.
    pub fn assess(current_cm2: f64, total_erosion: f64, band: &ThresholdBand) -> Self {
        if total_erosion > 2.0 {
            if current_cm2 >= band.good {
                MarginRisk::Low
            } else if current_cm2 >= band.warning {
                MarginRisk::Medium
            } else {
                MarginRisk::High
            }
        } else if total_erosion >= -2.0 {
            if current_cm2 >= band.excellent {
                MarginRisk::Low
            } else if current_cm2 >= band.good {
                MarginRisk::Medium
            } else if current_cm2 >= band.warning {
                MarginRisk::High
            } else {
                MarginRisk::Critical
            }
        } else if current_cm2 >= band.excellent && total_erosion > -5.0 {
            MarginRisk::Medium
        } else if current_cm2 >= band.good && total_erosion > -5.0 {
            MarginRisk::High
        } else if current_cm2 >= band.warning && total_erosion > -10.0 {
            MarginRisk::High
        } else {
            MarginRisk::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MarginRisk::Low => "Low",
            MarginRisk::Medium => "Medium",
            MarginRisk::High => "High",
            MarginRisk::Critical => "Critical",
        }
    }
}

impl fmt::Display for MarginRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastReliability {
    #[serde(rename = "Highly Reliable")]
    HighlyReliable,
    Reliable,
    #[serde(rename = "Moderately Reliable")]
    ModeratelyReliable,
    Unreliable,
}

impl ForecastReliability {
    pub fn from_average_change(average_abs_change: f64) -> Self {
        if average_abs_change <= 1.0 {
            ForecastReliability::HighlyReliable
        } else if average_abs_change <= 3.0 {
            ForecastReliability::Reliable
        } else if average_abs_change <= 5.0 {
            ForecastReliability::ModeratelyReliable
        } else {
            ForecastReliability::Unreliable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ForecastReliability::HighlyReliable => "Highly Reliable",
            ForecastReliability::Reliable => "Reliable",
            ForecastReliability::ModeratelyReliable => "Moderately Reliable",
            ForecastReliability::Unreliable => "Unreliable",
        }
    }
}

impl fmt::Display for ForecastReliability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One margin level (CM1 or CM2) tracked across the three snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginSeries {
    pub as_sold: f64,
    pub fct_n1: f64,
    pub fct_n: f64,
    /// Percentage points gained (positive) or lost since the sale
    pub total_erosion: f64,
    pub recent_change: f64,
    pub volatility_index: f64,
    /// `|fct_n1 - fct_n|`, 0 without a previous forecast
    pub forecast_accuracy: f64,
    pub value_impact: f64,
}

impl MarginSeries {
    fn from_pcts([as_sold, fct_n1, fct_n]: [f64; 3], current_price: f64) -> Self {
        let total_erosion = fct_n - as_sold;
        let non_zero: Vec<f64> = [as_sold, fct_n1, fct_n]
            .into_iter()
            .filter(|v| *v != 0.0)
            .collect();
        Self {
            as_sold,
            fct_n1,
            fct_n,
            total_erosion,
            recent_change: fct_n - fct_n1,
            volatility_index: std_dev(&non_zero),
            forecast_accuracy: if fct_n1 != 0.0 {
                (fct_n1 - fct_n).abs()
            } else {
                0.0
            },
            value_impact: total_erosion / 100.0 * current_price,
        }
    }

    pub fn current(&self) -> f64 {
        self.fct_n
    }

    /// Movement since the previous forecast, 0 when there is none.
    pub fn tracked_change(&self) -> f64 {
        if self.fct_n1 != 0.0 {
            self.recent_change
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginVariabilityAnalysis {
    pub cm1: MarginSeries,
    pub cm2: MarginSeries,
    pub trend: MarginTrend,
    pub risk_level: MarginRisk,
    pub forecast_reliability: ForecastReliability,
}

/// Margin variability result; a project whose margins never moved has no
/// forecast history to analyse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MarginVariability {
    NoHistoricalData,
    Analyzed(MarginVariabilityAnalysis),
}

impl MarginVariability {
    pub fn analysis(&self) -> Option<&MarginVariabilityAnalysis> {
        match self {
            MarginVariability::Analyzed(analysis) => Some(analysis),
            MarginVariability::NoHistoricalData => None,
        }
    }

    pub fn has_historical_data(&self) -> bool {
        self.analysis().is_some()
    }
}

fn any_differs([a, b, c]: [f64; 3]) -> bool {
    a != b || b != c || a != c
}

pub fn analyze_margin_variability(costs: &CostAnalysis, cm2_band: &ThresholdBand) -> MarginVariability {
    let cm1_pcts = costs.margins.cm1_pcts();
    let cm2_pcts = costs.margins.cm2_pcts();
    if !any_differs(cm1_pcts) && !any_differs(cm2_pcts) {
        return MarginVariability::NoHistoricalData;
    }

    let current_price = costs.selling_price.fct_n;
    let cm1 = MarginSeries::from_pcts(cm1_pcts, current_price);
    let cm2 = MarginSeries::from_pcts(cm2_pcts, current_price);
    let average_change = (cm2.forecast_accuracy + cm1.forecast_accuracy) / 2.0;

    MarginVariability::Analyzed(MarginVariabilityAnalysis {
        trend: MarginTrend::classify(cm2.total_erosion, cm2.tracked_change()),
        risk_level: MarginRisk::assess(cm2.current(), cm2.total_erosion, cm2_band),
        forecast_reliability: ForecastReliability::from_average_change(average_change),
        cm1,
        cm2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdTable;
    use crate::core::SnapshotAmounts;
    use crate::metrics::cost::{MarginFigures, MarginSnapshots};

    fn costs(cm1: [f64; 3], cm2: [f64; 3], price_fct_n: f64) -> CostAnalysis {
        let figures = |i: usize| MarginFigures {
            cm1_pct: cm1[i],
            cm2_pct: cm2[i],
            ..Default::default()
        };
        CostAnalysis {
            selling_price: SnapshotAmounts::new(price_fct_n, price_fct_n, price_fct_n),
            margins: MarginSnapshots {
                as_sold: figures(0),
                fct_n1: figures(1),
                fct_n: figures(2),
            },
            ..Default::default()
        }
    }

    fn cm2_band() -> ThresholdBand {
        ThresholdTable::default().cm2_margin
    }

    #[test]
    fn test_severely_declining_reference_scenario() {
        let analysis = costs([30.0, 29.0, 28.0], [20.0, 18.0, 12.0], 1_000_000.0);
        let result = analyze_margin_variability(&analysis, &cm2_band());
        let analysis = result.analysis().expect("margins moved");

        assert_eq!(analysis.cm2.total_erosion, -8.0);
        assert_eq!(analysis.cm2.recent_change, -6.0);
        assert_eq!(analysis.cm2.value_impact, -80_000.0);
        assert_eq!(analysis.trend, MarginTrend::SeverelyDeclining);
        // 12% is above warning but erosion is past -5
        assert_eq!(analysis.risk_level, MarginRisk::High);
        assert!((analysis.cm2.volatility_index - 3.399_346).abs() < 1e-5);
        assert_eq!(analysis.cm2.forecast_accuracy, 6.0);
        // (6 + 1) / 2 = 3.5
        assert_eq!(analysis.forecast_reliability, ForecastReliability::ModeratelyReliable);
    }

    #[test]
    fn test_flat_margins_have_no_history() {
        let analysis = costs([25.0; 3], [12.0; 3], 500.0);
        let result = analyze_margin_variability(&analysis, &cm2_band());
        assert_eq!(result, MarginVariability::NoHistoricalData);
        assert!(!result.has_historical_data());
    }

    #[test]
    fn test_cm1_movement_alone_triggers_analysis() {
        let analysis = costs([25.0, 24.0, 25.0], [12.0; 3], 500.0);
        assert!(analyze_margin_variability(&analysis, &cm2_band()).has_historical_data());
    }

    #[test]
    fn test_missing_previous_forecast_counts_as_no_movement() {
        let analysis = costs([25.0, 0.0, 25.5], [12.0, 0.0, 12.5], 1000.0);
        let result = analyze_margin_variability(&analysis, &cm2_band());
        let analysis = result.analysis().expect("margins moved");

        assert_eq!(analysis.cm2.recent_change, 12.5);
        assert_eq!(analysis.cm2.tracked_change(), 0.0);
        assert_eq!(analysis.cm2.forecast_accuracy, 0.0);
        assert_eq!(analysis.trend, MarginTrend::Stable);
        assert_eq!(analysis.forecast_reliability, ForecastReliability::HighlyReliable);
    }

    #[test]
    fn test_volatility_ignores_zero_snapshots() {
        let series = MarginSeries::from_pcts([0.0, 0.0, 12.0], 100.0);
        assert_eq!(series.volatility_index, 0.0);
        assert_eq!(series.forecast_accuracy, 0.0);
    }

    #[test]
    fn test_trend_classification_order() {
        assert_eq!(MarginTrend::classify(2.5, -4.0), MarginTrend::Improving);
        assert_eq!(MarginTrend::classify(-3.0, 0.0), MarginTrend::Declining);
        assert_eq!(MarginTrend::classify(-1.0, 0.5), MarginTrend::Stable);
        assert_eq!(MarginTrend::classify(1.0, -1.5), MarginTrend::Volatile);
    }

    #[test]
    fn test_risk_matrix() {
        let band = cm2_band();
        // improving margins
        assert_eq!(MarginRisk::assess(11.0, 3.0, &band), MarginRisk::Low);
        assert_eq!(MarginRisk::assess(6.0, 3.0, &band), MarginRisk::Medium);
        assert_eq!(MarginRisk::assess(2.0, 3.0, &band), MarginRisk::High);
        // stable margins
        assert_eq!(MarginRisk::assess(16.0, 0.0, &band), MarginRisk::Low);
        assert_eq!(MarginRisk::assess(11.0, 0.0, &band), MarginRisk::Medium);
        assert_eq!(MarginRisk::assess(6.0, 0.0, &band), MarginRisk::High);
        assert_eq!(MarginRisk::assess(2.0, 0.0, &band), MarginRisk::Critical);
        // deteriorating margins
        assert_eq!(MarginRisk::assess(16.0, -3.0, &band), MarginRisk::Medium);
        assert_eq!(MarginRisk::assess(11.0, -3.0, &band), MarginRisk::High);
        assert_eq!(MarginRisk::assess(16.0, -12.0, &band), MarginRisk::Critical);
        assert_eq!(MarginRisk::assess(4.0, -3.0, &band), MarginRisk::Critical);
    }
}
