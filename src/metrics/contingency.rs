//! Consumption and efficiency of risk-contingency budget lines.
//!
//! Efficiency compares the share of contingency consumed with the share of
//! work completed. 100 means consumption tracks progress exactly, lower values
//! mean the budget burns faster than the project advances.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::metrics::percent_of;
use crate::core::WorkPackage;

pub const MAX_EFFICIENCY: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContingencyTrend {
    Accelerating,
    Stable,
    Improving,
    #[serde(rename = "No Contingency")]
    NoContingency,
}

impl ContingencyTrend {
    pub fn label(self) -> &'static str {
        match self {
            ContingencyTrend::Accelerating => "Accelerating",
            ContingencyTrend::Stable => "Stable",
            ContingencyTrend::Improving => "Improving",
            ContingencyTrend::NoContingency => "No Contingency",
        }
    }
}

impl fmt::Display for ContingencyTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContingencyStatus {
    Excellent,
    Good,
    #[serde(rename = "On Track")]
    OnTrack,
    Warning,
    Critical,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl ContingencyStatus {
    pub fn from_efficiency(efficiency: f64) -> Self {
        if efficiency >= 150.0 {
            ContingencyStatus::Excellent
        } else if efficiency >= 120.0 {
            ContingencyStatus::Good
        } else if efficiency >= 80.0 {
            ContingencyStatus::OnTrack
        } else if efficiency >= 50.0 {
            ContingencyStatus::Warning
        } else {
            ContingencyStatus::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContingencyStatus::Excellent => "Excellent",
            ContingencyStatus::Good => "Good",
            ContingencyStatus::OnTrack => "On Track",
            ContingencyStatus::Warning => "Warning",
            ContingencyStatus::Critical => "Critical",
            ContingencyStatus::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for ContingencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyMetrics {
    pub has_contingency: bool,
    pub line_count: usize,
    pub as_sold: f64,
    pub fct_n1: f64,
    pub fct_n: f64,
    pub consumed_amount: f64,
    pub consumed_pct: f64,
    pub remaining_amount: f64,
    pub remaining_pct: f64,
    pub early_consumption: f64,
    pub recent_consumption: f64,
    /// `None` when the project carries no contingency lines
    pub efficiency: Option<f64>,
    pub trend: ContingencyTrend,
    pub status: ContingencyStatus,
}

impl ContingencyMetrics {
    pub fn none() -> Self {
        Self {
            has_contingency: false,
            line_count: 0,
            as_sold: 0.0,
            fct_n1: 0.0,
            fct_n: 0.0,
            consumed_amount: 0.0,
            consumed_pct: 0.0,
            remaining_amount: 0.0,
            remaining_pct: 0.0,
            early_consumption: 0.0,
            recent_consumption: 0.0,
            efficiency: None,
            trend: ContingencyTrend::NoContingency,
            status: ContingencyStatus::NotApplicable,
        }
    }

    /// Metrics for already-summed contingency amounts.
    pub fn from_totals(line_count: usize, as_sold: f64, fct_n1: f64, fct_n: f64, poc: f64) -> Self {
        let consumed_amount = as_sold - fct_n;
        let consumed_pct = percent_of(consumed_amount, as_sold);
        let efficiency = contingency_efficiency(consumed_pct, poc);
        let early_consumption = if as_sold > 0.0 { as_sold - fct_n1 } else { 0.0 };
        let recent_consumption = if fct_n1 > 0.0 { fct_n1 - fct_n } else { 0.0 };

        Self {
            has_contingency: true,
            line_count,
            as_sold,
            fct_n1,
            fct_n,
            consumed_amount,
            consumed_pct,
            remaining_amount: fct_n,
            remaining_pct: percent_of(fct_n, as_sold),
            early_consumption,
            recent_consumption,
            efficiency: Some(efficiency),
            trend: consumption_trend(early_consumption, recent_consumption),
            status: ContingencyStatus::from_efficiency(efficiency),
        }
    }
}

/// `(2 - consumed% / POC%) x 100`, clamped to `[0, 200]`.
///
/// Nothing should have been consumed before work starts, so a zero POC scores
/// the maximum.
pub fn contingency_efficiency(consumed_pct: f64, poc: f64) -> f64 {
    if poc == 0.0 {
        return MAX_EFFICIENCY;
    }
    let efficiency = (2.0 - consumed_pct / poc) * 100.0;
    if efficiency.is_nan() {
        return 0.0;
    }
    efficiency.clamp(0.0, MAX_EFFICIENCY)
}

fn consumption_trend(early: f64, recent: f64) -> ContingencyTrend {
    if early > 0.0 && recent > 1.2 * early {
        ContingencyTrend::Accelerating
    } else if recent < 0.8 * early {
        ContingencyTrend::Improving
    } else {
        ContingencyTrend::Stable
    }
}

pub fn analyze_contingency<'a>(
    packages: impl IntoIterator<Item = &'a WorkPackage>,
    poc: f64,
) -> ContingencyMetrics {
    let (count, as_sold, fct_n1, fct_n) = packages
        .into_iter()
        .filter(|wp| wp.is_risk_contingency)
        .fold((0usize, 0.0, 0.0, 0.0), |(n, sold, n1, cur), wp| {
            (n + 1, sold + wp.as_sold, n1 + wp.fct_n1, cur + wp.fct_n)
        });

    if count == 0 {
        return ContingencyMetrics::none();
    }
    ContingencyMetrics::from_totals(count, as_sold, fct_n1, fct_n, poc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorkPackageRow;
    use proptest::prelude::*;

    fn line(code: &str, description: &str, as_sold: f64, fct_n1: f64, fct_n: f64) -> WorkPackage {
        WorkPackage::from_row(WorkPackageRow {
            code: code.into(),
            description: description.into(),
            as_sold,
            fct_n1,
            fct_n,
            ..Default::default()
        })
    }

    #[test]
    fn test_reference_scenario_is_improving() {
        let packages = [line("RC", "Risk contingency", 1000.0, 900.0, 850.0)];
        let metrics = analyze_contingency(&packages, 40.0);

        assert!(metrics.has_contingency);
        assert_eq!(metrics.consumed_amount, 150.0);
        assert_eq!(metrics.consumed_pct, 15.0);
        assert_eq!(metrics.efficiency, Some(162.5));
        // recent 50 vs early 100 is below the 0.8 ratio
        assert_eq!(metrics.early_consumption, 100.0);
        assert_eq!(metrics.recent_consumption, 50.0);
        assert_eq!(metrics.trend, ContingencyTrend::Improving);
        assert_eq!(metrics.status, ContingencyStatus::Excellent);
        assert_eq!(metrics.remaining_amount, 850.0);
        assert_eq!(metrics.remaining_pct, 85.0);
    }

    #[test]
    fn test_only_contingency_lines_are_summed() {
        let packages = [
            line("A", "Risk contingency civil", 500.0, 450.0, 400.0),
            line("B", "Engineering", 9000.0, 9500.0, 9900.0),
            line("C", "Contingencies - schedule risk", 500.0, 500.0, 300.0),
        ];
        let metrics = analyze_contingency(&packages, 50.0);
        assert_eq!(metrics.line_count, 2);
        assert_eq!(metrics.as_sold, 1000.0);
        assert_eq!(metrics.fct_n, 700.0);
        assert_eq!(metrics.consumed_pct, 30.0);
        // early 50, recent 250
        assert_eq!(metrics.trend, ContingencyTrend::Accelerating);
    }

    #[test]
    fn test_no_contingency_is_not_applicable() {
        let packages = [line("B", "Engineering", 100.0, 100.0, 100.0)];
        let metrics = analyze_contingency(&packages, 50.0);
        assert!(!metrics.has_contingency);
        assert_eq!(metrics.efficiency, None);
        assert_eq!(metrics.status, ContingencyStatus::NotApplicable);
        assert_eq!(metrics.trend, ContingencyTrend::NoContingency);
    }

    #[test]
    fn test_missing_previous_forecast_has_no_recent_consumption() {
        let packages = [line("RC", "Risk contingency", 1000.0, 0.0, 600.0)];
        let metrics = analyze_contingency(&packages, 50.0);
        assert_eq!(metrics.early_consumption, 1000.0);
        assert_eq!(metrics.recent_consumption, 0.0);
        assert_eq!(metrics.consumed_pct, 40.0);
        assert_eq!(metrics.trend, ContingencyTrend::Improving);
    }

    #[test]
    fn test_zero_poc_scores_maximum() {
        assert_eq!(contingency_efficiency(40.0, 0.0), MAX_EFFICIENCY);
    }

    #[test]
    fn test_efficiency_status_bands() {
        assert_eq!(ContingencyStatus::from_efficiency(150.0), ContingencyStatus::Excellent);
        assert_eq!(ContingencyStatus::from_efficiency(120.0), ContingencyStatus::Good);
        assert_eq!(ContingencyStatus::from_efficiency(80.0), ContingencyStatus::OnTrack);
        assert_eq!(ContingencyStatus::from_efficiency(50.0), ContingencyStatus::Warning);
        assert_eq!(ContingencyStatus::from_efficiency(49.9), ContingencyStatus::Critical);
    }

    proptest! {
        #[test]
        fn efficiency_stays_within_bounds(
            as_sold in 0.0..1e7f64,
            consumed_share in 0.0..=1.0f64,
            poc in 0.0..=100.0f64,
        ) {
            let fct_n = as_sold * (1.0 - consumed_share);
            let metrics = ContingencyMetrics::from_totals(1, as_sold, as_sold, fct_n, poc);
            let efficiency = metrics.efficiency.unwrap_or(-1.0);
            prop_assert!((0.0..=MAX_EFFICIENCY).contains(&efficiency));
        }
    }
}
