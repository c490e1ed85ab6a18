//! Portfolio view of margin variability.

use serde::Serialize;

use crate::metrics::{ForecastReliability, MarginRisk, MarginTrend};
use crate::project::ProjectRecord;

/// CM2 volatility above which a project counts as highly volatile.
pub const HIGH_VOLATILITY: f64 = 5.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarginRollup {
    pub projects_analyzed: usize,
    pub projects_with_data: usize,
    pub severely_declining: usize,
    pub high_volatility: usize,
    pub unreliable_forecasts: usize,
    /// Projects whose margin risk is High or Critical
    pub margin_risk_projects: usize,
    pub total_cm2_value_impact: f64,
    /// Mean CM2 volatility over projects with forecast history
    pub average_cm2_volatility: f64,
}

impl MarginRollup {
    pub fn build(records: &[ProjectRecord]) -> Self {
        let mut rollup = Self::default();
        let mut volatility_sum = 0.0;

        for record in records.iter().filter(|r| r.is_valid()) {
            rollup.projects_analyzed += 1;
            let Some(analysis) = record.metrics.margin_variability.analysis() else {
                continue;
            };
            rollup.projects_with_data += 1;
            if analysis.trend == MarginTrend::SeverelyDeclining {
                rollup.severely_declining += 1;
            }
            if analysis.cm2.volatility_index > HIGH_VOLATILITY {
                rollup.high_volatility += 1;
            }
            if analysis.forecast_reliability == ForecastReliability::Unreliable {
                rollup.unreliable_forecasts += 1;
            }
            if matches!(analysis.risk_level, MarginRisk::High | MarginRisk::Critical) {
                rollup.margin_risk_projects += 1;
            }
            rollup.total_cm2_value_impact += analysis.cm2.value_impact;
            volatility_sum += analysis.cm2.volatility_index;
        }

        if rollup.projects_with_data > 0 {
            rollup.average_cm2_volatility = volatility_sum / rollup.projects_with_data as f64;
        }
        rollup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::core::{ProjectInput, SnapshotAmounts};

    fn record(id: &str, external: [f64; 3]) -> ProjectRecord {
        let mut input = ProjectInput {
            id: id.into(),
            ..Default::default()
        };
        input.revenues.contract_price.n_ptd = 1000.0;
        input.costs.selling_price = Some(SnapshotAmounts::uniform(1000.0));
        input.costs.external_costs = SnapshotAmounts::new(external[0], external[1], external[2]);
        ProjectRecord::derive(input.normalize(), &AnalysisConfig::default())
    }

    #[test]
    fn test_rollup_counts_projects_with_history() {
        let records = vec![
            // CM2 20 -> 18 -> 12
            record("ERODING", [800.0, 820.0, 880.0]),
            // CM2 50 -> 30 -> 10
            record("SWINGING", [500.0, 700.0, 900.0]),
            record("FLAT", [850.0, 850.0, 850.0]),
        ];
        let rollup = MarginRollup::build(&records);

        assert_eq!(rollup.projects_analyzed, 3);
        assert_eq!(rollup.projects_with_data, 2);
        assert_eq!(rollup.severely_declining, 2);
        assert_eq!(rollup.high_volatility, 1);
        assert_eq!(rollup.unreliable_forecasts, 2);
        assert_eq!(rollup.margin_risk_projects, 2);
        assert!((rollup.total_cm2_value_impact - -480.0).abs() < 1e-6);
        assert!((rollup.average_cm2_volatility - (3.399_346 + 16.329_932) / 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_rollup_is_zero() {
        assert_eq!(MarginRollup::build(&[]), MarginRollup::default());
    }
}
