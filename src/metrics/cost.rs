//! Contribution-margin waterfall (CM1, CM2) per reporting snapshot.

use serde::{Deserialize, Serialize};

use crate::core::metrics::{period_variance, ratio_or};
use crate::core::{CostTotals, ProjectData, Snapshot, SnapshotAmounts};

/// CM1 and CM2 at one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginFigures {
    pub cm1_value: f64,
    pub cm1_pct: f64,
    pub cm2_value: f64,
    pub cm2_pct: f64,
}

impl MarginFigures {
    /// Margins for one snapshot; left at zero when there is no price.
    pub fn compute(selling_price: f64, external: f64, internal: f64) -> Self {
        if selling_price == 0.0 {
            return Self::default();
        }
        let cm1_value = selling_price - external;
        let cm2_value = cm1_value - internal;
        Self {
            cm1_value,
            cm1_pct: cm1_value / selling_price * 100.0,
            cm2_value,
            cm2_pct: cm2_value / selling_price * 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarginSnapshots {
    pub as_sold: MarginFigures,
    pub fct_n1: MarginFigures,
    pub fct_n: MarginFigures,
}

impl MarginSnapshots {
    pub fn cm1_pcts(&self) -> [f64; 3] {
        [self.as_sold.cm1_pct, self.fct_n1.cm1_pct, self.fct_n.cm1_pct]
    }

    pub fn cm2_pcts(&self) -> [f64; 3] {
        [self.as_sold.cm2_pct, self.fct_n1.cm2_pct, self.fct_n.cm2_pct]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostAnalysis {
    pub totals: CostTotals,
    pub selling_price: SnapshotAmounts,
    /// The source had no selling-price row; contract value was used instead.
    pub selling_price_missing: bool,
    pub external_costs: SnapshotAmounts,
    pub internal_costs: SnapshotAmounts,
    pub margins: MarginSnapshots,
    pub committed_ratio: f64,
    pub cost_variance_pct: f64,
}

impl CostAnalysis {
    /// Current-forecast CM2 percentage, the headline margin figure.
    pub fn current_cm2_pct(&self) -> f64 {
        self.margins.fct_n.cm2_pct
    }

    pub fn current_cm1_pct(&self) -> f64 {
        self.margins.fct_n.cm1_pct
    }
}

pub fn analyze_costs(project: &ProjectData) -> CostAnalysis {
    let costs = &project.costs;
    let (selling_price, selling_price_missing) = match costs.selling_price {
        Some(price) => (price, false),
        None => {
            log::warn!(
                "Project {}: no selling price row, using contract value {:.2} for all periods",
                project.id,
                project.contract_value()
            );
            (SnapshotAmounts::uniform(project.contract_value()), true)
        }
    };

    let margin_at = |snapshot| {
        MarginFigures::compute(
            selling_price.get(snapshot),
            costs.external_costs.get(snapshot),
            costs.internal_costs.get(snapshot),
        )
    };

    CostAnalysis {
        totals: costs.totals,
        selling_price,
        selling_price_missing,
        external_costs: costs.external_costs,
        internal_costs: costs.internal_costs,
        margins: MarginSnapshots {
            as_sold: margin_at(Snapshot::AsSold),
            fct_n1: margin_at(Snapshot::PreviousForecast),
            fct_n: margin_at(Snapshot::CurrentForecast),
        },
        committed_ratio: ratio_or(costs.totals.committed, costs.totals.as_sold, 0.0),
        cost_variance_pct: period_variance(costs.totals.fct_n, costs.totals.as_sold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CostInput, PeriodValues, Revenues};
    use proptest::prelude::*;

    fn project_with(costs: CostInput, contract: f64) -> ProjectData {
        ProjectData {
            id: "P-1".into(),
            revenues: Revenues {
                contract_price: PeriodValues {
                    n_ptd: contract,
                    n1_ptd: contract,
                    n_mtd: 0.0,
                },
                ..Default::default()
            },
            costs,
            ..Default::default()
        }
    }

    #[test]
    fn test_margin_waterfall() {
        let m = MarginFigures::compute(1000.0, 600.0, 250.0);
        assert_eq!(m.cm1_value, 400.0);
        assert_eq!(m.cm1_pct, 40.0);
        assert_eq!(m.cm2_value, 150.0);
        assert_eq!(m.cm2_pct, 15.0);
    }

    #[test]
    fn test_zero_price_leaves_margins_at_zero() {
        assert_eq!(
            MarginFigures::compute(0.0, 600.0, 250.0),
            MarginFigures::default()
        );
    }

    #[test]
    fn test_missing_selling_price_falls_back_to_contract() {
        let costs = CostInput {
            selling_price: None,
            external_costs: SnapshotAmounts::uniform(700.0),
            internal_costs: SnapshotAmounts::uniform(100.0),
            ..Default::default()
        };
        let analysis = analyze_costs(&project_with(costs, 1000.0));
        assert!(analysis.selling_price_missing);
        assert_eq!(analysis.margins.fct_n.cm1_value, 300.0);
        assert_eq!(analysis.margins.as_sold.cm2_pct, 20.0);
    }

    #[test]
    fn test_committed_ratio_and_cost_variance() {
        let costs = CostInput {
            selling_price: Some(SnapshotAmounts::uniform(1000.0)),
            totals: CostTotals {
                as_sold: 800.0,
                committed: 880.0,
                fct_n: 920.0,
                fct_n1: 850.0,
                actuals: 400.0,
            },
            ..Default::default()
        };
        let analysis = analyze_costs(&project_with(costs, 1000.0));
        assert!(!analysis.selling_price_missing);
        assert!((analysis.committed_ratio - 1.1).abs() < 1e-12);
        assert!((analysis.cost_variance_pct - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_budget_totals_are_guarded() {
        let analysis = analyze_costs(&project_with(CostInput::default(), 0.0));
        assert_eq!(analysis.committed_ratio, 0.0);
        assert_eq!(analysis.cost_variance_pct, 0.0);
        assert_eq!(analysis.current_cm2_pct(), 0.0);
    }

    proptest! {
        #[test]
        fn cm2_equals_price_minus_both_cost_blocks(
            price in 1.0..1e7f64,
            external in 0.0..1e7f64,
            internal in 0.0..1e7f64,
        ) {
            let m = MarginFigures::compute(price, external, internal);
            prop_assert_eq!(m.cm1_value, price - external);
            prop_assert_eq!(m.cm2_value, m.cm1_value - internal);
            prop_assert_eq!(m.cm2_value, price - external - internal);
            prop_assert!(m.cm2_value <= m.cm1_value && m.cm1_value <= price);
        }
    }
}
