//! Earned value management: PV/EV/AC with CPI, SPI and completion estimates.

use serde::{Deserialize, Serialize};

use crate::core::metrics::ratio_or;
use crate::core::ProjectData;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarnedValueMetrics {
    pub planned_value: f64,
    pub earned_value: f64,
    pub actual_cost: f64,
    pub cost_performance_index: f64,
    pub schedule_performance_index: f64,
    pub cost_variance: f64,
    pub schedule_variance: f64,
    pub estimate_at_completion: f64,
    pub variance_at_completion: f64,
    /// (CPI - 1) x 100
    pub cost_efficiency: f64,
    /// (SPI - 1) x 100
    pub schedule_efficiency: f64,
}

impl EarnedValueMetrics {
    /// Bundle reported when the inputs cannot produce finite figures.
    pub fn neutral(contract_value: f64) -> Self {
        Self {
            planned_value: contract_value,
            earned_value: 0.0,
            actual_cost: 0.0,
            cost_performance_index: 1.0,
            schedule_performance_index: 1.0,
            cost_variance: 0.0,
            schedule_variance: 0.0,
            estimate_at_completion: contract_value,
            variance_at_completion: 0.0,
            cost_efficiency: 0.0,
            schedule_efficiency: 0.0,
        }
    }

    fn is_finite(&self) -> bool {
        [
            self.planned_value,
            self.earned_value,
            self.actual_cost,
            self.cost_performance_index,
            self.schedule_performance_index,
            self.cost_variance,
            self.schedule_variance,
            self.estimate_at_completion,
            self.variance_at_completion,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

pub fn compute_earned_value(project: &ProjectData) -> EarnedValueMetrics {
    let contract_value = project.contract_value();
    let poc = project.revenues.poc_current();
    let revenue = project.revenues.revenue_current();
    let actuals = project.costs.totals.actuals;

    let earned_value = if poc > 0.0 {
        poc / 100.0 * contract_value
    } else {
        revenue
    };
    // Revenue stands in for cost when no actuals have been booked
    let actual_cost = if actuals > 0.0 { actuals } else { revenue };

    let cpi = ratio_or(earned_value, actual_cost, 1.0);
    let spi = ratio_or(earned_value, revenue, 1.0);

    // CPI is a ratio of non-negative quantities; the guard only matters for
    // inputs with negative revenue or POC.
    let estimate_at_completion = if cpi > 0.0 {
        actual_cost + (contract_value - earned_value) / cpi
    } else {
        contract_value
    };

    let metrics = EarnedValueMetrics {
        planned_value: contract_value,
        earned_value,
        actual_cost,
        cost_performance_index: cpi,
        schedule_performance_index: spi,
        cost_variance: earned_value - actual_cost,
        schedule_variance: earned_value - revenue,
        estimate_at_completion,
        variance_at_completion: contract_value - estimate_at_completion,
        cost_efficiency: (cpi - 1.0) * 100.0,
        schedule_efficiency: (spi - 1.0) * 100.0,
    };

    if metrics.is_finite() {
        metrics
    } else {
        log::warn!(
            "Project {}: earned value produced non-finite figures, reporting neutral metrics",
            project.id
        );
        EarnedValueMetrics::neutral(contract_value)
    }
}
