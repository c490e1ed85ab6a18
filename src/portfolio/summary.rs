//! Contract-value-weighted portfolio aggregates.

use serde::{Deserialize, Serialize};

use crate::core::metrics::{percent_of, period_variance, ratio_or};
use crate::metrics::contingency_efficiency;
use crate::project::ProjectRecord;
use crate::risk::risk_score;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub project_count: usize,
    /// Projects with a positive contract value; only these are aggregated
    pub valid_projects: usize,

    pub total_contract_value: f64,
    pub total_contract_value_previous: f64,
    pub contract_variance: f64,
    pub total_revenue: f64,
    pub total_revenue_previous: f64,
    pub revenue_variance: f64,

    pub total_cash_in: f64,
    pub total_cash_out: f64,
    pub net_cash_flow: f64,
    pub net_cash_flow_previous: f64,
    pub net_cash_flow_variance: f64,
    /// Cash in over cash out, 1.0 when nothing went out
    pub cash_flow_efficiency: f64,

    pub total_cm1_value: f64,
    pub total_cm2_value: f64,
    pub cm1_pct: f64,
    pub cm2_pct: f64,
    pub total_external_costs: f64,
    pub total_internal_costs: f64,
    pub external_cost_pct: f64,
    pub internal_cost_pct: f64,
    pub total_committed: f64,
    pub total_as_sold: f64,
    pub committed_ratio: f64,

    pub weighted_poc: f64,
    pub weighted_poc_previous: f64,
    pub poc_velocity: f64,

    /// Arithmetic means, not value weighted
    pub average_cpi: f64,
    pub average_spi: f64,
    pub average_risk_score: f64,

    pub projects_with_contingency: usize,
    pub total_contingency_as_sold: f64,
    pub total_contingency_fct_n: f64,
    pub contingency_efficiency: Option<f64>,
}

#[derive(Default)]
struct Totals {
    contract: f64,
    contract_previous: f64,
    revenue: f64,
    revenue_previous: f64,
    cash_in: f64,
    cash_in_previous: f64,
    cash_out: f64,
    cash_out_previous: f64,
    cm1: f64,
    cm2: f64,
    external: f64,
    internal: f64,
    committed: f64,
    as_sold: f64,
    poc_weighted: f64,
    poc_weighted_previous: f64,
    cpi: f64,
    spi: f64,
    risk_score: f64,
    contingency_projects: usize,
    contingency_as_sold: f64,
    contingency_fct_n: f64,
    contingency_poc_weighted: f64,
}

impl Totals {
    fn add(&mut self, record: &ProjectRecord) {
        let revenues = &record.data.revenues;
        let metrics = &record.metrics;
        let costs = &metrics.cost_analysis;
        let contract = revenues.contract_price.n_ptd;
        let contract_previous = revenues.contract_price.n1_ptd;

        self.contract += contract;
        self.contract_previous += contract_previous;
        self.revenue += revenues.revenues.n_ptd;
        self.revenue_previous += revenues.revenues.n1_ptd;
        self.cash_in += revenues.cash_in.n_ptd;
        self.cash_in_previous += revenues.cash_in.n1_ptd;
        self.cash_out += revenues.cash_out.n_ptd;
        self.cash_out_previous += revenues.cash_out.n1_ptd;
        self.cm1 += costs.margins.fct_n.cm1_value;
        self.cm2 += costs.margins.fct_n.cm2_value;
        self.external += costs.external_costs.fct_n;
        self.internal += costs.internal_costs.fct_n;
        self.committed += costs.totals.committed;
        self.as_sold += costs.totals.as_sold;
        self.poc_weighted += revenues.poc.n_ptd * contract;
        self.poc_weighted_previous += revenues.poc.n1_ptd * contract_previous;
        self.cpi += metrics.earned_value.cost_performance_index;
        self.spi += metrics.earned_value.schedule_performance_index;
        self.risk_score += f64::from(risk_score(&metrics.risk_factors));

        if metrics.contingency.has_contingency {
            self.contingency_projects += 1;
            self.contingency_as_sold += metrics.contingency.as_sold;
            self.contingency_fct_n += metrics.contingency.fct_n;
            self.contingency_poc_weighted += revenues.poc.n_ptd * contract;
        }
    }

    fn contingency_efficiency(&self) -> Option<f64> {
        if self.contingency_projects == 0 || self.contingency_as_sold <= 0.0 {
            return None;
        }
        let consumed_pct = percent_of(
            self.contingency_as_sold - self.contingency_fct_n,
            self.contingency_as_sold,
        );
        // contingency-weighted POC spread over the whole portfolio value
        let poc = ratio_or(self.contingency_poc_weighted, self.contract, 0.0);
        Some(contingency_efficiency(consumed_pct, poc))
    }
}

impl PortfolioSummary {
    /// Aggregate every valid project; projects without a contract value are
    /// skipped entirely.
    pub fn aggregate(records: &[ProjectRecord]) -> Self {
        let mut totals = Totals::default();
        let mut valid = 0usize;
        for record in records {
            if !record.is_valid() {
                log::info!(
                    "Project {} skipped from portfolio totals: contract value {:.2}",
                    record.id(),
                    record.contract_value()
                );
                continue;
            }
            totals.add(record);
            valid += 1;
        }

        let net_cash_flow = totals.cash_in - totals.cash_out;
        let net_cash_flow_previous = totals.cash_in_previous - totals.cash_out_previous;
        let weighted_poc = ratio_or(totals.poc_weighted, totals.contract, 0.0);
        let weighted_poc_previous =
            ratio_or(totals.poc_weighted_previous, totals.contract_previous, 0.0);
        let per_project = |sum: f64, neutral: f64| {
            if valid == 0 {
                neutral
            } else {
                sum / valid as f64
            }
        };

        Self {
            project_count: records.len(),
            valid_projects: valid,
            total_contract_value: totals.contract,
            total_contract_value_previous: totals.contract_previous,
            contract_variance: period_variance(totals.contract, totals.contract_previous),
            total_revenue: totals.revenue,
            total_revenue_previous: totals.revenue_previous,
            revenue_variance: period_variance(totals.revenue, totals.revenue_previous),
            total_cash_in: totals.cash_in,
            total_cash_out: totals.cash_out,
            net_cash_flow,
            net_cash_flow_previous,
            net_cash_flow_variance: period_variance(net_cash_flow, net_cash_flow_previous),
            cash_flow_efficiency: if totals.cash_out > 0.0 {
                totals.cash_in / totals.cash_out
            } else {
                1.0
            },
            total_cm1_value: totals.cm1,
            total_cm2_value: totals.cm2,
            cm1_pct: percent_of(totals.cm1, totals.contract),
            cm2_pct: percent_of(totals.cm2, totals.contract),
            total_external_costs: totals.external,
            total_internal_costs: totals.internal,
            external_cost_pct: percent_of(totals.external, totals.contract),
            internal_cost_pct: percent_of(totals.internal, totals.contract),
            total_committed: totals.committed,
            total_as_sold: totals.as_sold,
            committed_ratio: ratio_or(totals.committed, totals.as_sold, 0.0),
            weighted_poc,
            weighted_poc_previous,
            poc_velocity: weighted_poc - weighted_poc_previous,
            average_cpi: per_project(totals.cpi, 1.0),
            average_spi: per_project(totals.spi, 1.0),
            average_risk_score: per_project(totals.risk_score, 0.0),
            projects_with_contingency: totals.contingency_projects,
            total_contingency_as_sold: totals.contingency_as_sold,
            total_contingency_fct_n: totals.contingency_fct_n,
            contingency_efficiency: totals.contingency_efficiency(),
        }
    }
}
