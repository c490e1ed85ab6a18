//! One project: its raw record plus every derived metric.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::core::ProjectData;
use crate::metrics::{
    analyze_contingency, analyze_costs, analyze_margin_variability, analyze_velocity,
    compute_earned_value, ContingencyMetrics, CostAnalysis, EarnedValueMetrics, MarginVariability,
    PocVelocity,
};
use crate::risk::{assess_project_risks, RiskFactor, RiskSnapshot};

/// Per-project metrics bundle handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetrics {
    pub cost_analysis: CostAnalysis,
    pub earned_value: EarnedValueMetrics,
    pub contingency: ContingencyMetrics,
    pub margin_variability: MarginVariability,
    pub velocity: PocVelocity,
    pub risk_factors: Vec<RiskFactor>,
}

impl ProjectMetrics {
    /// Run every engine once over `data` with one configuration snapshot.
    pub fn derive(data: &ProjectData, config: &AnalysisConfig) -> Self {
        let revenues = &data.revenues;
        let cost_analysis = analyze_costs(data);
        let earned_value = compute_earned_value(data);
        let contingency = analyze_contingency(data.work_packages.values(), revenues.poc_current());
        let margin_variability =
            analyze_margin_variability(&cost_analysis, &config.thresholds.cm2_margin);
        let velocity = analyze_velocity(
            revenues.poc_current(),
            revenues.poc_previous(),
            &config.thresholds,
        );

        let snapshot = RiskSnapshot {
            project_id: &data.id,
            contract_value: data.contract_value(),
            cm2_pct: cost_analysis.current_cm2_pct(),
            committed_ratio: cost_analysis.committed_ratio,
            cost_variance_pct: cost_analysis.cost_variance_pct,
            poc_current: velocity.current_poc,
            poc_velocity: velocity.velocity,
            revenue_current: revenues.revenue_current(),
            revenue_previous: revenues.revenue_previous(),
            cash_flow: &data.cash_flow_quarterly,
            work_packages: &data.work_packages,
            contingency: &contingency,
        };
        let risk_factors = assess_project_risks(&snapshot, config);

        Self {
            cost_analysis,
            earned_value,
            contingency,
            margin_variability,
            velocity,
            risk_factors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub data: ProjectData,
    pub metrics: ProjectMetrics,
}

impl ProjectRecord {
    pub fn derive(data: ProjectData, config: &AnalysisConfig) -> Self {
        let metrics = ProjectMetrics::derive(&data, config);
        Self { data, metrics }
    }

    /// Re-run the derivation pass, e.g. after a threshold change.
    pub fn recompute(&mut self, config: &AnalysisConfig) {
        self.metrics = ProjectMetrics::derive(&self.data, config);
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn contract_value(&self) -> f64 {
        self.data.contract_value()
    }

    /// Only projects with a positive contract value enter portfolio figures.
    pub fn is_valid(&self) -> bool {
        self.contract_value() > 0.0
    }
}
