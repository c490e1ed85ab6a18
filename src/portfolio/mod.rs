//! Portfolio-level views built over derived project records.

pub mod margin_rollup;
pub mod recommendations;
pub mod risk_summary;
pub mod scorecard;
pub mod summary;

use serde::Serialize;

pub use margin_rollup::{MarginRollup, HIGH_VOLATILITY};
pub use recommendations::{
    portfolio_recommendations, PortfolioAction, PortfolioRecommendation, RiskOverview,
    PORTFOLIO_ACTIONS,
};
pub use risk_summary::{risk_bucket, ProjectRiskLevel, RegisterEntry, RiskCategory, RiskSummary};
pub use scorecard::{build_scorecards, ProjectScorecard, Rated};
pub use summary::PortfolioSummary;

use crate::config::AnalysisConfig;
use crate::metrics::{
    analyze_work_packages, rollup_cash_flow, rollup_revenue, CashFlowRollup, RevenueRollup,
    WorkPackageAnalysis,
};
use crate::project::ProjectRecord;

/// Everything a renderer needs about one portfolio run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub config: AnalysisConfig,
    pub summary: PortfolioSummary,
    pub scorecards: Vec<ProjectScorecard>,
    pub risk_summary: RiskSummary,
    pub margin_rollup: MarginRollup,
    pub work_packages: WorkPackageAnalysis,
    pub cash_flow: CashFlowRollup,
    pub revenue: RevenueRollup,
    pub projects: Vec<ProjectRecord>,
}

impl PortfolioReport {
    pub fn valid_projects(&self) -> impl Iterator<Item = &ProjectRecord> {
        self.projects.iter().filter(|r| r.is_valid())
    }
}

/// Build every portfolio view from records derived with `config`.
///
/// Projects without a positive contract value stay in `projects` but are left
/// out of every aggregate.
pub fn analyze_portfolio(projects: Vec<ProjectRecord>, config: &AnalysisConfig) -> PortfolioReport {
    let summary = PortfolioSummary::aggregate(&projects);
    let scorecards = build_scorecards(&projects, &config.thresholds);
    let risk_summary = RiskSummary::build(&projects);
    let margin_rollup = MarginRollup::build(&projects);

    let valid = || projects.iter().filter(|r| r.is_valid()).map(|r| &r.data);
    let work_packages = analyze_work_packages(valid());
    let cash_flow = rollup_cash_flow(valid());
    let revenue = rollup_revenue(valid());

    log::info!(
        "Analyzed {} projects ({} valid), {} risk findings",
        summary.project_count,
        summary.valid_projects,
        risk_summary.register.len()
    );

    PortfolioReport {
        config: config.clone(),
        summary,
        scorecards,
        risk_summary,
        margin_rollup,
        work_packages,
        cash_flow,
        revenue,
        projects,
    }
}
