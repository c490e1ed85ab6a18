//! Portfolio-level mitigation programmes triggered by the risk picture.
//!
//! Each action is judged independently against a [`RiskOverview`]; the
//! resulting list keeps the order of [`PORTFOLIO_ACTIONS`].

use serde::Serialize;

use crate::risk::{RiskType, SeverityCounts};

use super::risk_summary::RiskCategory;

/// Share of projects in the High or Critical bucket that raises a portfolio alert.
const MAJOR_PROJECT_SHARE: f64 = 0.3;

/// Findings of one type beyond which a portfolio-wide programme is proposed.
const PROGRAMME_FINDINGS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortfolioAction {
    ExecutiveEscalation,
    PortfolioRiskAlert,
    MarginProtection,
    ProcurementControls,
    ContingencyCrisis,
    EstimationReview,
    BufferProtection,
    EnhancedMonitoring,
    BestPracticeSharing,
}

pub const PORTFOLIO_ACTIONS: [PortfolioAction; 9] = [
    PortfolioAction::ExecutiveEscalation,
    PortfolioAction::PortfolioRiskAlert,
    PortfolioAction::MarginProtection,
    PortfolioAction::ProcurementControls,
    PortfolioAction::ContingencyCrisis,
    PortfolioAction::EstimationReview,
    PortfolioAction::BufferProtection,
    PortfolioAction::EnhancedMonitoring,
    PortfolioAction::BestPracticeSharing,
];

/// Read-only view of the portfolio risk state the actions are judged on.
#[derive(Debug, Clone, Copy)]
pub struct RiskOverview<'a> {
    pub project_count: usize,
    /// Projects per risk bucket
    pub buckets: &'a SeverityCounts,
    pub categories: &'a [RiskCategory],
}

impl RiskOverview<'_> {
    fn category(&self, risk_type: RiskType) -> SeverityCounts {
        self.categories
            .iter()
            .find(|c| c.risk_type == risk_type)
            .map(|c| c.findings)
            .unwrap_or_default()
    }

    fn major_project_share(&self) -> f64 {
        if self.project_count == 0 {
            return 0.0;
        }
        self.buckets.major() as f64 / self.project_count as f64
    }
}

impl PortfolioAction {
    pub fn applies(self, overview: &RiskOverview<'_>) -> bool {
        match self {
            PortfolioAction::ExecutiveEscalation => overview.buckets.critical > 0,
            PortfolioAction::PortfolioRiskAlert => {
                overview.major_project_share() > MAJOR_PROJECT_SHARE
            }
            PortfolioAction::MarginProtection => {
                overview.category(RiskType::Margin).total() > PROGRAMME_FINDINGS
            }
            PortfolioAction::ProcurementControls => {
                overview.category(RiskType::CostCommitment).total() > PROGRAMME_FINDINGS
            }
            PortfolioAction::ContingencyCrisis => {
                overview.category(RiskType::Contingency).critical > 0
            }
            PortfolioAction::EstimationReview => {
                overview.category(RiskType::WorkPackagePerformance).total() > PROGRAMME_FINDINGS
            }
            PortfolioAction::BufferProtection => {
                overview.category(RiskType::FinancialBuffer).total() > 0
            }
            PortfolioAction::EnhancedMonitoring | PortfolioAction::BestPracticeSharing => {
                overview.project_count > 0
            }
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PortfolioAction::ExecutiveEscalation => "Executive Escalation Required",
            PortfolioAction::PortfolioRiskAlert => "Portfolio Risk Alert",
            PortfolioAction::MarginProtection => "Margin Protection Program",
            PortfolioAction::ProcurementControls => "Procurement Controls",
            PortfolioAction::ContingencyCrisis => "Contingency Crisis",
            PortfolioAction::EstimationReview => "Systemic Estimation Issue",
            PortfolioAction::BufferProtection => "Buffer Protection",
            PortfolioAction::EnhancedMonitoring => "Enhanced Monitoring",
            PortfolioAction::BestPracticeSharing => "Best Practice Sharing",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PortfolioAction::ExecutiveEscalation => {
                "Immediate intervention needed for critical risk projects"
            }
            PortfolioAction::PortfolioRiskAlert => {
                "More than 30% of projects at high or critical risk; review resource allocation"
            }
            PortfolioAction::MarginProtection => {
                "Implement enhanced cost control and revenue optimization"
            }
            PortfolioAction::ProcurementControls => {
                "Strengthen approval processes and cost commitment monitoring"
            }
            PortfolioAction::ContingencyCrisis => {
                "Projects with depleted contingencies; portfolio-wide risk review needed"
            }
            PortfolioAction::EstimationReview => {
                "Multiple projects with work package overruns; review estimation methodology"
            }
            PortfolioAction::BufferProtection => {
                "Projects operating with minimal financial cushion; prioritize risk mitigation"
            }
            PortfolioAction::EnhancedMonitoring => {
                "Implement weekly risk reviews for high-risk projects"
            }
            PortfolioAction::BestPracticeSharing => {
                "Transfer successful risk mitigation strategies across the portfolio"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRecommendation {
    pub action: PortfolioAction,
    pub title: &'static str,
    pub message: &'static str,
}

impl From<PortfolioAction> for PortfolioRecommendation {
    fn from(action: PortfolioAction) -> Self {
        Self {
            action,
            title: action.title(),
            message: action.message(),
        }
    }
}

pub fn portfolio_recommendations(overview: &RiskOverview<'_>) -> Vec<PortfolioRecommendation> {
    PORTFOLIO_ACTIONS
        .iter()
        .copied()
        .filter(|action| action.applies(overview))
        .map(PortfolioRecommendation::from)
        .collect()
}
