//! Portfolio risk register and per-project risk buckets.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use super::recommendations::{portfolio_recommendations, PortfolioRecommendation, RiskOverview};
use crate::core::metrics::percent_of;
use crate::project::ProjectRecord;
use crate::risk::{weighted_severity, RiskFactor, RiskType, Severity, SeverityCounts};

/// Weighted severity above which a project without major findings is Medium.
const MEDIUM_BUCKET_WEIGHT: u32 = 3;

/// Overall risk level of one project.
pub fn risk_bucket(factors: &[RiskFactor]) -> Severity {
    if factors.iter().any(|f| f.severity == Severity::Critical) {
        Severity::Critical
    } else if factors.iter().any(|f| f.severity == Severity::High) {
        Severity::High
    } else if weighted_severity(factors) > MEDIUM_BUCKET_WEIGHT {
        Severity::Medium
    } else {
        Severity::Low
    }
}

/// One finding placed in the portfolio-wide register.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterEntry {
    pub project_id: String,
    pub project_name: String,
    pub contract_value: f64,
    /// Position of the finding in the project's evaluation order
    pub sequence: usize,
    #[serde(flatten)]
    pub factor: RiskFactor,
}

fn register_order(a: &RegisterEntry, b: &RegisterEntry) -> Ordering {
    a.factor
        .severity
        .cmp(&b.factor.severity)
        .then_with(|| b.contract_value.total_cmp(&a.contract_value))
        .then_with(|| a.project_id.cmp(&b.project_id))
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// Findings of one risk type across the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskCategory {
    #[serde(rename = "type")]
    pub risk_type: RiskType,
    pub findings: SeverityCounts,
    pub severity_score: usize,
}

/// Highest severity score first, then by label.
fn categorize<'a>(factors: impl IntoIterator<Item = &'a RiskFactor>) -> Vec<RiskCategory> {
    let mut by_type: HashMap<RiskType, SeverityCounts> = HashMap::new();
    for factor in factors {
        by_type.entry(factor.risk_type).or_default().record(factor.severity);
    }

    let mut categories: Vec<RiskCategory> = by_type
        .into_iter()
        .map(|(risk_type, findings)| RiskCategory {
            risk_type,
            severity_score: findings.weighted(),
            findings,
        })
        .collect();
    categories.sort_by(|a, b| {
        b.severity_score
            .cmp(&a.severity_score)
            .then_with(|| a.risk_type.label().cmp(b.risk_type.label()))
    });
    categories
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRiskLevel {
    pub project_id: String,
    pub bucket: Severity,
    pub findings: SeverityCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub projects: Vec<ProjectRiskLevel>,
    /// Projects per bucket
    pub buckets: SeverityCounts,
    /// Findings per severity across the portfolio
    pub findings: SeverityCounts,
    /// Contract value of projects carrying a Critical or High finding
    pub value_at_risk: f64,
    pub value_at_risk_pct: f64,
    pub register: Vec<RegisterEntry>,
    pub categories: Vec<RiskCategory>,
    pub recommendations: Vec<PortfolioRecommendation>,
}

impl RiskSummary {
    pub fn build(records: &[ProjectRecord]) -> Self {
        let mut projects = Vec::new();
        let mut buckets = SeverityCounts::default();
        let mut findings = SeverityCounts::default();
        let mut register = Vec::new();
        let mut value_at_risk = 0.0;
        let mut total_contract = 0.0;

        for record in records.iter().filter(|r| r.is_valid()) {
            let factors = &record.metrics.risk_factors;
            let counts = SeverityCounts::from_factors(factors);
            let bucket = risk_bucket(factors);
            buckets.record(bucket);
            for factor in factors {
                findings.record(factor.severity);
            }

            total_contract += record.contract_value();
            if counts.major() > 0 {
                value_at_risk += record.contract_value();
            }

            register.extend(factors.iter().enumerate().map(|(sequence, factor)| RegisterEntry {
                project_id: record.id().to_string(),
                project_name: record.name().to_string(),
                contract_value: record.contract_value(),
                sequence,
                factor: factor.clone(),
            }));
            projects.push(ProjectRiskLevel {
                project_id: record.id().to_string(),
                bucket,
                findings: counts,
            });
        }

        register.sort_by(register_order);
        projects.sort_by(|a, b| a.bucket.cmp(&b.bucket).then_with(|| a.project_id.cmp(&b.project_id)));

        let categories = categorize(register.iter().map(|entry| &entry.factor));
        let recommendations = portfolio_recommendations(&RiskOverview {
            project_count: projects.len(),
            buckets: &buckets,
            categories: &categories,
        });

        Self {
            projects,
            buckets,
            findings,
            value_at_risk,
            value_at_risk_pct: percent_of(value_at_risk, total_contract),
            register,
            categories,
            recommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::core::ProjectInput;
    use crate::risk::{Impact, RiskType};
    use pretty_assertions::assert_eq;

    fn factor(risk_type: RiskType, severity: Severity) -> RiskFactor {
        RiskFactor::new(risk_type, severity, Impact::Medium, "finding", "act")
    }

    fn record(id: &str, contract: f64, factors: Vec<RiskFactor>) -> ProjectRecord {
        let mut input = ProjectInput {
            id: id.into(),
            ..Default::default()
        };
        input.revenues.contract_price.n_ptd = contract;
        let mut record = ProjectRecord::derive(input.normalize(), &AnalysisConfig::default());
        record.metrics.risk_factors = factors;
        record
    }

    #[test]
    fn test_bucket_rules() {
        assert_eq!(risk_bucket(&[]), Severity::Low);
        assert_eq!(
            risk_bucket(&[factor(RiskType::Margin, Severity::Low), factor(RiskType::Schedule, Severity::High)]),
            Severity::High
        );
        // 2 + 1 = 3 is not above the Medium weight
        assert_eq!(
            risk_bucket(&[factor(RiskType::Margin, Severity::Medium), factor(RiskType::Schedule, Severity::Low)]),
            Severity::Low
        );
        assert_eq!(
            risk_bucket(&[factor(RiskType::Margin, Severity::Medium), factor(RiskType::Schedule, Severity::Medium)]),
            Severity::Medium
        );
    }

    #[test]
    fn test_value_at_risk() {
        let records = vec![
            record("A", 3000.0, vec![factor(RiskType::Margin, Severity::Critical)]),
            record("B", 1000.0, vec![factor(RiskType::Schedule, Severity::Medium)]),
        ];
        let summary = RiskSummary::build(&records);
        assert_eq!(summary.value_at_risk, 3000.0);
        assert_eq!(summary.value_at_risk_pct, 75.0);
        assert_eq!(summary.buckets.critical, 1);
        assert_eq!(summary.buckets.low, 1);
        assert_eq!(summary.findings.total(), 2);
    }

    #[test]
    fn test_register_ordering() {
        let records = vec![
            record(
                "SMALL",
                1000.0,
                vec![
                    factor(RiskType::CashFlow, Severity::High),
                    factor(RiskType::Margin, Severity::High),
                ],
            ),
            record("BIG", 5000.0, vec![factor(RiskType::Schedule, Severity::High)]),
            record("OTHER", 1000.0, vec![factor(RiskType::CostCommitment, Severity::Critical)]),
        ];
        let summary = RiskSummary::build(&records);
        let order: Vec<(&str, RiskType)> = summary
            .register
            .iter()
            .map(|e| (e.project_id.as_str(), e.factor.risk_type))
            .collect();
        assert_eq!(
            order,
            vec![
                ("OTHER", RiskType::CostCommitment),
                ("BIG", RiskType::Schedule),
                ("SMALL", RiskType::CashFlow),
                ("SMALL", RiskType::Margin),
            ]
        );
    }

    #[test]
    fn test_categories_are_scored_and_ranked() {
        let records = vec![
            record(
                "A",
                1000.0,
                vec![
                    factor(RiskType::Margin, Severity::High),
                    factor(RiskType::Schedule, Severity::Low),
                ],
            ),
            record(
                "B",
                1000.0,
                vec![
                    factor(RiskType::Margin, Severity::Low),
                    factor(RiskType::Contingency, Severity::Critical),
                ],
            ),
        ];
        let summary = RiskSummary::build(&records);
        let scored: Vec<(RiskType, usize)> = summary
            .categories
            .iter()
            .map(|c| (c.risk_type, c.severity_score))
            .collect();
        // Margin and Contingency tie at 4; labels break the tie
        assert_eq!(
            scored,
            vec![
                (RiskType::Contingency, 4),
                (RiskType::Margin, 4),
                (RiskType::Schedule, 1),
            ]
        );
        assert_eq!(summary.categories[1].findings.high, 1);
        assert_eq!(summary.categories[1].findings.low, 1);
    }

    #[test]
    fn test_recommendations_follow_the_summary() {
        let records = vec![
            record("A", 1000.0, vec![factor(RiskType::Contingency, Severity::Critical)]),
            record("B", 1000.0, vec![factor(RiskType::FinancialBuffer, Severity::High)]),
            record("C", 1000.0, vec![]),
        ];
        let summary = RiskSummary::build(&records);
        let titles: Vec<&str> = summary.recommendations.iter().map(|r| r.title).collect();
        assert_eq!(
            titles,
            vec![
                "Executive Escalation Required",
                "Portfolio Risk Alert",
                "Contingency Crisis",
                "Buffer Protection",
                "Enhanced Monitoring",
                "Best Practice Sharing",
            ]
        );
    }

    #[test]
    fn test_invalid_projects_are_left_out() {
        let records = vec![record("ZERO", 0.0, vec![factor(RiskType::Margin, Severity::Critical)])];
        let summary = RiskSummary::build(&records);
        assert!(summary.register.is_empty());
        assert_eq!(summary.value_at_risk_pct, 0.0);
    }
}
