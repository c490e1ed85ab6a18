//! Discrete risk findings and the rule set that produces them.

pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use rules::{assess_project_risks, assess_with_rules, RiskRule, RiskSnapshot, RULES};

/// Finding severity, ordered most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Severity::Critical => "🔴",
            Severity::High => "🟠",
            Severity::Medium => "🟡",
            Severity::Low => "🟢",
        }
    }

    /// Weight used for the per-project risk bucket (Critical = 4).
    pub fn weight(self) -> u32 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    pub fn is_major(self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Impact::High => "High",
            Impact::Medium => "Medium",
            Impact::Low => "Low",
        })
    }
}

/// Category tag of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskType {
    #[serde(rename = "Margin Risk")]
    Margin,
    #[serde(rename = "Cost Commitment")]
    CostCommitment,
    #[serde(rename = "Cost Variance")]
    CostVariance,
    #[serde(rename = "Schedule Risk")]
    Schedule,
    #[serde(rename = "Cash Flow")]
    CashFlow,
    #[serde(rename = "Revenue Risk")]
    Revenue,
    #[serde(rename = "Contingency Risk")]
    Contingency,
    #[serde(rename = "WP Performance Risk")]
    WorkPackagePerformance,
    #[serde(rename = "Financial Buffer Risk")]
    FinancialBuffer,
    #[serde(rename = "Assessment Error")]
    AssessmentError,
}

impl RiskType {
    pub fn label(self) -> &'static str {
        match self {
            RiskType::Margin => "Margin Risk",
            RiskType::CostCommitment => "Cost Commitment",
            RiskType::CostVariance => "Cost Variance",
            RiskType::Schedule => "Schedule Risk",
            RiskType::CashFlow => "Cash Flow",
            RiskType::Revenue => "Revenue Risk",
            RiskType::Contingency => "Contingency Risk",
            RiskType::WorkPackagePerformance => "WP Performance Risk",
            RiskType::FinancialBuffer => "Financial Buffer Risk",
            RiskType::AssessmentError => "Assessment Error",
        }
    }
}

impl fmt::Display for RiskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    #[serde(rename = "type")]
    pub risk_type: RiskType,
    pub severity: Severity,
    pub description: String,
    pub impact: Impact,
    pub recommendation: String,
}

impl RiskFactor {
    pub fn new(
        risk_type: RiskType,
        severity: Severity,
        impact: Impact,
        description: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            risk_type,
            severity,
            description: description.into(),
            impact,
            recommendation: recommendation.into(),
        }
    }

    /// Synthetic finding recorded when the rule set could not be evaluated.
    pub fn assessment_error(reason: impl fmt::Display) -> Self {
        Self::new(
            RiskType::AssessmentError,
            Severity::Medium,
            Impact::Low,
            format!("Risk assessment incomplete: {reason}"),
            "Manual risk review recommended",
        )
    }
}

/// Findings per severity for one project or a whole portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl SeverityCounts {
    pub fn from_factors<'a>(factors: impl IntoIterator<Item = &'a RiskFactor>) -> Self {
        let mut counts = Self::default();
        for factor in factors {
            counts.record(factor.severity);
        }
        counts
    }

    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
    }

    pub fn major(&self) -> usize {
        self.critical + self.high
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low
    }

    /// Severity-weighted count (4/3/2/1).
    pub fn weighted(&self) -> usize {
        self.critical * 4 + self.high * 3 + self.medium * 2 + self.low
    }
}

/// Executive risk score of a project: 2 per Critical or High finding, 1 per Medium.
pub fn risk_score(factors: &[RiskFactor]) -> u32 {
    factors
        .iter()
        .map(|f| match f.severity {
            Severity::Critical | Severity::High => 2,
            Severity::Medium => 1,
            Severity::Low => 0,
        })
        .sum()
}

/// Sum of the severity weights (4/3/2/1) of a project's findings.
pub fn weighted_severity(factors: &[RiskFactor]) -> u32 {
    factors.iter().map(|f| f.severity.weight()).sum()
}
