//! The project risk rule set.
//!
//! Rules are plain data: [`RULES`] lists them in evaluation order and each
//! variant is a predicate over a read-only [`RiskSnapshot`] that yields zero
//! or one finding. Cutoffs come from the threshold table and
//! [`crate::config::RiskSettings`] of the run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Impact, RiskFactor, RiskType, Severity};
use crate::config::AnalysisConfig;
use crate::core::metrics::period_variance;
use crate::core::{CashFlowEntry, WorkPackage};
use crate::errors::{Error, Result};
use crate::metrics::ContingencyMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskRule {
    MarginLevel,
    CostCommitment,
    CostVariance,
    ScheduleProgress,
    NegativeCashFlow,
    RevenueDecline,
    ContingencyAdequacy,
    WorkPackageConcentration,
    FinancialBuffer,
}

/// Every rule, in evaluation order.
pub const RULES: [RiskRule; 9] = [
    RiskRule::MarginLevel,
    RiskRule::CostCommitment,
    RiskRule::CostVariance,
    RiskRule::ScheduleProgress,
    RiskRule::NegativeCashFlow,
    RiskRule::RevenueDecline,
    RiskRule::ContingencyAdequacy,
    RiskRule::WorkPackageConcentration,
    RiskRule::FinancialBuffer,
];

/// Read-only view of the metrics the rules look at.
#[derive(Debug, Clone, Copy)]
pub struct RiskSnapshot<'a> {
    pub project_id: &'a str,
    pub contract_value: f64,
    pub cm2_pct: f64,
    pub committed_ratio: f64,
    pub cost_variance_pct: f64,
    pub poc_current: f64,
    /// Raw velocity, not maturity adjusted
    pub poc_velocity: f64,
    pub revenue_current: f64,
    pub revenue_previous: f64,
    pub cash_flow: &'a [CashFlowEntry],
    pub work_packages: &'a BTreeMap<String, WorkPackage>,
    pub contingency: &'a ContingencyMetrics,
}

impl RiskSnapshot<'_> {
    /// Reject values that would make comparisons meaningless.
    fn finite(&self, name: &str, value: f64) -> Result<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::analysis(format!(
                "{name} is not a finite number for project {}",
                self.project_id
            )))
        }
    }

    /// Remaining contingency as a share of contract value.
    fn contingency_share_of_contract(&self) -> Result<f64> {
        let share = if self.contract_value > 0.0 {
            self.contingency.remaining_amount / self.contract_value * 100.0
        } else {
            0.0
        };
        self.finite("remaining contingency share", share)
    }
}

impl RiskRule {
    pub fn evaluate(
        self,
        snapshot: &RiskSnapshot<'_>,
        config: &AnalysisConfig,
    ) -> Result<Option<RiskFactor>> {
        match self {
            RiskRule::MarginLevel => margin_level(snapshot, config),
            RiskRule::CostCommitment => cost_commitment(snapshot, config),
            RiskRule::CostVariance => cost_variance(snapshot, config),
            RiskRule::ScheduleProgress => schedule_progress(snapshot, config),
            RiskRule::NegativeCashFlow => negative_cash_flow(snapshot, config),
            RiskRule::RevenueDecline => revenue_decline(snapshot, config),
            RiskRule::ContingencyAdequacy => contingency_adequacy(snapshot, config),
            RiskRule::WorkPackageConcentration => work_package_concentration(snapshot, config),
            RiskRule::FinancialBuffer => financial_buffer(snapshot, config),
        }
    }
}

fn margin_level(s: &RiskSnapshot<'_>, config: &AnalysisConfig) -> Result<Option<RiskFactor>> {
    let cm2 = s.finite("CM2 margin", s.cm2_pct)?;
    let band = &config.thresholds.cm2_margin;
    let factor = if cm2 < band.warning {
        Some(RiskFactor::new(
            RiskType::Margin,
            Severity::Critical,
            Impact::High,
            format!(
                "CM2 margin critically low at {cm2:.1}% (below warning threshold: {}%)",
                band.warning
            ),
            "Immediate cost reduction and revenue optimization required",
        ))
    } else if cm2 < band.good {
        Some(RiskFactor::new(
            RiskType::Margin,
            Severity::High,
            Impact::Medium,
            format!("CM2 margin below target at {cm2:.1}% (target: {}%)", band.good),
            "Review cost structure and identify optimization opportunities",
        ))
    } else if cm2 < band.excellent {
        Some(RiskFactor::new(
            RiskType::Margin,
            Severity::Medium,
            Impact::Low,
            format!(
                "CM2 margin at {cm2:.1}% - room for improvement (excellent: {}%)",
                band.excellent
            ),
            "Continue monitoring and seek margin enhancement opportunities",
        ))
    } else {
        None
    };
    Ok(factor)
}

fn cost_commitment(s: &RiskSnapshot<'_>, config: &AnalysisConfig) -> Result<Option<RiskFactor>> {
    let ratio = s.finite("committed ratio", s.committed_ratio)?;
    let band = &config.thresholds.committed_vs_budget;
    let factor = if ratio > band.critical {
        Some(RiskFactor::new(
            RiskType::CostCommitment,
            Severity::Critical,
            Impact::High,
            format!("Severe cost overcommitment: {ratio:.2} ratio"),
            "Emergency cost review and procurement controls",
        ))
    } else if ratio > band.warning {
        Some(RiskFactor::new(
            RiskType::CostCommitment,
            Severity::High,
            Impact::Medium,
            format!("High cost commitment: {ratio:.2} ratio"),
            "Enhanced cost monitoring and approval processes",
        ))
    } else {
        None
    };
    Ok(factor)
}

fn cost_variance(s: &RiskSnapshot<'_>, config: &AnalysisConfig) -> Result<Option<RiskFactor>> {
    let variance = s.finite("cost variance", s.cost_variance_pct)?;
    let band = &config.thresholds.cost_variance;
    let factor = if variance > band.critical {
        Some(RiskFactor::new(
            RiskType::CostVariance,
            Severity::Critical,
            Impact::High,
            format!("Extreme cost variance: {variance:+.1}%"),
            "Comprehensive cost baseline review required",
        ))
    } else if variance > band.warning {
        Some(RiskFactor::new(
            RiskType::CostVariance,
            Severity::High,
            Impact::Medium,
            format!("High cost variance: {variance:+.1}%"),
            "Detailed variance analysis and corrective action plan",
        ))
    } else {
        None
    };
    Ok(factor)
}

/// Uses raw velocity on purpose: slow absolute progress is flagged even when
/// the maturity curve would excuse it, as long as the project is not nearly
/// complete.
fn schedule_progress(s: &RiskSnapshot<'_>, config: &AnalysisConfig) -> Result<Option<RiskFactor>> {
    let velocity = s.finite("POC velocity", s.poc_velocity)?;
    let poc = s.finite("POC", s.poc_current)?;
    let slow = velocity < config.thresholds.poc_velocity.warning;
    if slow && poc < config.risk.schedule_poc_ceiling {
        return Ok(Some(RiskFactor::new(
            RiskType::Schedule,
            Severity::High,
            Impact::Medium,
            format!("Low POC velocity: {velocity:.1}%/month"),
            "Resource reallocation and schedule acceleration",
        )));
    }
    Ok(None)
}

fn negative_cash_flow(s: &RiskSnapshot<'_>, config: &AnalysisConfig) -> Result<Option<RiskFactor>> {
    let total = s.cash_flow.len();
    if total == 0 {
        return Ok(None);
    }
    let negative = s.cash_flow.iter().filter(|q| q.fct_n < 0.0).count();
    let limit = total as f64 * config.risk.cash_flow_negative_share_pct / 100.0;
    if negative as f64 > limit {
        return Ok(Some(RiskFactor::new(
            RiskType::CashFlow,
            Severity::High,
            Impact::High,
            format!("Multiple negative cash flow quarters: {negative}/{total}"),
            "Cash flow optimization and milestone acceleration",
        )));
    }
    Ok(None)
}

fn revenue_decline(s: &RiskSnapshot<'_>, config: &AnalysisConfig) -> Result<Option<RiskFactor>> {
    let variance = s.finite(
        "revenue variance",
        period_variance(s.revenue_current, s.revenue_previous),
    )?;
    if variance < config.thresholds.revenue_growth.critical {
        return Ok(Some(RiskFactor::new(
            RiskType::Revenue,
            Severity::Critical,
            Impact::High,
            format!("Significant revenue decline: {variance:.1}%"),
            "Revenue recovery plan and stakeholder engagement",
        )));
    }
    Ok(None)
}

fn contingency_adequacy(
    s: &RiskSnapshot<'_>,
    config: &AnalysisConfig,
) -> Result<Option<RiskFactor>> {
    if !s.contingency.has_contingency {
        return Ok(Some(RiskFactor::new(
            RiskType::Contingency,
            Severity::High,
            Impact::High,
            "No risk contingency identified in project structure",
            "Establish risk contingency budget for unforeseen events",
        )));
    }

    let remaining = s.contingency_share_of_contract()?;
    let consumed = s.finite("contingency consumption", s.contingency.consumed_pct)?;
    let settings = &config.risk;
    let factor = if remaining < settings.contingency_low_remaining_pct {
        Some(RiskFactor::new(
            RiskType::Contingency,
            Severity::Medium,
            Impact::Medium,
            format!("Insufficient risk contingency: {remaining:.1}% of contract value"),
            "Review risk register and consider contingency replenishment",
        ))
    } else if remaining < settings.contingency_depleting_remaining_pct
        && consumed > settings.contingency_depleting_consumed_pct
    {
        Some(RiskFactor::new(
            RiskType::Contingency,
            Severity::High,
            Impact::High,
            format!("Low contingency: {remaining:.1}% remaining, {consumed:.0}% consumed"),
            "Monitor emerging risks closely, prepare contingency plan",
        ))
    } else {
        None
    };
    Ok(factor)
}

fn work_package_concentration(
    s: &RiskSnapshot<'_>,
    config: &AnalysisConfig,
) -> Result<Option<RiskFactor>> {
    let settings = &config.risk;
    let (total, overruns) = s
        .work_packages
        .values()
        .filter(|wp| !wp.is_risk_contingency)
        .fold((0usize, 0usize), |(total, overruns), wp| {
            let over = wp.variance_pct > settings.work_package_variance_pct;
            (total + 1, overruns + usize::from(over))
        });
    if total == 0 {
        return Ok(None);
    }

    let share = overruns as f64 / total as f64 * 100.0;
    if share > settings.work_package_share_pct {
        return Ok(Some(RiskFactor::new(
            RiskType::WorkPackagePerformance,
            Severity::High,
            Impact::High,
            format!(
                "{overruns} of {total} work packages exceeding budget by >{}%",
                settings.work_package_variance_pct
            ),
            "Systemic issue - review estimation or execution processes",
        )));
    }
    Ok(None)
}

fn financial_buffer(s: &RiskSnapshot<'_>, config: &AnalysisConfig) -> Result<Option<RiskFactor>> {
    if !s.contingency.has_contingency {
        return Ok(None);
    }
    let remaining = s.contingency_share_of_contract()?;
    let cm2 = s.finite("CM2 margin", s.cm2_pct)?;
    if remaining < config.risk.buffer_remaining_pct && cm2 < config.risk.buffer_cm2_pct {
        return Ok(Some(RiskFactor::new(
            RiskType::FinancialBuffer,
            Severity::Critical,
            Impact::High,
            format!(
                "Low contingency ({remaining:.1}%) combined with thin margins ({cm2:.1}%)"
            ),
            "Project has minimal financial buffer for risks",
        )));
    }
    Ok(None)
}

/// Evaluate `rules` in order.
///
/// The first evaluation failure is recorded as a single Medium
/// "Assessment Error" finding; findings produced before it are kept.
pub fn assess_with_rules(
    rules: &[RiskRule],
    snapshot: &RiskSnapshot<'_>,
    config: &AnalysisConfig,
) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    for rule in rules {
        match rule.evaluate(snapshot, config) {
            Ok(Some(factor)) => factors.push(factor),
            Ok(None) => {}
            Err(e) => {
                log::warn!(
                    "Risk assessment for project {} stopped at {:?}: {}",
                    snapshot.project_id,
                    rule,
                    e
                );
                factors.push(RiskFactor::assessment_error(e));
                break;
            }
        }
    }
    factors
}

pub fn assess_project_risks(snapshot: &RiskSnapshot<'_>, config: &AnalysisConfig) -> Vec<RiskFactor> {
    assess_with_rules(&RULES, snapshot, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorkPackageRow;
    use crate::metrics::analyze_contingency;
    use pretty_assertions::assert_eq;

    struct Fixture {
        cash_flow: Vec<CashFlowEntry>,
        work_packages: BTreeMap<String, WorkPackage>,
        contingency: ContingencyMetrics,
    }

    impl Fixture {
        fn healthy() -> Self {
            let mut fixture = Self {
                cash_flow: Vec::new(),
                work_packages: BTreeMap::new(),
                contingency: ContingencyMetrics::none(),
            };
            fixture.add_package("RC", "Risk contingency", 100.0, 90.0);
            fixture.add_package("WP1", "Civil", 400.0, 410.0);
            fixture
        }

        fn add_package(&mut self, code: &str, description: &str, as_sold: f64, fct_n: f64) {
            let wp = WorkPackage::from_row(WorkPackageRow {
                code: code.into(),
                description: description.into(),
                as_sold,
                fct_n1: as_sold,
                fct_n,
                ..Default::default()
            });
            self.work_packages.insert(code.into(), wp);
            self.contingency = analyze_contingency(self.work_packages.values(), 50.0);
        }

        fn snapshot(&self) -> RiskSnapshot<'_> {
            RiskSnapshot {
                project_id: "P-1",
                contract_value: 1000.0,
                cm2_pct: 16.0,
                committed_ratio: 0.8,
                cost_variance_pct: 2.0,
                poc_current: 50.0,
                poc_velocity: 6.0,
                revenue_current: 500.0,
                revenue_previous: 450.0,
                cash_flow: &self.cash_flow,
                work_packages: &self.work_packages,
                contingency: &self.contingency,
            }
        }
    }

    fn types(factors: &[RiskFactor]) -> Vec<(RiskType, Severity)> {
        factors.iter().map(|f| (f.risk_type, f.severity)).collect()
    }

    #[test]
    fn test_healthy_project_has_no_findings() {
        let fixture = Fixture::healthy();
        assert!(assess_project_risks(&fixture.snapshot(), &AnalysisConfig::default()).is_empty());
    }

    #[test]
    fn test_missing_contingency_is_single_high_finding() {
        let mut fixture = Fixture::healthy();
        fixture.work_packages.remove("RC");
        fixture.contingency = ContingencyMetrics::none();

        let factors = assess_project_risks(&fixture.snapshot(), &AnalysisConfig::default());
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].risk_type, RiskType::Contingency);
        assert_eq!(factors[0].severity, Severity::High);
        assert_eq!(
            factors[0].recommendation,
            "Establish risk contingency budget for unforeseen events"
        );
    }

    #[test]
    fn test_margin_tiers_follow_threshold_table() {
        let fixture = Fixture::healthy();
        let config = AnalysisConfig::default();
        let at = |cm2| {
            let snapshot = RiskSnapshot {
                cm2_pct: cm2,
                ..fixture.snapshot()
            };
            margin_level(&snapshot, &config).unwrap().map(|f| f.severity)
        };
        assert_eq!(at(4.0), Some(Severity::Critical));
        assert_eq!(at(9.0), Some(Severity::High));
        assert_eq!(at(14.0), Some(Severity::Medium));
        assert_eq!(at(15.0), None);

        let mut strict = AnalysisConfig::default();
        strict.thresholds.cm2_margin.excellent = 18.0;
        let snapshot = fixture.snapshot();
        let factor = margin_level(&snapshot, &strict).unwrap();
        assert_eq!(factor.map(|f| f.severity), Some(Severity::Medium));
    }

    #[test]
    fn test_commitment_and_cost_variance_cutoffs_are_exclusive() {
        let fixture = Fixture::healthy();
        let config = AnalysisConfig::default();
        let snapshot = RiskSnapshot {
            committed_ratio: 1.2,
            cost_variance_pct: 25.0,
            ..fixture.snapshot()
        };
        let factors = assess_project_risks(&snapshot, &config);
        assert_eq!(
            types(&factors),
            vec![
                (RiskType::CostCommitment, Severity::High),
                (RiskType::CostVariance, Severity::High),
            ]
        );
    }

    #[test]
    fn test_schedule_rule_uses_raw_velocity_not_maturity_adjusted() {
        let fixture = Fixture::healthy();
        let config = AnalysisConfig::default();

        let slow = RiskSnapshot {
            poc_current: 85.0,
            poc_velocity: 1.5,
            ..fixture.snapshot()
        };
        let factor = schedule_progress(&slow, &config).unwrap();
        assert_eq!(factor.map(|f| f.risk_type), Some(RiskType::Schedule));

        let nearly_done = RiskSnapshot {
            poc_current: 96.0,
            poc_velocity: 1.5,
            ..fixture.snapshot()
        };
        assert!(schedule_progress(&nearly_done, &config).unwrap().is_none());

        // Intentional divergence: 4 points at 20% POC is Critical on the
        // maturity curve but clears the raw schedule cutoff.
        let early = RiskSnapshot {
            poc_current: 20.0,
            poc_velocity: 4.0,
            ..fixture.snapshot()
        };
        assert_eq!(
            crate::metrics::maturity_adjusted_tier(4.0 / crate::metrics::expected_velocity(20.0)),
            crate::scoring::StatusTier::Critical
        );
        assert!(schedule_progress(&early, &config).unwrap().is_none());
    }

    #[test]
    fn test_negative_cash_flow_share() {
        let mut fixture = Fixture::healthy();
        fixture.cash_flow = [10.0, -5.0, -1.0, 20.0]
            .into_iter()
            .map(|fct_n| CashFlowEntry {
                fct_n,
                ..Default::default()
            })
            .collect();
        let factor = negative_cash_flow(&fixture.snapshot(), &AnalysisConfig::default()).unwrap();
        assert_eq!(
            factor.map(|f| f.description),
            Some("Multiple negative cash flow quarters: 2/4".to_string())
        );
    }

    #[test]
    fn test_revenue_decline() {
        let fixture = Fixture::healthy();
        let snapshot = RiskSnapshot {
            revenue_current: 80.0,
            revenue_previous: 100.0,
            ..fixture.snapshot()
        };
        let factor = revenue_decline(&snapshot, &AnalysisConfig::default()).unwrap();
        assert_eq!(factor.map(|f| f.severity), Some(Severity::Critical));
    }

    #[test]
    fn test_depleted_contingency_and_thin_buffer() {
        let mut fixture = Fixture::healthy();
        // 900 sold, 20 left: 2% of contract, ~98% consumed
        fixture.add_package("RC", "Risk contingency", 900.0, 20.0);
        let snapshot = RiskSnapshot {
            cm2_pct: 8.0,
            ..fixture.snapshot()
        };
        let factors = assess_project_risks(&snapshot, &AnalysisConfig::default());
        assert_eq!(
            types(&factors),
            vec![
                (RiskType::Margin, Severity::High),
                (RiskType::Contingency, Severity::High),
                (RiskType::FinancialBuffer, Severity::Critical),
            ]
        );
    }

    #[test]
    fn test_nearly_empty_contingency_is_medium() {
        let mut fixture = Fixture::healthy();
        fixture.add_package("RC", "Risk contingency", 100.0, 5.0);
        let factor =
            contingency_adequacy(&fixture.snapshot(), &AnalysisConfig::default()).unwrap();
        assert_eq!(factor.map(|f| f.severity), Some(Severity::Medium));
    }

    #[test]
    fn test_work_package_concentration_ignores_contingency() {
        let mut fixture = Fixture::healthy();
        fixture.add_package("WP2", "Mechanical", 100.0, 120.0);
        fixture.add_package("WP3", "Electrical", 100.0, 100.0);
        fixture.add_package("RC2", "Risk contingency II", 100.0, 200.0);

        // 1 of 3 non-contingency packages is over by more than 15%, above the 30% share
        let factor =
            work_package_concentration(&fixture.snapshot(), &AnalysisConfig::default()).unwrap();
        assert_eq!(
            factor.map(|f| f.description),
            Some("1 of 3 work packages exceeding budget by >15%".to_string())
        );

        fixture.add_package("WP4", "Piping", 100.0, 130.0);
        let factor =
            work_package_concentration(&fixture.snapshot(), &AnalysisConfig::default()).unwrap();
        assert_eq!(factor.map(|f| f.severity), Some(Severity::High));
    }

    #[test]
    fn test_evaluation_failure_keeps_earlier_findings() {
        let fixture = Fixture::healthy();
        let snapshot = RiskSnapshot {
            cm2_pct: 4.0,
            committed_ratio: f64::INFINITY,
            ..fixture.snapshot()
        };
        let factors = assess_project_risks(&snapshot, &AnalysisConfig::default());
        assert_eq!(
            types(&factors),
            vec![
                (RiskType::Margin, Severity::Critical),
                (RiskType::AssessmentError, Severity::Medium),
            ]
        );
    }

    #[test]
    fn test_rule_subset_is_a_data_change() {
        let mut fixture = Fixture::healthy();
        fixture.work_packages.clear();
        fixture.contingency = ContingencyMetrics::none();
        let snapshot = RiskSnapshot {
            cm2_pct: 4.0,
            ..fixture.snapshot()
        };
        let factors = assess_with_rules(&[RiskRule::MarginLevel], &snapshot, &AnalysisConfig::default());
        assert_eq!(types(&factors), vec![(RiskType::Margin, Severity::Critical)]);
    }
}
