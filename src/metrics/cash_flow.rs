//! Quarterly cash flow rolled up across projects.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::metrics::period_variance;
use crate::core::ProjectData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CashFlowStatus {
    Excellent,
    #[serde(rename = "On/Above Plan")]
    OnPlan,
    #[serde(rename = "Slight Variance")]
    SlightVariance,
    Concerning,
    Critical,
}

impl CashFlowStatus {
    pub fn from_variance(variance_pct: f64) -> Self {
        if variance_pct >= 10.0 {
            CashFlowStatus::Excellent
        } else if variance_pct >= 0.0 {
            CashFlowStatus::OnPlan
        } else if variance_pct >= -10.0 {
            CashFlowStatus::SlightVariance
        } else if variance_pct >= -20.0 {
            CashFlowStatus::Concerning
        } else {
            CashFlowStatus::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CashFlowStatus::Excellent => "Excellent",
            CashFlowStatus::OnPlan => "On/Above Plan",
            CashFlowStatus::SlightVariance => "Slight Variance",
            CashFlowStatus::Concerning => "Concerning",
            CashFlowStatus::Critical => "Critical",
        }
    }
}

impl fmt::Display for CashFlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterCashFlow {
    pub period: String,
    pub as_sold: f64,
    pub fct_n1: f64,
    pub fct_n: f64,
    pub project_count: usize,
    pub variance_vs_plan: f64,
    pub variance_vs_previous: f64,
    pub status: CashFlowStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRollup {
    /// Ordered by period label
    pub quarters: Vec<QuarterCashFlow>,
    pub total_as_sold: f64,
    pub total_fct_n: f64,
    pub overall_variance: f64,
    pub overall_status: CashFlowStatus,
    /// Average change per period between the first and last quarter forecasts
    pub trend: f64,
}

fn variance_or_zero(current: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        period_variance(current, base)
    }
}

#[derive(Default)]
struct QuarterTotals {
    as_sold: f64,
    fct_n1: f64,
    fct_n: f64,
    project_count: usize,
}

pub fn rollup_cash_flow<'a>(projects: impl IntoIterator<Item = &'a ProjectData>) -> CashFlowRollup {
    let mut by_period: BTreeMap<&str, QuarterTotals> = BTreeMap::new();
    for project in projects {
        for entry in project.cash_flow_quarterly.iter().filter(|e| !e.period.is_empty()) {
            let totals = by_period.entry(entry.period.as_str()).or_default();
            totals.as_sold += entry.as_sold;
            totals.fct_n1 += entry.fct_n1;
            totals.fct_n += entry.fct_n;
            totals.project_count += 1;
        }
    }

    let quarters: Vec<QuarterCashFlow> = by_period
        .into_iter()
        .map(|(period, totals)| {
            let variance_vs_plan = variance_or_zero(totals.fct_n, totals.as_sold);
            QuarterCashFlow {
                period: period.to_string(),
                as_sold: totals.as_sold,
                fct_n1: totals.fct_n1,
                fct_n: totals.fct_n,
                project_count: totals.project_count,
                variance_vs_plan,
                variance_vs_previous: variance_or_zero(totals.fct_n, totals.fct_n1),
                status: CashFlowStatus::from_variance(variance_vs_plan),
            }
        })
        .collect();

    let total_as_sold: f64 = quarters.iter().map(|q| q.as_sold).sum();
    let total_fct_n: f64 = quarters.iter().map(|q| q.fct_n).sum();
    let overall_variance = variance_or_zero(total_fct_n, total_as_sold);

    let trend = match (quarters.first(), quarters.last()) {
        (Some(first), Some(last)) if quarters.len() >= 2 => {
            period_variance(last.fct_n, first.fct_n) / quarters.len() as f64
        }
        _ => 0.0,
    };

    CashFlowRollup {
        quarters,
        total_as_sold,
        total_fct_n,
        overall_variance,
        overall_status: CashFlowStatus::from_variance(overall_variance),
        trend,
    }
}
