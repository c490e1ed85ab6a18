//! Quarterly revenue actuals against budget, rolled up across projects.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{ProjectData, QuarterlyRevenue};

/// Key of the year-to-date row that sits next to the quarters.
pub const TOTAL_ROW: &str = "Total";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevenueStatus {
    #[serde(rename = "On Target")]
    OnTarget,
    Watch,
    Behind,
}

impl RevenueStatus {
    pub fn from_performance(performance_pct: f64) -> Self {
        if performance_pct >= 95.0 {
            RevenueStatus::OnTarget
        } else if performance_pct >= 85.0 {
            RevenueStatus::Watch
        } else {
            RevenueStatus::Behind
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RevenueStatus::OnTarget => "On Target",
            RevenueStatus::Watch => "Watch",
            RevenueStatus::Behind => "Behind",
        }
    }
}

impl fmt::Display for RevenueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl QuarterlyRevenue {
    /// The budget, or actuals plus the gap still to close when none was set.
    pub fn effective_budget(&self) -> f64 {
        if self.budget == 0.0 {
            self.actuals + self.gap_to_close
        } else {
            self.budget
        }
    }

    fn has_data(&self) -> bool {
        self.actuals > 0.0 || self.effective_budget() > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterRevenue {
    pub quarter: String,
    pub actual: f64,
    pub budget: f64,
    pub gap_to_close: f64,
    /// Projects reporting actuals or a budget for the quarter
    pub project_count: usize,
    /// Actual over budget in percent; `None` without a budget
    pub performance_pct: Option<f64>,
    pub status: Option<RevenueStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueRollup {
    /// Ordered by quarter label; the `Total` row is excluded
    pub quarters: Vec<QuarterRevenue>,
    pub total_actual: f64,
    pub total_budget: f64,
    pub performance_pct: Option<f64>,
}

fn performance(actual: f64, budget: f64) -> Option<f64> {
    (budget > 0.0).then(|| actual / budget * 100.0)
}

#[derive(Default)]
struct QuarterTotals {
    actual: f64,
    budget: f64,
    gap_to_close: f64,
    project_count: usize,
}

pub fn rollup_revenue<'a>(projects: impl IntoIterator<Item = &'a ProjectData>) -> RevenueRollup {
    let mut by_quarter: BTreeMap<&str, QuarterTotals> = BTreeMap::new();
    for project in projects {
        let rows = project
            .quarterly
            .iter()
            .filter(|(quarter, row)| !quarter.eq_ignore_ascii_case(TOTAL_ROW) && row.has_data());
        for (quarter, row) in rows {
            let totals = by_quarter.entry(quarter.as_str()).or_default();
            totals.actual += row.actuals;
            totals.budget += row.effective_budget();
            totals.gap_to_close += row.gap_to_close;
            totals.project_count += 1;
        }
    }

    let quarters: Vec<QuarterRevenue> = by_quarter
        .into_iter()
        .map(|(quarter, totals)| {
            let performance_pct = performance(totals.actual, totals.budget);
            QuarterRevenue {
                quarter: quarter.to_string(),
                actual: totals.actual,
                budget: totals.budget,
                gap_to_close: totals.gap_to_close,
                project_count: totals.project_count,
                performance_pct,
                status: performance_pct.map(RevenueStatus::from_performance),
            }
        })
        .collect();

    let total_actual: f64 = quarters.iter().map(|q| q.actual).sum();
    let total_budget: f64 = quarters.iter().map(|q| q.budget).sum();

    RevenueRollup {
        quarters,
        total_actual,
        total_budget,
        performance_pct: performance(total_actual, total_budget),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(rows: &[(&str, f64, f64, f64)]) -> ProjectData {
        ProjectData {
            quarterly: rows
                .iter()
                .map(|(quarter, actuals, budget, gap)| {
                    (
                        (*quarter).to_string(),
                        QuarterlyRevenue {
                            actuals: *actuals,
                            budget: *budget,
                            gap_to_close: *gap,
                            ..Default::default()
                        },
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_quarters_are_summed_without_total_row() {
        let a = project(&[("Q1", 90.0, 100.0, 10.0), ("Q2", 50.0, 100.0, 50.0), ("Total", 140.0, 200.0, 60.0)]);
        let b = project(&[("Q1", 100.0, 100.0, 0.0)]);
        let rollup = rollup_revenue([&a, &b]);

        assert_eq!(rollup.quarters.len(), 2);
        let q1 = &rollup.quarters[0];
        assert_eq!(q1.quarter, "Q1");
        assert_eq!(q1.project_count, 2);
        assert_eq!(q1.actual, 190.0);
        assert_eq!(q1.performance_pct, Some(95.0));
        assert_eq!(q1.status, Some(RevenueStatus::OnTarget));
        assert_eq!(rollup.quarters[1].status, Some(RevenueStatus::Behind));

        assert_eq!(rollup.total_actual, 240.0);
        assert_eq!(rollup.total_budget, 300.0);
        assert_eq!(rollup.performance_pct, Some(80.0));
    }

    #[test]
    fn test_missing_budget_falls_back_to_gap_to_close() {
        let a = project(&[("Q3", 80.0, 0.0, 10.0)]);
        let rollup = rollup_revenue([&a]);
        assert_eq!(rollup.quarters[0].budget, 90.0);
        assert_eq!(rollup.quarters[0].status, Some(RevenueStatus::Watch));
    }

    #[test]
    fn test_empty_quarters_are_skipped() {
        let a = project(&[("Q4", 0.0, 0.0, 0.0)]);
        let rollup = rollup_revenue([&a]);
        assert!(rollup.quarters.is_empty());
        assert_eq!(rollup.performance_pct, None);
    }
}
