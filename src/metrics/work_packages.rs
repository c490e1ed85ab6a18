//! Cost variance of material work packages across the portfolio.

use serde::{Deserialize, Serialize};

use crate::core::metrics::{mean, percent_of};
use crate::core::ProjectData;

/// Share of the project budget above which a package is material.
pub const MATERIALITY_PCT: f64 = 2.5;
const HIGH_VARIANCE_PCT: f64 = 15.0;
const CRITICAL_VARIANCE_PCT: f64 = 25.0;
const REDUCTION_OPPORTUNITY_PCT: f64 = -10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub project_id: String,
    pub code: String,
    pub description: String,
    pub as_sold: f64,
    pub fct_n: f64,
    pub variance_pct: f64,
    pub commitment_ratio: f64,
    pub materiality_pct: f64,
}

/// Count of material packages per variance range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceDistribution {
    /// below -5%
    pub cost_reduction: usize,
    /// -5% to +5%
    pub stable: usize,
    /// above 5% up to 15%
    pub moderate_increase: usize,
    /// above 15% up to 25%
    pub high_increase: usize,
    /// above 25%
    pub critical_increase: usize,
}

impl VarianceDistribution {
    fn record(&mut self, variance_pct: f64) {
        let bucket = if variance_pct < -5.0 {
            &mut self.cost_reduction
        } else if variance_pct <= 5.0 {
            &mut self.stable
        } else if variance_pct <= HIGH_VARIANCE_PCT {
            &mut self.moderate_increase
        } else if variance_pct <= CRITICAL_VARIANCE_PCT {
            &mut self.high_increase
        } else {
            &mut self.critical_increase
        };
        *bucket += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkPackageAnalysis {
    /// Sorted by variance, largest increase first
    pub material_packages: Vec<PackageEntry>,
    pub contingency_lines: Vec<PackageEntry>,
    pub distribution: VarianceDistribution,
    /// More than 15% over budget but not past 25%
    pub high_variance_count: usize,
    pub critical_variance_count: usize,
    /// Mean of the positive variances only
    pub average_cost_increase: f64,
    pub reduction_opportunities: usize,
    /// Material as-sold value against the budgets of the projects involved
    pub coverage_pct: f64,
}

pub fn analyze_work_packages<'a>(
    projects: impl IntoIterator<Item = &'a ProjectData>,
) -> WorkPackageAnalysis {
    let mut analysis = WorkPackageAnalysis::default();
    let mut covered_budget = 0.0;

    for project in projects {
        let project_total = if project.costs.totals.as_sold != 0.0 {
            project.costs.totals.as_sold
        } else {
            project.contract_value()
        };

        for wp in project.work_packages.values().filter(|wp| wp.as_sold > 0.0) {
            let entry = PackageEntry {
                project_id: project.id.clone(),
                code: wp.code.clone(),
                description: wp.description.clone(),
                as_sold: wp.as_sold,
                fct_n: wp.fct_n,
                variance_pct: wp.variance_pct,
                commitment_ratio: wp.commitment_ratio,
                materiality_pct: if project_total > 0.0 {
                    percent_of(wp.as_sold, project_total)
                } else {
                    0.0
                },
            };

            if wp.is_risk_contingency {
                analysis.contingency_lines.push(entry);
            } else if entry.materiality_pct > MATERIALITY_PCT {
                covered_budget += project_total;
                analysis.distribution.record(entry.variance_pct);
                if entry.variance_pct > CRITICAL_VARIANCE_PCT {
                    analysis.critical_variance_count += 1;
                } else if entry.variance_pct > HIGH_VARIANCE_PCT {
                    analysis.high_variance_count += 1;
                }
                if entry.variance_pct < REDUCTION_OPPORTUNITY_PCT {
                    analysis.reduction_opportunities += 1;
                }
                analysis.material_packages.push(entry);
            }
        }
    }

    let increases: Vec<f64> = analysis
        .material_packages
        .iter()
        .map(|wp| wp.variance_pct)
        .filter(|v| *v > 0.0)
        .collect();
    analysis.average_cost_increase = mean(&increases);

    let material_value: f64 = analysis.material_packages.iter().map(|wp| wp.as_sold).sum();
    analysis.coverage_pct = percent_of(material_value, covered_budget);

    analysis
        .material_packages
        .sort_by(|a, b| b.variance_pct.total_cmp(&a.variance_pct));

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CostTotals, WorkPackage, WorkPackageRow};

    fn project(id: &str, total_as_sold: f64, rows: &[(&str, &str, f64, f64)]) -> ProjectData {
        let mut data = ProjectData {
            id: id.into(),
            ..Default::default()
        };
        data.costs.totals = CostTotals {
            as_sold: total_as_sold,
            ..Default::default()
        };
        for (code, description, as_sold, fct_n) in rows {
            let wp = WorkPackage::from_row(WorkPackageRow {
                code: (*code).into(),
                description: (*description).into(),
                as_sold: *as_sold,
                fct_n: *fct_n,
                ..Default::default()
            });
            data.work_packages.insert(wp.code.clone(), wp);
        }
        data
    }

    #[test]
    fn test_materiality_filter_and_buckets() {
        let p = project(
            "P1",
            1000.0,
            &[
                ("A", "Structure", 400.0, 520.0),       // +30%
                ("B", "Electrical", 200.0, 236.0),      // +18%
                ("C", "Painting", 20.0, 40.0),          // 2% of budget, ignored
                ("D", "Logistics", 100.0, 80.0),        // -20%
                ("E", "Risk contingency", 50.0, 30.0),  // contingency
            ],
        );
        let analysis = analyze_work_packages([&p]);

        assert_eq!(analysis.material_packages.len(), 3);
        assert_eq!(analysis.material_packages[0].code, "A");
        assert_eq!(analysis.contingency_lines.len(), 1);
        assert_eq!(analysis.critical_variance_count, 1);
        assert_eq!(analysis.high_variance_count, 1);
        assert_eq!(analysis.reduction_opportunities, 1);
        assert_eq!(
            analysis.distribution,
            VarianceDistribution {
                cost_reduction: 1,
                stable: 0,
                moderate_increase: 0,
                high_increase: 1,
                critical_increase: 1,
            }
        );
        assert!((analysis.average_cost_increase - 24.0).abs() < 1e-9);
        assert!((analysis.coverage_pct - 700.0 / 3000.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_contract_value_is_materiality_fallback() {
        let mut p = project("P2", 0.0, &[("A", "Pumps", 10.0, 10.0)]);
        p.revenues.contract_price.n_ptd = 100.0;
        let analysis = analyze_work_packages([&p]);
        assert_eq!(analysis.material_packages[0].materiality_pct, 10.0);
    }

    #[test]
    fn test_empty_portfolio() {
        let analysis = analyze_work_packages(std::iter::empty());
        assert_eq!(analysis, WorkPackageAnalysis::default());
    }
}
