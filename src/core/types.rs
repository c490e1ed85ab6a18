//! Raw project records as delivered by the extraction collaborator.
//!
//! Every field defaults to zero or empty so that a partially extracted
//! document still deserializes. [`ProjectInput::normalize`] resolves the
//! remaining defaults once, producing a [`ProjectData`] that the derivation
//! engines consume without further guarding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::metrics::{finite_or_zero, period_variance, ratio_or};

/// One revenue row across the reporting periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodValues {
    /// Current period, project-to-date
    pub n_ptd: f64,
    /// Previous period, project-to-date
    pub n1_ptd: f64,
    /// Current period, month-to-date
    pub n_mtd: f64,
}

impl PeriodValues {
    fn sanitized(self) -> Self {
        Self {
            n_ptd: finite_or_zero(self.n_ptd),
            n1_ptd: finite_or_zero(self.n1_ptd),
            n_mtd: finite_or_zero(self.n_mtd),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Revenues {
    #[serde(alias = "Contract Price")]
    pub contract_price: PeriodValues,
    #[serde(alias = "Revenues")]
    pub revenues: PeriodValues,
    /// Percentage of completion, already in percent (0-100)
    #[serde(alias = "POC%")]
    pub poc: PeriodValues,
    #[serde(alias = "Cash IN")]
    pub cash_in: PeriodValues,
    #[serde(alias = "Cash OUT")]
    pub cash_out: PeriodValues,
    #[serde(alias = "Cash In %")]
    pub cash_in_pct: PeriodValues,
}

impl Revenues {
    pub fn contract_value(&self) -> f64 {
        self.contract_price.n_ptd
    }

    pub fn poc_current(&self) -> f64 {
        self.poc.n_ptd
    }

    pub fn poc_previous(&self) -> f64 {
        self.poc.n1_ptd
    }

    pub fn revenue_current(&self) -> f64 {
        self.revenues.n_ptd
    }

    pub fn revenue_previous(&self) -> f64 {
        self.revenues.n1_ptd
    }

    fn normalized(self) -> Self {
        let contract_price = self.contract_price.sanitized();
        let cash_in = self.cash_in.sanitized();
        let mut cash_in_pct = self.cash_in_pct.sanitized();

        let backfill = |pct: &mut f64, cash: f64, contract: f64| {
            if *pct == 0.0 && contract > 0.0 {
                *pct = cash / contract * 100.0;
            }
        };
        backfill(&mut cash_in_pct.n_ptd, cash_in.n_ptd, contract_price.n_ptd);
        backfill(&mut cash_in_pct.n1_ptd, cash_in.n1_ptd, contract_price.n1_ptd);
        backfill(&mut cash_in_pct.n_mtd, cash_in.n_mtd, contract_price.n_mtd);

        Self {
            contract_price,
            revenues: self.revenues.sanitized(),
            poc: self.poc.sanitized(),
            cash_in,
            cash_out: self.cash_out.sanitized(),
            cash_in_pct,
        }
    }
}

/// Quarterly revenue tracking row (`Q1`..`Q4`, `Total`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarterlyRevenue {
    pub actuals: f64,
    pub gap_to_close: f64,
    pub budget: f64,
    pub delta: f64,
    pub delta_pct: f64,
}

/// Quarterly cash-flow entry across the three snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CashFlowEntry {
    pub period: String,
    pub as_sold: f64,
    pub fct_n1: f64,
    pub fct_n: f64,
    pub variance_n_vs_sold: f64,
    pub variance_n_vs_n1: f64,
}

impl CashFlowEntry {
    fn normalized(self) -> Self {
        let as_sold = finite_or_zero(self.as_sold);
        let fct_n1 = finite_or_zero(self.fct_n1);
        let fct_n = finite_or_zero(self.fct_n);
        Self {
            period: self.period.trim().to_string(),
            as_sold,
            fct_n1,
            fct_n,
            variance_n_vs_sold: if as_sold != 0.0 {
                period_variance(fct_n, as_sold)
            } else {
                0.0
            },
            variance_n_vs_n1: if fct_n1 != 0.0 {
                period_variance(fct_n, fct_n1)
            } else {
                0.0
            },
        }
    }
}

/// Amounts at the three snapshots: as sold, previous forecast, current forecast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotAmounts {
    pub as_sold: f64,
    pub fct_n1: f64,
    pub fct_n: f64,
}

impl SnapshotAmounts {
    pub const fn new(as_sold: f64, fct_n1: f64, fct_n: f64) -> Self {
        Self {
            as_sold,
            fct_n1,
            fct_n,
        }
    }

    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value)
    }

    pub fn get(&self, period: Snapshot) -> f64 {
        match period {
            Snapshot::AsSold => self.as_sold,
            Snapshot::PreviousForecast => self.fct_n1,
            Snapshot::CurrentForecast => self.fct_n,
        }
    }

    fn sanitized(self) -> Self {
        Self::new(
            finite_or_zero(self.as_sold),
            finite_or_zero(self.fct_n1),
            finite_or_zero(self.fct_n),
        )
    }
}

/// The three reporting snapshots used by margin and contingency analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Snapshot {
    AsSold,
    PreviousForecast,
    CurrentForecast,
}

/// The `TOTAL` row of the cost breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostTotals {
    pub as_sold: f64,
    pub committed: f64,
    pub fct_n: f64,
    pub fct_n1: f64,
    pub actuals: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostInput {
    /// `None` when the source document has no selling-price row at all.
    pub selling_price: Option<SnapshotAmounts>,
    pub external_costs: SnapshotAmounts,
    pub internal_costs: SnapshotAmounts,
    pub totals: CostTotals,
}

/// A cost-breakdown line as extracted, before derivation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkPackageRow {
    pub code: String,
    pub description: String,
    pub as_sold: f64,
    pub committed: f64,
    /// Cost to complete
    pub ctc: f64,
    pub fct_n: f64,
    pub fct_n1: f64,
    pub actuals: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkPackage {
    pub code: String,
    pub description: String,
    pub as_sold: f64,
    pub committed: f64,
    pub ctc: f64,
    pub fct_n: f64,
    pub fct_n1: f64,
    pub actuals: f64,
    pub variance_pct: f64,
    pub commitment_ratio: f64,
    pub is_risk_contingency: bool,
}

impl WorkPackage {
    pub fn from_row(row: WorkPackageRow) -> Self {
        let as_sold = finite_or_zero(row.as_sold);
        let committed = finite_or_zero(row.committed);
        let fct_n = finite_or_zero(row.fct_n);
        Self {
            is_risk_contingency: is_risk_contingency(&row.description),
            code: row.code.trim().to_string(),
            description: row.description,
            as_sold,
            committed,
            ctc: finite_or_zero(row.ctc),
            fct_n,
            fct_n1: finite_or_zero(row.fct_n1),
            actuals: finite_or_zero(row.actuals),
            variance_pct: period_variance(fct_n, as_sold),
            commitment_ratio: ratio_or(committed, as_sold, 0.0),
        }
    }
}

/// A line is a risk contingency when its description mentions both "risk"
/// and a contingency stem, in any case.
pub fn is_risk_contingency(description: &str) -> bool {
    let lower = description.to_lowercase();
    lower.contains("risk") && lower.contains("contingenc")
}

/// Wire format of one project, one per source document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInput {
    /// Identifier; falls back to `project_info["Project No."]`.
    pub id: String,
    pub project_info: BTreeMap<String, serde_json::Value>,
    pub revenues: Revenues,
    pub quarterly: BTreeMap<String, QuarterlyRevenue>,
    pub cash_flow_quarterly: Vec<CashFlowEntry>,
    pub costs: CostInput,
    pub work_packages: Vec<WorkPackageRow>,
}

const PROJECT_NUMBER_KEY: &str = "Project No.";
const PROJECT_NAME_KEY: &str = "Project Name";

impl ProjectInput {
    /// Resolve every default once.
    pub fn normalize(self) -> ProjectData {
        let info_text = |key: &str| {
            self.project_info.get(key).and_then(|value| match value {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };

        let id = if self.id.trim().is_empty() {
            info_text(PROJECT_NUMBER_KEY).unwrap_or_default()
        } else {
            self.id.trim().to_string()
        };
        let name = info_text(PROJECT_NAME_KEY).unwrap_or_else(|| id.clone());

        let mut work_packages = BTreeMap::new();
        for row in self.work_packages {
            let package = WorkPackage::from_row(row);
            if package.code.is_empty() {
                log::warn!(
                    "Project {id}: work package without a code ignored ('{}')",
                    package.description
                );
                continue;
            }
            if work_packages.contains_key(&package.code) {
                log::warn!(
                    "Project {id}: duplicate work package code '{}' ignored",
                    package.code
                );
                continue;
            }
            work_packages.insert(package.code.clone(), package);
        }

        let costs = CostInput {
            selling_price: self.costs.selling_price.map(SnapshotAmounts::sanitized),
            external_costs: self.costs.external_costs.sanitized(),
            internal_costs: self.costs.internal_costs.sanitized(),
            totals: CostTotals {
                as_sold: finite_or_zero(self.costs.totals.as_sold),
                committed: finite_or_zero(self.costs.totals.committed),
                fct_n: finite_or_zero(self.costs.totals.fct_n),
                fct_n1: finite_or_zero(self.costs.totals.fct_n1),
                actuals: finite_or_zero(self.costs.totals.actuals),
            },
        };

        ProjectData {
            id,
            name,
            project_info: self.project_info,
            revenues: self.revenues.normalized(),
            quarterly: self.quarterly,
            cash_flow_quarterly: self
                .cash_flow_quarterly
                .into_iter()
                .map(CashFlowEntry::normalized)
                .collect(),
            costs,
            work_packages,
        }
    }
}

/// Fully populated raw record. Derived metrics are pure functions of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    pub id: String,
    pub name: String,
    pub project_info: BTreeMap<String, serde_json::Value>,
    pub revenues: Revenues,
    pub quarterly: BTreeMap<String, QuarterlyRevenue>,
    pub cash_flow_quarterly: Vec<CashFlowEntry>,
    pub costs: CostInput,
    pub work_packages: BTreeMap<String, WorkPackage>,
}

impl ProjectData {
    pub fn contract_value(&self) -> f64 {
        self.revenues.contract_value()
    }
}
