pub mod metrics;
pub mod types;

pub use metrics::{finite_or_zero, mean, percent_of, period_variance, ratio_or, std_dev};
pub use types::{
    is_risk_contingency, CashFlowEntry, CostInput, CostTotals, PeriodValues, ProjectData,
    ProjectInput, QuarterlyRevenue, Revenues, Snapshot, SnapshotAmounts, WorkPackage,
    WorkPackageRow,
};
