//! Per-project derivation engines.
//!
//! Every engine is a pure function of a normalised [`crate::core::ProjectData`]
//! and, where classification is involved, a threshold snapshot.

pub mod cash_flow;
pub mod contingency;
pub mod cost;
pub mod earned_value;
pub mod margin;
pub mod revenue;
pub mod velocity;
pub mod work_packages;

pub use cash_flow::{rollup_cash_flow, CashFlowRollup, CashFlowStatus, QuarterCashFlow};
pub use contingency::{
    analyze_contingency, contingency_efficiency, ContingencyMetrics, ContingencyStatus,
    ContingencyTrend,
};
pub use cost::{analyze_costs, CostAnalysis, MarginFigures, MarginSnapshots};
pub use earned_value::{compute_earned_value, EarnedValueMetrics};
pub use margin::{
    analyze_margin_variability, ForecastReliability, MarginRisk, MarginSeries, MarginTrend,
    MarginVariability, MarginVariabilityAnalysis,
};
pub use revenue::{rollup_revenue, QuarterRevenue, RevenueRollup, RevenueStatus};
pub use velocity::{analyze_velocity, expected_velocity, maturity_adjusted_tier, PocVelocity};
pub use work_packages::{analyze_work_packages, PackageEntry, VarianceDistribution, WorkPackageAnalysis};
