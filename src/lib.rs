//! Executive performance analytics for project portfolios.
//!
//! Raw per-project snapshots ([`core::ProjectInput`]) are normalised once,
//! run through the derivation engines in [`metrics`] and [`risk`], classified
//! with [`scoring`] and aggregated in [`portfolio`].
//!
//! ```rust,ignore
//! use portfolio_lens::{analyze_portfolio, AnalysisConfig, ProjectInput, ProjectRecord};
//!
//! let config = AnalysisConfig::default();
//! let record = ProjectRecord::derive(ProjectInput::default().normalize(), &config);
//! let report = analyze_portfolio(vec![record], &config);
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod metrics;
pub mod portfolio;
pub mod project;
pub mod risk;
pub mod scoring;

// Re-export commonly used types
pub use crate::config::{AnalysisConfig, Metric, PortfolioConfig, PresetLevel, ThresholdTable};
pub use crate::core::{ProjectData, ProjectInput};
pub use crate::errors::{Error, Result};
pub use crate::portfolio::{analyze_portfolio, PortfolioReport, PortfolioSummary};
pub use crate::project::{ProjectMetrics, ProjectRecord};
pub use crate::risk::{RiskFactor, RiskType, Severity};
pub use crate::scoring::{classify, Classification, StatusTier};
