//! CLI command implementations.
//!
//! - **analyze**: load project inputs and report on the portfolio
//! - **thresholds**: print the resolved threshold table
//! - **init**: write a default configuration file

pub mod analyze;
pub mod init;
pub mod thresholds;

pub use analyze::{handle_analyze, run_analysis, AnalyzeConfig};
pub use init::init_config;
pub use thresholds::{show_thresholds, ThresholdsConfig};

use std::path::Path;

use anyhow::Result;

use crate::config::{self, PortfolioConfig};

/// An explicit path must load; otherwise the file is discovered from the
/// current directory and a broken file falls back to defaults.
pub(crate) fn load_portfolio_config(explicit: Option<&Path>) -> Result<PortfolioConfig> {
    match explicit {
        Some(path) => Ok(config::load_config_from_path(path)?),
        None => Ok(config::load_config()),
    }
}
