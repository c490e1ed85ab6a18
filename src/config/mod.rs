//! Configuration: threshold bands, risk rule parameters and their loading.
//!
//! A run resolves the file, preset and command-line layers once into an
//! [`AnalysisConfig`], which is then passed by reference to every engine.

mod core;
mod loader;
pub mod presets;
mod risk;
mod thresholds;

pub use self::core::{AnalysisConfig, OutputConfig, PortfolioConfig};
pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from_path, parse_config,
    CONFIG_FILE_NAME,
};
pub use presets::PresetLevel;
pub use risk::RiskSettings;
pub use thresholds::{Metric, Polarity, ThresholdBand, ThresholdOverrides, ThresholdTable};
