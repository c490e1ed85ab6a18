use serde::{Deserialize, Serialize};

use super::presets::PresetLevel;
use super::risk::RiskSettings;
use super::thresholds::{ThresholdOverrides, ThresholdTable};
use crate::errors::{Result, ResultExt};

/// Root configuration structure, read from `.portfolio-lens.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfig {
    /// Partial `{metric: {tier: cutoff}}` overrides of the default bands
    #[serde(default)]
    pub thresholds: ThresholdOverrides,

    /// Risk rule parameters
    #[serde(default)]
    pub risk: RiskSettings,

    /// Output configuration
    #[serde(default)]
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub default_format: Option<String>,
    /// Colored terminal output (default: on)
    #[serde(default)]
    pub use_color: Option<bool>,
}

impl PortfolioConfig {
    pub fn default_format(&self) -> Option<&str> {
        self.output.as_ref()?.default_format.as_deref()
    }

    /// Build the threshold snapshot for one analysis run.
    ///
    /// Layers are applied in order: preset (or defaults), the file's
    /// `[thresholds]` section, then command-line overrides.
    pub fn resolve(
        &self,
        preset: Option<PresetLevel>,
        cli_overrides: &ThresholdOverrides,
    ) -> Result<AnalysisConfig> {
        let base = preset.map(PresetLevel::thresholds).unwrap_or_default();
        let thresholds = base
            .with_overrides(&self.thresholds)
            .context("Applying [thresholds] from configuration")?
            .with_overrides(cli_overrides)
            .context("Applying command-line threshold overrides")?;
        self.risk.validate().context("Validating [risk] settings")?;

        Ok(AnalysisConfig {
            thresholds,
            risk: self.risk.clone(),
        })
    }
}

/// Immutable configuration snapshot threaded through a full recomputation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub thresholds: ThresholdTable,
    pub risk: RiskSettings,
}
