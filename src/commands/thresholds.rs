use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Cell, Table};

use crate::config::{Metric, Polarity, PresetLevel, ThresholdOverrides, ThresholdTable};
use crate::scoring::StatusTier;

const TIERS: [StatusTier; 5] = [
    StatusTier::Excellent,
    StatusTier::Good,
    StatusTier::Stable,
    StatusTier::Warning,
    StatusTier::Critical,
];

pub struct ThresholdsConfig {
    pub config: Option<PathBuf>,
    pub threshold_preset: Option<PresetLevel>,
}

/// One row per metric: key, direction, then each tier cutoff.
pub fn threshold_table(thresholds: &ThresholdTable) -> Table {
    let mut header = vec!["Metric".to_string(), "Direction".to_string()];
    header.extend(TIERS.iter().map(|t| t.label().to_string()));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    for metric in Metric::ALL {
        let band = thresholds.band(metric);
        let direction = match metric.polarity() {
            Polarity::HigherIsBetter => "higher is better",
            Polarity::LowerIsBetter => "lower is better",
        };
        let mut row = vec![Cell::new(metric.key()), Cell::new(direction)];
        row.extend(TIERS.iter().map(|&tier| {
            Cell::new(
                band.cutoff(tier)
                    .map(|v| format!("{v}"))
                    .unwrap_or_else(|| "-".to_string()),
            )
        }));
        table.add_row(row);
    }
    table
}

pub fn show_thresholds(config: ThresholdsConfig) -> Result<()> {
    let file_config = super::load_portfolio_config(config.config.as_deref())?;
    let analysis = file_config.resolve(config.threshold_preset, &ThresholdOverrides::new())?;

    let preset = config
        .threshold_preset
        .map(|p| p.to_string())
        .unwrap_or_else(|| "default".to_string());
    println!("Active thresholds (preset: {preset})");
    println!("{}", threshold_table(&analysis.thresholds));
    Ok(())
}
