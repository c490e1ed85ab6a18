use std::fs::File;
use std::io::{self as stdio, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::{AnalysisConfig, PresetLevel, ThresholdOverrides};
use crate::io::{self, OutputFormat};
use crate::portfolio::{analyze_portfolio, PortfolioReport};
use crate::project::ProjectRecord;

pub struct AnalyzeConfig {
    pub paths: Vec<PathBuf>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub threshold_preset: Option<PresetLevel>,
    pub threshold_overrides: ThresholdOverrides,
    pub no_color: bool,
}

/// Load, derive and aggregate every project below `paths`.
pub fn run_analysis(paths: &[PathBuf], config: &AnalysisConfig) -> Result<PortfolioReport> {
    let projects = io::load_projects(paths).context("Failed to load project inputs")?;
    log::info!("Loaded {} project(s)", projects.len());

    let records = projects
        .into_iter()
        .map(|data| ProjectRecord::derive(data, config))
        .collect();
    Ok(analyze_portfolio(records, config))
}

pub fn handle_analyze(config: AnalyzeConfig) -> Result<()> {
    let file_config = super::load_portfolio_config(config.config.as_deref())?;
    let analysis = file_config.resolve(config.threshold_preset, &config.threshold_overrides)?;

    let format = config
        .format
        .or_else(|| file_config.default_format().and_then(OutputFormat::parse))
        .unwrap_or(OutputFormat::Terminal);
    let use_color = file_config
        .output
        .as_ref()
        .and_then(|o| o.use_color)
        .unwrap_or(true);
    if config.no_color || !use_color || config.output.is_some() {
        colored::control::set_override(false);
    }

    let report = run_analysis(&config.paths, &analysis)?;

    let sink: Box<dyn Write> = match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(stdio::stdout()),
    };
    io::create_writer(format, sink).write_report(&report)?;

    if let Some(path) = &config.output {
        log::info!("Wrote {format} report to {}", path.display());
    }
    Ok(())
}
