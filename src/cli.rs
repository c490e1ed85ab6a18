use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::{Metric, PresetLevel, ThresholdOverrides};

#[derive(Parser, Debug)]
#[command(name = "portfolio-lens")]
#[command(about = "Executive performance analytics for project portfolios", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze project inputs and report portfolio performance
    Analyze {
        /// Project JSON files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output format (defaults to the config file setting, then terminal)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (skips discovery of .portfolio-lens.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Threshold preset applied before config file overrides
        #[arg(long, value_enum)]
        threshold_preset: Option<PresetLevel>,

        #[command(flatten)]
        margin: MarginOverrides,

        /// Disable colored terminal output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the active threshold table
    Thresholds {
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(long, value_enum)]
        threshold_preset: Option<PresetLevel>,
    },

    /// Write a default .portfolio-lens.toml into the current directory
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },
}

/// CM2 cutoffs given on the command line; they win over every other layer.
#[derive(clap::Args, Debug, Clone, Copy, Default, PartialEq)]
pub struct MarginOverrides {
    #[arg(long)]
    pub cm2_excellent: Option<f64>,

    #[arg(long)]
    pub cm2_good: Option<f64>,

    #[arg(long)]
    pub cm2_warning: Option<f64>,
}

impl MarginOverrides {
    pub fn to_overrides(self) -> ThresholdOverrides {
        let tiers: BTreeMap<String, f64> = [
            ("excellent", self.cm2_excellent),
            ("good", self.cm2_good),
            ("warning", self.cm2_warning),
        ]
        .into_iter()
        .filter_map(|(tier, value)| value.map(|v| (tier.to_string(), v)))
        .collect();

        let mut overrides = ThresholdOverrides::new();
        if !tiers.is_empty() {
            overrides.insert(Metric::Cm2Margin.key().to_string(), tiers);
        }
        overrides
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
            OutputFormat::Markdown => crate::io::output::OutputFormat::Markdown,
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
