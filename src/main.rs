use anyhow::Result;
use portfolio_lens::cli::{self, Commands};
use portfolio_lens::commands::{self, AnalyzeConfig, ThresholdsConfig};

fn main() -> Result<()> {
    let cli = cli::parse_args();
    init_logging(cli.verbosity);

    match cli.command {
        command @ Commands::Analyze { .. } => handle_analyze_command(command),
        Commands::Thresholds {
            config,
            threshold_preset,
        } => commands::show_thresholds(ThresholdsConfig {
            config,
            threshold_preset,
        }),
        Commands::Init { force } => commands::init_config(force),
    }
}

// RUST_LOG wins; otherwise -v raises the default warn level
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn handle_analyze_command(command: Commands) -> Result<()> {
    let Commands::Analyze {
        paths,
        format,
        output,
        config,
        threshold_preset,
        margin,
        no_color,
    } = command
    else {
        anyhow::bail!("Invalid command");
    };

    commands::handle_analyze(AnalyzeConfig {
        paths,
        format: format.map(Into::into),
        output,
        config,
        threshold_preset,
        threshold_overrides: margin.to_overrides(),
        no_color,
    })
}
