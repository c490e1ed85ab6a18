use crate::config::CONFIG_FILE_NAME;
use crate::io;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG: &str = r#"# portfolio-lens configuration
#
# Threshold cutoffs per metric. Only the tiers you list are changed; the rest
# keep their defaults. Tiers: excellent, good, stable, warning, critical.

[thresholds.cm2_margin]
excellent = 15.0
good = 10.0
warning = 5.0
critical = 0.0

[thresholds.cm1_margin]
excellent = 25.0
good = 20.0
warning = 15.0
critical = 10.0

# Lower is better: committed cost over as-sold budget
[thresholds.committed_vs_budget]
excellent = 0.9
good = 1.0
warning = 1.1
critical = 1.2

# Parameters of the risk rules, in percent
[risk]
contingency_low_remaining_pct = 1.0
contingency_depleting_remaining_pct = 5.0
contingency_depleting_consumed_pct = 80.0
buffer_remaining_pct = 3.0
buffer_cm2_pct = 10.0
work_package_share_pct = 30.0
work_package_variance_pct = 15.0
cash_flow_negative_share_pct = 30.0
schedule_poc_ceiling = 90.0

[output]
default_format = "terminal"
use_color = true
"#;

/// Write the default configuration into `dir`.
pub fn init_config_in(dir: &Path, force: bool) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    io::write_file(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}

pub fn init_config(force: bool) -> Result<()> {
    init_config_in(Path::new("."), force)?;
    println!("Created {CONFIG_FILE_NAME} configuration file");
    Ok(())
}
