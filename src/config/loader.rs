use std::fs;
use std::path::{Path, PathBuf};

use super::core::PortfolioConfig;
use crate::errors::{Error, Result};

pub const CONFIG_FILE_NAME: &str = ".portfolio-lens.toml";
const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to parse and validate config from TOML string
pub fn parse_config(contents: &str) -> Result<PortfolioConfig> {
    let config: PortfolioConfig = toml::from_str(contents)?;
    config.risk.validate()?;
    Ok(config)
}

/// Load an explicitly requested config file; failures are reported.
pub fn load_config_from_path(path: &Path) -> Result<PortfolioConfig> {
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::input(path, format!("cannot read config file: {e}")))?;
    let config = parse_config(&contents).map_err(|e| Error::input(path, e.to_string()))?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Pure function to try loading a discovered config file
fn try_load_config(config_path: &Path) -> Option<PortfolioConfig> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            handle_read_error(config_path, &e);
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!(
                "Failed to parse {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            Some(PortfolioConfig::default())
        }
    }
}

/// Handle file read errors with appropriate logging
fn handle_read_error(config_path: &Path, error: &std::io::Error) {
    // Only log actual errors, not "file not found"
    if error.kind() != std::io::ErrorKind::NotFound {
        log::warn!(
            "Failed to read config file {}: {}",
            config_path.display(),
            error
        );
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a config file.
pub fn discover_config(start: PathBuf) -> PortfolioConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            PortfolioConfig::default()
        })
}

pub fn load_config() -> PortfolioConfig {
    match std::env::current_dir() {
        Ok(dir) => discover_config(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            PortfolioConfig::default()
        }
    }
}
