pub mod input;
pub mod output;
pub mod walker;
pub mod writers;

pub use input::{load_project_file, load_projects, parse_projects};
pub use output::{create_writer, OutputFormat, OutputWriter};
pub use walker::FileWalker;

use anyhow::Result;
use std::fs;
use std::path::Path;

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}
