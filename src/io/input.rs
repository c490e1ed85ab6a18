//! Loading project documents into normalised [`ProjectData`].

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::{ProjectData, ProjectInput};
use crate::errors::{Error, Result};
use crate::io::walker::FileWalker;

/// A document holds one project or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum InputDocument {
    Many(Vec<ProjectInput>),
    One(Box<ProjectInput>),
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn with_fallback_id(mut data: ProjectData, fallback: String) -> ProjectData {
    if data.id.is_empty() {
        log::debug!("Project without identifier named after its source: {fallback}");
        if data.name.is_empty() {
            data.name = fallback.clone();
        }
        data.id = fallback;
    }
    data
}

/// Decode the projects held in `content`; `path` only labels errors and
/// supplies identifiers for anonymous projects.
pub fn parse_projects(content: &str, path: &Path) -> Result<Vec<ProjectData>> {
    let document: InputDocument =
        serde_json::from_str(content).map_err(|e| Error::input(path, e.to_string()))?;
    let stem = file_stem(path);

    let projects = match document {
        InputDocument::One(input) => vec![with_fallback_id(input.normalize(), stem)],
        InputDocument::Many(inputs) => inputs
            .into_iter()
            .enumerate()
            .map(|(i, input)| with_fallback_id(input.normalize(), format!("{stem}-{}", i + 1)))
            .collect(),
    };
    Ok(projects)
}

pub fn load_project_file(path: &Path) -> Result<Vec<ProjectData>> {
    let content = fs::read_to_string(path).map_err(|e| Error::input(path, e.to_string()))?;
    let projects = parse_projects(&content, path)?;
    log::debug!("Loaded {} project(s) from {}", projects.len(), path.display());
    Ok(projects)
}

/// Load every project below `paths`. Files and directories may be mixed;
/// directories are searched recursively for `.json` documents.
pub fn load_projects(paths: &[PathBuf]) -> Result<Vec<ProjectData>> {
    let mut projects = Vec::new();
    for root in paths {
        for file in FileWalker::new(root.clone()).walk()? {
            projects.extend(load_project_file(&file)?);
        }
    }

    let mut seen = BTreeSet::new();
    for project in &projects {
        if !seen.insert(project.id.as_str()) {
            log::warn!("Project id {} appears more than once in the input", project.id);
        }
    }
    Ok(projects)
}
