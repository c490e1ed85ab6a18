use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::{Error, Result};

/// Collects project input files under a root, in a stable order.
pub struct FileWalker {
    root: PathBuf,
    extensions: Vec<String>,
    max_depth: usize,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            extensions: vec!["json".to_string()],
            max_depth: usize::MAX,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// A file root yields itself; a directory yields every matching file below it.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        if self.root.is_file() {
            return Ok(vec![self.root.clone()]);
        }
        if !self.root.is_dir() {
            return Err(Error::input(&self.root, "path does not exist"));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .max_depth(self.max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

        for entry in walker {
            let entry = entry.map_err(|e| Error::input(&self.root, e.to_string()))?;
            let path = entry.path();
            if entry.file_type().is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| *wanted == ext))
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_walk_finds_json_files_sorted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.JSON"), "{}").unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden").join("d.json"), "{}").unwrap();

        let files = FileWalker::new(dir.path().to_path_buf()).walk().unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json", "c.JSON"]);
    }

    #[test]
    fn test_max_depth_stops_descent() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("top.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("deep.json"), "{}").unwrap();

        let files = FileWalker::new(dir.path().to_path_buf())
            .with_max_depth(1)
            .walk()
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_single_file_root() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("project.json");
        fs::write(&file, "{}").unwrap();
        assert_eq!(FileWalker::new(file.clone()).walk().unwrap(), vec![file]);
    }

    #[test]
    fn test_missing_root_is_input_error() {
        let dir = TempDir::new().unwrap();
        let result = FileWalker::new(dir.path().join("missing")).walk();
        assert!(matches!(result, Err(Error::Input { .. })));
    }
}
