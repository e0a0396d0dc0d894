use std::path::{Path, PathBuf};
use log::{debug, trace};

use crate::error::Result;
use crate::vfs::{FileSystem, WalkEntry};

/// Suffix marking Go test files, which never take part in exports
pub const GO_TEST_SUFFIX: &str = "_test.go";

/// File collector for finding Go source files
#[derive(Debug)]
pub struct FileCollector {
    /// Valid file extensions to collect
    valid_extensions: Vec<String>,

    /// File name suffixes excluded even when the extension matches
    excluded_suffixes: Vec<String>,
}

impl Default for FileCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl FileCollector {
    /// Create a new file collector for Go sources, skipping tests
    pub fn new() -> Self {
        Self {
            valid_extensions: vec!["go".to_string()],
            excluded_suffixes: vec![GO_TEST_SUFFIX.to_string()],
        }
    }

    /// Whether a walked entry is a candidate source file
    pub fn is_candidate(&self, entry: &WalkEntry) -> bool {
        if entry.is_dir {
            return false;
        }

        let name = entry.file_name();
        if self.excluded_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())) {
            trace!("Skipping excluded file: {}", entry.path.display());
            return false;
        }

        match entry.path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => self.valid_extensions.iter().any(|valid| valid == ext),
            None => false,
        }
    }

    /// Collect all candidate files below `root` in lexical tree order
    pub fn collect_files(&self, fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>> {
        debug!("Collecting files from directory: {}", root.display());

        let files: Vec<PathBuf> = fs
            .walk(root)?
            .into_iter()
            .filter(|entry| self.is_candidate(entry))
            .map(|entry| entry.path)
            .collect();

        debug!("Collected {} files for processing", files.len());
        Ok(files)
    }

    /// Collect the candidate files directly inside `dir`, without descending
    pub fn collect_package_files(&self, fs: &dyn FileSystem, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(fs
            .read_dir(dir)?
            .into_iter()
            .filter(|entry| self.is_candidate(entry))
            .map(|entry| entry.path)
            .collect())
    }
}
