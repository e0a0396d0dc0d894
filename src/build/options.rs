use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::manifest::MANIFEST_FILE;
use crate::vfs::FileSystem;

/// Optional configuration file at the module root
pub const CONFIG_FILE: &str = "melo.toml";

/// Default output directory, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Configuration options for a build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Directory the manifest is written to
    pub output_dir: PathBuf,

    /// Number of parallel threads used to inspect packages
    pub parallel_threads: Option<usize>,

    /// File name of the manifest inside the output directory
    pub manifest_file: String,

    /// Show a progress bar once this many packages are inspected
    pub progress_threshold: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            parallel_threads: None,
            manifest_file: MANIFEST_FILE.to_string(),
            progress_threshold: 10,
        }
    }
}

impl BuildOptions {
    /// Parse options from TOML; missing keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse build options")
    }

    /// Read `melo.toml` from the module root, falling back to the defaults
    pub fn load_or_default(fs: &dyn FileSystem, module_root: &Path) -> Result<Self> {
        let path = module_root.join(CONFIG_FILE);
        match fs.read_to_string(&path) {
            Ok(content) => {
                info!("Using build options from {}", path.display());
                Self::from_toml(&content).with_context(|| format!("Invalid {}", path.display()))
            }
            Err(Error::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!("No {} found, using default options", CONFIG_FILE);
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Path of the manifest file
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_file)
    }

    /// Threads to inspect with, leaving one core free by default
    pub fn thread_count(&self) -> usize {
        self.parallel_threads.unwrap_or_else(|| {
            let available = num_cpus::get();
            let used = std::cmp::max(1, available.saturating_sub(1));
            debug!("Using {} threads for parallel inspection (available: {})", used, available);
            used
        })
    }
}
