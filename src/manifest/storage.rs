use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use super::types::BridgeManifest;
use crate::utils::file_utils;

/// Name of the manifest file inside the output directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Reads and writes a manifest file
#[derive(Debug)]
pub struct ManifestStorage {
    /// Path to the manifest file
    manifest_path: PathBuf,
}

impl ManifestStorage {
    pub fn new(manifest_path: impl AsRef<Path>) -> Self {
        Self {
            manifest_path: manifest_path.as_ref().to_path_buf(),
        }
    }

    /// Storage for the default manifest file inside `output_dir`
    pub fn in_dir(output_dir: impl AsRef<Path>) -> Self {
        Self::new(output_dir.as_ref().join(MANIFEST_FILE))
    }

    /// Load the manifest from disk
    pub fn load(&self) -> Result<BridgeManifest> {
        let path = &self.manifest_path;
        debug!("Loading manifest from {}", path.display());

        let content = file_utils::read_file_to_string(path)?;
        let manifest = BridgeManifest::from_json(&content)
            .with_context(|| format!("Failed to parse manifest file {}", path.display()))?;

        info!("Loaded manifest with {} package(s)", manifest.packages.len());
        Ok(manifest)
    }

    /// Save the manifest to disk
    pub fn save(&self, manifest: &BridgeManifest) -> Result<()> {
        let path = &self.manifest_path;
        debug!("Saving manifest to {}", path.display());

        let content = manifest.to_json().context("Failed to serialize manifest")?;
        file_utils::write_string_to_file(path, &content)?;

        info!("Saved manifest with {} package(s) to {}", manifest.packages.len(), path.display());
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.manifest_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.manifest_path
    }
}
