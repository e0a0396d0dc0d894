//! Build orchestration: check the module, scan it, inspect every exported
//! package and write the export manifest.

mod options;
mod progress;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::inspector::PackageInspector;
use crate::loader::ModuleLoader;
use crate::manifest::{BridgeManifest, ManifestStorage, PackageManifest};
use crate::package::{check_input_folder, ExportedPackage, ModuleScanner};
use crate::utils::file_utils;
use crate::vfs::FileSystem;

pub use options::{BuildOptions, CONFIG_FILE, DEFAULT_OUTPUT_DIR};
pub use progress::ProgressTracker;

/// Outcome of a successful build
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// The manifest that was written
    pub manifest: BridgeManifest,

    /// Where it was written to
    pub manifest_path: PathBuf,
}

/// Builder turning a Go module into an export manifest
#[derive(Debug)]
pub struct Builder {
    /// Configuration options for the build
    options: BuildOptions,

    /// Scanner deciding which packages are exported
    scanner: ModuleScanner,

    /// Progress display for the inspection phase
    progress: ProgressTracker,
}

impl Builder {
    pub fn new(options: BuildOptions) -> Self {
        let progress = ProgressTracker::new(options.progress_threshold);
        Self {
            options,
            scanner: ModuleScanner::new(),
            progress,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build the manifest of the module at `input`.
    ///
    /// Fails as a whole: nothing is written unless every exported package
    /// was inspected successfully.
    pub fn build(&self, fs: &dyn FileSystem, input: &Path) -> Result<BuildReport> {
        info!("Building export manifest for {}", input.display());

        let module = check_input_folder(fs, input)
            .with_context(|| format!("Invalid input folder {}", input.display()))?;
        debug!("Module path: {}", module.module_path);

        file_utils::ensure_dir_exists(&self.options.output_dir)?;

        let scanned = self
            .scanner
            .scan_module(fs, &module.root, &module.module_path)
            .with_context(|| format!("Failed to scan module {}", module.module_path))?;
        let packages = dedupe_packages(scanned);

        let loader = ModuleLoader::new(fs, &module.root, &module.module_path);
        let inspector = PackageInspector::new(&loader);

        let thread_count = self.options.thread_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(thread_count)
            .build()
            .context("Failed to build thread pool")?;

        info!("Inspecting {} package(s) on {} thread(s)", packages.len(), thread_count);
        let entries = pool
            .install(|| {
                self.progress.track_parallel(
                    &packages,
                    |package| package.origin_path.clone(),
                    |package| {
                        let objects = inspector.inspect_package(&package.origin_path)?;
                        PackageManifest::new(package.clone(), objects)
                    },
                )
            })
            .with_context(|| format!("Failed to inspect module {}", module.module_path))?;

        let mut manifest = BridgeManifest::new(&module.module_path);
        manifest.packages = entries;

        let storage = ManifestStorage::new(self.options.manifest_path());
        if storage.exists() {
            debug!("Overwriting {}", storage.path().display());
        }
        storage.save(&manifest)?;

        let stats = manifest.stats();
        info!(
            "Manifest complete: {} package(s), {} struct(s), {} interface(s), {} function(s)",
            stats.packages, stats.structs, stats.interfaces, stats.functions
        );

        Ok(BuildReport {
            manifest,
            manifest_path: storage.path().to_path_buf(),
        })
    }
}

/// Keep the first entry per origin path.
///
/// The scanner reports every exported file, so a package with several
/// exported files shows up more than once.
pub fn dedupe_packages(packages: Vec<ExportedPackage>) -> Vec<ExportedPackage> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut unique = Vec::with_capacity(packages.len());

    for package in packages {
        match seen.get(&package.origin_path) {
            Some(bridge_path) if *bridge_path != package.bridge_path => warn!(
                "Package {} is exported as both {} and {}, keeping {}",
                package.origin_path, bridge_path, package.bridge_path, bridge_path
            ),
            Some(_) => debug!("Package {} already exported", package.origin_path),
            None => {
                seen.insert(package.origin_path.clone(), package.bridge_path.clone());
                unique.push(package);
            }
        }
    }

    unique
}
