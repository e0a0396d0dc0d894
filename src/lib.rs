pub mod build;
pub mod cli;
pub mod error;
pub mod inspector;
pub mod loader;
pub mod manifest;
pub mod package;
pub mod syntax;
pub mod typing;
pub mod utils;
pub mod vfs;

#[cfg(test)]
mod tests;

// Re-export main types and functions for easier access
pub use error::{Error, Result};

pub use package::{check_input_folder, scan_module, ExportedPackage, ModuleDescriptor, ModuleScanner};

pub use inspector::{inspect_package, ExportedObjects, PackageInspector};
pub use loader::{ModuleLoader, PackageLoader};

pub use manifest::{BridgeManifest, ManifestStorage, PackageManifest};
pub use build::{BuildOptions, BuildReport, Builder};

pub use vfs::{FileSystem, MemoryFileSystem, OsFileSystem};

// Re-export utility functions
pub use utils::file_utils;
