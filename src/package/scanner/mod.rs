mod file_collector;
mod header;

use std::path::{Component, Path};
use log::{debug, info};

use crate::error::Result;
use crate::package::types::ExportedPackage;
use crate::vfs::FileSystem;

// Re-export from submodules
pub use file_collector::{FileCollector, GO_TEST_SUFFIX};
pub use header::{parse_header, parse_package_name, GO_EXPORTED_DIRECTIVE};

/// Identifier of executable packages, which are never aliased
pub const MAIN_PACKAGE: &str = "main";

/// Module scanner deciding which packages opt into export
#[derive(Debug, Default)]
pub struct ModuleScanner {
    /// File collector for finding Go sources
    file_collector: FileCollector,
}

impl ModuleScanner {
    /// Create a new module scanner
    pub fn new() -> Self {
        Self {
            file_collector: FileCollector::new(),
        }
    }

    /// Scan the module rooted at `root` and return its exported packages.
    ///
    /// Every candidate file carrying the export directive yields one entry, in
    /// lexical tree order. Any read or traversal failure aborts the scan.
    pub fn scan_module(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
        module_name: &str,
    ) -> Result<Vec<ExportedPackage>> {
        info!("Scanning module {} at {}", module_name, root.display());

        let files = self.file_collector.collect_files(fs, root)?;
        let mut exported_packages = Vec::new();

        for file in files {
            let content = fs.read_to_string(&file)?;
            let header = parse_header(&content);

            let Some(bridge_path) = header.bridge_path else {
                debug!("Not exported: {}", file.display());
                continue;
            };

            debug!("Exported file {} as {}", file.display(), bridge_path);
            let origin_path = go_format_path(root, &file, module_name);
            exported_packages.push(gen_exported_package(
                origin_path,
                bridge_path,
                header.package_name.as_deref().unwrap_or_default(),
            ));
        }

        info!("Found {} exported package(s)", exported_packages.len());
        Ok(exported_packages)
    }
}

/// Scan a module with the default scanner
pub fn scan_module(fs: &dyn FileSystem, root: &Path, module_name: &str) -> Result<Vec<ExportedPackage>> {
    ModuleScanner::new().scan_module(fs, root, module_name)
}

/// Import path of the directory holding `file`, below `module_name`
fn go_format_path(root: &Path, file: &Path, module_name: &str) -> String {
    let mut segments = vec![module_name.to_string()];

    let relative_dir = file
        .parent()
        .and_then(|dir| dir.strip_prefix(root).ok())
        .unwrap_or_else(|| Path::new(""));

    for component in relative_dir.components() {
        if let Component::Normal(segment) = component {
            segments.push(segment.to_string_lossy().into_owned());
        }
    }

    segments.join("/")
}

fn gen_exported_package(origin_path: String, bridge_path: String, package_name: &str) -> ExportedPackage {
    let mut exported_package = ExportedPackage {
        origin_path,
        bridge_path,
        alias_name: String::new(),
    };

    if package_name.is_empty() || package_name == MAIN_PACKAGE {
        return exported_package;
    }

    let last_segment = exported_package
        .origin_path
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if package_name != last_segment {
        exported_package.alias_name = package_name.to_string();
    }

    exported_package
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn origin_path_drops_root_and_file_name() {
        let path = go_format_path(Path::new("root"), Path::new("root/a/b/file.go"), "example.com");
        assert_eq!(path, "example.com/a/b");
    }

    #[test]
    fn origin_path_of_root_file_is_module_name() {
        let path = go_format_path(Path::new("root"), Path::new("root/main.go"), "example.com");
        assert_eq!(path, "example.com");
    }

    #[test]
    fn main_package_is_never_aliased() {
        let package = gen_exported_package("example.com/cmd".into(), "m.cmd".into(), "main");
        assert_eq!(package.alias_name, "");
    }

    #[test]
    fn differing_identifier_is_aliased() {
        let package = gen_exported_package("example.com/dir".into(), "m.bacon".into(), "bacon");
        assert_eq!(package.alias_name, "bacon");
    }
}
