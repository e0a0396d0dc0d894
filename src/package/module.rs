use std::path::Path;
use log::{info, warn};

use crate::error::{Error, Result};
use crate::package::types::ModuleDescriptor;
use crate::vfs::FileSystem;

/// File name of the module descriptor
pub const GO_MOD_FILE: &str = "go.mod";

/// Prefix the first descriptor line must carry
pub const GO_MOD_START: &str = "module ";

/// Check that `path` is a module root and read its module path.
///
/// The descriptor must exist and its first line must start with `module `.
pub fn check_input_folder(fs: &dyn FileSystem, path: &Path) -> Result<ModuleDescriptor> {
    info!("Checking input folder {}", path.display());

    let descriptor_path = path.join(GO_MOD_FILE);
    let content = fs.read_to_string(&descriptor_path)?;
    let first_line = content.lines().next().unwrap_or_default();

    let Some(module_path) = first_line.strip_prefix(GO_MOD_START) else {
        warn!("Input folder doesn't have a valid {}", GO_MOD_FILE);
        return Err(Error::InvalidModule {
            path: path.to_path_buf(),
            reason: format!("{} does not start with a module declaration", GO_MOD_FILE),
        });
    };

    Ok(ModuleDescriptor {
        root: path.to_path_buf(),
        module_path: module_path.trim().trim_matches('"').to_string(),
    })
}
