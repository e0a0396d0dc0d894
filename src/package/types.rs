use std::path::PathBuf;
use serde::{Serialize, Deserialize};

/// One exportable package found while scanning a module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPackage {
    /// Fully qualified Go import path of the package
    pub origin_path: String,

    /// Dotted path under which the binding is importable from Python
    pub bridge_path: String,

    /// Declared package identifier, when it differs from the last origin path segment
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub alias_name: String,
}

/// A module root that passed the descriptor check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    /// Directory holding the descriptor
    pub root: PathBuf,

    /// Module path declared on the first descriptor line
    pub module_path: String,
}

/// What the scanner learned from one source file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceHeader {
    /// Identifier from the package clause, if one was found
    pub package_name: Option<String>,

    /// Remainder of the export directive line, if the file carries one
    pub bridge_path: Option<String>,
}
