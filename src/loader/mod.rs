//! Loading packages: sources, syntax trees and type information.

mod module_loader;

use std::fmt;
use std::path::PathBuf;

use crate::error::Result;
use crate::syntax::ast::{File, Pos};
use crate::typing::TypesInfo;

pub use module_loader::ModuleLoader;

/// A problem reported while loading a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// `file:line:column`, or empty when not tied to a file
    pub location: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.location, self.message)
        }
    }
}

/// One parsed source file of a package
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub source: String,
    pub syntax: File,
}

impl SourceFile {
    /// `path:line:column` of a byte offset
    pub fn location(&self, offset: usize) -> String {
        let before = &self.source[..offset.min(self.source.len())];
        let line = before.matches('\n').count() + 1;
        let column = before.len() - before.rfind('\n').map(|i| i + 1).unwrap_or(0) + 1;
        format!("{}:{}:{}", self.path.display(), line, column)
    }
}

/// A loaded package
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Declared package name
    pub name: String,

    /// Import path
    pub path: String,

    /// Source files in load order, non-test files only
    pub files: Vec<SourceFile>,

    /// Objects of every top-level declaration
    pub info: TypesInfo,

    /// Everything that went wrong; empty for a healthy package
    pub errors: Vec<Diagnostic>,
}

impl Package {
    /// A package that could not be loaded at all
    pub fn broken(path: impl Into<String>, error: Diagnostic) -> Self {
        Self {
            path: path.into(),
            errors: vec![error],
            ..Self::default()
        }
    }

    /// Syntax trees in load order
    pub fn syntax(&self) -> impl Iterator<Item = &File> {
        self.files.iter().map(|f| &f.syntax)
    }

    pub fn location(&self, pos: Pos) -> String {
        self.files
            .get(pos.file)
            .map(|f| f.location(pos.offset))
            .unwrap_or_default()
    }
}

/// Loads the syntax and types of the package behind an import path
pub trait PackageLoader: Send + Sync {
    /// Load the package at `import_path`, excluding test files.
    ///
    /// Problems with the package itself are reported through
    /// [`Package::errors`]; `Err` is kept for failures of the loader.
    fn load(&self, import_path: &str) -> Result<Vec<Package>>;
}
