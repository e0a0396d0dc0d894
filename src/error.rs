use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the scanner and the inspector
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem read or traversal failure while scanning a module
    #[error("error reading {}: {source}", path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The package loader reported diagnostics, found nothing, or the path is unknown
    #[error("error inspecting package {import_path}: {reason}")]
    Load {
        /// Import path handed to the loader
        import_path: String,
        /// Summary of what went wrong
        reason: String,
    },

    /// An exported value name has no initializer at its position
    #[error(
        "value '{name}' at position {index} has no matching initializer ({values} value(s) declared)"
    )]
    StructuralMismatch {
        /// Exported name that could not be matched
        name: String,
        /// Position of the name in its value spec
        index: usize,
        /// Number of initializers the value spec carries
        values: usize,
    },

    /// The scan root is not a module root
    #[error("invalid module at {}: {reason}", path.display())]
    InvalidModule {
        /// Directory that was checked
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },

    /// Manifest could not be serialized or deserialized
    #[error("manifest error: {0}")]
    Manifest(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn load(import_path: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Load {
            import_path: import_path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
