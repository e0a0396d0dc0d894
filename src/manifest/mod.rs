pub mod storage;
pub mod types;

// Re-export main types for easier access
pub use storage::{ManifestStorage, MANIFEST_FILE};
pub use types::{BridgeManifest, ManifestStats, PackageManifest};
