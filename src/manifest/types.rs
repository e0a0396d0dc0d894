use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::inspector::ExportedObjects;
use crate::package::ExportedPackage;
use crate::utils::hash_utils;

/// Exported surface of one package together with where it is exported to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Origin and bridge paths of the package
    pub package: ExportedPackage,

    /// Declarations found by the inspector
    pub objects: ExportedObjects,

    /// SHA-256 of the serialized objects
    pub fingerprint: String,
}

impl PackageManifest {
    /// Create a manifest entry, fingerprinting the objects
    pub fn new(package: ExportedPackage, objects: ExportedObjects) -> Result<Self> {
        let fingerprint = fingerprint(&objects)?;
        Ok(Self {
            package,
            objects,
            fingerprint,
        })
    }
}

/// SHA-256 fingerprint of a serializable value, keeping the whole error chain
pub(crate) fn fingerprint<T: Serialize>(value: &T) -> Result<String> {
    hash_utils::hash_serialized(value).map_err(|e| Error::Manifest(format!("{:#}", e)))
}

/// Export manifest of a whole module, input of the binding generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeManifest {
    /// Module path from `go.mod`
    pub module: String,

    /// When this manifest was generated
    pub generated_at: DateTime<Utc>,

    /// Version of the tool that generated it
    pub version: String,

    /// One entry per exported package, in scan order
    pub packages: Vec<PackageManifest>,
}

/// Totals over all packages of a manifest
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestStats {
    pub packages: usize,
    pub constants: usize,
    pub variables: usize,
    pub types: usize,
    pub structs: usize,
    pub methods: usize,
    pub interfaces: usize,
    pub functions: usize,
}

impl BridgeManifest {
    /// Create an empty manifest for `module`
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            packages: Vec::new(),
        }
    }

    /// Entry for the package with the given origin path
    pub fn find_package(&self, origin_path: &str) -> Option<&PackageManifest> {
        self.packages.iter().find(|p| p.package.origin_path == origin_path)
    }

    /// Count declarations per kind
    pub fn stats(&self) -> ManifestStats {
        let mut stats = ManifestStats {
            packages: self.packages.len(),
            ..ManifestStats::default()
        };

        for entry in &self.packages {
            let objects = &entry.objects;
            stats.constants += objects.constants.len();
            stats.variables += objects.variables.len();
            stats.types += objects.types.len();
            stats.structs += objects.structs.len();
            stats.methods += objects.structs.iter().map(|s| s.methods.len()).sum::<usize>();
            stats.interfaces += objects.interfaces.len();
            stats.functions += objects.functions.len();
        }

        stats
    }

    /// Pretty printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Manifest(e.to_string()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| Error::Manifest(e.to_string()))
    }
}
