//! Type checking of package-level Go declarations.
//!
//! The checker resolves every top-level identifier of a package to an
//! [`Object`] carrying its type. Function bodies are never looked at. The
//! [`Importer`] decides how much is known about imported packages: members
//! of a package it has no scope for are opaque, and named types of other
//! packages are always their own underlying type.

pub mod checker;
pub mod types;
mod universe;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::syntax::ast::{Ident, Pos};

pub use checker::Checker;
pub use types::{BasicKind, Field, InterfaceType, Method, NamedType, Signature, Type, Var};

/// A declared package-level entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Const { name: String, ty: Type },
    Var { name: String, ty: Type },
    TypeName { name: String, ty: Type, underlying: Type },
    Func { name: String, signature: Signature },
}

impl Object {
    pub fn name(&self) -> &str {
        match self {
            Object::Const { name, .. }
            | Object::Var { name, .. }
            | Object::TypeName { name, .. }
            | Object::Func { name, .. } => name,
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Object::Const { ty, .. } | Object::Var { ty, .. } | Object::TypeName { ty, .. } => ty.clone(),
            Object::Func { signature, .. } => Type::Signature(signature.clone()),
        }
    }
}

/// Results of checking one package
#[derive(Debug, Clone, Default)]
pub struct TypesInfo {
    /// Objects keyed by the position of their defining identifier
    pub defs: HashMap<Pos, Object>,
}

impl TypesInfo {
    pub fn object_of(&self, ident: &Ident) -> Option<&Object> {
        self.defs.get(&ident.pos)
    }
}

/// A problem found while checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub pos: Pos,
    pub message: String,
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Exported package-level objects of one package, by name
pub type PackageScope = HashMap<String, Object>;

/// Resolves imported packages for the checker
pub trait Importer {
    /// `None` when the path cannot be imported at all
    fn package_name(&self, import_path: &str) -> Option<String>;

    /// Exported objects of the package at `import_path`.
    ///
    /// `None` when its declarations are not available; the checker then
    /// falls back to a small table of well-known standard library members.
    fn package_scope(&self, _import_path: &str) -> Option<Arc<PackageScope>> {
        None
    }
}

/// Package name conventionally declared by the package at `import_path`.
///
/// Takes the last path element, skipping a trailing major version element
/// (`/v2`), a `.vN` suffix (`gopkg.in/yaml.v3`) and a `go-` prefix.
pub fn guess_package_name(import_path: &str) -> String {
    let mut segments = import_path.rsplit('/');
    let mut last = segments.next().unwrap_or(import_path);

    let is_major_version = |s: &str| s.len() > 1 && s.starts_with('v') && s[1..].bytes().all(|b| b.is_ascii_digit());
    if is_major_version(last) {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }

    let last = match last.rfind(".v") {
        Some(dot) if last[dot + 2..].bytes().all(|b| b.is_ascii_digit()) && dot + 2 < last.len() => &last[..dot],
        _ => last,
    };
    let last = last.strip_prefix("go-").unwrap_or(last);

    last.replace(['-', '.'], "_")
}
