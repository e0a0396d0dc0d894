pub mod types;
mod package_inspector;

// Re-export the main API for easier access
pub use package_inspector::{inspect_package, PackageInspector};
pub use types::{
    ExportedArgument, ExportedConstant, ExportedField, ExportedInterface, ExportedObjects, ExportedRoutine,
    ExportedStruct, ExportedType, ExportedVariable,
};
