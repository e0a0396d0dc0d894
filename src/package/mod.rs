pub mod types;
pub mod module;
pub mod scanner;

// Re-export the main API for easier access
pub use types::{ExportedPackage, ModuleDescriptor, SourceHeader};
pub use module::check_input_folder;
pub use scanner::{scan_module, ModuleScanner};
