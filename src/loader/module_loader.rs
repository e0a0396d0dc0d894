use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, trace};

use crate::error::Result;
use crate::loader::{Diagnostic, Package, PackageLoader, SourceFile};
use crate::package::scanner::{parse_package_name, FileCollector};
use crate::syntax::ast::{Decl, Ident, Spec};
use crate::syntax::parse_file;
use crate::typing::{guess_package_name, Checker, Importer, PackageScope};
use crate::vfs::FileSystem;

/// Loads packages of a single Go module from a file system.
///
/// Imports from outside the module are never read; their package names
/// follow the usual last-path-element convention. Imports from inside the
/// module are checked on demand so that values initialized from them get
/// their types.
pub struct ModuleLoader<'a> {
    fs: &'a dyn FileSystem,
    root: PathBuf,
    module_path: String,
    file_collector: FileCollector,

    /// Module-local packages already checked as imports
    imported: Mutex<HashMap<String, Imported>>,
}

/// Outcome of checking a module-local package on behalf of an importer
#[derive(Debug, Clone)]
struct Imported {
    scope: Arc<PackageScope>,

    /// First problem of the package, if it has any
    problem: Option<String>,
}

impl<'a> ModuleLoader<'a> {
    pub fn new(fs: &'a dyn FileSystem, root: impl Into<PathBuf>, module_path: impl Into<String>) -> Self {
        Self {
            fs,
            root: root.into(),
            module_path: module_path.into(),
            file_collector: FileCollector::new(),
            imported: Mutex::new(HashMap::new()),
        }
    }

    /// Directory of a module-local import path
    fn package_dir(&self, import_path: &str) -> Option<PathBuf> {
        if import_path == self.module_path {
            return Some(self.root.clone());
        }
        let relative = import_path.strip_prefix(&self.module_path)?.strip_prefix('/')?;
        Some(relative.split('/').fold(self.root.clone(), |dir, segment| dir.join(segment)))
    }

    /// Load and check the package in `dir`; `importers` are the packages
    /// currently being checked that led to this one, outermost first
    fn load_package(&self, import_path: &str, dir: &Path, importers: &[String]) -> Package {
        let files = match self.file_collector.collect_package_files(self.fs, dir) {
            Ok(files) => files,
            Err(e) => return Package::broken(import_path, Diagnostic::new("", e.to_string())),
        };
        if files.is_empty() {
            return Package::broken(
                import_path,
                Diagnostic::new("", format!("no Go files in {}", dir.display())),
            );
        }

        let mut errors = Vec::new();
        let mut sources = Vec::new();
        let mut syntax = Vec::new();

        for path in files {
            let source = match self.fs.read_to_string(&path) {
                Ok(source) => source,
                Err(e) => {
                    errors.push(Diagnostic::new(path.display().to_string(), e.to_string()));
                    continue;
                }
            };

            match parse_file(syntax.len(), &source) {
                Ok(file) => {
                    trace!("Parsed {}", path.display());
                    syntax.push(file);
                    sources.push((path, source));
                }
                Err(e) => {
                    let location = format!("{}:{}:{}", path.display(), e.line, e.column);
                    errors.push(Diagnostic::new(location, e.message));
                }
            }
        }

        // All files of a directory must agree on the package name
        let name = syntax.first().map(|f| f.package.name.clone()).unwrap_or_default();
        for (file, (path, _)) in syntax.iter().zip(&sources).skip(1) {
            if file.package.name != name {
                errors.push(Diagnostic::new(
                    dir.display().to_string(),
                    format!(
                        "found packages {} and {} ({}) in {}",
                        name,
                        file.package.name,
                        path.display(),
                        dir.display()
                    ),
                ));
            }
        }

        let mut chain = importers.to_vec();
        chain.push(import_path.to_string());
        let importer = ImportChain {
            loader: self,
            chain,
            problems: RefCell::new(BTreeSet::new()),
        };
        let (info, type_errors) = Checker::new(import_path, &syntax, &importer).check();

        let location = dir.display().to_string();
        errors.extend(
            importer
                .problems
                .into_inner()
                .into_iter()
                .map(|problem| Diagnostic::new(location.clone(), problem)),
        );

        let files: Vec<SourceFile> = sources
            .into_iter()
            .zip(syntax)
            .map(|((path, source), syntax)| SourceFile { path, source, syntax })
            .collect();

        let mut package = Package {
            name,
            path: import_path.to_string(),
            files,
            info,
            errors,
        };

        let type_errors: Vec<Diagnostic> = type_errors
            .into_iter()
            .map(|e| Diagnostic::new(package.location(e.pos), e.message))
            .collect();
        package.errors.extend(type_errors);

        debug!(
            "Loaded {} ({} file(s), {} error(s))",
            import_path,
            package.files.len(),
            package.errors.len()
        );
        package
    }
}

impl PackageLoader for ModuleLoader<'_> {
    fn load(&self, import_path: &str) -> Result<Vec<Package>> {
        let Some(dir) = self.package_dir(import_path) else {
            let reason = format!("package {} is not in module {}", import_path, self.module_path);
            return Ok(vec![Package::broken(import_path, Diagnostic::new("", reason))]);
        };

        if !self.fs.is_dir(&dir) {
            let reason = format!("cannot find package {} in {}", import_path, dir.display());
            return Ok(vec![Package::broken(import_path, Diagnostic::new("", reason))]);
        }

        Ok(vec![self.load_package(import_path, &dir, &[])])
    }
}

impl ModuleLoader<'_> {
    /// Check a module-local package as an import, at most once per path
    fn import(&self, import_path: &str, importers: &[String]) -> Option<Imported> {
        let dir = self.package_dir(import_path)?;

        let cached = self
            .imported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(import_path)
            .cloned();
        if let Some(imported) = cached {
            return Some(imported);
        }

        if !self.fs.is_dir(&dir) {
            return None;
        }

        debug!("Checking imported package {}", import_path);
        let package = self.load_package(import_path, &dir, importers);
        let imported = Imported {
            scope: Arc::new(exported_scope(&package)),
            problem: package.errors.first().map(|e| e.to_string()),
        };

        self.imported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(import_path.to_string(), imported.clone());
        Some(imported)
    }
}

/// Exported package-level objects of a checked package; methods are left out
fn exported_scope(package: &Package) -> PackageScope {
    let mut scope = PackageScope::new();

    for file in package.syntax() {
        for decl in &file.decls {
            let names: Vec<&Ident> = match decl {
                Decl::Func(func) if func.recv.is_none() => vec![&func.name],
                Decl::Func(_) => Vec::new(),
                Decl::Gen(gen_decl) => gen_decl
                    .specs
                    .iter()
                    .flat_map(|spec| match spec {
                        Spec::Value(value) => value.names.iter().collect(),
                        Spec::Type(spec) => vec![&spec.name],
                        Spec::Import(_) => Vec::new(),
                    })
                    .collect(),
            };

            for name in names.into_iter().filter(|name| name.is_exported()) {
                if let Some(object) = package.info.object_of(name) {
                    scope.entry(name.name.clone()).or_insert_with(|| object.clone());
                }
            }
        }
    }
    scope
}

/// Importer handed to the checker of one package.
///
/// Keeps the chain of packages being checked so that an import cycle ends
/// in an opaque package instead of endless recursion, and collects what
/// went wrong with the imports.
struct ImportChain<'l, 'a> {
    loader: &'l ModuleLoader<'a>,

    /// Import paths being checked, outermost first, this package last
    chain: Vec<String>,
    problems: RefCell<BTreeSet<String>>,
}

impl Importer for ImportChain<'_, '_> {
    fn package_name(&self, import_path: &str) -> Option<String> {
        self.loader.package_name(import_path)
    }

    fn package_scope(&self, import_path: &str) -> Option<Arc<PackageScope>> {
        if let Some(start) = self.chain.iter().position(|path| path == import_path) {
            let mut cycle = self.chain[start..].to_vec();
            cycle.push(import_path.to_string());
            self.problems
                .borrow_mut()
                .insert(format!("import cycle not allowed: {}", cycle.join(" -> ")));
            return None;
        }

        let imported = self.loader.import(import_path, &self.chain)?;
        if let Some(problem) = &imported.problem {
            self.problems
                .borrow_mut()
                .insert(format!("could not import {} ({})", import_path, problem));
        }
        Some(imported.scope)
    }
}

impl Importer for ModuleLoader<'_> {
    fn package_name(&self, import_path: &str) -> Option<String> {
        let Some(dir) = self.package_dir(import_path) else {
            return Some(guess_package_name(import_path));
        };

        let files = self.file_collector.collect_package_files(self.fs, &dir).ok()?;
        files
            .iter()
            .filter_map(|path| self.fs.read_to_string(path).ok())
            .find_map(|content| parse_package_name(&content))
    }
}
