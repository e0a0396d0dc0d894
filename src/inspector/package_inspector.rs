use std::collections::{BTreeMap, HashMap};

use log::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::inspector::types::*;
use crate::loader::{Package, PackageLoader};
use crate::syntax::ast::{
    Decl, DeclKind, Expr, ExprKind, File, FuncDecl, GenDecl, InterfaceElem, LitKind, Spec, TypeExpr, TypeSpec, ValueSpec,
};
use crate::syntax::comments::CommentGroup;
use crate::typing::{Field, InterfaceType, Object, Signature, Type};

/// Qualifier go/types puts in front of the type of untyped constants
const UNTYPED_PREFIX: &str = "untyped ";

/// Structural kind of a named type's underlying type
enum StructuralKind<'t> {
    Struct(&'t [Field]),
    Interface(&'t InterfaceType),
    Other(&'t Type),
}

impl<'t> StructuralKind<'t> {
    fn of(underlying: &'t Type) -> Self {
        match underlying {
            Type::Struct(fields) => StructuralKind::Struct(fields),
            Type::Interface(interface) => StructuralKind::Interface(interface),
            other => StructuralKind::Other(other),
        }
    }
}

/// Package inspector producing the exported surface of a package
pub struct PackageInspector<'a> {
    /// Source of syntax and type information
    loader: &'a dyn PackageLoader,
}

impl<'a> PackageInspector<'a> {
    pub fn new(loader: &'a dyn PackageLoader) -> Self {
        Self { loader }
    }

    /// Load the package at `import_path` and collect its exported declarations
    pub fn inspect_package(&self, import_path: &str) -> Result<ExportedObjects> {
        info!("Inspecting package {}", import_path);

        let packages = self.loader.load(import_path)?;

        let diagnostics: Vec<_> = packages.iter().flat_map(|p| p.errors.iter()).collect();
        for diagnostic in &diagnostics {
            error!("{}", diagnostic);
        }
        if let Some(first) = diagnostics.first() {
            return Err(Error::load(
                import_path,
                format!("package contained {} error(s), first: {}", diagnostics.len(), first),
            ));
        }

        let Some(package) = packages.first() else {
            return Err(Error::load(import_path, "no packages found"));
        };
        debug!("Inspecting {} ({}) with {} file(s)", package.name, package.path, package.files.len());

        let mut walk = DeclarationWalk::new(package);
        for file in package.syntax() {
            walk.inspect_file(file)?;
        }
        let objects = walk.finish();

        info!("Package {} exports {} declaration(s)", import_path, objects.len());
        Ok(objects)
    }
}

/// Inspect one package with the given loader
pub fn inspect_package(loader: &dyn PackageLoader, import_path: &str) -> Result<ExportedObjects> {
    PackageInspector::new(loader).inspect_package(import_path)
}

/// State of the walk over one package's declarations
struct DeclarationWalk<'p> {
    package: &'p Package,
    objects: ExportedObjects,

    /// Methods waiting for their struct, by receiver base type name
    methods: BTreeMap<String, Vec<ExportedRoutine>>,

    /// `type A = B` declarations naming a local type, `A` to `B`
    aliases: HashMap<String, String>,
}

impl<'p> DeclarationWalk<'p> {
    fn new(package: &'p Package) -> Self {
        Self {
            package,
            objects: ExportedObjects::default(),
            methods: BTreeMap::new(),
            aliases: local_aliases(package),
        }
    }

    /// Type a receiver written as `name` actually belongs to
    fn receiver_type<'n>(&'n self, mut name: &'n str) -> &'n str {
        // Bounded walk, alias cycles are rejected by the checker
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(name) {
                Some(target) => name = target,
                None => break,
            }
        }
        name
    }

    fn inspect_file(&mut self, file: &File) -> Result<()> {
        for decl in &file.decls {
            match decl {
                Decl::Func(func) => self.inspect_func(func),
                Decl::Gen(gen_decl) => {
                    for spec in &gen_decl.specs {
                        match spec {
                            Spec::Value(value) => self.inspect_value_spec(gen_decl, value)?,
                            Spec::Type(spec) => self.inspect_type_spec(gen_decl, spec),
                            Spec::Import(_) => {}
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn inspect_func(&mut self, func: &FuncDecl) {
        if !func.name.is_exported() {
            return;
        }

        let Some(Object::Func { signature, .. }) = self.package.info.object_of(&func.name) else {
            debug!("No signature for {}, skipping", func.name.name);
            return;
        };
        let routine = routine(&func.name.name, signature, doc_text(func.doc.as_ref()));

        match (&func.recv, func.receiver_base()) {
            (None, _) => self.objects.functions.push(routine),
            (Some(_), Some(receiver)) => {
                let receiver = self.receiver_type(&receiver.name).to_string();
                trace!("Queueing method {}.{}", receiver, routine.name);
                self.methods.entry(receiver).or_default().push(routine);
            }
            (Some(_), None) => debug!("Unsupported receiver on method {}, skipping", func.name.name),
        }
    }

    fn inspect_value_spec(&mut self, gen_decl: &GenDecl, spec: &ValueSpec) -> Result<()> {
        for (index, name) in spec.names.iter().enumerate() {
            if !name.is_exported() {
                continue;
            }

            let Some(object) = self.package.info.object_of(name) else {
                warn!("Cannot determine the type of {}, leaving it out", name.name);
                continue;
            };

            let type_name = object.ty().to_string();
            let type_name = type_name.strip_prefix(UNTYPED_PREFIX).unwrap_or(&type_name).to_string();

            let value = match spec.values.get(index) {
                Some(value) => literal_value(value),
                // `var X T` declares a zero value
                None if gen_decl.kind == DeclKind::Var && spec.values.is_empty() && spec.ty.is_some() => {
                    String::new()
                }
                None => {
                    return Err(Error::StructuralMismatch {
                        name: name.name.clone(),
                        index,
                        values: spec.values.len(),
                    });
                }
            };

            let doc = doc_text(spec_doc(gen_decl, spec.doc.as_ref()));
            let name = name.name.clone();

            match gen_decl.kind {
                DeclKind::Const => self.objects.constants.push(ExportedConstant {
                    name,
                    type_name,
                    value,
                    doc,
                }),
                DeclKind::Var => self.objects.variables.push(ExportedVariable {
                    name,
                    type_name,
                    value,
                    doc,
                }),
                DeclKind::Import | DeclKind::Type => {}
            }
        }
        Ok(())
    }

    fn inspect_type_spec(&mut self, gen_decl: &GenDecl, spec: &TypeSpec) {
        if !spec.name.is_exported() {
            return;
        }

        let Some(Object::TypeName { underlying, .. }) = self.package.info.object_of(&spec.name) else {
            debug!("No type information for {}, skipping", spec.name.name);
            return;
        };

        let name = spec.name.name.clone();
        let doc = doc_text(spec_doc(gen_decl, spec.doc.as_ref()));

        match StructuralKind::of(underlying) {
            StructuralKind::Struct(fields) => self.objects.structs.push(ExportedStruct {
                name,
                fields: fields
                    .iter()
                    .map(|field| ExportedField {
                        name: field.name.clone(),
                        type_name: field.ty.to_string(),
                    })
                    .collect(),
                methods: Vec::new(),
                doc,
            }),
            StructuralKind::Interface(interface) => self.objects.interfaces.push(ExportedInterface {
                name,
                methods: interface
                    .methods
                    .iter()
                    .map(|method| {
                        let doc = doc_text(interface_method_doc(spec, &method.name));
                        routine(&method.name, &method.signature, doc)
                    })
                    .collect(),
                doc,
            }),
            StructuralKind::Other(ty) => self.objects.types.push(ExportedType {
                name,
                underlying_type_name: ty.to_string(),
                doc,
            }),
        }
    }

    /// Attach the queued methods to their structs
    fn finish(mut self) -> ExportedObjects {
        for (receiver, methods) in std::mem::take(&mut self.methods) {
            match self.objects.find_struct_mut(&receiver) {
                Some(exported_struct) => exported_struct.methods.extend(methods),
                None => debug!(
                    "Dropping {} method(s) of {}: not an exported struct",
                    methods.len(),
                    receiver
                ),
            }
        }
        self.objects
    }
}

fn routine(name: &str, signature: &Signature, doc: Option<String>) -> ExportedRoutine {
    ExportedRoutine {
        name: name.to_string(),
        arguments: signature
            .params
            .iter()
            .map(|param| ExportedArgument {
                name: param.name.clone(),
                type_name: param.ty.to_string(),
            })
            .collect(),
        return_types: signature.results.iter().map(|result| result.ty.to_string()).collect(),
        doc,
    }
}

/// Aliases whose right-hand side is a plain local type name
fn local_aliases(package: &Package) -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    for file in package.syntax() {
        for decl in &file.decls {
            let Decl::Gen(gen_decl) = decl else {
                continue;
            };
            for spec in &gen_decl.specs {
                let Spec::Type(spec) = spec else {
                    continue;
                };
                if let (true, Some(target)) = (spec.alias, local_type_name(&spec.ty)) {
                    aliases.insert(spec.name.name.clone(), target.to_string());
                }
            }
        }
    }
    aliases
}

fn local_type_name(ty: &TypeExpr) -> Option<&str> {
    match ty {
        TypeExpr::Name { package: None, name, .. } => Some(&name.name),
        TypeExpr::Paren(inner) => local_type_name(inner),
        _ => None,
    }
}

/// Doc of a spec, or of its declaration when written without parentheses
fn spec_doc<'d>(gen_decl: &'d GenDecl, doc: Option<&'d CommentGroup>) -> Option<&'d CommentGroup> {
    match doc {
        Some(doc) => Some(doc),
        None if !gen_decl.grouped => gen_decl.doc.as_ref(),
        None => None,
    }
}

fn interface_method_doc<'s>(spec: &'s TypeSpec, method: &str) -> Option<&'s CommentGroup> {
    let TypeExpr::Interface(elems) = &spec.ty else {
        return None;
    };
    elems.iter().find_map(|elem| match elem {
        InterfaceElem::Method { doc, name, .. } if name.name == method => doc.as_ref(),
        _ => None,
    })
}

fn doc_text(doc: Option<&CommentGroup>) -> Option<String> {
    let text = doc?.text();
    let text = text.trim_end_matches('\n');
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn literal_value(value: &Expr) -> String {
    match &value.kind {
        ExprKind::BasicLit(LitKind::String, text) if text.len() >= 2 => text[1..text.len() - 1].to_string(),
        _ => value.text.clone(),
    }
}
