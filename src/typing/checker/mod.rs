//! Package-level type checker.

mod values;

use std::collections::{HashMap, HashSet};

use log::trace;

use crate::syntax::ast::{
    Decl, DeclKind, File, FuncDecl, FuncType, Ident, InterfaceElem, Pos, Spec, TypeExpr, TypeParam, TypeSpec, ValueSpec,
};
use crate::typing::types::{Field, InterfaceType, Method, Signature, Term, Type, Var};
use crate::typing::universe;
use crate::typing::{BasicKind, Importer, NamedType, Object, TypeError, TypesInfo};

/// A package-scope declaration
#[derive(Debug, Clone, Copy)]
enum Entity<'a> {
    Const {
        file: usize,
        spec: &'a ValueSpec,
        index: usize,
        /// Spec supplying type and initializers, an earlier one under implicit repetition
        init: &'a ValueSpec,
    },
    Var {
        file: usize,
        spec: &'a ValueSpec,
        index: usize,
    },
    Type {
        file: usize,
        spec: &'a TypeSpec,
    },
    Func {
        file: usize,
        decl: &'a FuncDecl,
    },
}

impl<'a> Entity<'a> {
    fn pos(&self) -> Pos {
        match self {
            Entity::Const { spec, index, .. } | Entity::Var { spec, index, .. } => spec.names[*index].pos,
            Entity::Type { spec, .. } => spec.name.pos,
            Entity::Func { decl, .. } => decl.name.pos,
        }
    }
}

#[derive(Debug, Default)]
struct FileImports {
    /// Local package name to import path
    names: HashMap<String, String>,

    /// A `.` import makes unresolved names unknowable
    dot: bool,
}

/// Checks the declarations of one package.
///
/// ```ignore
/// let (info, errors) = Checker::new("example.com/m/pkg", &files, &importer).check();
/// ```
pub struct Checker<'a> {
    package_path: &'a str,
    files: &'a [File],
    importer: &'a dyn Importer,
    scope: HashMap<&'a str, Entity<'a>>,
    imports: Vec<FileImports>,
    underlying_cache: HashMap<String, Type>,
    resolving: HashSet<String>,
    value_cache: HashMap<String, Option<Type>>,
    evaluating: HashSet<String>,
    errors: Vec<TypeError>,
    reported: HashSet<(Pos, String)>,
}

impl<'a> Checker<'a> {
    pub fn new(package_path: &'a str, files: &'a [File], importer: &'a dyn Importer) -> Self {
        Self {
            package_path,
            files,
            importer,
            scope: HashMap::new(),
            imports: Vec::new(),
            underlying_cache: HashMap::new(),
            resolving: HashSet::new(),
            value_cache: HashMap::new(),
            evaluating: HashSet::new(),
            errors: Vec::new(),
            reported: HashSet::new(),
        }
    }

    /// Type every top-level declaration; errors come back sorted by position
    pub fn check(mut self) -> (TypesInfo, Vec<TypeError>) {
        self.collect_imports();
        self.collect_scope();

        let mut info = TypesInfo::default();
        let files = self.files;

        for (file_index, file) in files.iter().enumerate() {
            for decl in &file.decls {
                match decl {
                    Decl::Gen(gen_decl) => {
                        for spec in &gen_decl.specs {
                            match spec {
                                Spec::Value(value) => self.check_value_spec(gen_decl.kind, value, &mut info),
                                Spec::Type(spec) => self.check_type_spec(spec, &mut info),
                                Spec::Import(_) => {}
                            }
                        }
                    }
                    Decl::Func(func) => {
                        let signature = self.func_signature(file_index, func);
                        info.defs.insert(
                            func.name.pos,
                            Object::Func {
                                name: func.name.name.clone(),
                                signature,
                            },
                        );
                    }
                }
            }
        }

        trace!(
            "Checked {}: {} object(s), {} error(s)",
            self.package_path,
            info.defs.len(),
            self.errors.len()
        );

        let mut errors = self.errors;
        errors.sort_by_key(|e| e.pos);
        (info, errors)
    }

    fn collect_imports(&mut self) {
        let files = self.files;
        for file in files {
            let mut imports = FileImports::default();
            for import in &file.imports {
                let explicit = import.name.as_ref().map(|n| n.name.as_str());
                match explicit {
                    Some("_") => {}
                    Some(".") => imports.dot = true,
                    Some(name) => {
                        imports.names.insert(name.to_string(), import.path.clone());
                    }
                    None => match self.importer.package_name(&import.path) {
                        Some(name) => {
                            imports.names.insert(name, import.path.clone());
                        }
                        None => self.error(file.package.pos, format!("could not import {}", import.path)),
                    },
                }
            }
            self.imports.push(imports);
        }
    }

    fn collect_scope(&mut self) {
        let files = self.files;
        for (file, syntax) in files.iter().enumerate() {
            for decl in &syntax.decls {
                match decl {
                    Decl::Gen(gen_decl) => {
                        let mut init: Option<&'a ValueSpec> = None;
                        for spec in &gen_decl.specs {
                            match spec {
                                Spec::Value(value) => {
                                    if gen_decl.kind == DeclKind::Const && !value.values.is_empty() {
                                        init = Some(value);
                                    }
                                    for (index, name) in value.names.iter().enumerate() {
                                        let entity = match gen_decl.kind {
                                            DeclKind::Const => Entity::Const {
                                                file,
                                                spec: value,
                                                index,
                                                init: init.unwrap_or(value),
                                            },
                                            _ => Entity::Var {
                                                file,
                                                spec: value,
                                                index,
                                            },
                                        };
                                        self.declare(name, entity);
                                    }
                                }
                                Spec::Type(spec) => self.declare(&spec.name, Entity::Type { file, spec }),
                                Spec::Import(_) => {}
                            }
                        }
                    }
                    Decl::Func(func) => {
                        if func.recv.is_none() && func.name.name != "init" {
                            self.declare(&func.name, Entity::Func { file, decl: func });
                        }
                    }
                }
            }
        }
    }

    fn declare(&mut self, name: &'a Ident, entity: Entity<'a>) {
        if name.is_blank() {
            return;
        }
        if self.scope.contains_key(name.name.as_str()) {
            self.error(name.pos, format!("{} redeclared in this block", name.name));
            return;
        }
        self.scope.insert(name.name.as_str(), entity);
    }

    /// Scope entry for `ident`, only if `ident` is the declaring identifier
    fn declared_by(&self, ident: &Ident) -> Option<Entity<'a>> {
        self.scope
            .get(ident.name.as_str())
            .copied()
            .filter(|entity| entity.pos() == ident.pos)
    }

    fn check_value_spec(&mut self, kind: DeclKind, spec: &ValueSpec, info: &mut TypesInfo) {
        for (index, name) in spec.names.iter().enumerate() {
            if name.is_blank() {
                // Blank names still get their initializers checked
                if let Some(value) = spec.values.get(index) {
                    let file = name.pos.file;
                    self.expr_type(file, value);
                }
                continue;
            }
            if self.declared_by(name).is_none() {
                continue;
            }

            let Some(ty) = self.value_type(&name.name) else {
                continue;
            };
            let object = match kind {
                DeclKind::Const => Object::Const {
                    name: name.name.clone(),
                    ty,
                },
                _ => Object::Var {
                    name: name.name.clone(),
                    ty,
                },
            };
            info.defs.insert(name.pos, object);
        }
    }

    fn check_type_spec(&mut self, spec: &TypeSpec, info: &mut TypesInfo) {
        if self.declared_by(&spec.name).is_none() {
            return;
        }

        let file = spec.name.pos.file;
        let type_params = self.type_param_names(file, &spec.type_params);
        let args = type_params.iter().map(|name| Type::TypeParam(name.clone())).collect();

        let ty = Type::Named(NamedType {
            package: Some(self.package_path.to_string()),
            name: spec.name.name.clone(),
            args,
        });
        let underlying = self.declared_underlying(&spec.name.name);

        info.defs.insert(
            spec.name.pos,
            Object::TypeName {
                name: spec.name.name.clone(),
                ty,
                underlying,
            },
        );
    }

    /// Names of a type parameter list; constraints are resolved for diagnostics
    fn type_param_names(&mut self, file: usize, params: &[TypeParam]) -> Vec<String> {
        let names: Vec<String> = params
            .iter()
            .flat_map(|p| p.names.iter().map(|n| n.name.clone()))
            .collect();
        for param in params {
            self.resolve(file, &param.constraint, &names);
        }
        names
    }

    fn func_signature(&mut self, file: usize, func: &FuncDecl) -> Signature {
        let mut type_params = self.type_param_names(file, &func.type_params);

        if let Some(recv) = &func.recv {
            // `func (l *List[T]) ...` brings `T` into scope
            let mut base = &recv.ty;
            while let TypeExpr::Pointer(inner) | TypeExpr::Paren(inner) = base {
                base = inner;
            }
            if let TypeExpr::Name { args, .. } = base {
                for arg in args {
                    if let TypeExpr::Name {
                        package: None, name, ..
                    } = arg
                    {
                        type_params.push(name.name.clone());
                    }
                }
            }

            let recv_type = self.resolve(file, base, &type_params);
            let local = matches!(&recv_type, Type::Named(named) if named.package.as_deref() == Some(self.package_path));
            if !local && !recv_type.is_invalid() {
                let pos = recv.ty.base_name().map(|n| n.pos).unwrap_or(func.name.pos);
                self.error(pos, format!("cannot define new methods on non-local type {}", recv_type));
            }
        }

        self.resolve_signature(file, &func.signature, &type_params)
    }

    pub(crate) fn resolve_signature(&mut self, file: usize, func: &FuncType, type_params: &[String]) -> Signature {
        let mut variadic = false;

        let mut params = Vec::with_capacity(func.params.len());
        for param in &func.params {
            if matches!(param.ty, TypeExpr::Ellipsis(_)) {
                variadic = true;
            }
            params.push(Var {
                name: param.name.as_ref().map(|n| n.name.clone()).unwrap_or_default(),
                ty: self.resolve(file, &param.ty, type_params),
            });
        }

        let results = func
            .results
            .iter()
            .map(|result| Var {
                name: result.name.as_ref().map(|n| n.name.clone()).unwrap_or_default(),
                ty: self.resolve(file, &result.ty, type_params),
            })
            .collect();

        Signature {
            params,
            results,
            variadic,
        }
    }

    /// Resolve a type expression written in `file`
    pub(crate) fn resolve(&mut self, file: usize, expr: &TypeExpr, type_params: &[String]) -> Type {
        match expr {
            TypeExpr::Name {
                package: Some(package),
                name,
                args,
            } => {
                let Some(path) = self.imports[file].names.get(&package.name).cloned() else {
                    self.error(package.pos, format!("undefined: {}", package.name));
                    return Type::Invalid;
                };
                if path == "unsafe" && name.name == "Pointer" {
                    return Type::Basic(BasicKind::UnsafePointer);
                }
                match self.imported_object(&path, package, name) {
                    Some(Some(Object::TypeName { .. })) | None => {}
                    Some(Some(_)) => {
                        self.error(name.pos, format!("{}.{} is not a type", package.name, name.name));
                        return Type::Invalid;
                    }
                    Some(None) => return Type::Invalid,
                }
                let args = args.iter().map(|a| self.resolve(file, a, type_params)).collect();
                Type::Named(NamedType {
                    package: Some(path),
                    name: name.name.clone(),
                    args,
                })
            }
            TypeExpr::Name {
                package: None,
                name,
                args,
            } => {
                if type_params.contains(&name.name) {
                    return Type::TypeParam(name.name.clone());
                }
                match self.scope.get(name.name.as_str()).copied() {
                    Some(Entity::Type { .. }) => {
                        let args = args.iter().map(|a| self.resolve(file, a, type_params)).collect();
                        Type::Named(NamedType {
                            package: Some(self.package_path.to_string()),
                            name: name.name.clone(),
                            args,
                        })
                    }
                    Some(_) => {
                        self.error(name.pos, format!("{} is not a type", name.name));
                        Type::Invalid
                    }
                    None => match universe::lookup_type(&name.name) {
                        Some(ty) => ty,
                        None if self.imports[file].dot => Type::named(None, &name.name),
                        None => {
                            self.error(name.pos, format!("undefined: {}", name.name));
                            Type::Invalid
                        }
                    },
                }
            }
            TypeExpr::Pointer(inner) => Type::Pointer(Box::new(self.resolve(file, inner, type_params))),
            TypeExpr::Slice(inner) | TypeExpr::Ellipsis(inner) => {
                Type::Slice(Box::new(self.resolve(file, inner, type_params)))
            }
            TypeExpr::Array { len, elem } => {
                let len = match len {
                    Some(len) => self
                        .const_int(file, len, 0)
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| len.text.clone()),
                    None => "...".to_string(),
                };
                Type::Array {
                    len,
                    elem: Box::new(self.resolve(file, elem, type_params)),
                }
            }
            TypeExpr::Map { key, value } => Type::Map {
                key: Box::new(self.resolve(file, key, type_params)),
                value: Box::new(self.resolve(file, value, type_params)),
            },
            TypeExpr::Chan { dir, elem } => Type::Chan {
                dir: *dir,
                elem: Box::new(self.resolve(file, elem, type_params)),
            },
            TypeExpr::Func(func) => Type::Signature(self.resolve_signature(file, func, type_params)),
            TypeExpr::Struct(decls) => {
                let mut fields = Vec::new();
                for decl in decls {
                    let ty = self.resolve(file, &decl.ty, type_params);
                    if decl.names.is_empty() {
                        let name = decl.ty.base_name().map(|n| n.name.clone()).unwrap_or_default();
                        fields.push(Field {
                            name,
                            ty,
                            embedded: true,
                            tag: decl.tag.clone(),
                        });
                        continue;
                    }
                    for name in &decl.names {
                        fields.push(Field {
                            name: name.name.clone(),
                            ty: ty.clone(),
                            embedded: false,
                            tag: decl.tag.clone(),
                        });
                    }
                }
                Type::Struct(fields)
            }
            TypeExpr::Interface(elems) => {
                let mut interface = InterfaceType::default();
                for elem in elems {
                    match elem {
                        InterfaceElem::Method { name, signature, .. } => {
                            let signature = self.resolve_signature(file, signature, type_params);
                            interface.methods.push(Method {
                                name: name.name.clone(),
                                signature,
                            });
                        }
                        InterfaceElem::Embedded(ty) => {
                            let ty = self.resolve(file, ty, type_params);
                            interface.embeddeds.push(ty);
                        }
                    }
                }
                Type::Interface(interface)
            }
            TypeExpr::Paren(inner) => self.resolve(file, inner, type_params),
            TypeExpr::Union(terms) => Type::Union(
                terms
                    .iter()
                    .map(|term| Term {
                        tilde: term.tilde,
                        ty: self.resolve(file, &term.ty, type_params),
                    })
                    .collect(),
            ),
        }
    }

    /// Underlying type; named types of other packages are their own underlying type
    pub(crate) fn underlying(&mut self, ty: &Type) -> Type {
        match ty {
            Type::Named(named) => match &named.package {
                None => universe::underlying(&named.name).unwrap_or_else(|| ty.clone()),
                Some(package) if package == self.package_path => self.declared_underlying(&named.name),
                Some(_) => ty.clone(),
            },
            other => other.clone(),
        }
    }

    fn declared_underlying(&mut self, name: &str) -> Type {
        if let Some(cached) = self.underlying_cache.get(name) {
            return cached.clone();
        }

        let Some(Entity::Type { file, spec }) = self.scope.get(name).copied() else {
            return Type::Invalid;
        };

        if !self.resolving.insert(name.to_string()) {
            self.error(spec.name.pos, format!("invalid recursive type {}", name));
            return Type::Invalid;
        }

        let type_params = self.type_param_names(file, &spec.type_params);
        let rhs = self.resolve(file, &spec.ty, &type_params);
        let underlying = self.underlying(&rhs);

        self.resolving.remove(name);
        self.underlying_cache.insert(name.to_string(), underlying.clone());
        underlying
    }

    pub(crate) fn error(&mut self, pos: Pos, message: String) {
        if self.reported.insert((pos, message.clone())) {
            self.errors.push(TypeError { pos, message });
        }
    }
}
