//! Types of constants and variables, and constant folding of integers.

use crate::syntax::ast::{BinaryOp, Expr, ExprKind, Ident, LitKind, Pos, UnaryOp, ValueSpec};
use crate::syntax::parser::unquote;
use crate::typing::checker::{Checker, Entity};
use crate::typing::types::{BasicKind, Signature, Type};
use crate::typing::{universe, Object};

impl<'a> Checker<'a> {
    /// Type of the package-level constant or variable `name`
    pub(super) fn value_type(&mut self, name: &str) -> Option<Type> {
        if let Some(cached) = self.value_cache.get(name) {
            return cached.clone();
        }

        let entity = self.scope.get(name).copied()?;
        if !self.evaluating.insert(name.to_string()) {
            self.error(entity.pos(), format!("initialization cycle or invalid reference to {}", name));
            return None;
        }

        let ty = match entity {
            Entity::Const { file, spec, index, init } => self.const_type(file, spec, index, init),
            Entity::Var { file, spec, index } => self.var_type(file, spec, index),
            _ => None,
        };

        self.evaluating.remove(name);
        self.value_cache.insert(name.to_string(), ty.clone());
        ty
    }

    fn const_type(&mut self, file: usize, spec: &ValueSpec, index: usize, init: &ValueSpec) -> Option<Type> {
        let name = &spec.names[index];

        if spec.values.is_empty() && spec.ty.is_some() {
            self.error(name.pos, "missing init expr for const declaration".to_string());
            return None;
        }

        let Some(value) = init.values.get(index) else {
            self.error(name.pos, "missing init expr for const declaration".to_string());
            return None;
        };

        let value_type = self.expr_type(file, value);
        self.check_divisions(file, value, spec.iota, name.pos);
        match &init.ty {
            Some(ty) => Some(self.resolve(file, ty, &[])),
            None => value_type,
        }
    }

    fn var_type(&mut self, file: usize, spec: &ValueSpec, index: usize) -> Option<Type> {
        let name = &spec.names[index];
        if let Some(value) = spec.values.get(index) {
            self.check_divisions(file, value, 0, name.pos);
        }

        if let Some(ty) = &spec.ty {
            if let Some(value) = spec.values.get(index) {
                self.expr_type(file, value);
            }
            return Some(self.resolve(file, ty, &[]));
        }

        if spec.values.len() == spec.names.len() {
            return self.expr_type(file, &spec.values[index]).map(Type::defaulted);
        }

        // `var a, b = f()` takes one result per name
        if let [value] = spec.values.as_slice() {
            if let ExprKind::Call { fun, .. } = &value.kind {
                if let Some(results) = self.call_results(file, fun) {
                    if results.len() == spec.names.len() {
                        return results.into_iter().nth(index);
                    }
                }
            }
        }

        self.error(
            name.pos,
            format!(
                "assignment mismatch: {} variables but {} values",
                spec.names.len(),
                spec.values.len()
            ),
        );
        None
    }

    /// Type of an initializer expression; untyped constants stay untyped
    pub(super) fn expr_type(&mut self, file: usize, expr: &Expr) -> Option<Type> {
        match &expr.kind {
            ExprKind::BasicLit(kind, _) => Some(Type::Basic(match kind {
                LitKind::Int => BasicKind::UntypedInt,
                LitKind::Float => BasicKind::UntypedFloat,
                LitKind::Imag => BasicKind::UntypedComplex,
                LitKind::Char => BasicKind::UntypedRune,
                LitKind::String => BasicKind::UntypedString,
            })),
            ExprKind::Ident(ident) => {
                match self.scope.get(ident.name.as_str()).copied() {
                    Some(Entity::Const { .. } | Entity::Var { .. }) => return self.value_type(&ident.name),
                    Some(Entity::Func { file, decl }) => {
                        let type_params = self.type_param_names(file, &decl.type_params);
                        return Some(Type::Signature(self.resolve_signature(file, &decl.signature, &type_params)));
                    }
                    Some(Entity::Type { .. }) => return None,
                    None => {}
                }
                if let Some(kind) = universe::constant_type(&ident.name) {
                    return Some(Type::Basic(kind));
                }
                if universe::lookup_type(&ident.name).is_none()
                    && !universe::is_builtin_func(&ident.name)
                    && !self.imports[file].dot
                    && !self.imports[file].names.contains_key(&ident.name)
                {
                    self.error(ident.pos, format!("undefined: {}", ident.name));
                }
                None
            }
            ExprKind::Selector(base, field) => {
                if let ExprKind::Ident(package) = &base.kind {
                    if self.is_import(file, &package.name) {
                        return self.imported_value_type(file, package, field);
                    }
                }
                let base_type = self.expr_type(file, base)?;
                self.field_type(&base_type, &field.name)
            }
            ExprKind::Call { fun, args } => self.call_type(file, fun, args),
            ExprKind::Index(base, _) => {
                let base_type = self.expr_type(file, base)?;
                match self.underlying(&base_type) {
                    Type::Slice(elem) | Type::Array { elem, .. } => Some(*elem),
                    Type::Pointer(inner) => match self.underlying(&inner) {
                        Type::Array { elem, .. } => Some(*elem),
                        _ => None,
                    },
                    Type::Map { value, .. } => Some(*value),
                    Type::Basic(BasicKind::String | BasicKind::UntypedString) => Some(Type::Basic(BasicKind::Byte)),
                    _ => None,
                }
            }
            ExprKind::Slice(base) => {
                let base_type = self.expr_type(file, base)?;
                match self.underlying(&base_type) {
                    Type::Array { elem, .. } => Some(Type::Slice(elem)),
                    Type::Basic(BasicKind::UntypedString) => Some(Type::Basic(BasicKind::String)),
                    _ => Some(base_type),
                }
            }
            ExprKind::TypeAssert(_, ty) => ty.as_ref().map(|ty| self.resolve(file, ty, &[])),
            ExprKind::Composite { ty: Some(ty), elements } => {
                let resolved = self.resolve(file, ty, &[]);
                match resolved {
                    Type::Array { len, elem } if len == "..." => Some(Type::Array {
                        len: elements.len().to_string(),
                        elem,
                    }),
                    other => Some(other),
                }
            }
            ExprKind::Composite { ty: None, .. } => None,
            ExprKind::FuncLit(signature) => Some(Type::Signature(self.resolve_signature(file, signature, &[]))),
            ExprKind::Unary(op, inner) => {
                let inner_type = self.expr_type(file, inner)?;
                match op {
                    UnaryOp::Addr => Some(Type::Pointer(Box::new(inner_type))),
                    UnaryOp::Deref => match self.underlying(&inner_type) {
                        Type::Pointer(elem) => Some(*elem),
                        _ => None,
                    },
                    UnaryOp::Recv => match self.underlying(&inner_type) {
                        Type::Chan { elem, .. } => Some(*elem),
                        _ => None,
                    },
                    _ => Some(inner_type),
                }
            }
            ExprKind::Binary(op, lhs, rhs) => {
                let lhs_type = self.expr_type(file, lhs);
                let rhs_type = self.expr_type(file, rhs);
                if op.yields_bool() && !matches!(op, BinaryOp::LAnd | BinaryOp::LOr) {
                    return Some(Type::Basic(BasicKind::UntypedBool));
                }
                if op.is_shift() {
                    return lhs_type;
                }
                combine(lhs_type?, rhs_type?)
            }
            ExprKind::Paren(inner) => self.expr_type(file, inner),
            ExprKind::Type(_) | ExprKind::KeyValue(..) => None,
        }
    }

    fn is_import(&self, file: usize, name: &str) -> bool {
        self.imports[file].names.contains_key(name) && !self.scope.contains_key(name)
    }

    /// Object `package.name` of a package whose scope the importer knows.
    ///
    /// The outer `None` means the scope is unknown; a missing member of a
    /// known scope is reported and yields `Some(None)`.
    pub(super) fn imported_object(&mut self, path: &str, package: &Ident, name: &Ident) -> Option<Option<Object>> {
        let scope = self.importer.package_scope(path)?;
        let object = scope.get(&name.name).cloned();
        if object.is_none() {
            self.error(name.pos, format!("undefined: {}.{}", package.name, name.name));
        }
        Some(object)
    }

    /// Type of `package.name` used as a value
    fn imported_value_type(&mut self, file: usize, package: &Ident, name: &Ident) -> Option<Type> {
        let path = self.imports[file].names.get(&package.name)?.clone();
        match self.imported_object(&path, package, name) {
            None => universe::well_known_value(&path, &name.name),
            Some(Some(Object::TypeName { .. }) | None) => None,
            Some(Some(object)) => Some(object.ty()),
        }
    }

    /// Result type of calling or converting with `package.name`
    fn imported_call_type(&mut self, file: usize, package: &Ident, name: &Ident) -> Option<Type> {
        let path = self.imports[file].names.get(&package.name)?.clone();
        match self.imported_object(&path, package, name) {
            None => universe::well_known_call(&path, &name.name),
            Some(None) => None,
            Some(Some(Object::TypeName { ty, .. })) => Some(ty),
            Some(Some(object)) => match object.ty() {
                Type::Signature(Signature { results, .. }) => single(results.into_iter().map(|r| r.ty).collect()),
                _ => None,
            },
        }
    }

    /// Report integer or constant divisions by a constant zero within `expr`
    fn check_divisions(&mut self, file: usize, expr: &Expr, iota: usize, pos: Pos) {
        match &expr.kind {
            ExprKind::Binary(op, lhs, rhs) => {
                if matches!(op, BinaryOp::Quo | BinaryOp::Rem) && self.is_zero_constant(file, rhs, iota) {
                    let integer_or_constant = match self.expr_type(file, lhs) {
                        Some(ty) if ty.is_untyped() => true,
                        Some(ty) => matches!(self.underlying(&ty), Type::Basic(kind) if kind.is_integer()),
                        None => false,
                    };
                    if integer_or_constant {
                        self.error(pos, "invalid operation: division by zero".to_string());
                    }
                }
                self.check_divisions(file, lhs, iota, pos);
                self.check_divisions(file, rhs, iota, pos);
            }
            ExprKind::Paren(inner) | ExprKind::Unary(_, inner) => self.check_divisions(file, inner, iota, pos),
            ExprKind::Call { args, .. } => {
                for arg in args {
                    self.check_divisions(file, arg, iota, pos);
                }
            }
            _ => {}
        }
    }

    fn is_zero_constant(&mut self, file: usize, expr: &Expr, iota: usize) -> bool {
        match &expr.kind {
            ExprKind::BasicLit(LitKind::Float, text) => text.replace('_', "").parse::<f64>().is_ok_and(|v| v == 0.0),
            ExprKind::Paren(inner) => self.is_zero_constant(file, inner, iota),
            _ => self.const_int(file, expr, iota) == Some(0),
        }
    }

    fn field_type(&mut self, base: &Type, field: &str) -> Option<Type> {
        let base = match self.underlying(base) {
            Type::Pointer(elem) => self.underlying(&elem),
            other => other,
        };
        match base {
            Type::Struct(fields) => fields.into_iter().find(|f| f.name == field).map(|f| f.ty),
            _ => None,
        }
    }

    fn call_type(&mut self, file: usize, fun: &Expr, args: &[Expr]) -> Option<Type> {
        if let ExprKind::Ident(ident) = &fun.kind {
            match self.scope.get(ident.name.as_str()).copied() {
                Some(Entity::Type { .. }) => return fun.as_type().map(|ty| self.resolve(file, &ty, &[])),
                Some(_) => {
                    let results = self.call_results(file, fun)?;
                    return single(results);
                }
                None => {}
            }

            if let Some(ty) = universe::lookup_type(&ident.name) {
                return Some(ty);
            }

            if universe::is_builtin_func(&ident.name) {
                return self.builtin_call_type(file, &ident.name, args);
            }

            if !self.imports[file].dot {
                self.error(ident.pos, format!("undefined: {}", ident.name));
            }
            return None;
        }

        if let ExprKind::Selector(base, name) = &fun.kind {
            if let ExprKind::Ident(package) = &base.kind {
                if self.is_import(file, &package.name) {
                    return self.imported_call_type(file, package, name);
                }
            }
        }

        if matches!(fun.kind, ExprKind::Type(_) | ExprKind::Paren(_) | ExprKind::Index(..)) {
            if let Some(ty) = fun.as_type() {
                return Some(self.resolve(file, &ty, &[]));
            }
        }

        single(self.call_results(file, fun)?)
    }

    /// Result types of calling `fun`, when `fun` is a function value
    fn call_results(&mut self, file: usize, fun: &Expr) -> Option<Vec<Type>> {
        let Type::Signature(Signature { results, .. }) = self.expr_type(file, fun)? else {
            return None;
        };
        Some(results.into_iter().map(|r| r.ty).collect())
    }

    fn builtin_call_type(&mut self, file: usize, name: &str, args: &[Expr]) -> Option<Type> {
        let first = args.first();
        match name {
            "len" | "cap" | "copy" => Some(Type::Basic(BasicKind::Int)),
            "new" => {
                let ty = first?.as_type()?;
                Some(Type::Pointer(Box::new(self.resolve(file, &ty, &[]))))
            }
            "make" => {
                let ty = first?.as_type()?;
                Some(self.resolve(file, &ty, &[]))
            }
            "append" => self.expr_type(file, first?).map(Type::defaulted),
            "complex" => Some(Type::Basic(BasicKind::Complex128)),
            "real" | "imag" => Some(Type::Basic(BasicKind::Float64)),
            "min" | "max" => {
                let mut result = self.expr_type(file, first?)?;
                for arg in &args[1..] {
                    result = combine(result, self.expr_type(file, arg)?)?;
                }
                Some(result)
            }
            "recover" => Some(Type::named(None, "any")),
            _ => None,
        }
    }

    /// Fold an integer constant expression, `iota` taking the given value
    pub(super) fn const_int(&mut self, file: usize, expr: &Expr, iota: usize) -> Option<i128> {
        match &expr.kind {
            ExprKind::BasicLit(LitKind::Int, text) => parse_int_literal(text),
            ExprKind::BasicLit(LitKind::Char, text) => unquote(text).chars().next().map(|c| c as i128),
            ExprKind::Ident(ident) if ident.name == "iota" => Some(iota as i128),
            ExprKind::Ident(ident) => {
                let Some(Entity::Const { file, spec, index, init }) = self.scope.get(ident.name.as_str()).copied()
                else {
                    return None;
                };
                let value = init.values.get(index)?;
                let key = format!("const {}", ident.name);
                if !self.evaluating.insert(key.clone()) {
                    return None;
                }
                let result = self.const_int(file, value, spec.iota);
                self.evaluating.remove(&key);
                result
            }
            ExprKind::Paren(inner) => self.const_int(file, inner, iota),
            ExprKind::Unary(op, inner) => {
                let value = self.const_int(file, inner, iota)?;
                match op {
                    UnaryOp::Plus => Some(value),
                    UnaryOp::Neg => value.checked_neg(),
                    UnaryOp::Xor => Some(!value),
                    _ => None,
                }
            }
            ExprKind::Binary(op, lhs, rhs) => {
                let lhs = self.const_int(file, lhs, iota)?;
                let rhs = self.const_int(file, rhs, iota)?;
                match op {
                    BinaryOp::Add => lhs.checked_add(rhs),
                    BinaryOp::Sub => lhs.checked_sub(rhs),
                    BinaryOp::Mul => lhs.checked_mul(rhs),
                    BinaryOp::Quo => lhs.checked_div(rhs),
                    BinaryOp::Rem => lhs.checked_rem(rhs),
                    BinaryOp::Shl => u32::try_from(rhs).ok().and_then(|r| lhs.checked_shl(r)),
                    BinaryOp::Shr => u32::try_from(rhs).ok().and_then(|r| lhs.checked_shr(r)),
                    BinaryOp::And => Some(lhs & rhs),
                    BinaryOp::Or => Some(lhs | rhs),
                    BinaryOp::Xor => Some(lhs ^ rhs),
                    BinaryOp::AndNot => Some(lhs & !rhs),
                    _ => None,
                }
            }
            ExprKind::Call { fun, args } => match (&fun.kind, args.as_slice()) {
                (ExprKind::Ident(ident), [arg]) if ident.name == "len" => match &arg.kind {
                    ExprKind::BasicLit(LitKind::String, text) => Some(unquote(text).len() as i128),
                    _ => None,
                },
                // Conversions keep the value
                (_, [arg]) if fun.as_type().is_some() => self.const_int(file, arg, iota),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Result type of a binary arithmetic operation
fn combine(lhs: Type, rhs: Type) -> Option<Type> {
    match (lhs.is_untyped(), rhs.is_untyped()) {
        (false, _) => Some(lhs),
        (true, false) => Some(rhs),
        (true, true) => {
            let (Type::Basic(l), Type::Basic(r)) = (&lhs, &rhs) else {
                return None;
            };
            if l.untyped_rank() >= r.untyped_rank() {
                Some(lhs)
            } else {
                Some(rhs)
            }
        }
    }
}

fn single(mut results: Vec<Type>) -> Option<Type> {
    if results.len() == 1 {
        results.pop()
    } else {
        None
    }
}

/// Value of a Go integer literal in any base, underscores allowed
pub(crate) fn parse_int_literal(text: &str) -> Option<i128> {
    let digits = text.replace('_', "");
    let lower = digits.to_ascii_lowercase();

    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(binary) = lower.strip_prefix("0b") {
        (2, binary)
    } else if let Some(octal) = lower.strip_prefix("0o") {
        (8, octal)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };

    i128::from_str_radix(body, radix).ok()
}
