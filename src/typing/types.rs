//! Resolved Go types and their canonical spelling.
//!
//! `Display` mirrors `go/types.TypeString` with fully qualified package paths,
//! which is the form type names take in the export manifest.

use std::fmt::{self, Write as _};

pub use crate::syntax::ast::ChanDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicKind {
    Bool,
    String,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    /// Spelled `byte`, identical to `uint8`
    Byte,
    /// Spelled `rune`, identical to `int32`
    Rune,
    UnsafePointer,
    UntypedBool,
    UntypedInt,
    UntypedRune,
    UntypedFloat,
    UntypedComplex,
    UntypedString,
    UntypedNil,
}

impl BasicKind {
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::String => "string",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::Byte => "byte",
            BasicKind::Rune => "rune",
            BasicKind::UnsafePointer => "unsafe.Pointer",
            BasicKind::UntypedBool => "untyped bool",
            BasicKind::UntypedInt => "untyped int",
            BasicKind::UntypedRune => "untyped rune",
            BasicKind::UntypedFloat => "untyped float",
            BasicKind::UntypedComplex => "untyped complex",
            BasicKind::UntypedString => "untyped string",
            BasicKind::UntypedNil => "untyped nil",
        }
    }

    pub fn is_untyped(self) -> bool {
        matches!(
            self,
            BasicKind::UntypedBool
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
                | BasicKind::UntypedFloat
                | BasicKind::UntypedComplex
                | BasicKind::UntypedString
                | BasicKind::UntypedNil
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::Int
                | BasicKind::Int8
                | BasicKind::Int16
                | BasicKind::Int32
                | BasicKind::Int64
                | BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
                | BasicKind::Byte
                | BasicKind::Rune
                | BasicKind::UntypedInt
                | BasicKind::UntypedRune
        )
    }

    /// Type an untyped constant takes when nothing else dictates one
    pub fn default_type(self) -> BasicKind {
        match self {
            BasicKind::UntypedBool => BasicKind::Bool,
            BasicKind::UntypedInt => BasicKind::Int,
            BasicKind::UntypedRune => BasicKind::Rune,
            BasicKind::UntypedFloat => BasicKind::Float64,
            BasicKind::UntypedComplex => BasicKind::Complex128,
            BasicKind::UntypedString => BasicKind::String,
            other => other,
        }
    }

    /// Ordering of untyped numeric kinds when mixed in one expression
    pub(crate) fn untyped_rank(self) -> u8 {
        match self {
            BasicKind::UntypedInt => 1,
            BasicKind::UntypedRune => 2,
            BasicKind::UntypedFloat => 3,
            BasicKind::UntypedComplex => 4,
            _ => 0,
        }
    }
}

/// A named type as referenced from somewhere, possibly instantiated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedType {
    /// Import path of the declaring package, `None` for predeclared types
    pub package: Option<String>,
    pub name: String,
    pub args: Vec<Type>,
}

/// A parameter or result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    /// Empty for unnamed parameters
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Var>,
    pub results: Vec<Var>,

    /// The last parameter is `...T`; its type is stored as `[]T`
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub embedded: bool,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub signature: Signature,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceType {
    /// Explicitly declared methods in source order
    pub methods: Vec<Method>,
    pub embeddeds: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub tilde: bool,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Basic(BasicKind),
    Named(NamedType),
    TypeParam(String),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array { len: String, elem: Box<Type> },
    Map { key: Box<Type>, value: Box<Type> },
    Chan { dir: ChanDir, elem: Box<Type> },
    Signature(Signature),
    Struct(Vec<Field>),
    Interface(InterfaceType),
    Union(Vec<Term>),
    Invalid,
}

impl Type {
    pub fn named(package: Option<&str>, name: &str) -> Type {
        Type::Named(NamedType {
            package: package.map(str::to_string),
            name: name.to_string(),
            args: Vec::new(),
        })
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Basic(kind) if kind.is_untyped())
    }

    /// Replace an untyped basic type by its default type
    pub fn defaulted(self) -> Type {
        match self {
            Type::Basic(kind) => Type::Basic(kind.default_type()),
            other => other,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Invalid)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(kind) => f.write_str(kind.name()),
            Type::Named(named) => {
                if let Some(package) = &named.package {
                    write!(f, "{}.", package)?;
                }
                f.write_str(&named.name)?;
                write_type_list(f, "[", &named.args, "]")
            }
            Type::TypeParam(name) => f.write_str(name),
            Type::Pointer(elem) => write!(f, "*{}", elem),
            Type::Slice(elem) => write!(f, "[]{}", elem),
            Type::Array { len, elem } => write!(f, "[{}]{}", len, elem),
            Type::Map { key, value } => write!(f, "map[{}]{}", key, value),
            Type::Chan { dir, elem } => {
                let prefix = match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                };
                // `chan (<-chan T)` needs parentheses to stay unambiguous
                let parens = *dir == ChanDir::Both && matches!(**elem, Type::Chan { dir: ChanDir::Recv, .. });
                if parens {
                    write!(f, "{}({})", prefix, elem)
                } else {
                    write!(f, "{}{}", prefix, elem)
                }
            }
            Type::Signature(signature) => {
                f.write_str("func")?;
                write_signature(f, signature)
            }
            Type::Struct(fields) => {
                f.write_str("struct{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    if !field.embedded {
                        write!(f, "{} ", field.name)?;
                    }
                    write!(f, "{}", field.ty)?;
                    if let Some(tag) = &field.tag {
                        write!(f, " {}", quote(tag))?;
                    }
                }
                f.write_str("}")
            }
            Type::Interface(interface) => {
                f.write_str("interface{")?;
                let mut methods: Vec<&Method> = interface.methods.iter().collect();
                methods.sort_by(|a, b| a.name.cmp(&b.name));

                let mut first = true;
                for method in methods {
                    if !first {
                        f.write_str("; ")?;
                    }
                    first = false;
                    f.write_str(&method.name)?;
                    write_signature(f, &method.signature)?;
                }
                for embedded in &interface.embeddeds {
                    if !first {
                        f.write_str("; ")?;
                    }
                    first = false;
                    write!(f, "{}", embedded)?;
                }
                f.write_str("}")
            }
            Type::Union(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    if term.tilde {
                        f.write_str("~")?;
                    }
                    write!(f, "{}", term.ty)?;
                }
                Ok(())
            }
            Type::Invalid => f.write_str("invalid type"),
        }
    }
}

fn write_type_list(f: &mut fmt::Formatter<'_>, open: &str, types: &[Type], close: &str) -> fmt::Result {
    if types.is_empty() {
        return Ok(());
    }
    f.write_str(open)?;
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", ty)?;
    }
    f.write_str(close)
}

fn write_tuple(f: &mut fmt::Formatter<'_>, vars: &[Var], variadic: bool) -> fmt::Result {
    f.write_str("(")?;
    for (i, var) in vars.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if !var.name.is_empty() {
            write!(f, "{} ", var.name)?;
        }
        match (&var.ty, variadic && i + 1 == vars.len()) {
            (Type::Slice(elem), true) => write!(f, "...{}", elem)?,
            (ty, _) => write!(f, "{}", ty)?,
        }
    }
    f.write_str(")")
}

/// Parameters and results without the leading `func`
fn write_signature(f: &mut fmt::Formatter<'_>, signature: &Signature) -> fmt::Result {
    write_tuple(f, &signature.params, signature.variadic)?;

    match signature.results.as_slice() {
        [] => Ok(()),
        [single] if single.name.is_empty() => write!(f, " {}", single.ty),
        results => {
            f.write_str(" ")?;
            write_tuple(f, results, false)
        }
    }
}

/// Quote `s` as a Go interpreted string literal
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            '\u{0B}' => out.push_str("\\v"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
