//! Predeclared identifiers.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::typing::types::{BasicKind, InterfaceType, Method, Signature, Type, Var};

static TYPES: Lazy<HashMap<&'static str, Type>> = Lazy::new(|| {
    let basics = [
        BasicKind::Bool,
        BasicKind::String,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Uintptr,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::Complex64,
        BasicKind::Complex128,
        BasicKind::Byte,
        BasicKind::Rune,
    ];

    let mut types: HashMap<&'static str, Type> = basics
        .into_iter()
        .map(|kind| (kind.name(), Type::Basic(kind)))
        .collect();

    for name in ["error", "any", "comparable"] {
        types.insert(name, Type::named(None, name));
    }
    types
});

static ERROR_INTERFACE: Lazy<Type> = Lazy::new(|| {
    Type::Interface(InterfaceType {
        methods: vec![Method {
            name: "Error".to_string(),
            signature: Signature {
                params: Vec::new(),
                results: vec![Var {
                    name: String::new(),
                    ty: Type::Basic(BasicKind::String),
                }],
                variadic: false,
            },
        }],
        embeddeds: Vec::new(),
    })
});

const BUILTIN_FUNCS: &[&str] = &[
    "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max", "min", "new",
    "panic", "print", "println", "real", "recover",
];

/// Predeclared type named `name`
pub fn lookup_type(name: &str) -> Option<Type> {
    TYPES.get(name).cloned()
}

/// Underlying type of a predeclared named type
pub fn underlying(name: &str) -> Option<Type> {
    match name {
        "error" => Some(ERROR_INTERFACE.clone()),
        "any" | "comparable" => Some(Type::Interface(InterfaceType::default())),
        _ => None,
    }
}

pub fn is_builtin_func(name: &str) -> bool {
    BUILTIN_FUNCS.contains(&name)
}

/// `true`, `false`, `iota` and `nil`
pub fn constant_type(name: &str) -> Option<BasicKind> {
    match name {
        "true" | "false" => Some(BasicKind::UntypedBool),
        "iota" => Some(BasicKind::UntypedInt),
        "nil" => Some(BasicKind::UntypedNil),
        _ => None,
    }
}

/// Result type of a few widely used standard library functions
pub fn well_known_call(package: &str, function: &str) -> Option<Type> {
    let ty = match (package, function) {
        ("errors", "New") | ("fmt", "Errorf") => Type::named(None, "error"),
        ("fmt", "Sprintf" | "Sprint" | "Sprintln")
        | ("strconv", "Itoa" | "Quote" | "FormatInt" | "FormatBool")
        | ("strings", "Join" | "Repeat" | "ToUpper" | "ToLower" | "TrimSpace" | "ReplaceAll") => {
            Type::Basic(BasicKind::String)
        }
        ("time", "Now") => Type::named(Some("time"), "Time"),
        ("time", "Since") => Type::named(Some("time"), "Duration"),
        ("regexp", "MustCompile") => Type::Pointer(Box::new(Type::named(Some("regexp"), "Regexp"))),
        ("os", "Getenv") => Type::Basic(BasicKind::String),
        ("context", "Background" | "TODO") => Type::named(Some("context"), "Context"),
        _ => return None,
    };
    Some(ty)
}

/// Type of a few widely used standard library constants and variables
pub fn well_known_value(package: &str, name: &str) -> Option<Type> {
    let ty = match (package, name) {
        ("time", "Nanosecond" | "Microsecond" | "Millisecond" | "Second" | "Minute" | "Hour") => {
            Type::named(Some("time"), "Duration")
        }
        ("time", "UTC" | "Local") => Type::Pointer(Box::new(Type::named(Some("time"), "Location"))),
        ("time", "RFC3339" | "RFC3339Nano" | "RFC1123" | "Kitchen" | "DateTime" | "DateOnly" | "TimeOnly") => {
            Type::Basic(BasicKind::UntypedString)
        }
        ("math", "Pi" | "E" | "Phi" | "Sqrt2" | "Ln2" | "Ln10" | "MaxFloat32" | "MaxFloat64")
        | ("math", "SmallestNonzeroFloat32" | "SmallestNonzeroFloat64") => Type::Basic(BasicKind::UntypedFloat),
        ("math", "MaxInt" | "MinInt" | "MaxInt8" | "MinInt8" | "MaxInt16" | "MinInt16" | "MaxInt32" | "MinInt32")
        | ("math", "MaxInt64" | "MinInt64" | "MaxUint" | "MaxUint8" | "MaxUint16" | "MaxUint32" | "MaxUint64") => {
            Type::Basic(BasicKind::UntypedInt)
        }
        ("net/http", "DefaultClient") => Type::Pointer(Box::new(Type::named(Some("net/http"), "Client"))),
        ("net/http", "DefaultServeMux") => Type::Pointer(Box::new(Type::named(Some("net/http"), "ServeMux"))),
        ("net/http", "ErrServerClosed" | "ErrNoCookie") => Type::named(None, "error"),
        ("net/http", name) if name.starts_with("Method") => Type::Basic(BasicKind::UntypedString),
        ("net/http", name) if name.starts_with("Status") && name != "StatusText" => Type::Basic(BasicKind::UntypedInt),
        ("os", "Args") => Type::Slice(Box::new(Type::Basic(BasicKind::String))),
        ("os", "Stdin" | "Stdout" | "Stderr") => Type::Pointer(Box::new(Type::named(Some("os"), "File"))),
        ("os", "ErrNotExist" | "ErrExist" | "ErrPermission") => Type::named(None, "error"),
        ("io", "EOF" | "ErrUnexpectedEOF" | "ErrClosedPipe") => Type::named(None, "error"),
        ("io", "Discard") => Type::named(Some("io"), "Writer"),
        ("context", "Canceled" | "DeadlineExceeded") => Type::named(None, "error"),
        _ => return None,
    };
    Some(ty)
}
