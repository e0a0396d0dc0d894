//! Syntax tree for the top-level declarations of a Go file.
//!
//! Function bodies are not represented; initializer expressions are, each
//! carrying its exact source text.

use crate::syntax::comments::CommentGroup;

/// Location of an identifier: file index within its package and byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub file: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub pos: Pos,
}

impl Ident {
    /// Go's export rule: the first character is an upper case letter
    pub fn is_exported(&self) -> bool {
        is_exported(&self.name)
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// One parsed source file
#[derive(Debug, Clone)]
pub struct File {
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
    pub comments: Vec<CommentGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit local name, `.` or `_`
    pub name: Option<Ident>,

    /// Unquoted import path
    pub path: String,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Gen(GenDecl),
    Func(FuncDecl),
}

/// Keyword introducing a general declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Import,
    Const,
    Var,
    Type,
}

#[derive(Debug, Clone)]
pub struct GenDecl {
    pub doc: Option<CommentGroup>,
    pub kind: DeclKind,

    /// Specs were written inside parentheses
    pub grouped: bool,
    pub specs: Vec<Spec>,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

/// `Names [Type] [= Values]` inside a `const` or `var` declaration
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub doc: Option<CommentGroup>,
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,

    /// Position of the spec within its declaration, the value of `iota`
    pub iota: usize,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub doc: Option<CommentGroup>,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,

    /// `type A = B`
    pub alias: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone)]
pub struct TypeParam {
    pub names: Vec<Ident>,
    pub constraint: TypeExpr,
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub doc: Option<CommentGroup>,
    pub recv: Option<Param>,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub signature: FuncType,
}

impl FuncDecl {
    /// Base type name of the receiver, `*T[K]` and `T` both giving `T`
    pub fn receiver_base(&self) -> Option<&Ident> {
        self.recv.as_ref().and_then(|recv| recv.ty.base_name())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FuncType {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone)]
pub enum TypeExpr {
    /// `T`, `pkg.T`, `T[A, B]`
    Name {
        package: Option<Ident>,
        name: Ident,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// `[N]T`; `len` is `None` for `[...]T`
    Array {
        len: Option<Box<Expr>>,
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Func(FuncType),
    Struct(Vec<FieldDecl>),
    Interface(Vec<InterfaceElem>),
    /// Final variadic parameter `...T`
    Ellipsis(Box<TypeExpr>),
    Paren(Box<TypeExpr>),
    /// Constraint terms `~int | string`
    Union(Vec<UnionTerm>),
}

impl TypeExpr {
    /// Name of the type after peeling pointers, parentheses and type arguments
    pub fn base_name(&self) -> Option<&Ident> {
        match self {
            TypeExpr::Name { name, .. } => Some(name),
            TypeExpr::Pointer(inner) | TypeExpr::Paren(inner) => inner.base_name(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Empty for embedded fields
    pub names: Vec<Ident>,
    pub ty: TypeExpr,

    /// Unquoted tag
    pub tag: Option<String>,
}

#[derive(Debug, Clone)]
pub enum InterfaceElem {
    Method {
        doc: Option<CommentGroup>,
        name: Ident,
        signature: FuncType,
    },
    Embedded(TypeExpr),
}

#[derive(Debug, Clone)]
pub struct UnionTerm {
    pub tilde: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    Xor,
    Deref,
    Addr,
    Recv,
    Tilde,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LOr,
    LAnd,
    Eql,
    Neq,
    Lss,
    Leq,
    Gtr,
    Geq,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Quo,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::LOr => 1,
            BinaryOp::LAnd => 2,
            BinaryOp::Eql
            | BinaryOp::Neq
            | BinaryOp::Lss
            | BinaryOp::Leq
            | BinaryOp::Gtr
            | BinaryOp::Geq => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            _ => 5,
        }
    }

    pub fn yields_bool(self) -> bool {
        self.precedence() == 3 || matches!(self, BinaryOp::LAnd | BinaryOp::LOr)
    }

    pub fn is_shift(self) -> bool {
        matches!(self, BinaryOp::Shl | BinaryOp::Shr)
    }
}

/// An initializer expression and its source text
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    BasicLit(LitKind, String),
    Ident(Ident),
    Selector(Box<Expr>, Ident),
    Call {
        fun: Box<Expr>,
        args: Vec<Expr>,
    },
    Index(Box<Expr>, Vec<Expr>),
    Slice(Box<Expr>),
    TypeAssert(Box<Expr>, Option<TypeExpr>),
    Composite {
        ty: Option<TypeExpr>,
        elements: Vec<Expr>,
    },
    FuncLit(FuncType),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Paren(Box<Expr>),
    /// A type literal in expression position, as in `make([]int, 3)`
    Type(TypeExpr),
    /// `key: value` inside a composite literal
    KeyValue(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Reinterpret the expression as a type, as Go does for conversions
    pub fn as_type(&self) -> Option<TypeExpr> {
        match &self.kind {
            ExprKind::Ident(name) => Some(TypeExpr::Name {
                package: None,
                name: name.clone(),
                args: Vec::new(),
            }),
            ExprKind::Selector(base, name) => match &base.kind {
                ExprKind::Ident(package) => Some(TypeExpr::Name {
                    package: Some(package.clone()),
                    name: name.clone(),
                    args: Vec::new(),
                }),
                _ => None,
            },
            ExprKind::Index(base, args) => {
                let TypeExpr::Name { package, name, .. } = base.as_type()? else {
                    return None;
                };
                let args = args.iter().map(Expr::as_type).collect::<Option<Vec<_>>>()?;
                Some(TypeExpr::Name { package, name, args })
            }
            ExprKind::Unary(UnaryOp::Deref, inner) => Some(TypeExpr::Pointer(Box::new(inner.as_type()?))),
            ExprKind::Paren(inner) => Some(TypeExpr::Paren(Box::new(inner.as_type()?))),
            ExprKind::Type(ty) => Some(ty.clone()),
            _ => None,
        }
    }
}
