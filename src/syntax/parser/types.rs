//! Type expressions, signatures and type parameter lists.

use crate::syntax::ast::*;
use crate::syntax::error::ParseResult;
use crate::syntax::parser::{unquote, Parser};
use crate::syntax::token::TokenKind;

/// One comma-separated entry of a parameter or type parameter list
enum ListEntry {
    /// A lone identifier, either a name waiting for its type or a type name
    Bare(Ident),
    Named(Ident, TypeExpr),
    Type(TypeExpr),
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        match self.kind() {
            TokenKind::Ident => self.parse_type_name(),
            TokenKind::Mul => {
                self.bump();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::LBrack => {
                self.bump();
                if self.eat(TokenKind::RBrack) {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }

                let len = if self.at(TokenKind::Ellipsis) && self.nth(1) == TokenKind::RBrack {
                    self.bump();
                    None
                } else {
                    Some(Box::new(self.parse_expr()?))
                };
                self.expect(TokenKind::RBrack)?;

                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Map => {
                self.bump();
                self.expect(TokenKind::LBrack)?;
                let key = self.parse_type()?;
                self.expect(TokenKind::RBrack)?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Chan => {
                self.bump();
                let dir = if self.eat(TokenKind::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Arrow if self.nth(1) == TokenKind::Chan => {
                self.bump();
                self.bump();
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Func => {
                self.bump();
                Ok(TypeExpr::Func(self.parse_signature()?))
            }
            TokenKind::Struct => self.parse_struct_type(),
            TokenKind::Interface => self.parse_interface_type(),
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen)?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            _ => Err(self.unexpected("type")),
        }
    }

    /// `T`, `pkg.T`, optionally followed by type arguments
    fn parse_type_name(&mut self) -> ParseResult<TypeExpr> {
        let first = self.ident()?;
        let (package, name) = if self.eat(TokenKind::Period) {
            (Some(first), self.ident()?)
        } else {
            (None, first)
        };

        let mut args = Vec::new();
        if self.at(TokenKind::LBrack) && self.nth(1) != TokenKind::RBrack {
            self.bump();
            args.push(self.parse_type()?);
            while self.eat(TokenKind::Comma) {
                if self.at(TokenKind::RBrack) {
                    break;
                }
                args.push(self.parse_type()?);
            }
            self.expect(TokenKind::RBrack)?;
        }

        Ok(TypeExpr::Name { package, name, args })
    }

    fn parse_param_type(&mut self) -> ParseResult<TypeExpr> {
        if self.eat(TokenKind::Ellipsis) {
            Ok(TypeExpr::Ellipsis(Box::new(self.parse_type()?)))
        } else {
            self.parse_type()
        }
    }

    /// Parameters and results of a function
    pub(crate) fn parse_signature(&mut self) -> ParseResult<FuncType> {
        let params = self.parse_params()?;

        let results = match self.kind() {
            TokenKind::LParen => self.parse_params()?,
            TokenKind::Ident
            | TokenKind::Mul
            | TokenKind::LBrack
            | TokenKind::Map
            | TokenKind::Chan
            | TokenKind::Func
            | TokenKind::Struct
            | TokenKind::Interface => vec![Param {
                name: None,
                ty: self.parse_type()?,
            }],
            TokenKind::Arrow if self.nth(1) == TokenKind::Chan => vec![Param {
                name: None,
                ty: self.parse_type()?,
            }],
            _ => Vec::new(),
        };

        Ok(FuncType { params, results })
    }

    /// `(a, b int, c string)` or `(int, error)`
    pub(crate) fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let open = self.expect(TokenKind::LParen)?;
        let mut entries = Vec::new();

        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            entries.push(self.parse_list_entry(TokenKind::RParen, Self::parse_param_type)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        let named = entries.iter().any(|e| matches!(e, ListEntry::Named(..)));
        if !named {
            return Ok(entries
                .into_iter()
                .map(|entry| match entry {
                    ListEntry::Bare(name) => Param {
                        name: None,
                        ty: TypeExpr::Name {
                            package: None,
                            name,
                            args: Vec::new(),
                        },
                    },
                    ListEntry::Type(ty) | ListEntry::Named(_, ty) => Param { name: None, ty },
                })
                .collect());
        }

        // `a, b int` shares the type with every pending name
        let mut params = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();
        for entry in entries {
            match entry {
                ListEntry::Bare(name) => pending.push(name),
                ListEntry::Named(name, ty) => {
                    for waiting in pending.drain(..) {
                        params.push(Param {
                            name: Some(waiting),
                            ty: ty.clone(),
                        });
                    }
                    params.push(Param { name: Some(name), ty });
                }
                ListEntry::Type(_) => {
                    return Err(self.error_at(&open, "mixed named and unnamed parameters"));
                }
            }
        }
        if !pending.is_empty() {
            return Err(self.error_at(&open, "mixed named and unnamed parameters"));
        }

        Ok(params)
    }

    /// Parse `name Type`, a bare `name` or an unnamed `Type`
    fn parse_list_entry(
        &mut self,
        close: TokenKind,
        parse_type: fn(&mut Self) -> ParseResult<TypeExpr>,
    ) -> ParseResult<ListEntry> {
        if !self.at(TokenKind::Ident) {
            return Ok(ListEntry::Type(parse_type(self)?));
        }

        match self.nth(1) {
            TokenKind::Comma => Ok(ListEntry::Bare(self.ident()?)),
            kind if kind == close => Ok(ListEntry::Bare(self.ident()?)),
            TokenKind::Period => Ok(ListEntry::Type(parse_type(self)?)),
            TokenKind::LBrack => {
                // `a []int` and `a [4]int` versus the instantiated `List[T]`
                let save = self.pos;
                let attempt = self.ident().and_then(|name| Ok((name, parse_type(self)?)));
                match attempt {
                    Ok((name, ty)) if self.at(TokenKind::Comma) || self.at(close) => {
                        Ok(ListEntry::Named(name, ty))
                    }
                    _ => {
                        self.pos = save;
                        Ok(ListEntry::Type(parse_type(self)?))
                    }
                }
            }
            _ => {
                let name = self.ident()?;
                Ok(ListEntry::Named(name, parse_type(self)?))
            }
        }
    }

    /// `[K comparable, V any]`
    pub(crate) fn parse_type_params(&mut self) -> ParseResult<Vec<TypeParam>> {
        let open = self.expect(TokenKind::LBrack)?;
        let mut entries = Vec::new();

        while !self.at(TokenKind::RBrack) && !self.at(TokenKind::Eof) {
            entries.push(self.parse_list_entry(TokenKind::RBrack, Self::parse_constraint)?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrack)?;

        let mut params = Vec::new();
        let mut pending: Vec<Ident> = Vec::new();
        for entry in entries {
            match entry {
                ListEntry::Bare(name) => pending.push(name),
                ListEntry::Named(name, constraint) => {
                    pending.push(name);
                    params.push(TypeParam {
                        names: std::mem::take(&mut pending),
                        constraint,
                    });
                }
                ListEntry::Type(_) => return Err(self.error_at(&open, "type parameter needs a name")),
            }
        }
        if !pending.is_empty() {
            return Err(self.error_at(&open, "type parameters need a constraint"));
        }

        Ok(params)
    }

    /// A constraint element: a type or a union of `~T` terms
    fn parse_constraint(&mut self) -> ParseResult<TypeExpr> {
        let mut terms = vec![self.parse_union_term()?];
        while self.eat(TokenKind::Or) {
            terms.push(self.parse_union_term()?);
        }

        if terms.len() == 1 && !terms[0].tilde {
            if let Some(term) = terms.pop() {
                return Ok(term.ty);
            }
        }
        Ok(TypeExpr::Union(terms))
    }

    fn parse_union_term(&mut self) -> ParseResult<UnionTerm> {
        let tilde = self.eat(TokenKind::Tilde);
        Ok(UnionTerm {
            tilde,
            ty: self.parse_type()?,
        })
    }

    fn parse_struct_type(&mut self) -> ParseResult<TypeExpr> {
        self.expect(TokenKind::Struct)?;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            fields.push(self.parse_field_decl()?);
            self.expect_semi()?;
        }
        self.expect(TokenKind::RBrace)?;

        Ok(TypeExpr::Struct(fields))
    }

    fn parse_field_decl(&mut self) -> ParseResult<FieldDecl> {
        let (names, ty) = match (self.kind(), self.nth(1)) {
            (TokenKind::Mul, _) => {
                self.bump();
                (Vec::new(), TypeExpr::Pointer(Box::new(self.parse_type_name()?)))
            }
            (TokenKind::Ident, TokenKind::Period)
            | (TokenKind::Ident, TokenKind::Semicolon)
            | (TokenKind::Ident, TokenKind::RBrace)
            | (TokenKind::Ident, TokenKind::String) => (Vec::new(), self.parse_type_name()?),
            (TokenKind::Ident, TokenKind::LBrack) => {
                let save = self.pos;
                let attempt = self.ident().and_then(|name| Ok((name, self.parse_type()?)));
                match attempt {
                    Ok((name, ty))
                        if matches!(self.kind(), TokenKind::Semicolon | TokenKind::RBrace | TokenKind::String) =>
                    {
                        (vec![name], ty)
                    }
                    _ => {
                        self.pos = save;
                        (Vec::new(), self.parse_type_name()?)
                    }
                }
            }
            (TokenKind::Ident, _) => {
                let names = self.ident_list()?;
                (names, self.parse_type()?)
            }
            _ => return Err(self.unexpected("field name or embedded type")),
        };

        let tag = if self.at(TokenKind::String) {
            let token = self.bump();
            Some(unquote(token.text(self.source)))
        } else {
            None
        };

        Ok(FieldDecl { names, ty, tag })
    }

    fn parse_interface_type(&mut self) -> ParseResult<TypeExpr> {
        self.expect(TokenKind::Interface)?;
        self.expect(TokenKind::LBrace)?;

        let mut elems = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            if self.at(TokenKind::Ident) && self.nth(1) == TokenKind::LParen {
                let doc = self.lead_doc();
                let name = self.ident()?;
                let signature = self.parse_signature()?;
                elems.push(InterfaceElem::Method { doc, name, signature });
            } else {
                elems.push(InterfaceElem::Embedded(self.parse_constraint()?));
            }
            self.expect_semi()?;
        }
        self.expect(TokenKind::RBrace)?;

        Ok(TypeExpr::Interface(elems))
    }
}
