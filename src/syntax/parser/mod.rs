//! Recursive-descent parser for the declaration level of Go files.
//!
//! The token stream is fully materialized up front, which keeps the few
//! ambiguous spots of the grammar (`a []int` vs `T[int]` in parameter lists,
//! array types vs type parameter lists) cheap to resolve by backtracking.

mod expr;
mod types;

use log::trace;

use crate::syntax::ast::*;
use crate::syntax::comments::{group_comments, CommentGroup};
use crate::syntax::error::{ParseError, ParseResult};
use crate::syntax::lexer::tokenize;
use crate::syntax::token::{Token, TokenKind};

/// Parse one source file; `file` is the file's index within its package
pub fn parse_file(file: usize, source: &str) -> ParseResult<File> {
    let lexed = tokenize(source)?;
    let tokens = lexed.tokens;

    let groups = {
        let starts: Vec<usize> = tokens.iter().filter(|t| !t.implicit).map(|t| t.start).collect();
        group_comments(lexed.comments, |from, to| {
            let first = starts.partition_point(|&start| start < from);
            starts.get(first).is_some_and(|&start| start < to)
        })
    };

    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
        file,
        groups,
    };
    parser.parse_file()
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    file: usize,
    groups: Vec<CommentGroup>,
}

impl<'a> Parser<'a> {
    fn parse_file(&mut self) -> ParseResult<File> {
        self.expect(TokenKind::Package)?;
        let package = self.ident()?;
        self.expect_semi()?;

        let mut imports = Vec::new();
        let mut decls = Vec::new();

        while self.at(TokenKind::Import) {
            let decl = self.parse_gen_decl(DeclKind::Import)?;
            for spec in &decl.specs {
                if let Spec::Import(import) = spec {
                    imports.push(import.clone());
                }
            }
            decls.push(Decl::Gen(decl));
            self.expect_semi()?;
        }

        while !self.at(TokenKind::Eof) {
            let decl = match self.kind() {
                TokenKind::Const => Decl::Gen(self.parse_gen_decl(DeclKind::Const)?),
                TokenKind::Var => Decl::Gen(self.parse_gen_decl(DeclKind::Var)?),
                TokenKind::Type => Decl::Gen(self.parse_gen_decl(DeclKind::Type)?),
                TokenKind::Func => Decl::Func(self.parse_func_decl()?),
                TokenKind::Import => {
                    return Err(self.error("imports must appear before other declarations"));
                }
                TokenKind::Semicolon => {
                    self.bump();
                    continue;
                }
                _ => return Err(self.unexpected("declaration")),
            };
            decls.push(decl);
            self.expect_semi()?;
        }

        trace!("Parsed package {} with {} declaration(s)", package.name, decls.len());

        Ok(File {
            package,
            imports,
            decls,
            comments: std::mem::take(&mut self.groups),
        })
    }

    fn parse_gen_decl(&mut self, kind: DeclKind) -> ParseResult<GenDecl> {
        let doc = self.lead_doc();
        self.bump();

        let mut specs = Vec::new();
        let grouped = self.eat(TokenKind::LParen);

        if grouped {
            let mut iota = 0;
            while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                let spec_doc = self.lead_doc();
                specs.push(self.parse_spec(kind, spec_doc, iota)?);
                iota += 1;
                self.expect_semi()?;
            }
            self.expect(TokenKind::RParen)?;
        } else {
            specs.push(self.parse_spec(kind, None, 0)?);
        }

        Ok(GenDecl {
            doc,
            kind,
            grouped,
            specs,
        })
    }

    fn parse_spec(&mut self, kind: DeclKind, doc: Option<CommentGroup>, iota: usize) -> ParseResult<Spec> {
        match kind {
            DeclKind::Import => self.parse_import_spec().map(Spec::Import),
            DeclKind::Const | DeclKind::Var => self.parse_value_spec(doc, iota).map(Spec::Value),
            DeclKind::Type => self.parse_type_spec(doc).map(Spec::Type),
        }
    }

    fn parse_import_spec(&mut self) -> ParseResult<ImportSpec> {
        let name = match self.kind() {
            TokenKind::Ident => Some(self.ident()?),
            TokenKind::Period => {
                let token = self.bump();
                Some(Ident {
                    name: ".".to_string(),
                    pos: self.pos_of(&token),
                })
            }
            _ => None,
        };

        let token = self.expect(TokenKind::String)?;
        Ok(ImportSpec {
            name,
            path: unquote(token.text(self.source)),
        })
    }

    fn parse_value_spec(&mut self, doc: Option<CommentGroup>, iota: usize) -> ParseResult<ValueSpec> {
        let names = self.ident_list()?;

        let ty = match self.kind() {
            TokenKind::Assign | TokenKind::Semicolon | TokenKind::RParen => None,
            _ => Some(self.parse_type()?),
        };

        let mut values = Vec::new();
        if self.eat(TokenKind::Assign) {
            values.push(self.parse_expr()?);
            while self.eat(TokenKind::Comma) {
                values.push(self.parse_expr()?);
            }
        }

        Ok(ValueSpec {
            doc,
            names,
            ty,
            values,
            iota,
        })
    }

    fn parse_type_spec(&mut self, doc: Option<CommentGroup>) -> ParseResult<TypeSpec> {
        let name = self.ident()?;

        let type_params = if self.at(TokenKind::LBrack) && self.starts_type_params() {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        let alias = self.eat(TokenKind::Assign);
        let ty = self.parse_type()?;

        Ok(TypeSpec {
            doc,
            name,
            type_params,
            alias,
            ty,
        })
    }

    /// Tell `type A[T any] ...` apart from `type A [N]int`
    fn starts_type_params(&self) -> bool {
        if self.nth(1) != TokenKind::Ident {
            return false;
        }
        matches!(
            self.nth(2),
            TokenKind::Ident
                | TokenKind::Comma
                | TokenKind::Tilde
                | TokenKind::Interface
                | TokenKind::LBrack
                | TokenKind::Map
                | TokenKind::Chan
                | TokenKind::Func
                | TokenKind::Struct
                | TokenKind::LParen
        )
    }

    fn parse_func_decl(&mut self) -> ParseResult<FuncDecl> {
        let doc = self.lead_doc();
        self.expect(TokenKind::Func)?;

        let recv = if self.at(TokenKind::LParen) {
            let token = self.peek();
            let mut params = self.parse_params()?;
            if params.len() != 1 {
                return Err(self.error_at(&token, "method has multiple receivers"));
            }
            params.pop()
        } else {
            None
        };

        let name = self.ident()?;
        let type_params = if self.at(TokenKind::LBrack) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };

        let signature = self.parse_signature()?;
        if self.at(TokenKind::LBrace) {
            self.skip_block()?;
        }

        Ok(FuncDecl {
            doc,
            recv,
            name,
            type_params,
            signature,
        })
    }

    /// Skip a brace-delimited block, nested blocks included
    fn skip_block(&mut self) -> ParseResult<()> {
        let open = self.expect(TokenKind::LBrace)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.bump().kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => depth -= 1,
                TokenKind::Eof => return Err(self.error_at(&open, "unclosed block")),
                _ => {}
            }
        }
        Ok(())
    }

    // Token helpers

    fn peek(&self) -> Token {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn bump(&mut self) -> Token {
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    /// Semicolons may be left out before a closing `)` or `}`
    fn expect_semi(&mut self) -> ParseResult<()> {
        match self.kind() {
            TokenKind::Semicolon => {
                self.bump();
                Ok(())
            }
            TokenKind::RParen | TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("newline or ;")),
        }
    }

    fn ident(&mut self) -> ParseResult<Ident> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(Ident {
            name: token.text(self.source).to_string(),
            pos: self.pos_of(&token),
        })
    }

    fn ident_list(&mut self) -> ParseResult<Vec<Ident>> {
        let mut names = vec![self.ident()?];
        while self.eat(TokenKind::Comma) {
            names.push(self.ident()?);
        }
        Ok(names)
    }

    fn pos_of(&self, token: &Token) -> Pos {
        Pos {
            file: self.file,
            offset: token.start,
        }
    }

    /// Text between the start of token `from` and the end of the last consumed token
    fn text_since(&self, from: usize) -> String {
        let start = self.tokens[from].start;
        let end = self.tokens[..self.pos]
            .iter()
            .rev()
            .find(|t| !t.implicit)
            .map(|t| t.end)
            .unwrap_or(start);
        self.source[start..end.max(start)].to_string()
    }

    /// Doc comment group directly above the current token
    fn lead_doc(&self) -> Option<CommentGroup> {
        let token = self.peek();
        let group = self.groups.iter().rev().find(|g| g.end() <= token.start)?;

        let first = group.comments.first()?;
        if !first.own_line || group.end_line() + 1 != token.line {
            return None;
        }

        let previous_end = self.tokens[..self.pos]
            .iter()
            .rev()
            .find(|t| !t.implicit)
            .map(|t| t.end)
            .unwrap_or(0);
        if previous_end > group.start() {
            return None;
        }

        Some(group.clone())
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let token = self.peek();
        self.error_at(&token, message)
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> ParseError {
        ParseError::new(message, token.line, token.column)
    }

    fn unexpected(&self, wanted: &str) -> ParseError {
        let token = self.peek();
        let found = if token.implicit {
            "newline".to_string()
        } else if token.kind == TokenKind::Eof {
            "EOF".to_string()
        } else {
            token.text(self.source).to_string()
        };
        self.error(format!("expected {}, found {}", wanted, found))
    }
}

/// Decode a Go string literal, interpreted or raw
pub fn unquote(literal: &str) -> String {
    if let Some(raw) = literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return raw.replace('\r', "");
    }

    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| literal.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };

        let decoded = match escape {
            'a' => Some('\u{07}'),
            'b' => Some('\u{08}'),
            'f' => Some('\u{0C}'),
            'n' => Some('\n'),
            'r' => Some('\r'),
            't' => Some('\t'),
            'v' => Some('\u{0B}'),
            '\\' => Some('\\'),
            '\'' => Some('\''),
            '"' => Some('"'),
            'x' => read_code_point(&mut chars, 2, 16),
            'u' => read_code_point(&mut chars, 4, 16),
            'U' => read_code_point(&mut chars, 8, 16),
            '0'..='7' => {
                let mut digits = escape.to_string();
                for _ in 0..2 {
                    if let Some(d) = chars.next() {
                        digits.push(d);
                    }
                }
                u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32)
            }
            _ => None,
        };

        match decoded {
            Some(c) => out.push(c),
            None => {
                out.push('\\');
                out.push(escape);
            }
        }
    }

    out
}

fn read_code_point(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, len: usize, radix: u32) -> Option<char> {
    let digits: String = (0..len).filter_map(|_| chars.next()).collect();
    u32::from_str_radix(&digits, radix).ok().and_then(char::from_u32)
}
