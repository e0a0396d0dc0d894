//! Expressions found in package-level initializers and array lengths.

use crate::syntax::ast::*;
use crate::syntax::error::ParseResult;
use crate::syntax::parser::Parser;
use crate::syntax::token::TokenKind;

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::LOr => BinaryOp::LOr,
        TokenKind::LAnd => BinaryOp::LAnd,
        TokenKind::Eql => BinaryOp::Eql,
        TokenKind::Neq => BinaryOp::Neq,
        TokenKind::Lss => BinaryOp::Lss,
        TokenKind::Leq => BinaryOp::Leq,
        TokenKind::Gtr => BinaryOp::Gtr,
        TokenKind::Geq => BinaryOp::Geq,
        TokenKind::Add => BinaryOp::Add,
        TokenKind::Sub => BinaryOp::Sub,
        TokenKind::Or => BinaryOp::Or,
        TokenKind::Xor => BinaryOp::Xor,
        TokenKind::Mul => BinaryOp::Mul,
        TokenKind::Quo => BinaryOp::Quo,
        TokenKind::Rem => BinaryOp::Rem,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::And => BinaryOp::And,
        TokenKind::AndNot => BinaryOp::AndNot,
        _ => return None,
    };
    Some(op)
}

fn unary_op(kind: TokenKind) -> Option<UnaryOp> {
    let op = match kind {
        TokenKind::Add => UnaryOp::Plus,
        TokenKind::Sub => UnaryOp::Neg,
        TokenKind::Not => UnaryOp::Not,
        TokenKind::Xor => UnaryOp::Xor,
        TokenKind::Mul => UnaryOp::Deref,
        TokenKind::And => UnaryOp::Addr,
        TokenKind::Arrow => UnaryOp::Recv,
        TokenKind::Tilde => UnaryOp::Tilde,
        _ => return None,
    };
    Some(op)
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_binary(1)
    }

    /// Precedence climbing; all binary operators are left associative
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expr> {
        let start = self.pos;
        let mut lhs = self.parse_unary()?;

        while let Some(op) = binary_op(self.kind()) {
            if op.precedence() < min_precedence {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(op.precedence() + 1)?;
            lhs = self.finish(start, ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)));
        }

        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let start = self.pos;

        // `<-chan T` is a type, not a receive
        if self.at(TokenKind::Arrow) && self.nth(1) == TokenKind::Chan {
            let ty = self.parse_type()?;
            let operand = self.finish(start, ExprKind::Type(ty));
            return self.parse_suffixes(start, operand);
        }

        if let Some(op) = unary_op(self.kind()) {
            self.bump();
            let operand = self.parse_unary()?;
            return Ok(self.finish(start, ExprKind::Unary(op, Box::new(operand))));
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let start = self.pos;
        let operand = self.parse_operand()?;
        self.parse_suffixes(start, operand)
    }

    fn parse_operand(&mut self) -> ParseResult<Expr> {
        let start = self.pos;

        let kind = match self.kind() {
            TokenKind::Int | TokenKind::Float | TokenKind::Imag | TokenKind::Char | TokenKind::String => {
                let token = self.bump();
                let lit = match token.kind {
                    TokenKind::Int => LitKind::Int,
                    TokenKind::Float => LitKind::Float,
                    TokenKind::Imag => LitKind::Imag,
                    TokenKind::Char => LitKind::Char,
                    _ => LitKind::String,
                };
                ExprKind::BasicLit(lit, token.text(self.source).to_string())
            }
            TokenKind::Ident => ExprKind::Ident(self.ident()?),
            TokenKind::LParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            TokenKind::Func => {
                self.bump();
                let signature = self.parse_signature()?;
                if self.at(TokenKind::LBrace) {
                    self.skip_block()?;
                    ExprKind::FuncLit(signature)
                } else {
                    ExprKind::Type(TypeExpr::Func(signature))
                }
            }
            TokenKind::LBrack | TokenKind::Map | TokenKind::Chan | TokenKind::Struct | TokenKind::Interface => {
                ExprKind::Type(self.parse_type()?)
            }
            _ => return Err(self.unexpected("expression")),
        };

        Ok(self.finish(start, kind))
    }

    fn parse_suffixes(&mut self, start: usize, mut expr: Expr) -> ParseResult<Expr> {
        loop {
            let kind = match self.kind() {
                TokenKind::Period => {
                    self.bump();
                    if self.eat(TokenKind::LParen) {
                        let ty = if self.eat(TokenKind::Type) {
                            None
                        } else {
                            Some(self.parse_type()?)
                        };
                        self.expect(TokenKind::RParen)?;
                        ExprKind::TypeAssert(Box::new(expr), ty)
                    } else {
                        let field = self.ident()?;
                        ExprKind::Selector(Box::new(expr), field)
                    }
                }
                TokenKind::LBrack => {
                    self.bump();
                    self.parse_index_or_slice(expr)?
                }
                TokenKind::LParen => {
                    self.bump();
                    let mut args = Vec::new();
                    while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
                        args.push(self.parse_expr()?);
                        self.eat(TokenKind::Ellipsis);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen)?;
                    ExprKind::Call {
                        fun: Box::new(expr),
                        args,
                    }
                }
                TokenKind::LBrace if expr.as_type().is_some() => {
                    let ty = expr.as_type();
                    let elements = self.parse_composite_body()?;
                    ExprKind::Composite { ty, elements }
                }
                _ => break,
            };
            expr = self.finish(start, kind);
        }

        Ok(expr)
    }

    fn parse_index_or_slice(&mut self, base: Expr) -> ParseResult<ExprKind> {
        if self.at(TokenKind::Colon) {
            self.skip_slice_bounds()?;
            return Ok(ExprKind::Slice(Box::new(base)));
        }

        // Type literals are allowed here for instantiations like `F[[]int]`
        let first = self.parse_expr()?;
        if self.at(TokenKind::Colon) {
            self.skip_slice_bounds()?;
            return Ok(ExprKind::Slice(Box::new(base)));
        }

        let mut indices = vec![first];
        while self.eat(TokenKind::Comma) {
            if self.at(TokenKind::RBrack) {
                break;
            }
            indices.push(self.parse_expr()?);
        }
        self.expect(TokenKind::RBrack)?;

        Ok(ExprKind::Index(Box::new(base), indices))
    }

    fn skip_slice_bounds(&mut self) -> ParseResult<()> {
        while self.eat(TokenKind::Colon) {
            if !self.at(TokenKind::Colon) && !self.at(TokenKind::RBrack) {
                self.parse_expr()?;
            }
        }
        self.expect(TokenKind::RBrack)?;
        Ok(())
    }

    /// `{a, b}`, `{k: v}` and nested literals with elided types
    fn parse_composite_body(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(TokenKind::LBrace)?;

        let mut elements = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            let start = self.pos;
            let key = self.parse_element()?;
            let element = if self.eat(TokenKind::Colon) {
                let value = self.parse_element()?;
                self.finish(start, ExprKind::KeyValue(Box::new(key), Box::new(value)))
            } else {
                key
            };
            elements.push(element);

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        Ok(elements)
    }

    fn parse_element(&mut self) -> ParseResult<Expr> {
        if self.at(TokenKind::LBrace) {
            let start = self.pos;
            let elements = self.parse_composite_body()?;
            Ok(self.finish(start, ExprKind::Composite { ty: None, elements }))
        } else {
            self.parse_expr()
        }
    }

    fn finish(&self, start: usize, kind: ExprKind) -> Expr {
        Expr {
            kind,
            text: self.text_since(start),
        }
    }
}
