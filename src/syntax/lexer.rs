//! Hand-written lexer for Go source.
//!
//! Produces the token stream with automatic semicolons already inserted and
//! keeps comments on the side so the parser can attach doc comments.

use crate::syntax::comments::Comment;
use crate::syntax::error::ParseError;
use crate::syntax::token::{Token, TokenKind};

/// Operators ordered so that longer spellings are tried first
const OPERATORS: &[(&str, TokenKind)] = &[
    ("<<=", TokenKind::AssignOp),
    (">>=", TokenKind::AssignOp),
    ("&^=", TokenKind::AssignOp),
    ("...", TokenKind::Ellipsis),
    ("&&", TokenKind::LAnd),
    ("||", TokenKind::LOr),
    ("<-", TokenKind::Arrow),
    ("++", TokenKind::Inc),
    ("--", TokenKind::Dec),
    ("==", TokenKind::Eql),
    ("!=", TokenKind::Neq),
    ("<=", TokenKind::Leq),
    (">=", TokenKind::Geq),
    (":=", TokenKind::Define),
    ("<<", TokenKind::Shl),
    (">>", TokenKind::Shr),
    ("&^", TokenKind::AndNot),
    ("+=", TokenKind::AssignOp),
    ("-=", TokenKind::AssignOp),
    ("*=", TokenKind::AssignOp),
    ("/=", TokenKind::AssignOp),
    ("%=", TokenKind::AssignOp),
    ("&=", TokenKind::AssignOp),
    ("|=", TokenKind::AssignOp),
    ("^=", TokenKind::AssignOp),
    ("+", TokenKind::Add),
    ("-", TokenKind::Sub),
    ("*", TokenKind::Mul),
    ("/", TokenKind::Quo),
    ("%", TokenKind::Rem),
    ("&", TokenKind::And),
    ("|", TokenKind::Or),
    ("^", TokenKind::Xor),
    ("<", TokenKind::Lss),
    (">", TokenKind::Gtr),
    ("=", TokenKind::Assign),
    ("!", TokenKind::Not),
    ("~", TokenKind::Tilde),
    ("(", TokenKind::LParen),
    ("[", TokenKind::LBrack),
    ("{", TokenKind::LBrace),
    (",", TokenKind::Comma),
    (".", TokenKind::Period),
    (")", TokenKind::RParen),
    ("]", TokenKind::RBrack),
    ("}", TokenKind::RBrace),
    (";", TokenKind::Semicolon),
    (":", TokenKind::Colon),
];

/// Output of lexing one file
#[derive(Debug, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
    insert_semi: bool,
    last_token_line: usize,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            line_start: 0,
            insert_semi: false,
            last_token_line: 0,
            tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Tokenize the whole source
    pub fn tokenize(mut self) -> Result<Lexed, ParseError> {
        loop {
            self.skip_blanks();

            let Some(c) = self.peek() else {
                if self.insert_semi {
                    self.push_implicit_semicolon();
                }
                let eof = self.make_token(TokenKind::Eof, self.pos);
                self.tokens.push(eof);
                break;
            };

            if c == '\n' {
                if self.insert_semi {
                    self.push_implicit_semicolon();
                }
                self.advance();
                continue;
            }

            if self.rest().starts_with("//") || self.rest().starts_with("/*") {
                self.lex_comment()?;
                continue;
            }

            let start = self.pos;
            let kind = if is_letter(c) {
                self.lex_identifier()
            } else if c.is_ascii_digit()
                || (c == '.' && self.peek_nth(1).is_some_and(|n| n.is_ascii_digit()))
            {
                self.lex_number()
            } else if c == '"' {
                self.lex_string()?
            } else if c == '`' {
                self.lex_raw_string()?
            } else if c == '\'' {
                self.lex_rune()?
            } else {
                self.lex_operator()?
            };

            let token = self.make_token(kind, start);
            self.insert_semi = kind.ends_statement();
            self.last_token_line = token.line;
            self.tokens.push(token);
        }

        Ok(Lexed {
            tokens: self.tokens,
            comments: self.comments,
        })
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.line_start = self.pos;
        }
        Some(c)
    }

    fn skip_blanks(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.line, self.pos - self.line_start + 1)
    }

    fn make_token(&self, kind: TokenKind, start: usize) -> Token {
        let line_start = self.source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line = self.line - self.source[start..self.pos].matches('\n').count();
        Token {
            kind,
            start,
            end: self.pos,
            line,
            column: start - line_start + 1,
            implicit: false,
        }
    }

    fn push_implicit_semicolon(&mut self) {
        self.tokens.push(Token {
            kind: TokenKind::Semicolon,
            start: self.pos,
            end: self.pos,
            line: self.line,
            column: self.pos - self.line_start + 1,
            implicit: true,
        });
        self.insert_semi = false;
    }

    fn lex_comment(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        let start_line = self.line;
        let own_line = self.last_token_line != self.line;

        if self.rest().starts_with("//") {
            while let Some(c) = self.peek() {
                if c == '\n' {
                    break;
                }
                self.advance();
            }
        } else {
            self.pos += 2;
            loop {
                if self.rest().starts_with("*/") {
                    self.pos += 2;
                    break;
                }
                if self.advance().is_none() {
                    return Err(ParseError::new("comment not terminated", start_line, 1));
                }
            }
        }

        let text = self.source[start..self.pos].trim_end_matches('\r').to_string();
        let is_line_comment = text.starts_with("//");
        let spans_lines = self.line > start_line;

        // A line comment, or a block comment spanning lines, acts like a newline
        if self.insert_semi && (is_line_comment || spans_lines) {
            let semi_line = start_line;
            self.tokens.push(Token {
                kind: TokenKind::Semicolon,
                start,
                end: start,
                line: semi_line,
                column: 1,
                implicit: true,
            });
            self.insert_semi = false;
        }

        self.comments.push(Comment {
            text,
            start,
            end: self.pos,
            start_line,
            end_line: self.line,
            own_line,
        });
        Ok(())
    }

    fn lex_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_letter(c) || c.is_numeric() {
                self.advance();
            } else {
                break;
            }
        }
        TokenKind::keyword(&self.source[start..self.pos]).unwrap_or(TokenKind::Ident)
    }

    fn lex_number(&mut self) -> TokenKind {
        let start = self.pos;
        let hex = self.rest().starts_with("0x") || self.rest().starts_with("0X");
        let mut kind = TokenKind::Int;

        while let Some(c) = self.peek() {
            let previous = self.source[start..self.pos].chars().last();
            if c == '.' {
                kind = TokenKind::Float;
                self.advance();
            } else if (c == '+' || c == '-')
                && matches!(
                    (hex, previous),
                    (false, Some('e' | 'E')) | (true, Some('p' | 'P'))
                )
            {
                self.advance();
            } else if c.is_ascii_alphanumeric() || c == '_' {
                if !hex && (c == 'e' || c == 'E') || hex && (c == 'p' || c == 'P') {
                    kind = TokenKind::Float;
                }
                self.advance();
            } else {
                break;
            }
        }

        if self.source[start..self.pos].ends_with('i') {
            TokenKind::Imag
        } else {
            kind
        }
    }

    fn lex_string(&mut self) -> Result<TokenKind, ParseError> {
        self.lex_quoted('"', "string literal not terminated")?;
        Ok(TokenKind::String)
    }

    fn lex_raw_string(&mut self) -> Result<TokenKind, ParseError> {
        self.advance();
        loop {
            match self.advance() {
                Some('`') => return Ok(TokenKind::String),
                None => return Err(self.error("raw string literal not terminated")),
                Some(_) => {}
            }
        }
    }

    fn lex_rune(&mut self) -> Result<TokenKind, ParseError> {
        self.lex_quoted('\'', "rune literal not terminated")?;
        Ok(TokenKind::Char)
    }

    /// Consume a single-line literal closed by `quote`, escapes included
    fn lex_quoted(&mut self, quote: char, unterminated: &str) -> Result<(), ParseError> {
        self.advance();
        loop {
            match self.peek() {
                Some('\n') | None => return Err(self.error(unterminated)),
                Some('\\') => {
                    self.advance();
                    if self.peek() == Some('\n') {
                        return Err(self.error(unterminated));
                    }
                    self.advance();
                }
                Some(c) => {
                    self.advance();
                    if c == quote {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn lex_operator(&mut self) -> Result<TokenKind, ParseError> {
        let rest = self.rest();
        for (spelling, kind) in OPERATORS {
            if rest.starts_with(spelling) {
                self.pos += spelling.len();
                return Ok(*kind);
            }
        }
        let c = self.peek().unwrap_or_default();
        Err(self.error(format!("invalid character {:?}", c)))
    }
}

fn is_letter(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Tokenize `source` in one go
pub fn tokenize(source: &str) -> Result<Lexed, ParseError> {
    Lexer::new(source).tokenize()
}
