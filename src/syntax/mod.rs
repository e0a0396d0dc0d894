//! Go front end: lexer, doc comments and a parser for top-level declarations.

pub mod ast;
pub mod comments;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::File;
pub use comments::{Comment, CommentGroup};
pub use error::{ParseError, ParseResult};
pub use lexer::tokenize;
pub use parser::{parse_file, unquote};
pub use token::{Token, TokenKind};
