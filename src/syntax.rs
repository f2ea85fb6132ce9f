//! Syntax module for DCP statements
//!
//! Turns one line of text into an annotated [`Statement`](crate::ast::Statement)
//! or a declaration. The [`lexer`] is stateless and the [`parser`] only
//! borrows the session state it needs, so both can be driven line by line.

pub mod lexer;
pub mod parser;

pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{parse_line, Line, SymbolTable};
