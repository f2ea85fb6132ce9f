//! Lexer: one line of text to a token stream.
//!
//! Whitespace and `#` comments are discarded. Identifiers are looked up in a
//! fixed keyword table; anything not found there stays a plain identifier.
//! A handful of single characters that people carry over from other math
//! notations get a tailored error instead of the generic one.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::trace;

use crate::ast::Span;
use crate::dcp::Sign;
use crate::diagnostics::{DcpError, LexErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Integer(i64),
    Float(f64),
    Plus,
    Minus,
    Star,
    Slash,
    EqualEqual,
    LessEqual,
    GreaterEqual,
    LeftParen,
    RightParen,
    Comma,
    Identifier(String),
    /// `variable`
    Variable,
    /// `parameter`
    Parameter,
    /// Any of the sign labels.
    Sign(Sign),
    /// `Inf`, the infinite-bound marker accepted verbatim as a call argument.
    Infinity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert("variable", TokenKind::Variable);
    table.insert("parameter", TokenKind::Parameter);
    for sign in Sign::ALL {
        table.insert(sign.label(), TokenKind::Sign(sign));
    }
    table.insert("Inf", TokenKind::Infinity);
    table
});

/// The keyword token for `text`, if it is reserved.
pub fn keyword(text: &str) -> Option<TokenKind> {
    KEYWORDS.get(text).cloned()
}

/// Whether `text` lexes as exactly one identifier-shaped word.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_char),
        _ => false,
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer { source, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.source[self.pos..].chars().nth(1)
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while matches!(self.peek(), Some(ch) if pred(ch)) {
            self.advance();
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        Token {
            kind,
            span: Span::new(start, self.pos),
        }
    }

    /// A two-character operator whose second character must be `=`.
    fn with_equals(&mut self, kind: TokenKind, lone: LexErrorKind) -> Result<Token, DcpError> {
        let start = self.pos;
        self.advance();
        if self.peek() == Some('=') {
            self.advance();
            Ok(Token {
                kind,
                span: Span::new(start, self.pos),
            })
        } else {
            Err(DcpError::lex(lone, Span::new(start, self.pos)))
        }
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        self.eat_while(is_identifier_char);
        let text = &self.source[start..self.pos];
        let kind = keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()));
        Token {
            kind,
            span: Span::new(start, self.pos),
        }
    }

    /// `\d*\.\d+` is a float, `\d+` an integer.
    fn number(&mut self) -> Result<Token, DcpError> {
        let start = self.pos;
        self.eat_while(|ch| ch.is_ascii_digit());
        let is_float =
            self.peek() == Some('.') && matches!(self.peek_second(), Some(ch) if ch.is_ascii_digit());
        if is_float {
            self.advance();
            self.eat_while(|ch| ch.is_ascii_digit());
        }
        let span = Span::new(start, self.pos);
        let text = &self.source[start..self.pos];
        let integer = if is_float { None } else { text.parse::<i64>().ok() };
        let kind = match integer {
            Some(value) => TokenKind::Integer(value),
            // Floats, and integers too wide for i64, keep their magnitude as f64.
            None => {
                let value = text.parse::<f64>().map_err(|_| {
                    DcpError::lex(LexErrorKind::IllegalCharacter('.'), span)
                })?;
                TokenKind::Float(value)
            }
        };
        Ok(Token { kind, span })
    }

    fn next_token(&mut self) -> Result<Option<Token>, DcpError> {
        loop {
            match self.peek() {
                None => return Ok(None),
                Some(' ' | '\t' | '\r' | '\n') => self.advance(),
                Some('#') => self.eat_while(|ch| ch != '\n'),
                Some(_) => break,
            }
        }
        let start = self.pos;
        let token = match self.peek() {
            Some(ch) if is_identifier_start(ch) => self.word(),
            Some(ch) if ch.is_ascii_digit() => self.number()?,
            Some('.') if matches!(self.peek_second(), Some(ch) if ch.is_ascii_digit()) => {
                self.number()?
            }
            Some('+') => self.single(TokenKind::Plus),
            Some('-') => self.single(TokenKind::Minus),
            Some('*') => self.single(TokenKind::Star),
            Some('/') => self.single(TokenKind::Slash),
            Some('(') => self.single(TokenKind::LeftParen),
            Some(')') => self.single(TokenKind::RightParen),
            Some(',') => self.single(TokenKind::Comma),
            Some('=') => self.with_equals(TokenKind::EqualEqual, LexErrorKind::SingleEquals)?,
            Some('<') => self.with_equals(TokenKind::LessEqual, LexErrorKind::StrictLess)?,
            Some('>') => self.with_equals(TokenKind::GreaterEqual, LexErrorKind::StrictGreater)?,
            Some('^') => {
                return Err(DcpError::lex(
                    LexErrorKind::Exponent,
                    Span::new(start, start + 1),
                ))
            }
            Some(other) => {
                return Err(DcpError::lex(
                    LexErrorKind::IllegalCharacter(other),
                    Span::new(start, start + other.len_utf8()),
                ))
            }
            None => return Ok(None),
        };
        Ok(Some(token))
    }
}

/// Tokenizes one line. The first malformed character aborts the line.
pub fn tokenize(line: &str) -> Result<Vec<Token>, DcpError> {
    let mut lexer = Lexer::new(line);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    trace!(count = tokens.len(), "tokenized line");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;

    fn kinds(line: &str) -> Vec<TokenKind> {
        tokenize(line)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_operators_and_literals() {
        assert_eq!(
            kinds("3 + x1 * .5 - 2.25 / (y)"),
            vec![
                TokenKind::Integer(3),
                TokenKind::Plus,
                TokenKind::Identifier("x1".into()),
                TokenKind::Star,
                TokenKind::Float(0.5),
                TokenKind::Minus,
                TokenKind::Float(2.25),
                TokenKind::Slash,
                TokenKind::LeftParen,
                TokenKind::Identifier("y".into()),
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn test_relations() {
        assert_eq!(
            kinds("a == b <= c >= d"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::EqualEqual,
                TokenKind::Identifier("b".into()),
                TokenKind::LessEqual,
                TokenKind::Identifier("c".into()),
                TokenKind::GreaterEqual,
                TokenKind::Identifier("d".into()),
            ]
        );
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("variable positive x parameter unknown Inf inf"),
            vec![
                TokenKind::Variable,
                TokenKind::Sign(Sign::Positive),
                TokenKind::Identifier("x".into()),
                TokenKind::Parameter,
                TokenKind::Sign(Sign::Unknown),
                TokenKind::Infinity,
                TokenKind::Identifier("inf".into()),
            ]
        );
        // Keyword lookup is exact text, not prefix.
        assert_eq!(kinds("variables"), vec![TokenKind::Identifier("variables".into())]);
    }

    #[test]
    fn test_comments_and_whitespace_are_dropped() {
        assert_eq!(kinds("  x\t# trailing == comment"), vec![TokenKind::Identifier("x".into())]);
        assert!(kinds("# only a comment").is_empty());
        assert!(kinds("").is_empty());
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("ab <= 10").unwrap();
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(3, 5));
        assert_eq!(tokens[2].span, Span::new(6, 8));
    }

    #[test]
    fn test_trailing_dot_is_illegal() {
        let err = tokenize("1.").unwrap_err();
        assert_eq!(err.to_string(), "Illegal character '.'.");
    }

    #[test]
    fn test_tailored_messages() {
        let cases = [
            ("x = 2", "'=' is not valid. Did you mean '=='?"),
            ("x < 2", "'<' constraints are not valid. Consider using '<='."),
            ("x > 2", "'>' constraints are not valid. Consider using '>='."),
            ("x ^ 2", "'^' is not valid. Consider using the 'pow' function."),
            ("x $ 2", "Illegal character '$'."),
        ];
        for (line, message) in cases {
            let err = tokenize(line).unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Lex);
            assert_eq!(err.to_string(), message);
            assert_eq!(err.span().map(|s| s.start), Some(2));
        }
    }

    #[test]
    fn test_wide_integer_literal() {
        let tokens = tokenize("99999999999999999999").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Float(1e20));
        assert_eq!(tokens[0].span, Span::new(0, 20));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("norm_inf"));
        assert!(is_identifier("_x9"));
        assert!(!is_identifier("9x"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }
}
