//! Grammar driver: one line of tokens to a declaration or an annotated statement.
//!
//! Precedence, lowest to highest:
//!
//! | level      | operators          | associativity   |
//! |------------|--------------------|-----------------|
//! | relation   | `==` `<=` `>=`     | non-associative |
//! | additive   | `+` `-`            | left            |
//! | multiply   | `*` `/`            | left            |
//! | unary      | `+` `-` (prefix)   | right           |
//!
//! Arithmetic operators never resolve sign or curvature; they build an
//! unknown/unknown compound. Atom calls take both attributes from the
//! registry regardless of their arguments.
//!
//! The driver owns no state. It reads the symbol table for lookups and only
//! writes to it when a declaration line parses completely.
//!
//! Nesting is capped at [`MAX_NESTING`] levels. Each parenthesis and each
//! prefix operator counts once, each call twice. A line past the cap is
//! rejected like any other malformed line instead of exhausting the stack.

use im::OrdMap;
use tracing::debug;

use crate::ast::{Constraint, Expr, Number, Operand, Relation, Span, Statement};
use crate::atoms::AtomRegistry;
use crate::dcp::Sign;
use crate::diagnostics::{DcpError, SemanticErrorKind, SyntaxErrorKind};
use crate::syntax::lexer::{tokenize, Token, TokenKind};

/// Deepest operand nesting the recursive descent will enter.
pub const MAX_NESTING: usize = 128;

/// Identifier → declared variable or parameter node.
pub type SymbolTable = OrdMap<String, Expr>;

/// What a single line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Nothing but whitespace and comments.
    Empty,
    /// A `variable` or `parameter` line; the names now in the symbol table.
    Declaration { names: Vec<String> },
    /// An expression or constraint to append to the statement list.
    Statement(Statement),
}

/// Parses one line against the given session state.
pub fn parse_line(
    line: &str,
    symbols: &mut SymbolTable,
    atoms: &AtomRegistry,
) -> Result<Line, DcpError> {
    let tokens = tokenize(line)?;
    let Some(first) = tokens.first() else {
        return Ok(Line::Empty);
    };

    let declares_variables = match first.kind {
        TokenKind::Variable => Some(true),
        TokenKind::Parameter => Some(false),
        _ => None,
    };
    if let Some(is_variable) = declares_variables {
        let (sign, names) = declaration(&tokens, line)?;
        for name in &names {
            let node = if is_variable {
                Expr::variable(name.as_str(), sign)
            } else {
                Expr::parameter(name.as_str(), sign)
            };
            symbols.insert(name.clone(), node);
        }
        debug!(?names, %sign, is_variable, "declared symbols");
        return Ok(Line::Declaration { names });
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
        symbols,
        atoms,
    };
    let statement = parser.statement().map_err(|failure| failure.into_error(&tokens, line))?;
    debug!(%statement, "parsed statement");
    Ok(Line::Statement(statement))
}

/// `(variable | parameter) [sign] id+`
fn declaration(tokens: &[Token], line: &str) -> Result<(Sign, Vec<String>), DcpError> {
    let mut rest = &tokens[1..];
    let mut sign = Sign::Unknown;
    if let Some(Token {
        kind: TokenKind::Sign(declared),
        ..
    }) = rest.first()
    {
        sign = *declared;
        rest = &rest[1..];
    }

    let mut names = Vec::with_capacity(rest.len());
    for (offset, token) in rest.iter().enumerate() {
        match &token.kind {
            TokenKind::Identifier(name) => names.push(name.clone()),
            _ => {
                let at = tokens.len() - rest.len() + offset;
                return Err(Failure::Grammar { at }.into_error(tokens, line));
            }
        }
    }
    if names.is_empty() {
        return Err(Failure::Grammar { at: tokens.len() }.into_error(tokens, line));
    }
    Ok((sign, names))
}

// ============================================================================
// FAILURES
// ============================================================================

/// Internal failure of the recursive descent.
///
/// `Grammar` is an unexpected token that may still be recovered by an
/// enclosing call; `Fatal` aborts the line as is.
enum Failure {
    Grammar { at: usize },
    Fatal(DcpError),
}

impl Failure {
    fn into_error(self, tokens: &[Token], line: &str) -> DcpError {
        match self {
            Failure::Fatal(err) => err,
            Failure::Grammar { at } => DcpError::syntax(
                SyntaxErrorKind::InvalidExpression {
                    line: line.to_string(),
                },
                span_at(tokens, at, line),
            ),
        }
    }
}

impl From<DcpError> for Failure {
    fn from(err: DcpError) -> Self {
        Failure::Fatal(err)
    }
}

fn span_at(tokens: &[Token], at: usize, line: &str) -> Span {
    tokens
        .get(at)
        .map(|token| token.span)
        .unwrap_or_else(|| Span::new(line.len(), line.len()))
}

type PResult<T> = Result<T, Failure>;

// ============================================================================
// RECURSIVE DESCENT
// ============================================================================

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    symbols: &'a SymbolTable,
    atoms: &'a AtomRegistry,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos).map(|token| &token.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos + offset).map(|token| &token.kind)
    }

    fn bump(&mut self) -> &'a Token {
        let token = &self.tokens[self.pos];
        self.pos += 1;
        token
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<&'a Token> {
        if self.peek() == Some(kind) {
            Ok(self.bump())
        } else {
            Err(Failure::Grammar { at: self.pos })
        }
    }

    /// Runs `rule` one nesting level deeper.
    fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(Failure::Grammar { at: self.pos });
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn span_from(&self, start: usize) -> Span {
        let first = self.tokens[start].span;
        let last = self.tokens[self.pos.saturating_sub(1).max(start)].span;
        first.to(last)
    }

    /// A whole expression line: one expression, at most one relation, and
    /// nothing after it.
    fn statement(&mut self) -> PResult<Statement> {
        let lhs = self.additive()?;
        let statement = match self.peek().and_then(relation_of) {
            Some(relation) => {
                self.bump();
                let rhs = self.additive()?;
                if self.peek().and_then(relation_of).is_some() {
                    let token = &self.tokens[self.pos];
                    return Err(DcpError::syntax(SyntaxErrorKind::ChainedConstraint, token.span).into());
                }
                Statement::Constraint(Constraint { relation, lhs, rhs })
            }
            None => Statement::Expr(lhs),
        };

        if self.pos < self.tokens.len() {
            let first = self.tokens[self.pos].span;
            let last = self.tokens[self.tokens.len() - 1].span;
            return Err(DcpError::syntax(
                SyntaxErrorKind::TrailingInput {
                    after: statement.to_string(),
                },
                first.to(last),
            )
            .into());
        }
        Ok(statement)
    }

    fn additive(&mut self) -> PResult<Expr> {
        let mut lhs = self.multiplicative()?;
        while let Some(symbol) = self.peek().and_then(additive_symbol) {
            self.bump();
            let rhs = self.multiplicative()?;
            lhs = Expr::operator(symbol, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> PResult<Expr> {
        let mut lhs = self.unary()?;
        while let Some(symbol) = self.peek().and_then(multiplicative_symbol) {
            self.bump();
            let rhs = self.unary()?;
            lhs = Expr::operator(symbol, vec![lhs, rhs]);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> PResult<Expr> {
        self.nested(Self::prefixed)
    }

    fn prefixed(&mut self) -> PResult<Expr> {
        match self.peek() {
            Some(TokenKind::Plus) => {
                self.bump();
                self.unary()
            }
            Some(TokenKind::Minus) => {
                self.bump();
                let operand = self.unary()?;
                Ok(Expr::operator("-", vec![operand]))
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> PResult<Expr> {
        match self.peek() {
            Some(TokenKind::Integer(n)) => {
                self.bump();
                Ok(Expr::constant(Number::Integer(*n)))
            }
            Some(TokenKind::Float(x)) => {
                self.bump();
                Ok(Expr::constant(Number::Float(*x)))
            }
            Some(TokenKind::Identifier(name)) => {
                if self.peek_at(1) == Some(&TokenKind::LeftParen) {
                    return self.nested(|parser| parser.call(name));
                }
                let token = self.bump();
                self.symbols.get(name).cloned().ok_or_else(|| {
                    DcpError::semantic(
                        SemanticErrorKind::UnknownSymbol { name: name.clone() },
                        token.span,
                    )
                    .into()
                })
            }
            Some(TokenKind::LeftParen) => {
                self.bump();
                let inner = self.additive()?;
                self.expect(&TokenKind::RightParen)?;
                Ok(inner.with_parens())
            }
            _ => Err(Failure::Grammar { at: self.pos }),
        }
    }

    /// `name ( slot (, slot)* )`. A grammar failure inside the parentheses
    /// is reported against the call when a closing parenthesis follows it.
    fn call(&mut self, name: &str) -> PResult<Expr> {
        let start = self.pos;
        self.bump();
        self.bump();

        let args = match self.arguments() {
            Ok(args) => args,
            Err(Failure::Grammar { at }) => {
                let closes = self.tokens[at..]
                    .iter()
                    .any(|token| token.kind == TokenKind::RightParen);
                if !closes {
                    return Err(Failure::Grammar { at });
                }
                let end = self.tokens.len() - 1;
                return Err(DcpError::syntax(
                    SyntaxErrorKind::MalformedCall {
                        function: name.to_string(),
                    },
                    self.tokens[start].span.to(self.tokens[end].span),
                )
                .into());
            }
            Err(fatal) => return Err(fatal),
        };

        let span = self.span_from(start);
        let atom = self.atoms.get(name).ok_or_else(|| {
            DcpError::semantic(
                SemanticErrorKind::UnknownFunction {
                    name: name.to_string(),
                },
                self.tokens[start].span,
            )
        })?;
        if !atom.accepts(args.len()) {
            return Err(DcpError::semantic(
                SemanticErrorKind::ArityMismatch {
                    name: name.to_string(),
                    expected: atom.arity.unwrap_or_default(),
                    found: args.len(),
                },
                span,
            )
            .into());
        }
        Ok(Expr::compound(name, atom.sign, atom.curvature, args))
    }

    /// Argument slots up to and including the closing parenthesis.
    fn arguments(&mut self) -> PResult<Vec<Operand>> {
        let mut args = Vec::new();
        loop {
            args.push(self.slot()?);
            match self.peek() {
                Some(TokenKind::Comma) => {
                    self.bump();
                }
                Some(TokenKind::RightParen) => {
                    self.bump();
                    return Ok(args);
                }
                _ => return Err(Failure::Grammar { at: self.pos }),
            }
        }
    }

    fn slot(&mut self) -> PResult<Operand> {
        match self.peek() {
            Some(TokenKind::Comma | TokenKind::RightParen) => Ok(Operand::Empty),
            Some(TokenKind::Infinity) => {
                self.bump();
                Ok(Operand::Literal("Inf".to_string()))
            }
            _ => self.additive().map(Operand::Expr),
        }
    }
}

fn relation_of(kind: &TokenKind) -> Option<Relation> {
    match kind {
        TokenKind::EqualEqual => Some(Relation::Equal),
        TokenKind::LessEqual => Some(Relation::LessOrEqual),
        TokenKind::GreaterEqual => Some(Relation::GreaterOrEqual),
        _ => None,
    }
}

fn additive_symbol(kind: &TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Plus => Some("+"),
        TokenKind::Minus => Some("-"),
        _ => None,
    }
}

fn multiplicative_symbol(kind: &TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Star => Some("*"),
        TokenKind::Slash => Some("/"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcp::Curvature;
    use crate::diagnostics::ErrorType;

    fn symbols_with(names: &[&str]) -> SymbolTable {
        let mut symbols = SymbolTable::new();
        for name in names {
            symbols.insert(name.to_string(), Expr::variable(*name, Sign::Unknown));
        }
        symbols
    }

    fn statement(line: &str, symbols: &mut SymbolTable) -> Statement {
        match parse_line(line, symbols, &AtomRegistry::standard()).unwrap() {
            Line::Statement(statement) => statement,
            other => panic!("expected a statement, got {other:?}"),
        }
    }

    fn error(line: &str, symbols: &mut SymbolTable) -> DcpError {
        parse_line(line, symbols, &AtomRegistry::standard()).unwrap_err()
    }

    #[test]
    fn test_precedence() {
        let mut symbols = symbols_with(&["x", "y", "z"]);
        let parsed = statement("x + y * z", &mut symbols);
        let expr = parsed.as_expr().unwrap();
        assert_eq!(expr.name(), "+");
        let Operand::Expr(rhs) = &expr.children()[1] else {
            panic!("expected an expression operand");
        };
        assert_eq!(rhs.name(), "*");
    }

    #[test]
    fn test_left_associativity() {
        let mut symbols = symbols_with(&["x", "y", "z"]);
        let parsed = statement("x - y - z", &mut symbols);
        let expr = parsed.as_expr().unwrap();
        let Operand::Expr(lhs) = &expr.children()[0] else {
            panic!("expected an expression operand");
        };
        assert_eq!(lhs.to_string(), "x - y");
        assert_eq!(expr.children()[1], Operand::Expr(Expr::variable("z", Sign::Unknown)));
    }

    #[test]
    fn test_unary_binds_tightest() {
        let mut symbols = symbols_with(&["x", "y"]);
        let parsed = statement("-x * y", &mut symbols);
        let expr = parsed.as_expr().unwrap();
        assert_eq!(expr.name(), "*");
        let Operand::Expr(lhs) = &expr.children()[0] else {
            panic!("expected an expression operand");
        };
        assert_eq!(lhs.name(), "-");
        assert_eq!(lhs.children().len(), 1);
    }

    #[test]
    fn test_unary_plus_is_a_no_op() {
        let mut symbols = symbols_with(&["x"]);
        let parsed = statement("+x", &mut symbols);
        assert_eq!(parsed, Statement::Expr(Expr::variable("x", Sign::Unknown)));
    }

    #[test]
    fn test_arithmetic_is_unknown() {
        let mut symbols = SymbolTable::new();
        symbols.insert("x".into(), Expr::variable("x", Sign::Positive));
        let parsed = statement("square(x) + square(x)", &mut symbols);
        let expr = parsed.as_expr().unwrap();
        assert_eq!(expr.sign(), Sign::Unknown);
        assert_eq!(expr.curvature(), Curvature::Unknown);
    }

    #[test]
    fn test_parenthesized_sets_flag_only() {
        let mut symbols = symbols_with(&["x", "y"]);
        let parsed = statement("(x + y)", &mut symbols);
        let expr = parsed.as_expr().unwrap();
        assert!(expr.parens);
        assert_eq!(expr.name(), "+");
    }

    #[test]
    fn test_call_slots() {
        let mut symbols = symbols_with(&["x"]);
        let parsed = statement("max(x, , Inf)", &mut symbols);
        let expr = parsed.as_expr().unwrap();
        assert_eq!(
            expr.children(),
            &[
                Operand::Expr(Expr::variable("x", Sign::Unknown)),
                Operand::Empty,
                Operand::Literal("Inf".into()),
            ]
        );
    }

    #[test]
    fn test_empty_call_has_one_empty_slot() {
        let mut symbols = SymbolTable::new();
        let parsed = statement("square()", &mut symbols);
        assert_eq!(parsed.as_expr().unwrap().children(), &[Operand::Empty]);
    }

    #[test]
    fn test_declaration() {
        let mut symbols = SymbolTable::new();
        let line = parse_line("parameter negative a b", &mut symbols, &AtomRegistry::standard()).unwrap();
        assert_eq!(
            line,
            Line::Declaration {
                names: vec!["a".into(), "b".into()]
            }
        );
        assert_eq!(symbols.get("b"), Some(&Expr::parameter("b", Sign::Negative)));
    }

    #[test]
    fn test_declaration_is_atomic() {
        let mut symbols = SymbolTable::new();
        let err = error("variable x y 3", &mut symbols);
        assert_eq!(err.to_string(), "'variable x y 3' is not a valid expression.");
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_declaration_needs_a_name() {
        let mut symbols = SymbolTable::new();
        assert_eq!(error("variable", &mut symbols).error_type(), ErrorType::Syntax);
        assert_eq!(error("variable positive", &mut symbols).error_type(), ErrorType::Syntax);
    }

    #[test]
    fn test_trailing_input() {
        let mut symbols = symbols_with(&["x", "y"]);
        let err = error("x + 1 y", &mut symbols);
        assert_eq!(err.to_string(), "Invalid syntax after 'x + 1'.");
        let err = error("x <= y )", &mut symbols);
        assert_eq!(err.to_string(), "Invalid syntax after 'x <= y'.");
    }

    #[test]
    fn test_malformed_call() {
        let mut symbols = symbols_with(&["x", "y"]);
        let err = error("max(x y)", &mut symbols);
        assert_eq!(err.to_string(), "Syntax error in call to 'max'.");
        let err = error("square(Inf + 1)", &mut symbols);
        assert_eq!(err.to_string(), "Syntax error in call to 'square'.");
    }

    #[test]
    fn test_innermost_call_is_blamed() {
        let mut symbols = symbols_with(&["x", "y"]);
        let err = error("max(abs(x +), y)", &mut symbols);
        assert_eq!(err.to_string(), "Syntax error in call to 'abs'.");
    }

    #[test]
    fn test_unclosed_call_is_invalid_expression() {
        let mut symbols = symbols_with(&["x"]);
        let err = error("square(x", &mut symbols);
        assert_eq!(err.to_string(), "'square(x' is not a valid expression.");
    }

    #[test]
    fn test_incomplete_expression() {
        let mut symbols = symbols_with(&["x"]);
        let err = error("x +", &mut symbols);
        assert_eq!(err.to_string(), "'x +' is not a valid expression.");
        assert_eq!(err.span(), Some(Span::new(3, 3)));
        let err = error("(x == x)", &mut symbols);
        assert_eq!(err.error_type(), ErrorType::Syntax);
    }

    #[test]
    fn test_unknown_names() {
        let mut symbols = symbols_with(&["x"]);
        let err = error("foo(x)", &mut symbols);
        assert_eq!(err.to_string(), "'foo' is not a known function.");
        let err = error("x + q", &mut symbols);
        assert_eq!(err.to_string(), "'q' is not a known variable or parameter.");
        assert_eq!(err.span(), Some(Span::new(4, 5)));
    }

    #[test]
    fn test_arity_mismatch() {
        let mut symbols = symbols_with(&["x", "y"]);
        let err = error("pow(x)", &mut symbols);
        assert_eq!(err.to_string(), "Incorrect number of arguments in 'pow'.");
        assert_eq!(err.error_type(), ErrorType::Semantic);
    }

    #[test]
    fn test_chained_constraint() {
        let mut symbols = symbols_with(&["x", "y"]);
        let err = error("x <= y >= q", &mut symbols);
        assert_eq!(err.to_string(), "An expression can only contain one constraint.");
    }

    #[test]
    fn test_nesting_cap() {
        let mut symbols = symbols_with(&["x"]);
        let at_cap = format!("{}x{}", "(".repeat(MAX_NESTING - 1), ")".repeat(MAX_NESTING - 1));
        assert!(statement(&at_cap, &mut symbols).as_expr().unwrap().parens);

        let past_cap = format!("{}x{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        let err = error(&past_cap, &mut symbols);
        assert_eq!(err.to_string(), format!("'{past_cap}' is not a valid expression."));
    }

    #[test]
    fn test_comment_only_line() {
        let mut symbols = SymbolTable::new();
        let line = parse_line("   # nothing here", &mut symbols, &AtomRegistry::standard()).unwrap();
        assert_eq!(line, Line::Empty);
    }
}
