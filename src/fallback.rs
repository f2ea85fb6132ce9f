//! Degraded-mode classifier used when the grammar parser is unavailable.
//!
//! The scanner looks at one statement at a time without tokenizing it. It
//! recognizes declaration prefixes, finds the leftmost atom call anywhere in
//! the text, and otherwise falls back to symbol lookup, a float literal or an
//! opaque leaf. Nothing in here fails on bad input.
//!
//! When several atoms are called on one line the leftmost call in the text
//! wins, not the first atom in registry order: `exp(x) + square(y)` is
//! classified as `exp`.

use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::ast::{Expr, Number, Operand, Span, Statement};
use crate::atoms::AtomRegistry;
use crate::dcp::{Curvature, Sign};
use crate::diagnostics::{DcpError, SyntaxErrorKind};
use crate::syntax::SymbolTable;

/// Atoms that get a synthetic `x` argument so the rendered tree has a child.
const SINGLE_ARGUMENT_ATOMS: [&str; 6] = ["square", "sqrt", "abs", "exp", "log", "pos"];

#[derive(Debug, Clone)]
pub struct FallbackScanner {
    atoms: Arc<AtomRegistry>,
    /// `None` when the registry is empty.
    call_pattern: Option<Regex>,
    symbols: SymbolTable,
    statements: Vec<Statement>,
}

impl FallbackScanner {
    pub fn new(atoms: Arc<AtomRegistry>) -> Result<Self, DcpError> {
        let call_pattern = call_pattern(&atoms)?;
        Ok(Self {
            atoms,
            call_pattern,
            symbols: SymbolTable::new(),
            statements: Vec::new(),
        })
    }

    pub fn standard() -> Result<Self, DcpError> {
        Self::new(AtomRegistry::standard())
    }

    /// Classifies one statement and answers with the most recent expression.
    ///
    /// The only error is [`SyntaxErrorKind::NoStatement`], returned when
    /// nothing but declarations has been seen so far.
    pub fn scan(&mut self, text: &str) -> Result<Statement, DcpError> {
        let text = text.trim();
        if text.starts_with("variable") {
            self.declare_variables(text);
        } else if text.starts_with("parameter") {
            self.declare_parameters(text);
        } else {
            let expr = self.classify(text);
            debug!(%expr, sign = %expr.sign(), curvature = %expr.curvature(), "fallback classified");
            self.statements.push(Statement::Expr(expr));
        }
        self.last_statement()
            .cloned()
            .ok_or_else(|| DcpError::syntax(SyntaxErrorKind::NoStatement, Span::default()))
    }

    pub fn reset(&mut self) {
        self.symbols = SymbolTable::new();
        self.statements.clear();
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn last_statement(&self) -> Option<&Statement> {
        self.statements.last()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn atoms(&self) -> &Arc<AtomRegistry> {
        &self.atoms
    }

    fn declare_variables(&mut self, text: &str) {
        for name in text.split_whitespace().skip(1) {
            self.symbols
                .insert(name.to_string(), Expr::variable(name, Sign::Unknown));
        }
    }

    fn declare_parameters(&mut self, text: &str) {
        let mut words = text.split_whitespace().skip(1).peekable();
        let sign = if words.peek() == Some(&"positive") {
            words.next();
            Sign::Positive
        } else {
            Sign::Unknown
        };
        for name in words {
            self.symbols
                .insert(name.to_string(), Expr::parameter(name, sign));
        }
    }

    fn classify(&self, text: &str) -> Expr {
        if let Some(atom) = self.leftmost_call(text) {
            let children = if SINGLE_ARGUMENT_ATOMS.contains(&atom) {
                vec![Expr::compound("x", Sign::Unknown, Curvature::Affine, Vec::new())]
            } else {
                Vec::new()
            };
            if let Some(spec) = self.atoms.get(atom) {
                return Expr::compound(
                    atom,
                    spec.sign,
                    spec.curvature,
                    children.into_iter().map(Operand::Expr).collect(),
                );
            }
        }
        if let Some(symbol) = self.symbols.get(text) {
            return symbol.clone();
        }
        if let Ok(value) = text.parse::<f64>() {
            return Expr::constant(Number::Float(value));
        }
        Expr::opaque(text)
    }

    fn leftmost_call<'t>(&self, text: &'t str) -> Option<&'t str> {
        let captures = self.call_pattern.as_ref()?.captures(text)?;
        captures.get(1).map(|m| m.as_str())
    }
}

/// `(name|name|...)\s*\(`, longest names first so alternation prefers
/// `log_sum_exp` over `log` at the same position.
fn call_pattern(atoms: &AtomRegistry) -> Result<Option<Regex>, DcpError> {
    let mut names: Vec<&str> = atoms.list().into_iter().map(|atom| atom.name.as_str()).collect();
    if names.is_empty() {
        return Ok(None);
    }
    names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"({alternation})\s*\("))
        .map(Some)
        .map_err(|err| DcpError::config_caused_by("Failed to build the atom call pattern", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> FallbackScanner {
        FallbackScanner::standard().unwrap()
    }

    fn scan_expr(scanner: &mut FallbackScanner, text: &str) -> Expr {
        match scanner.scan(text).unwrap() {
            Statement::Expr(expr) => expr,
            other => panic!("expected an expression, got {other:?}"),
        }
    }

    #[test]
    fn test_single_argument_atom_gets_synthetic_child() {
        let mut scanner = scanner();
        let expr = scan_expr(&mut scanner, "sqrt(x + y)");
        assert_eq!(expr.name(), "sqrt");
        assert_eq!(expr.curvature(), Curvature::Concave);
        assert_eq!(expr.sign(), Sign::Positive);
        let [Operand::Expr(child)] = expr.children() else {
            panic!("expected one child");
        };
        assert_eq!(child.name(), "x");
        assert_eq!(child.curvature(), Curvature::Affine);
        assert_eq!(child.sign(), Sign::Unknown);
    }

    #[test]
    fn test_other_atoms_have_no_children() {
        let mut scanner = scanner();
        let expr = scan_expr(&mut scanner, "max(a, b)");
        assert_eq!(expr.curvature(), Curvature::Convex);
        assert!(expr.children().is_empty());
    }

    #[test]
    fn test_leftmost_atom_wins() {
        let mut scanner = scanner();
        let expr = scan_expr(&mut scanner, "x + sqrt(y) - square(z)");
        assert_eq!(expr.name(), "sqrt");
        let expr = scan_expr(&mut scanner, "exp(x) + square(y)");
        assert_eq!(expr.name(), "exp");
        let expr = scan_expr(&mut scanner, "log_sum_exp (x)");
        assert_eq!(expr.name(), "log_sum_exp");
    }

    #[test]
    fn test_match_is_unanchored() {
        let mut scanner = scanner();
        let expr = scan_expr(&mut scanner, "foo_abs(x)");
        assert_eq!(expr.name(), "abs");
    }

    #[test]
    fn test_declared_symbol_lookup() {
        let mut scanner = scanner();
        scanner.scan("parameter positive a b").unwrap_err();
        let expr = scan_expr(&mut scanner, "  a ");
        assert_eq!(expr, Expr::parameter("a", Sign::Positive));
    }

    #[test]
    fn test_variable_prefix_registers_every_word() {
        let mut scanner = scanner();
        let err = scanner.scan("variable positive x").unwrap_err();
        assert_eq!(err.to_string(), "No valid expression found");
        assert_eq!(
            scanner.symbols().get("positive"),
            Some(&Expr::variable("positive", Sign::Unknown))
        );
        assert!(scanner.symbols().contains_key("x"));
    }

    #[test]
    fn test_float_and_opaque_leaves() {
        let mut scanner = scanner();
        let expr = scan_expr(&mut scanner, "-2.5");
        assert_eq!(expr.sign(), Sign::Negative);
        assert_eq!(expr.curvature(), Curvature::Constant);

        let expr = scan_expr(&mut scanner, "x + y");
        assert_eq!(expr.name(), "x + y");
        assert_eq!(expr.sign(), Sign::Unknown);
        assert_eq!(expr.curvature(), Curvature::Unknown);
        assert!(expr.children().is_empty());
    }

    #[test]
    fn test_declaration_answers_with_previous_statement() {
        let mut scanner = scanner();
        scan_expr(&mut scanner, "exp(x)");
        let statement = scanner.scan("variable z").unwrap();
        assert_eq!(statement.name(), "exp");
    }

    #[test]
    fn test_empty_registry_never_matches() {
        let mut scanner = FallbackScanner::new(Arc::new(AtomRegistry::new())).unwrap();
        let expr = scan_expr(&mut scanner, "square(x)");
        assert_eq!(expr.name(), "square(x)");
    }
}
