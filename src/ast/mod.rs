//! AST module for annotated DCP statements
//!
//! Every node produced by the parser or the fallback scanner carries its
//! sign and curvature. Expression-like nodes are [`Expr`]; a parsed line is
//! a [`Statement`], which is either an expression or a single top-level
//! [`Constraint`]. Constraints hold plain expressions, so they cannot nest.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dcp::{Curvature, Sign};

// ============================================================================
// CORE DATA STRUCTURES
// ============================================================================

/// Represents a span in the source line.
///
/// # Examples
///
/// ```rust
/// use dcp_analyzer::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A numeric literal exactly as it was written: integers stay integers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Float(x) => x,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{n}"),
            // Keep a visible fractional part so 1.0 does not read as an integer.
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Number::Float(x) => write!(f, "{x}"),
        }
    }
}

/// An annotated expression node.
///
/// `parens` records that the expression was written inside explicit
/// parentheses. It only affects rendering; equality ignores it.
#[derive(Debug, Clone)]
pub struct Expr {
    kind: ExprKind,
    pub parens: bool,
}

/// The closed set of expression-like nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A declared variable. Always affine.
    Variable { name: String, sign: Sign },
    /// A declared parameter. Always constant.
    Parameter { name: String, sign: Sign },
    /// A numeric literal. Always constant; the sign follows from the value.
    Constant { value: Number },
    /// An operator application, an atom call, or an opaque leaf.
    Compound {
        name: String,
        sign: Sign,
        curvature: Curvature,
        children: Vec<Operand>,
    },
}

/// One child slot of a compound node.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Expr(Expr),
    /// An empty argument slot, as in `max(x, )`.
    Empty,
    /// A verbatim argument token such as `Inf`.
    Literal(String),
}

/// Relation of a top-level constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Equal,
    LessOrEqual,
    GreaterOrEqual,
}

/// `lhs <relation> rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub relation: Relation,
    pub lhs: Expr,
    pub rhs: Expr,
}

/// A parsed top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expr(Expr),
    Constraint(Constraint),
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

const INFIX_OPERATORS: [&str; 4] = ["+", "-", "*", "/"];

impl Expr {
    fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            parens: false,
        }
    }

    pub fn variable(name: impl Into<String>, sign: Sign) -> Self {
        Self::new(ExprKind::Variable {
            name: name.into(),
            sign,
        })
    }

    pub fn parameter(name: impl Into<String>, sign: Sign) -> Self {
        Self::new(ExprKind::Parameter {
            name: name.into(),
            sign,
        })
    }

    pub fn constant(value: Number) -> Self {
        Self::new(ExprKind::Constant { value })
    }

    pub fn compound(
        name: impl Into<String>,
        sign: Sign,
        curvature: Curvature,
        children: Vec<Operand>,
    ) -> Self {
        Self::new(ExprKind::Compound {
            name: name.into(),
            sign,
            curvature,
            children,
        })
    }

    /// An arithmetic operator application. Its attributes are left unknown.
    pub fn operator(symbol: &str, children: Vec<Expr>) -> Self {
        Self::compound(
            symbol,
            Sign::Unknown,
            Curvature::Unknown,
            children.into_iter().map(Operand::Expr).collect(),
        )
    }

    /// A childless node carrying `text` as its name with nothing known about it.
    pub fn opaque(text: impl Into<String>) -> Self {
        Self::compound(text, Sign::Unknown, Curvature::Unknown, Vec::new())
    }

    pub fn with_parens(mut self) -> Self {
        self.parens = true;
        self
    }
}

// ============================================================================
// ACCESSORS
// ============================================================================

impl Expr {
    /// Read-only view of the node. Nodes are only built through the
    /// constructors above, so a literal's sign cannot disagree with its value.
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Display name; also used as `short_name` when serialized.
    pub fn name(&self) -> String {
        match &self.kind {
            ExprKind::Variable { name, .. }
            | ExprKind::Parameter { name, .. }
            | ExprKind::Compound { name, .. } => name.clone(),
            ExprKind::Constant { value, .. } => value.to_string(),
        }
    }

    pub fn sign(&self) -> Sign {
        match &self.kind {
            ExprKind::Variable { sign, .. }
            | ExprKind::Parameter { sign, .. }
            | ExprKind::Compound { sign, .. } => *sign,
            ExprKind::Constant { value } => Sign::of_value(value.as_f64()),
        }
    }

    pub fn curvature(&self) -> Curvature {
        match &self.kind {
            ExprKind::Variable { .. } => Curvature::Affine,
            ExprKind::Parameter { .. } | ExprKind::Constant { .. } => Curvature::Constant,
            ExprKind::Compound { curvature, .. } => *curvature,
        }
    }

    pub fn children(&self) -> &[Operand] {
        match &self.kind {
            ExprKind::Compound { children, .. } => children,
            _ => &[],
        }
    }

    pub fn value(&self) -> Option<Number> {
        match &self.kind {
            ExprKind::Constant { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Number of expression nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| match child {
                Operand::Expr(expr) => expr.node_count(),
                Operand::Empty | Operand::Literal(_) => 0,
            })
            .sum::<usize>()
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Relation {
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Equal => "==",
            Relation::LessOrEqual => "<=",
            Relation::GreaterOrEqual => ">=",
        }
    }
}

impl Statement {
    pub fn name(&self) -> String {
        match self {
            Statement::Expr(expr) => expr.name(),
            Statement::Constraint(constraint) => constraint.relation.symbol().to_string(),
        }
    }

    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Statement::Expr(expr) => Some(expr),
            Statement::Constraint(_) => None,
        }
    }

    pub fn as_constraint(&self) -> Option<&Constraint> {
        match self {
            Statement::Constraint(constraint) => Some(constraint),
            Statement::Expr(_) => None,
        }
    }
}

impl From<Expr> for Statement {
    fn from(expr: Expr) -> Self {
        Statement::Expr(expr)
    }
}

impl From<Constraint> for Statement {
    fn from(constraint: Constraint) -> Self {
        Statement::Constraint(constraint)
    }
}

// ============================================================================
// RENDERING
// ============================================================================

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parens {
            f.write_str("(")?;
        }
        match &self.kind {
            ExprKind::Variable { name, .. } | ExprKind::Parameter { name, .. } => {
                f.write_str(name)?
            }
            ExprKind::Constant { value, .. } => write!(f, "{value}")?,
            ExprKind::Compound { name, children, .. } => {
                let is_operator = INFIX_OPERATORS.contains(&name.as_str());
                match children.as_slice() {
                    [] => f.write_str(name)?,
                    [operand] if is_operator => write!(f, "{name}{operand}")?,
                    [lhs, rhs] if is_operator => write!(f, "{lhs} {name} {rhs}")?,
                    args => {
                        write!(f, "{name}(")?;
                        for (i, arg) in args.iter().enumerate() {
                            if i > 0 {
                                f.write_str(", ")?;
                            }
                            write!(f, "{arg}")?;
                        }
                        f.write_str(")")?;
                    }
                }
            }
        }
        if self.parens {
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Expr(expr) => write!(f, "{expr}"),
            Operand::Empty => Ok(()),
            Operand::Literal(text) => f.write_str(text),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.relation.symbol(), self.rhs)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Expr(expr) => write!(f, "{expr}"),
            Statement::Constraint(constraint) => write!(f, "{constraint}"),
        }
    }
}
