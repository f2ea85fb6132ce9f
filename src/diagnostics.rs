//! # Overview
//!
//! The unified, `miette`-based diagnostic system. Every failure produced by
//! the lexer, the grammar parser or the configuration layer is a [`DcpError`].
//!
//! The `Display` text of an error is the exact user-facing message that the
//! rendering boundary places in its `error` field. Spans, the offending line
//! and help text live in an [`ErrorContext`] and only show up when the error
//! is rendered as a `miette` report.
//!
//! # Construction
//!
//! - `DcpError::lex(kind, span)`, `DcpError::syntax(kind, span)` and
//!   `DcpError::semantic(kind, span)` for parse failures. The parser does not
//!   know the line it is working on; the session attaches it afterwards with
//!   [`DcpError::with_line`].
//! - `DcpError::config(message)` for registry and configuration failures.

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::ast::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe error classification that corresponds to [`DcpError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Illegal characters and the tailored typo diagnostics.
    Lex,
    /// Grammar violations.
    Syntax,
    /// Unknown names and arity mismatches.
    Semantic,
    /// Invalid configuration or atom table.
    Config,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Lex => "Lex",
            ErrorType::Syntax => "Syntax",
            ErrorType::Semantic => "Semantic",
            ErrorType::Config => "Config",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// ERROR KINDS
// ============================================================================

/// Lexical failures. Several single characters get a tailored message
/// because they are common notations borrowed from other math syntaxes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("'=' is not valid. Did you mean '=='?")]
    SingleEquals,
    #[error("'<' constraints are not valid. Consider using '<='.")]
    StrictLess,
    #[error("'>' constraints are not valid. Consider using '>='.")]
    StrictGreater,
    #[error("'^' is not valid. Consider using the 'pow' function.")]
    Exponent,
    #[error("Illegal character '{0}'.")]
    IllegalCharacter(char),
}

/// Grammar violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("'{line}' is not a valid expression.")]
    InvalidExpression { line: String },
    #[error("Invalid syntax after '{after}'.")]
    TrailingInput { after: String },
    #[error("Syntax error in call to '{function}'.")]
    MalformedCall { function: String },
    #[error("An expression can only contain one constraint.")]
    ChainedConstraint,
    /// The input held declarations only, and nothing was parsed before.
    #[error("No valid expression found")]
    NoStatement,
}

/// Well-formed input that refers to something that does not exist or does
/// not fit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticErrorKind {
    #[error("'{name}' is not a known function.")]
    UnknownFunction { name: String },
    #[error("Incorrect number of arguments in '{name}'.")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("'{name}' is not a known variable or parameter.")]
    UnknownSymbol { name: String },
}

// ============================================================================
// ERROR CONTEXT
// ============================================================================

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default, Clone)]
pub struct ErrorContext {
    /// The line the error was found on, if known.
    pub source: Option<SourceArc>,
    /// Byte span of the offending token within `source`.
    pub span: Option<Span>,
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_span(span: Span) -> Self {
        Self {
            span: Some(span),
            ..Self::default()
        }
    }
}

// ============================================================================
// ERROR TYPE
// ============================================================================

/// Unified error type for every failure mode of the analyzer.
#[derive(Debug, Error)]
pub enum DcpError {
    #[error("{kind}")]
    Lex {
        kind: LexErrorKind,
        ctx: ErrorContext,
    },
    #[error("{kind}")]
    Syntax {
        kind: SyntaxErrorKind,
        ctx: ErrorContext,
    },
    #[error("{kind}")]
    Semantic {
        kind: SemanticErrorKind,
        ctx: ErrorContext,
    },
    #[error("{message}")]
    Config {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl DcpError {
    pub fn lex(kind: LexErrorKind, span: Span) -> Self {
        DcpError::Lex {
            kind,
            ctx: ErrorContext::with_span(span),
        }
    }

    pub fn syntax(kind: SyntaxErrorKind, span: Span) -> Self {
        DcpError::Syntax {
            kind,
            ctx: ErrorContext::with_span(span),
        }
    }

    pub fn semantic(kind: SemanticErrorKind, span: Span) -> Self {
        DcpError::Semantic {
            kind,
            ctx: ErrorContext::with_span(span),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        DcpError::Config {
            message: message.into(),
            ctx: ErrorContext::none(),
            source: None,
        }
    }

    /// A configuration error caused by a lower-level failure (I/O, YAML, regex).
    pub fn config_caused_by<E>(message: impl Into<String>, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DcpError::Config {
            message: message.into(),
            ctx: ErrorContext::none(),
            source: Some(Box::new(cause)),
        }
    }

    /// Attaches the text of the failing line so reports can point into it.
    pub fn with_line(mut self, line_number: usize, line: &str) -> Self {
        self.ctx_mut().source = Some(Arc::new(NamedSource::new(
            format!("line {line_number}"),
            line.to_string(),
        )));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.ctx_mut().help = Some(help.into());
        self
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            DcpError::Lex { .. } => ErrorType::Lex,
            DcpError::Syntax { .. } => ErrorType::Syntax,
            DcpError::Semantic { .. } => ErrorType::Semantic,
            DcpError::Config { .. } => ErrorType::Config,
        }
    }

    pub fn span(&self) -> Option<Span> {
        self.ctx().span
    }

    fn ctx(&self) -> &ErrorContext {
        match self {
            DcpError::Lex { ctx, .. }
            | DcpError::Syntax { ctx, .. }
            | DcpError::Semantic { ctx, .. }
            | DcpError::Config { ctx, .. } => ctx,
        }
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            DcpError::Lex { ctx, .. }
            | DcpError::Syntax { ctx, .. }
            | DcpError::Semantic { ctx, .. }
            | DcpError::Config { ctx, .. } => ctx,
        }
    }

    /// Help derived from the error kind when none was attached explicitly.
    fn default_help(&self) -> Option<String> {
        match self {
            DcpError::Semantic {
                kind:
                    SemanticErrorKind::ArityMismatch {
                        name,
                        expected,
                        found,
                    },
                ..
            } => Some(format!(
                "'{name}' takes exactly {expected} argument(s), found {found}"
            )),
            DcpError::Semantic {
                kind: SemanticErrorKind::UnknownSymbol { name },
                ..
            } => Some(format!(
                "declare it first, e.g. 'variable {name}' or 'parameter {name}'"
            )),
            DcpError::Syntax {
                kind: SyntaxErrorKind::ChainedConstraint,
                ..
            } => Some("split the statement into one constraint per line".to_string()),
            _ => None,
        }
    }
}

impl Diagnostic for DcpError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.error_type() {
            ErrorType::Lex => "dcp::lex",
            ErrorType::Syntax => "dcp::syntax",
            ErrorType::Semantic => "dcp::semantic",
            ErrorType::Config => "dcp::config",
        };
        Some(Box::new(code) as Box<dyn fmt::Display + 'a>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match &self.ctx().help {
            Some(help) => Some(Box::new(help) as Box<dyn fmt::Display + 'a>),
            None => self
                .default_help()
                .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>),
        }
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.ctx();
        // Labels without a source would point at nothing.
        ctx.source.as_ref()?;
        let span = ctx.span?;
        let len = if span.end > span.start {
            span.end - span.start
        } else {
            1
        };
        let label = LabeledSpan::new(Some(self.to_string()), span.start, len);
        Some(Box::new(std::iter::once(label)))
    }
}
