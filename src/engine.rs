//! Hosting layer between callers and the two parsing backends.
//!
//! An [`Analyzer`] owns exactly one backend. It is built from an
//! [`AnalyzerConfig`]: the grammar session when the atom table is sound, the
//! fallback scanner when asked for or when `auto` mode has to degrade.
//! Callers get either the tree of the last statement or an error message.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::ast::{Span, Statement};
use crate::atoms::AtomRegistry;
use crate::config::{AnalyzerConfig, ParserMode};
use crate::diagnostics::{DcpError, SyntaxErrorKind};
use crate::fallback::FallbackScanner;
use crate::serialize::to_json;
use crate::session::Session;

/// What the rendering boundary receives for one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Tree(Statement),
    Error { error: String },
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

impl From<Result<Statement, DcpError>> for Response {
    fn from(result: Result<Statement, DcpError>) -> Self {
        match result {
            Ok(statement) => Response::Tree(statement),
            Err(err) => Response::Error {
                error: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
enum Backend {
    Grammar(Session),
    Fallback(FallbackScanner),
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    backend: Backend,
    pretty: bool,
}

impl Analyzer {
    /// Grammar backend over the standard atoms.
    pub fn new() -> Self {
        Self {
            backend: Backend::Grammar(Session::standard()),
            pretty: false,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, DcpError> {
        let registry = AtomRegistry::standard()
            .extended(config.extra_atoms.iter().cloned())
            .map(Arc::new);

        let backend = match (config.mode, registry) {
            (ParserMode::Grammar | ParserMode::Auto, Ok(registry)) => {
                Backend::Grammar(Session::new(registry))
            }
            (ParserMode::Fallback, Ok(registry)) => {
                Backend::Fallback(FallbackScanner::new(registry)?)
            }
            (ParserMode::Auto, Err(err)) => {
                warn!(error = %err, "grammar parser unavailable, using the fallback scanner");
                Backend::Fallback(FallbackScanner::standard()?)
            }
            (ParserMode::Grammar | ParserMode::Fallback, Err(err)) => return Err(err),
        };
        debug!(mode = ?config.mode, "analyzer ready");

        Ok(Self {
            backend,
            pretty: config.pretty,
        })
    }

    /// The backend actually in use; never `Auto`.
    pub fn mode(&self) -> ParserMode {
        match self.backend {
            Backend::Grammar(_) => ParserMode::Grammar,
            Backend::Fallback(_) => ParserMode::Fallback,
        }
    }

    /// Parses `text` and returns the most recent statement of the session.
    pub fn try_analyze(&mut self, text: &str) -> Result<Statement, DcpError> {
        match &mut self.backend {
            Backend::Grammar(session) => {
                session.parse(text)?;
                session.last_statement().cloned().ok_or_else(no_statement)
            }
            Backend::Fallback(scanner) => {
                let mut answer = None;
                for line in text.lines().filter(|line| !line.trim().is_empty()) {
                    answer = Some(scanner.scan(line));
                }
                answer.unwrap_or_else(|| scanner.last_statement().cloned().ok_or_else(no_statement))
            }
        }
    }

    pub fn analyze(&mut self, text: &str) -> Response {
        self.try_analyze(text).into()
    }

    pub fn analyze_json(&mut self, text: &str) -> String {
        let response = self.analyze(text);
        self.render(&response)
    }

    /// Renders a response with this analyzer's formatting settings.
    pub fn render(&self, response: &Response) -> String {
        to_json(response, self.pretty)
            .unwrap_or_else(|err| serde_json::json!({ "error": err.to_string() }).to_string())
    }

    pub fn reset(&mut self) {
        match &mut self.backend {
            Backend::Grammar(session) => session.reset(),
            Backend::Fallback(scanner) => scanner.reset(),
        }
    }

    pub fn registry(&self) -> &Arc<AtomRegistry> {
        match &self.backend {
            Backend::Grammar(session) => session.atoms(),
            Backend::Fallback(scanner) => scanner.atoms(),
        }
    }

    /// Number of statements parsed since creation or the last reset.
    pub fn statement_count(&self) -> usize {
        match &self.backend {
            Backend::Grammar(session) => session.statements().len(),
            Backend::Fallback(scanner) => scanner.statements().len(),
        }
    }

    /// Declared names with their rendered attributes, sorted by name.
    pub fn symbols(&self) -> Vec<(String, String)> {
        let table = match &self.backend {
            Backend::Grammar(session) => session.symbols(),
            Backend::Fallback(scanner) => scanner.symbols(),
        };
        table
            .iter()
            .map(|(name, node)| (name.clone(), format!("{} {}", node.sign(), node.curvature())))
            .collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn no_statement() -> DcpError {
    DcpError::syntax(SyntaxErrorKind::NoStatement, Span::default())
}
