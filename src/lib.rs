//! Sign and curvature annotation for disciplined convex programming statements.
//!
//! A [`Session`] parses lines such as `variable positive x` or
//! `square(x) + 1 <= y` and keeps declarations between calls. Every node of
//! the resulting tree carries a [`Sign`] and a [`Curvature`]. The [`Analyzer`]
//! wraps a session (or the [`FallbackScanner`] when the grammar parser is
//! unavailable) and renders the last statement as a JSON record.
//!
//! ```rust
//! use dcp_analyzer::{Analyzer, Response};
//!
//! let mut analyzer = Analyzer::new();
//! let response = analyzer.analyze("variable positive x\nsquare(x)");
//! assert!(matches!(response, Response::Tree(_)));
//! ```

pub use crate::ast::{Constraint, Expr, Operand, Statement};
pub use crate::atoms::{AtomRegistry, AtomSpec};
pub use crate::config::{AnalyzerConfig, ParserMode};
pub use crate::dcp::{Curvature, Sign};
pub use crate::diagnostics::{DcpError, ErrorType};
pub use crate::engine::{Analyzer, Response};
pub use crate::fallback::FallbackScanner;
pub use crate::session::Session;

pub mod ast;
pub mod atoms;
pub mod cli;
pub mod config;
pub mod dcp;
pub mod diagnostics;
pub mod engine;
pub mod fallback;
pub mod quiz;
pub mod repl;
pub mod serialize;
pub mod session;
pub mod syntax;
