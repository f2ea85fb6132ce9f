//! Analyzer configuration, read from YAML.
//!
//! ```yaml
//! mode: auto          # auto | grammar | fallback
//! pretty: false
//! extra_atoms:
//!   - name: cube_pos
//!     curvature: convex
//!     sign: positive
//!     arity: 1
//! ```

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::atoms::AtomSpec;
use crate::diagnostics::DcpError;

/// Which backend answers `analyze` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ParserMode {
    /// Grammar parser, degrading to the fallback scanner if it cannot be built.
    #[default]
    Auto,
    /// Grammar parser only; a broken atom table is an error.
    Grammar,
    /// Fallback scanner only.
    Fallback,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub mode: ParserMode,
    /// Pretty-print JSON responses.
    pub pretty: bool,
    /// Atoms added on top of the standard registry.
    pub extra_atoms: Vec<AtomSpec>,
}

impl AnalyzerConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, DcpError> {
        serde_yaml::from_str(text)
            .map_err(|e| DcpError::config_caused_by("Invalid analyzer configuration", e))
    }

    pub fn load(path: &Path) -> Result<Self, DcpError> {
        let text = fs::read_to_string(path).map_err(|e| {
            DcpError::config_caused_by(format!("Failed to read '{}'", path.display()), e)
        })?;
        Self::from_yaml_str(&text).map_err(|e| e.with_help(format!("while loading '{}'", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dcp::{Curvature, Sign};
    use crate::diagnostics::ErrorType;

    #[test]
    fn test_empty_document_is_default() {
        let config = AnalyzerConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.mode, ParserMode::Auto);
    }

    #[test]
    fn test_full_document() {
        let config = AnalyzerConfig::from_yaml_str(
            "mode: fallback\npretty: true\nextra_atoms:\n  - name: cube_pos\n    curvature: convex\n    sign: positive\n    arity: 1\n  - name: lambda_max\n    curvature: convex\n    sign: unknown\n",
        )
        .unwrap();
        assert_eq!(config.mode, ParserMode::Fallback);
        assert!(config.pretty);
        assert_eq!(
            config.extra_atoms,
            vec![
                AtomSpec::new("cube_pos", Curvature::Convex, Sign::Positive, Some(1)),
                AtomSpec::new("lambda_max", Curvature::Convex, Sign::Unknown, None),
            ]
        );
    }

    #[test]
    fn test_bad_labels_are_config_errors() {
        let err = AnalyzerConfig::from_yaml_str(
            "extra_atoms:\n  - name: f\n    curvature: wobbly\n    sign: positive\n",
        )
        .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);

        let err = AnalyzerConfig::from_yaml_str("mode: sometimes\n").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[test]
    fn test_missing_file() {
        let err = AnalyzerConfig::load(Path::new("/nonexistent/dcp.yaml")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
