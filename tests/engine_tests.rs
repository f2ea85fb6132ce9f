//! Backend selection, configuration and the fallback path.

use dcp_analyzer::{
    Analyzer, AnalyzerConfig, AtomSpec, Curvature, ErrorType, ParserMode, Response, Sign,
};

fn tree(response: Response) -> serde_json::Value {
    match response {
        Response::Tree(statement) => serde_json::to_value(statement).unwrap(),
        Response::Error { error } => panic!("unexpected error: {error}"),
    }
}

#[test]
fn test_default_analyzer_uses_grammar() {
    let mut analyzer = Analyzer::new();
    assert_eq!(analyzer.mode(), ParserMode::Grammar);
    let record = tree(analyzer.analyze("variable x\nx + 1"));
    assert_eq!(record["name"], "+");
    assert_eq!(record["sign"], "unknown");
    assert_eq!(record["curvature"], "unknown");
}

#[test]
fn test_declarations_only() {
    let mut analyzer = Analyzer::new();
    let response = analyzer.analyze("variable x\nparameter positive a");
    assert_eq!(
        response,
        Response::Error {
            error: "No valid expression found".to_string()
        }
    );

    // Once something was parsed, later declarations answer with it.
    analyzer.analyze("exp(x)");
    let record = tree(analyzer.analyze("variable y"));
    assert_eq!(record["name"], "exp");
}

#[test]
fn test_first_failing_line_wins() {
    let mut analyzer = Analyzer::new();
    let response = analyzer.analyze("variable x\nx ^ 2\nfoo(x)");
    assert!(response.is_error());
    assert_eq!(
        response,
        Response::Error {
            error: "'^' is not valid. Consider using the 'pow' function.".to_string()
        }
    );
    // `variable x` took effect before the failure.
    assert!(!analyzer.analyze("x").is_error());
}

#[test]
fn test_reset() {
    let mut analyzer = Analyzer::new();
    analyzer.analyze("variable x\nx");
    analyzer.reset();
    assert_eq!(analyzer.statement_count(), 0);
    assert!(analyzer.symbols().is_empty());
    assert_eq!(
        analyzer.analyze("x"),
        Response::Error {
            error: "'x' is not a known variable or parameter.".to_string()
        }
    );
}

#[test]
fn test_extra_atoms_extend_the_grammar() {
    let config = AnalyzerConfig {
        extra_atoms: vec![AtomSpec::new(
            "cube_pos",
            Curvature::Convex,
            Sign::Positive,
            Some(1),
        )],
        ..AnalyzerConfig::default()
    };
    let mut analyzer = Analyzer::from_config(&config).unwrap();
    assert_eq!(analyzer.registry().len(), 21);
    let record = tree(analyzer.analyze("variable x\ncube_pos(x)"));
    assert_eq!(record["curvature"], "convex");
    assert!(analyzer.analyze("cube_pos(x, x)").is_error());
}

#[test]
fn test_bad_atom_table() {
    let duplicate = AnalyzerConfig {
        mode: ParserMode::Grammar,
        extra_atoms: vec![AtomSpec::new("abs", Curvature::Concave, Sign::Unknown, None)],
        ..AnalyzerConfig::default()
    };
    let err = Analyzer::from_config(&duplicate).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Config);
    assert_eq!(err.to_string(), "Atom 'abs' is already defined.");

    let auto = AnalyzerConfig {
        mode: ParserMode::Auto,
        ..duplicate.clone()
    };
    let analyzer = Analyzer::from_config(&auto).unwrap();
    assert_eq!(analyzer.mode(), ParserMode::Fallback);
    assert_eq!(analyzer.registry().len(), 20);

    let fallback = AnalyzerConfig {
        mode: ParserMode::Fallback,
        ..duplicate
    };
    assert!(Analyzer::from_config(&fallback).is_err());
}

#[test]
fn test_keyword_cannot_name_an_atom() {
    let config = AnalyzerConfig {
        mode: ParserMode::Grammar,
        extra_atoms: vec![AtomSpec::new("Inf", Curvature::Convex, Sign::Positive, None)],
        ..AnalyzerConfig::default()
    };
    let err = Analyzer::from_config(&config).unwrap_err();
    assert_eq!(
        err.to_string(),
        "'Inf' is a reserved word and cannot name an atom."
    );
}

#[test]
fn test_fallback_mode_line_by_line() {
    let config = AnalyzerConfig {
        mode: ParserMode::Fallback,
        ..AnalyzerConfig::default()
    };
    let mut analyzer = Analyzer::from_config(&config).unwrap();

    let record = tree(analyzer.analyze("parameter positive a\n\nsquare(a) + 1"));
    assert_eq!(record["name"], "square");
    assert_eq!(record["subexpressions"][0]["name"], "x");

    let record = tree(analyzer.analyze("a"));
    assert_eq!(record["curvature"], "constant");
    assert_eq!(record["sign"], "positive");

    // Never an error for malformed input.
    let record = tree(analyzer.analyze("x ^ = )("));
    assert_eq!(record["name"], "x ^ = )(");
    assert_eq!(record["curvature"], "unknown");
}

#[test]
fn test_fallback_with_nothing_parsed() {
    let config = AnalyzerConfig {
        mode: ParserMode::Fallback,
        ..AnalyzerConfig::default()
    };
    let mut analyzer = Analyzer::from_config(&config).unwrap();
    assert!(analyzer.analyze("").is_error());
    assert!(analyzer.analyze("variable x").is_error());
}

#[test]
fn test_config_from_yaml() {
    let config =
        AnalyzerConfig::from_yaml_str("mode: grammar\npretty: true\n").unwrap();
    let mut analyzer = Analyzer::from_config(&config).unwrap();
    let json = analyzer.analyze_json("1");
    assert!(json.contains('\n'));
    assert!(json.contains("\"value\": 1"));
}
