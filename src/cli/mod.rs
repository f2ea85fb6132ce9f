//! The dcp-analyzer command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::io::{self, Read};
use std::path::Path;
use std::{fs, process};

use clap::Parser;

use crate::cli::args::{Command, DcpArgs};
use crate::config::AnalyzerConfig;
use crate::diagnostics::DcpError;
use crate::engine::{Analyzer, Response};
use crate::quiz::Quiz;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = DcpArgs::parse();

    let analyzer = build_analyzer(&args).unwrap_or_else(|e| {
        output::print_error(e);
        process::exit(1);
    });

    match args.command {
        Command::Parse { file } => {
            let source = read_input(&file).unwrap_or_else(|e| {
                output::print_error(e);
                process::exit(1);
            });
            if !handle_parse(analyzer, &source) {
                process::exit(1);
            }
        }
        Command::Repl => crate::repl::run_repl(analyzer),
        Command::Atoms => output::print_atoms(analyzer.registry()),
        Command::Quiz { seed, difficulty } => {
            let atoms = analyzer.registry().clone();
            let quiz = match seed {
                Some(seed) => Quiz::seeded(atoms, seed),
                None => Quiz::new(atoms),
            };
            crate::quiz::run_quiz(quiz.with_difficulty(difficulty));
        }
    }
}

/// Configuration file first, then command-line overrides.
fn build_analyzer(args: &DcpArgs) -> Result<Analyzer, DcpError> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    config.pretty |= args.pretty;
    Analyzer::from_config(&config)
}

fn read_input(path: &Path) -> Result<String, DcpError> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .map_err(|e| DcpError::config_caused_by("Failed to read standard input", e))?;
        return Ok(source);
    }
    fs::read_to_string(path)
        .map_err(|e| DcpError::config_caused_by(format!("Failed to read '{}'", path.display()), e))
}

/// Prints the JSON response; a failure is also reported on stderr.
/// Returns whether the input parsed.
fn handle_parse(mut analyzer: Analyzer, source: &str) -> bool {
    match analyzer.try_analyze(source) {
        Ok(statement) => {
            println!("{}", analyzer.render(&Response::Tree(statement)));
            true
        }
        Err(e) => {
            println!(
                "{}",
                analyzer.render(&Response::Error {
                    error: e.to_string()
                })
            );
            output::print_error(e);
            false
        }
    }
}
