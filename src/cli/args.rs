//! Command-line arguments and subcommands, declared with `clap`'s derive API.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::ParserMode;
use crate::quiz::Difficulty;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "dcp-analyzer",
    version,
    about = "Annotates convex-programming statements with sign and curvature."
)]
pub struct DcpArgs {
    /// YAML configuration file.
    #[arg(long, global = true, value_name = "YAML")]
    pub config: Option<PathBuf>,

    /// Backend override; takes precedence over the configuration file.
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ParserMode>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a file (or `-` for stdin) and print the JSON tree of its last statement.
    Parse {
        #[arg(default_value = "-")]
        file: PathBuf,
    },
    /// Interactive session, one statement per line.
    Repl,
    /// List the atoms known to the analyzer.
    Atoms,
    /// Guess the curvature of random expressions.
    Quiz {
        /// Seed for a reproducible sequence of questions.
        #[arg(long)]
        seed: Option<u64>,
        /// Starting difficulty; streaks of answers move it up or down.
        #[arg(long, value_enum, default_value_t = Difficulty::Easy)]
        difficulty: Difficulty,
    },
}
