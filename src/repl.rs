//! dcp-analyzer REPL (Read-Eval-Print Loop)
//!
//! Provides an interactive shell where declarations persist between lines.

use std::io::{self, Write};

use crate::cli::output::{print_atoms, print_error, print_heading, print_statement, print_symbols};
use crate::diagnostics::{DcpError, SyntaxErrorKind};
use crate::engine::Analyzer;

/// REPL state that persists across evaluations
pub struct ReplState {
    analyzer: Analyzer,
}

impl ReplState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }

    /// Analyze one line in the persistent context and print the outcome.
    pub fn eval_line(&mut self, input: &str) -> Result<(), ()> {
        let before = self.analyzer.statement_count();

        match self.analyzer.try_analyze(input) {
            Ok(statement) if self.analyzer.statement_count() > before => {
                print_statement(&statement);
                Ok(())
            }
            // Declarations answer with the previous statement, or with
            // nothing at all on a fresh session.
            Ok(_)
            | Err(DcpError::Syntax {
                kind: SyntaxErrorKind::NoStatement,
                ..
            }) => Ok(()),
            Err(e) => {
                print_error(e);
                Err(())
            }
        }
    }
}

/// Main REPL entry point
pub fn run_repl(analyzer: Analyzer) {
    println!("dcp-analyzer REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for help, :quit to exit, :reset to forget declarations");
    println!();

    let mut repl_state = ReplState::new(analyzer);
    let mut input_buffer = String::new();

    loop {
        if input_buffer.is_empty() {
            print!("dcp> ");
        } else {
            print!("  -> ");
        }
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF (Ctrl+D)
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {
                let line = line.trim();

                if input_buffer.is_empty() && line.starts_with(':') {
                    match handle_repl_command(line, &mut repl_state) {
                        ReplCommand::Continue => continue,
                        ReplCommand::Quit => break,
                    }
                }

                if !input_buffer.is_empty() {
                    input_buffer.push(' ');
                }
                input_buffer.push_str(line);

                // An empty line flushes whatever is buffered.
                if is_complete_statement(&input_buffer) || line.is_empty() {
                    if !input_buffer.trim().is_empty() {
                        let _ = repl_state.eval_line(&input_buffer);
                    }
                    input_buffer.clear();
                }
            }
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }
    }
}

enum ReplCommand {
    Continue,
    Quit,
}

/// Handle special REPL commands that start with ':'
fn handle_repl_command(command: &str, state: &mut ReplState) -> ReplCommand {
    match command.to_ascii_lowercase().as_str() {
        ":help" | ":h" => {
            print_heading("REPL commands");
            println!("  :help, :h       Show this help");
            println!("  :quit, :q       Exit the REPL");
            println!("  :reset, :r      Forget all declarations and statements");
            println!("  :symbols, :s    List declared variables and parameters");
            println!("  :atoms, :a      List the known atoms");
            println!();
            println!("Declare with 'variable [sign] x y' or 'parameter [sign] a'.");
            println!("Then enter one expression or constraint per line.");
            ReplCommand::Continue
        }
        ":quit" | ":q" => {
            println!("Goodbye!");
            ReplCommand::Quit
        }
        ":reset" | ":r" => {
            state.analyzer.reset();
            println!("Session reset.");
            ReplCommand::Continue
        }
        ":symbols" | ":s" => {
            print_symbols(&state.analyzer.symbols());
            ReplCommand::Continue
        }
        ":atoms" | ":a" => {
            print_atoms(state.analyzer.registry());
            ReplCommand::Continue
        }
        _ => {
            println!(
                "Unknown command: {}. Type :help for available commands.",
                command
            );
            ReplCommand::Continue
        }
    }
}

/// A statement is complete once its parentheses balance. Text after `#` is
/// a comment and is not counted.
fn is_complete_statement(input: &str) -> bool {
    let code = input.split('#').next().unwrap_or_default().trim();
    if code.is_empty() {
        return input.trim_start().starts_with('#');
    }

    let mut depth = 0i32;
    for ch in code.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth <= 0
}
