//! Handles all user-facing output for the CLI.
//!
//! Diagnostics go to stderr as `miette` reports; everything else goes to
//! stdout, colored with `termcolor` when the terminal supports it.

use std::io::Write;

use miette::Report;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::ast::{Expr, Operand, Statement};
use crate::atoms::AtomRegistry;
use crate::dcp::Curvature;
use crate::diagnostics::DcpError;

pub fn print_error(error: DcpError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

pub fn print_heading(text: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "{text}");
    let _ = stdout.reset();
}

/// Prints the registry as an aligned table.
pub fn print_atoms(registry: &AtomRegistry) {
    print_heading(&format!("{} atoms", registry.len()));
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for atom in registry.list() {
        let arity = atom
            .arity
            .map_or_else(|| "any".to_string(), |n| n.to_string());
        let _ = write!(stdout, "  {:<14}", atom.name);
        write_curvature(&mut stdout, atom.curvature, 9);
        let _ = writeln!(stdout, " {:<9} {arity}", atom.sign.label());
    }
}

/// Prints a statement as an indented outline, one node per line.
pub fn print_statement(statement: &Statement) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    match statement {
        Statement::Expr(expr) => write_expr(&mut stdout, expr, 0),
        Statement::Constraint(constraint) => {
            let _ = stdout.set_color(ColorSpec::new().set_bold(true));
            let _ = writeln!(stdout, "{constraint}");
            let _ = stdout.reset();
            write_expr(&mut stdout, &constraint.lhs, 1);
            write_expr(&mut stdout, &constraint.rhs, 1);
        }
    }
}

pub fn print_symbols(symbols: &[(String, String)]) {
    if symbols.is_empty() {
        println!("  No symbols declared.");
        return;
    }
    for (name, attributes) in symbols {
        println!("  {name:<14} {attributes}");
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn write_expr(stdout: &mut StandardStream, expr: &Expr, depth: usize) {
    let _ = write!(stdout, "{:indent$}{expr}  ", "", indent = depth * 2);
    let _ = write!(stdout, "{} ", expr.sign());
    write_curvature(stdout, expr.curvature(), 0);
    let _ = writeln!(stdout);
    for child in expr.children() {
        if let Operand::Expr(child) = child {
            write_expr(stdout, child, depth + 1);
        }
    }
}

fn write_curvature(stdout: &mut StandardStream, curvature: Curvature, width: usize) {
    let color = match curvature {
        Curvature::Unknown => Color::Red,
        c if c.is_convex() && c.is_concave() => Color::Blue,
        c if c.is_convex() => Color::Green,
        _ => Color::Yellow,
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    let _ = write!(stdout, "{:<width$}", curvature.label());
    let _ = stdout.reset();
}
