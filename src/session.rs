//! Parser session: the mutable state that survives between lines.
//!
//! A session owns the symbol table and the statement list and shares the
//! atom registry. Each line goes through [`parse_line`]; the session only
//! appends what the driver hands back.

use std::sync::Arc;

use tracing::debug;

use crate::ast::{Expr, Statement};
use crate::atoms::AtomRegistry;
use crate::diagnostics::DcpError;
use crate::syntax::{parse_line, Line, SymbolTable};

#[derive(Debug, Clone)]
pub struct Session {
    atoms: Arc<AtomRegistry>,
    symbols: SymbolTable,
    statements: Vec<Statement>,
}

impl Session {
    pub fn new(atoms: Arc<AtomRegistry>) -> Self {
        Self {
            atoms,
            symbols: SymbolTable::new(),
            statements: Vec::new(),
        }
    }

    /// A session over the built-in atoms.
    pub fn standard() -> Self {
        Self::new(AtomRegistry::standard())
    }

    /// Parses every line of `text` in order.
    ///
    /// The first failing line aborts the call with its error, carrying the
    /// line text and its 1-based number. Lines before it keep their effects.
    pub fn parse(&mut self, text: &str) -> Result<(), DcpError> {
        for (index, line) in text.lines().enumerate() {
            self.parse_line(line)
                .map_err(|err| err.with_line(index + 1, line))?;
        }
        Ok(())
    }

    /// Parses a single line and applies its effect.
    pub fn parse_line(&mut self, line: &str) -> Result<Line, DcpError> {
        let parsed = parse_line(line, &mut self.symbols, &self.atoms)?;
        if let Line::Statement(statement) = &parsed {
            self.statements.push(statement.clone());
            debug!(count = self.statements.len(), "statement appended");
        }
        Ok(parsed)
    }

    /// Forgets every declaration and statement.
    pub fn reset(&mut self) {
        self.symbols = SymbolTable::new();
        self.statements.clear();
        debug!("session reset");
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn lookup(&self, name: &str) -> Option<&Expr> {
        self.symbols.get(name)
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn last_statement(&self) -> Option<&Statement> {
        self.statements.last()
    }

    pub fn atoms(&self) -> &Arc<AtomRegistry> {
        &self.atoms
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::standard()
    }
}
