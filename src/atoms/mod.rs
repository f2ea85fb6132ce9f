//! # Atom Registry
//!
//! Atoms are the named functions a statement may call. Each atom carries a
//! fixed curvature, a fixed sign and an optional fixed arity. A call
//! expression takes its sign and curvature straight from the registry entry,
//! whatever its arguments are.
//!
//! The standard registry is built once per process and shared by reference.
//! Additional atoms from configuration produce a new registry that is
//! likewise immutable once built.

use std::sync::Arc;

use im::HashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::dcp::{Curvature, Sign};
use crate::diagnostics::DcpError;
use crate::syntax::lexer::{is_identifier, keyword};

pub mod builtin;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Registry entry for a single atom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomSpec {
    pub name: String,
    pub curvature: Curvature,
    pub sign: Sign,
    /// Required argument count, or `None` when any count is accepted.
    #[serde(default)]
    pub arity: Option<usize>,
}

impl AtomSpec {
    pub fn new(name: &str, curvature: Curvature, sign: Sign, arity: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            curvature,
            sign,
            arity,
        }
    }

    /// Whether `count` arguments satisfy this atom's arity.
    pub fn accepts(&self, count: usize) -> bool {
        self.arity.map_or(true, |arity| arity == count)
    }
}

/// Name → atom table, inspectable at runtime.
#[derive(Debug, Clone, Default)]
pub struct AtomRegistry {
    atoms: HashMap<String, AtomSpec>,
}

static STANDARD_ATOMS: Lazy<Arc<AtomRegistry>> = Lazy::new(|| {
    let mut registry = AtomRegistry::new();
    builtin::register_standard_atoms(&mut registry);
    Arc::new(registry)
});

// ============================================================================
// PUBLIC API
// ============================================================================

impl AtomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide standard registry.
    pub fn standard() -> Arc<AtomRegistry> {
        Arc::clone(&STANDARD_ATOMS)
    }

    pub fn get(&self, name: &str) -> Option<&AtomSpec> {
        self.atoms.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.atoms.contains_key(name)
    }

    /// All entries sorted by name.
    pub fn list(&self) -> Vec<&AtomSpec> {
        let mut specs: Vec<_> = self.atoms.values().collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub(crate) fn register(&mut self, spec: AtomSpec) {
        self.atoms.insert(spec.name.clone(), spec);
    }

    /// Returns a copy of this registry with `extra` atoms added.
    ///
    /// Each new name must lex as a plain identifier and must not already be
    /// taken by a keyword or another atom.
    pub fn extended<I>(&self, extra: I) -> Result<AtomRegistry, DcpError>
    where
        I: IntoIterator<Item = AtomSpec>,
    {
        let mut registry = self.clone();
        for spec in extra {
            if !is_identifier(&spec.name) {
                return Err(DcpError::config(format!(
                    "'{}' is not a valid atom name.",
                    spec.name
                )));
            }
            if keyword(&spec.name).is_some() {
                return Err(DcpError::config(format!(
                    "'{}' is a reserved word and cannot name an atom.",
                    spec.name
                )));
            }
            if registry.has(&spec.name) {
                return Err(DcpError::config(format!(
                    "Atom '{}' is already defined.",
                    spec.name
                )));
            }
            registry.register(spec);
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_is_shared() {
        let a = AtomRegistry::standard();
        let b = AtomRegistry::standard();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 20);
    }

    #[test]
    fn test_list_is_sorted() {
        let registry = AtomRegistry::standard();
        let names: Vec<_> = registry.list().iter().map(|s| s.name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_extended_adds_atom() {
        let extra = AtomSpec::new("logistic", Curvature::Convex, Sign::Positive, Some(1));
        let registry = AtomRegistry::standard().extended(vec![extra]).unwrap();
        assert!(registry.has("logistic"));
        assert!(!AtomRegistry::standard().has("logistic"));
    }

    #[test]
    fn test_extended_rejects_bad_names() {
        let standard = AtomRegistry::standard();
        for name in ["9lives", "a-b", "", "variable", "Inf", "positive", "abs"] {
            let spec = AtomSpec::new(name, Curvature::Convex, Sign::Unknown, None);
            assert!(standard.extended(vec![spec]).is_err(), "{name} accepted");
        }
    }

    #[test]
    fn test_accepts() {
        let registry = AtomRegistry::standard();
        let abs = registry.get("abs").unwrap();
        assert!(abs.accepts(1));
        assert!(!abs.accepts(2));
        let max = registry.get("max").unwrap();
        assert!(max.accepts(0));
        assert!(max.accepts(7));
    }
}
