//! Record shape handed to the rendering boundary.
//!
//! Expression-like nodes become
//! `{name, short_name, sign, curvature, subexpressions}` with an extra
//! `value` on constants. A constraint becomes `{name, short_name, lhs, rhs}`
//! named by its relation. Empty argument slots render as `""` and verbatim
//! arguments as their text, so `max(x, , Inf)` keeps three children.

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::ast::{Constraint, Expr, Operand, Statement};

impl Serialize for Expr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = self.value();
        let len = if value.is_some() { 6 } else { 5 };
        let name = self.name();

        let mut record = serializer.serialize_struct("Expression", len)?;
        record.serialize_field("name", &name)?;
        record.serialize_field("short_name", &name)?;
        record.serialize_field("sign", &self.sign())?;
        record.serialize_field("curvature", &self.curvature())?;
        record.serialize_field("subexpressions", &Subexpressions(self.children()))?;
        if let Some(value) = value {
            record.serialize_field("value", &value)?;
        }
        record.end()
    }
}

struct Subexpressions<'a>(&'a [Operand]);

impl Serialize for Subexpressions<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for operand in self.0 {
            seq.serialize_element(operand)?;
        }
        seq.end()
    }
}

impl Serialize for Operand {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Operand::Expr(expr) => expr.serialize(serializer),
            Operand::Empty => serializer.serialize_str(""),
            Operand::Literal(text) => serializer.serialize_str(text),
        }
    }
}

impl Serialize for Constraint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let symbol = self.relation.symbol();
        let mut record = serializer.serialize_struct("Constraint", 4)?;
        record.serialize_field("name", symbol)?;
        record.serialize_field("short_name", symbol)?;
        record.serialize_field("lhs", &self.lhs)?;
        record.serialize_field("rhs", &self.rhs)?;
        record.end()
    }
}

impl Serialize for Statement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Statement::Expr(expr) => expr.serialize(serializer),
            Statement::Constraint(constraint) => constraint.serialize(serializer),
        }
    }
}

/// Renders any record as JSON text.
pub fn to_json<T: Serialize + ?Sized>(record: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(record)
    } else {
        serde_json::to_string(record)
    }
}
