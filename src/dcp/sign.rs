//! Sign tracking.
//!
//! The sign of an expression classifies the range of values it can take.
//! Declared symbols carry the sign written in their declaration, literals
//! derive it from their value, and atoms take it from the registry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sign of an expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    /// Expression is always > 0.
    Positive,
    /// Expression is always < 0.
    Negative,
    /// Expression is always == 0.
    Zero,
    /// Sign is unknown.
    #[default]
    Unknown,
}

impl Sign {
    /// Every sign, in label-table order.
    pub const ALL: [Sign; 4] = [Sign::Positive, Sign::Negative, Sign::Zero, Sign::Unknown];

    /// The lowercase label of this sign.
    pub fn label(self) -> &'static str {
        match self {
            Sign::Positive => "positive",
            Sign::Negative => "negative",
            Sign::Zero => "zero",
            Sign::Unknown => "unknown",
        }
    }

    /// Sign of a literal value.
    ///
    /// Anything that is neither above nor below zero (including NaN) is
    /// classified as zero.
    pub fn of_value(value: f64) -> Self {
        if value > 0.0 {
            Sign::Positive
        } else if value < 0.0 {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_of_value() {
        assert_eq!(Sign::of_value(5.0), Sign::Positive);
        assert_eq!(Sign::of_value(-3.0), Sign::Negative);
        assert_eq!(Sign::of_value(0.0), Sign::Zero);
        assert_eq!(Sign::of_value(-0.0), Sign::Zero);
        assert_eq!(Sign::of_value(f64::NAN), Sign::Zero);
        assert_eq!(Sign::of_value(f64::INFINITY), Sign::Positive);
    }

    #[test]
    fn test_sign_labels() {
        for sign in Sign::ALL {
            assert_eq!(sign.to_string(), sign.label());
        }
        assert_eq!(Sign::default(), Sign::Unknown);
        assert_eq!(serde_yaml::from_str::<Sign>("negative").unwrap(), Sign::Negative);
        assert!(serde_yaml::from_str::<Sign>("Positive").is_err());
    }
}
