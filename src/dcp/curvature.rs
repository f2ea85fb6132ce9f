//! Curvature tracking.
//!
//! Curvature is the shape class of an expression as seen by disciplined
//! convex programming. Variables are affine, parameters and literals are
//! constant, atoms carry a fixed curvature from the registry and arithmetic
//! operators are left unknown.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Curvature of an expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curvature {
    /// Constant value.
    Constant,
    /// Affine function (both convex and concave).
    Affine,
    /// Convex function.
    Convex,
    /// Concave function.
    Concave,
    /// Unknown curvature.
    #[default]
    Unknown,
}

impl Curvature {
    /// Every curvature, in label-table order.
    pub const ALL: [Curvature; 5] = [
        Curvature::Constant,
        Curvature::Affine,
        Curvature::Convex,
        Curvature::Concave,
        Curvature::Unknown,
    ];

    /// The lowercase label of this curvature.
    pub fn label(self) -> &'static str {
        match self {
            Curvature::Constant => "constant",
            Curvature::Affine => "affine",
            Curvature::Convex => "convex",
            Curvature::Concave => "concave",
            Curvature::Unknown => "unknown",
        }
    }

    /// Check if the curvature is convex (constant, affine, or convex).
    pub fn is_convex(self) -> bool {
        matches!(
            self,
            Curvature::Constant | Curvature::Affine | Curvature::Convex
        )
    }

    /// Check if the curvature is concave (constant, affine, or concave).
    pub fn is_concave(self) -> bool {
        matches!(
            self,
            Curvature::Constant | Curvature::Affine | Curvature::Concave
        )
    }
}

impl fmt::Display for Curvature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
