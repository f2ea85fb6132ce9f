//! # Standard Atoms
//!
//! The built-in atom table.
//!
//! ## Atoms Provided
//!
//! - **Elementwise, one argument**: `abs`, `exp`, `square`, `sqrt`, `log`,
//!   `entr`, `inv_pos`, `pos`, `neg`, `huber`
//! - **Two arguments**: `quad_over_lin`, `pow`, `kl_div`
//! - **Any number of arguments**: `max`, `min`, `norm1`, `norm2`, `norm_inf`,
//!   `geo_mean`, `log_sum_exp`

use crate::atoms::{AtomRegistry, AtomSpec};
use crate::dcp::Curvature::{Concave, Convex};
use crate::dcp::Sign::{Positive, Unknown};

/// Registers the standard atoms with the given registry.
pub fn register_standard_atoms(registry: &mut AtomRegistry) {
    // Elementwise
    registry.register(AtomSpec::new("abs", Convex, Positive, Some(1)));
    registry.register(AtomSpec::new("exp", Convex, Positive, Some(1)));
    registry.register(AtomSpec::new("square", Convex, Positive, Some(1)));
    registry.register(AtomSpec::new("sqrt", Concave, Positive, Some(1)));
    registry.register(AtomSpec::new("log", Concave, Unknown, Some(1)));
    registry.register(AtomSpec::new("entr", Concave, Unknown, Some(1)));
    registry.register(AtomSpec::new("inv_pos", Convex, Positive, Some(1)));
    registry.register(AtomSpec::new("pos", Convex, Positive, Some(1)));
    registry.register(AtomSpec::new("neg", Convex, Positive, Some(1)));
    registry.register(AtomSpec::new("huber", Convex, Positive, Some(1)));

    // Aggregates
    registry.register(AtomSpec::new("max", Convex, Unknown, None));
    registry.register(AtomSpec::new("min", Concave, Unknown, None));
    registry.register(AtomSpec::new("norm2", Convex, Positive, None));
    registry.register(AtomSpec::new("norm1", Convex, Positive, None));
    registry.register(AtomSpec::new("norm_inf", Convex, Positive, None));
    registry.register(AtomSpec::new("geo_mean", Concave, Positive, None));
    registry.register(AtomSpec::new("log_sum_exp", Convex, Unknown, None));

    // Two-argument
    registry.register(AtomSpec::new("quad_over_lin", Convex, Positive, Some(2)));
    registry.register(AtomSpec::new("pow", Convex, Positive, Some(2)));
    registry.register(AtomSpec::new("kl_div", Convex, Positive, Some(2)));
}
