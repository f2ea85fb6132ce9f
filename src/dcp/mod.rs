//! Sign and curvature attributes attached to every annotated expression.
//!
//! Both are closed value sets. Each value has a lowercase label used by the
//! keyword table, the serialized tree and the configuration file.

pub mod curvature;
pub mod sign;

pub use curvature::Curvature;
pub use sign::Sign;
