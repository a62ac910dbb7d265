//! Polynomial space-curve evaluation.
//!
//! Models are implemented as small, pure functions so that the cost and the
//! plotting code can share them.

pub mod curve;

pub use curve::*;
