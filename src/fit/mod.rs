//! Curve fitting.
//!
//! Responsibilities:
//!
//! - score candidate curves against the data (`cost`)
//! - build starting points and search boxes (`bounds`)
//! - drive the local and global optimizers (`fitter`)

pub mod bounds;
pub mod cost;
pub mod fitter;

pub use bounds::*;
pub use cost::*;
pub use fitter::*;
