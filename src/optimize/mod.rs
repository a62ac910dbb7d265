//! General-purpose minimizers.
//!
//! Both solvers work on plain `Fn(&[f64]) -> f64` objectives and know nothing
//! about curves; the fitting code adapts `CurveFitCost` to this shape.
//!
//! - `lbfgs`: limited-memory quasi-Newton with finite-difference gradients
//! - `lbfgs_bounded`: the same, projected onto a box (used to polish DE results)
//! - `differential_evolution`: population-based, derivative-free, box-bounded

pub mod differential_evolution;
pub mod lbfgs;
mod utils;

use std::fmt;

pub use differential_evolution::{DeOptions, GlobalResult, differential_evolution};
pub use lbfgs::{LbfgsOptions, MinimizeResult, lbfgs, lbfgs_bounded};

/// Result type for optimization operations.
pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Errors that can occur during optimization.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimizeError {
    /// Invalid input array size or option value.
    InvalidInput { context: String },

    /// Lower bound not strictly below upper bound (or non-finite).
    InvalidBounds { index: usize, lo: f64, hi: f64 },

    /// The objective could not be evaluated to a finite value where one is required.
    NumericalError { message: String },
}

impl fmt::Display for OptimizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { context } => write!(f, "invalid input: {context}"),
            Self::InvalidBounds { index, lo, hi } => {
                write!(f, "invalid bounds [{lo}, {hi}] for coordinate {index}: need finite lo < hi")
            }
            Self::NumericalError { message } => write!(f, "numerical error: {message}"),
        }
    }
}

impl std::error::Error for OptimizeError {}
