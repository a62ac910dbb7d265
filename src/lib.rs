//! `polyfit3d` library crate.
//!
//! Fits three polynomials `x(t)`, `y(t)`, `z(t)` on `t ∈ [0, 1]` to an
//! unordered 3D point set by minimizing a symmetric nearest-neighbour
//! (Chamfer-style) distance, with a local L-BFGS and a global differential
//! evolution optimizer.
//!
//! The binary (`pf3`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the cost and optimizers are reusable on other data sets

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod optimize;
pub mod plot;
pub mod report;
