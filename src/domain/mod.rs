//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the fitted object (`CurveParams`) and its evaluation on a grid (`SampledCurve`)
//! - the fixed observations (`DataPoints`)
//! - run configuration and outputs (`FitConfig`, `FitRun`, `CurveFile`)

pub mod types;

pub use types::*;
