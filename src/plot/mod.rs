//! Visual comparison of data and fitted curve.
//!
//! - `ascii`: 2D projection rendered into the terminal
//! - `svg`: 3D scatter written to an SVG file (plotters)
//!
//! Plotting never feeds back into the fit.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;
