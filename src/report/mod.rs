//! Reporting utilities: per-point residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{Point3, SampledCurve};
use crate::math::nearest_squared_distance;

/// Distance from one data point to the fitted curve's nearest sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointResidual {
    /// Index into the data set.
    pub index: usize,
    pub point: Point3,
    /// Euclidean distance (not squared) to the nearest sample.
    pub distance: f64,
}

/// Nearest-sample distance for every data point, in data order.
pub fn point_residuals(data: &[Point3], curve: &SampledCurve) -> Vec<PointResidual> {
    data.iter()
        .enumerate()
        .map(|(index, p)| PointResidual {
            index,
            point: *p,
            distance: nearest_squared_distance(p, &curve.points).sqrt(),
        })
        .collect()
}

/// The `top_n` data points farthest from the curve, worst first.
pub fn worst_points(residuals: &[PointResidual], top_n: usize) -> Vec<PointResidual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| b.distance.partial_cmp(&a.distance).unwrap_or(std::cmp::Ordering::Equal));
    sorted.truncate(top_n);
    sorted
}
