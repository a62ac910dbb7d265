//! Nearest-neighbour squared distances between two point sets.
//!
//! The curve-fit objective is built from one primitive:
//!
//! ```text
//! mean_nearest(A, B) = (1/|A|) Σ_{a ∈ A} min_{b ∈ B} |a - b|²
//! ```
//!
//! evaluated in both directions. Search is brute force, O(|A|·|B|); the point
//! sets involved are tens to hundreds of points.

use crate::domain::Point3;

/// Squared Euclidean distance.
pub fn squared_distance(a: &Point3, b: &Point3) -> f64 {
    (a - b).norm_squared()
}

/// Smallest squared distance from `p` to any point in `set`.
///
/// Returns `f64::INFINITY` for an empty set.
pub fn nearest_squared_distance(p: &Point3, set: &[Point3]) -> f64 {
    set.iter()
        .map(|q| squared_distance(p, q))
        .fold(f64::INFINITY, f64::min)
}

/// Mean over `from` of the squared distance to the nearest point of `to`.
///
/// An empty `from` contributes nothing (`0.0`).
pub fn mean_nearest_squared_distance(from: &[Point3], to: &[Point3]) -> f64 {
    if from.is_empty() {
        return 0.0;
    }
    let sum: f64 = from.iter().map(|p| nearest_squared_distance(p, to)).sum();
    sum / from.len() as f64
}

/// Both directional terms between a data set and a sampled curve:
/// `(data → curve, curve → data)`.
pub fn chamfer_terms(data: &[Point3], curve: &[Point3]) -> (f64, f64) {
    (
        mean_nearest_squared_distance(data, curve),
        mean_nearest_squared_distance(curve, data),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_picks_the_closest_point() {
        let set = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(3.0, 0.0, 0.0),
        ];
        let p = Point3::new(2.5, 0.0, 0.0);
        assert!((nearest_squared_distance(&p, &set) - 0.25).abs() < 1e-15);
        assert_eq!(nearest_squared_distance(&p, &[]), f64::INFINITY);
    }

    #[test]
    fn terms_are_asymmetric_in_general() {
        // One data point sitting on the first of three curve samples.
        let data = [Point3::new(0.0, 0.0, 0.0)];
        let curve = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let (fwd, bwd) = chamfer_terms(&data, &curve);
        assert_eq!(fwd, 0.0);
        assert!((bwd - 5.0 / 3.0).abs() < 1e-15);
    }
}
