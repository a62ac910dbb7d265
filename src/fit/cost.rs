//! The curve-to-data objective.
//!
//! For coefficients `p`, the curve is sampled at `M` fixed parameter values
//! `t_j ∈ [0, 1]` and compared with the `N` data points in both directions:
//!
//! ```text
//! forward  = (1/N) Σ_i min_j |d_i - C(t_j)|²     (data must lie near the curve)
//! backward = (1/M) Σ_j min_i |C(t_j) - d_i|²     (curve must stay near the data)
//! cost     = forward + w * backward              (w = 0.1 by default)
//! ```
//!
//! No point-to-parameter correspondence is assumed.
//!
//! The context owns everything the objective closes over (data, grid, `K`,
//! weight) and is never mutated after construction, so one instance can be
//! shared by reference across optimizer threads and several contexts can
//! coexist with different datasets.

use crate::domain::{CostBreakdown, CurveParams, DataPoints, SampledCurve};
use crate::error::AppError;
use crate::math::{chamfer_terms, linspace};
use crate::models::sample_curve;

/// Default weight of the curve → data term.
pub const DEFAULT_BACKWARD_WEIGHT: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct CurveFitCost {
    data: DataPoints,
    n_coeffs: usize,
    t_grid: Vec<f64>,
    backward_weight: f64,
}

impl CurveFitCost {
    pub fn new(
        data: DataPoints,
        n_coeffs: usize,
        n_samples: usize,
        backward_weight: f64,
    ) -> Result<Self, AppError> {
        if n_coeffs == 0 {
            return Err(AppError::input("Coefficient count (K) must be >= 1."));
        }
        if n_samples == 0 {
            return Err(AppError::input("Curve sample count (M) must be >= 1."));
        }
        if !(backward_weight.is_finite() && backward_weight >= 0.0) {
            return Err(AppError::input(format!(
                "Backward weight must be finite and >= 0, got {backward_weight}."
            )));
        }
        Ok(Self {
            data,
            n_coeffs,
            t_grid: linspace(0.0, 1.0, n_samples),
            backward_weight,
        })
    }

    pub fn data(&self) -> &DataPoints {
        &self.data
    }

    pub fn n_coeffs(&self) -> usize {
        self.n_coeffs
    }

    pub fn n_samples(&self) -> usize {
        self.t_grid.len()
    }

    /// Length of the flat optimizer vector (`3K`).
    pub fn dimension(&self) -> usize {
        3 * self.n_coeffs
    }

    pub fn backward_weight(&self) -> f64 {
        self.backward_weight
    }

    /// Sample `params` on this context's fixed grid.
    pub fn sample(&self, params: &CurveParams) -> SampledCurve {
        sample_curve(params, &self.t_grid)
    }

    /// Score a curve. Rejects coefficient counts other than this context's `K`.
    pub fn evaluate(&self, params: &CurveParams) -> Result<CostBreakdown, AppError> {
        if params.n_coeffs() != self.n_coeffs {
            return Err(AppError::input(format!(
                "Curve has {} coefficients per axis, cost expects {}.",
                params.n_coeffs(),
                self.n_coeffs
            )));
        }
        Ok(self.breakdown(params))
    }

    /// Score a flat `[x.., y.., z..]` vector of length exactly `3K`.
    pub fn evaluate_flat(&self, flat: &[f64]) -> Result<f64, AppError> {
        let params = CurveParams::from_flat(flat, self.n_coeffs)?;
        Ok(self.breakdown(&params).total)
    }

    /// The objective in the shape the optimizers consume.
    ///
    /// The optimizers only ever pass vectors of `self.dimension()`; any other
    /// length scores `f64::INFINITY` so it can never be selected.
    pub fn objective(&self) -> impl Fn(&[f64]) -> f64 + Sync + '_ {
        move |flat: &[f64]| self.evaluate_flat(flat).unwrap_or(f64::INFINITY)
    }

    fn breakdown(&self, params: &CurveParams) -> CostBreakdown {
        let curve = self.sample(params);
        let (forward, backward) = chamfer_terms(self.data.points(), &curve.points);
        CostBreakdown {
            forward,
            backward,
            backward_weight: self.backward_weight,
            total: forward + self.backward_weight * backward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::helix_points;
    use crate::domain::Point3;
    use crate::math::mean_nearest_squared_distance;
    use crate::optimize::{LbfgsOptions, lbfgs};

    fn helix_cost(n_coeffs: usize, n_samples: usize) -> CurveFitCost {
        let data = DataPoints::new(helix_points(10, 2.0)).unwrap();
        CurveFitCost::new(data, n_coeffs, n_samples, DEFAULT_BACKWARD_WEIGHT).unwrap()
    }

    fn wavy_params(n_coeffs: usize) -> CurveParams {
        let flat: Vec<f64> = (0..3 * n_coeffs).map(|i| ((i as f64) * 0.7).sin()).collect();
        CurveParams::from_flat(&flat, n_coeffs).unwrap()
    }

    #[test]
    fn cost_is_deterministic() {
        let cost = helix_cost(5, 100);
        let params = wavy_params(5);
        let a = cost.evaluate(&params).unwrap();
        let b = cost.evaluate(&params).unwrap();
        assert_eq!(a, b);
        assert_eq!(cost.evaluate_flat(&params.to_flat()).unwrap(), a.total);
    }

    #[test]
    fn cost_is_non_negative() {
        let cost = helix_cost(4, 37);
        for seed in 0..20 {
            let flat: Vec<f64> = (0..12)
                .map(|i| (((seed * 31 + i * 17) % 23) as f64 - 11.0) / 3.0)
                .collect();
            let total = cost.evaluate_flat(&flat).unwrap();
            assert!(total >= 0.0 && total.is_finite());
        }
    }

    #[test]
    fn curve_through_every_data_point_has_zero_forward_term() {
        // Data are samples of the line (t, 2t, -t) at t = 0, 0.25, ..., 1, which
        // is exactly the curve's own grid with M = 5.
        let points: Vec<Point3> = linspace(0.0, 1.0, 5)
            .into_iter()
            .map(|t| Point3::new(t, 2.0 * t, -t))
            .collect();
        // Keep only two of them so the curve overshoots the data cloud.
        let data = DataPoints::new(vec![points[0], points[2]]).unwrap();
        let cost = CurveFitCost::new(data, 2, 5, DEFAULT_BACKWARD_WEIGHT).unwrap();
        let line = CurveParams::new(vec![0.0, 1.0], vec![0.0, 2.0], vec![0.0, -1.0]).unwrap();

        let b = cost.evaluate(&line).unwrap();
        assert!(b.forward.abs() < 1e-15);
        assert!(b.backward > 0.0);
        assert!((b.total - 0.1 * b.backward).abs() < 1e-15);
    }

    #[test]
    fn doubling_backward_weight_only_scales_backward_term() {
        let data = DataPoints::new(helix_points(10, 2.0)).unwrap();
        let single = CurveFitCost::new(data.clone(), 5, 100, 0.1).unwrap();
        let double = CurveFitCost::new(data, 5, 100, 0.2).unwrap();
        let params = wavy_params(5);

        let a = single.evaluate(&params).unwrap();
        let b = double.evaluate(&params).unwrap();
        assert_eq!(a.forward, b.forward);
        assert_eq!(a.backward, b.backward);
        assert!(((b.total - a.total) - 0.1 * a.backward).abs() < 1e-12);
    }

    #[test]
    fn constant_curve_terms() {
        let data = DataPoints::new(helix_points(10, 2.0)).unwrap();
        let cost = CurveFitCost::new(data.clone(), 1, 100, DEFAULT_BACKWARD_WEIGHT).unwrap();
        let c = Point3::new(0.3, -0.2, 1.1);
        let params = CurveParams::new(vec![c.x], vec![c.y], vec![c.z]).unwrap();

        let dists: Vec<f64> = data.points().iter().map(|p| (p - c).norm_squared()).collect();
        let mean = dists.iter().sum::<f64>() / dists.len() as f64;
        let min = dists.iter().copied().fold(f64::INFINITY, f64::min);

        let b = cost.evaluate(&params).unwrap();
        assert!((b.forward - mean).abs() < 1e-12);
        assert!((b.backward - min).abs() < 1e-12);
    }

    #[test]
    fn swapping_sets_and_weights_is_symmetric() {
        let cost = helix_cost(5, 100);
        let params = wavy_params(5);
        let curve = cost.sample(&params);
        let data = cost.data().points();

        let direct = cost.evaluate(&params).unwrap().total;
        // Treat the samples as "data" and the data as "curve", weights exchanged.
        let (fwd_swapped, bwd_swapped) = chamfer_terms(&curve.points, data);
        let swapped = 0.1 * fwd_swapped + 1.0 * bwd_swapped;
        assert!((direct - swapped).abs() < 1e-12);

        let by_hand = mean_nearest_squared_distance(data, &curve.points)
            + 0.1 * mean_nearest_squared_distance(&curve.points, data);
        assert!((direct - by_hand).abs() < 1e-12);
    }

    #[test]
    fn wrong_length_vectors_are_errors() {
        let cost = helix_cost(5, 100);
        assert!(cost.evaluate_flat(&[1.0; 14]).is_err());
        assert!(cost.evaluate_flat(&[1.0; 16]).is_err());
        assert!(cost.evaluate(&wavy_params(4)).is_err());
        assert_eq!(cost.objective()(&[1.0; 14]), f64::INFINITY);
    }

    #[test]
    fn rejects_invalid_context() {
        let data = DataPoints::new(helix_points(3, 1.0)).unwrap();
        assert!(CurveFitCost::new(data.clone(), 0, 10, 0.1).is_err());
        assert!(CurveFitCost::new(data.clone(), 3, 0, 0.1).is_err());
        assert!(CurveFitCost::new(data, 3, 10, -1.0).is_err());
    }

    #[test]
    fn local_minimizer_improves_on_all_ones_guess() {
        let cost = helix_cost(5, 100);
        let x0 = vec![1.0; cost.dimension()];
        let initial = cost.evaluate_flat(&x0).unwrap();

        let res = lbfgs(cost.objective(), &x0, &LbfgsOptions::default()).unwrap();
        let fitted = cost.evaluate_flat(&res.x).unwrap();

        assert!(fitted <= initial);
        assert!((fitted - res.fun).abs() < 1e-12);
    }
}
