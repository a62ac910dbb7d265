//! Evaluation of the three-axis power-basis curve.
//!
//! The curve is `C(t) = (x(t), y(t), z(t))` for `t ∈ [0, 1]`, each axis an
//! independent polynomial with the same coefficient count.

use crate::domain::{CurveParams, Point3, SampledCurve};
use crate::math::eval_power_basis;

/// Evaluate the curve at a single parameter value.
pub fn evaluate(params: &CurveParams, t: f64) -> Point3 {
    Point3::new(
        eval_power_basis(params.x(), t),
        eval_power_basis(params.y(), t),
        eval_power_basis(params.z(), t),
    )
}

/// Evaluate the curve at every value of `t_grid`.
pub fn sample_curve(params: &CurveParams, t_grid: &[f64]) -> SampledCurve {
    SampledCurve {
        t: t_grid.to_vec(),
        points: t_grid.iter().map(|&t| evaluate(params, t)).collect(),
    }
}
