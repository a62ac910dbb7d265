//! Starting points and search boxes for the optimizers.

use crate::domain::DataPoints;
use crate::error::AppError;

/// The all-ones starting vector (`3K` entries).
pub fn initial_guess(n_coeffs: usize) -> Vec<f64> {
    vec![1.0; 3 * n_coeffs]
}

/// Symmetric box `±scale * max|coordinate|` for every coefficient.
///
/// The box is data-driven but crude: higher-order coefficients of a curve
/// that stays inside the data cloud can legitimately exceed it, so `scale`
/// may need tuning per dataset. An all-zero dataset falls back to `±scale`.
pub fn global_bounds(
    data: &DataPoints,
    n_coeffs: usize,
    scale: f64,
) -> Result<Vec<(f64, f64)>, AppError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(AppError::input(format!("Bound scale must be finite and > 0, got {scale}.")));
    }
    let max_abs = data.max_abs_coordinate();
    let extent = scale * if max_abs > 0.0 { max_abs } else { 1.0 };
    Ok(vec![(-extent, extent); 3 * n_coeffs])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Point3;

    #[test]
    fn bounds_scale_with_largest_coordinate() {
        let data = DataPoints::new(vec![Point3::new(1.0, -0.5, 2.0), Point3::new(0.0, 0.3, 0.1)]).unwrap();
        let bounds = global_bounds(&data, 5, 3.0).unwrap();
        assert_eq!(bounds.len(), 15);
        assert!(bounds.iter().all(|&b| b == (-6.0, 6.0)));
    }

    #[test]
    fn degenerate_data_still_gets_a_box() {
        let data = DataPoints::new(vec![Point3::origin()]).unwrap();
        let bounds = global_bounds(&data, 1, 2.0).unwrap();
        assert_eq!(bounds, vec![(-2.0, 2.0); 3]);
        assert!(global_bounds(&data, 1, 0.0).is_err());
    }

    #[test]
    fn initial_guess_is_all_ones() {
        assert_eq!(initial_guess(2), vec![1.0; 6]);
    }
}
