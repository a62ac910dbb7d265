//! Power-basis polynomials and uniform parameter grids.
//!
//! A polynomial is stored as its coefficients from degree 0 upward:
//!
//! ```text
//! p(t) = c[0] + c[1] t + c[2] t^2 + ... + c[K-1] t^(K-1)
//! ```
//!
//! Evaluation uses Horner's scheme, which is the same sum with fewer
//! multiplications and better rounding behaviour than explicit powers.

/// Evaluate `Σ coeffs[k] * t^k`.
///
/// An empty coefficient slice evaluates to `0.0`.
pub fn eval_power_basis(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}

/// Generate `n` evenly spaced points between `start` and `end` (inclusive).
///
/// `n == 1` yields `[start]`, `n == 0` yields an empty vector.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            // Pin the last value so rounding never overshoots the interval.
            out[n - 1] = end;
            out
        }
    }
}
