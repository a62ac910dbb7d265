//! Small dense-vector helpers shared by the solvers.

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn norm(v: &[f64]) -> f64 {
    dot(v, v).sqrt()
}

pub(crate) fn norm_inf(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

/// Forward-difference gradient: `g_i ≈ (f(x + h e_i) - f(x)) / h`.
///
/// With bounds, a coordinate whose forward step would leave the box is differenced
/// backward instead; one with no room either way gets a zero component.
/// Costs at most `x.len()` evaluations of `f`.
pub(crate) fn forward_difference_gradient<F>(
    f: &F,
    x: &[f64],
    fx: f64,
    eps: f64,
    bounds: Option<&[(f64, f64)]>,
) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut shifted = x.to_vec();
    let mut grad = Vec::with_capacity(x.len());
    for i in 0..x.len() {
        let xi = shifted[i];
        // Scale the step with the coordinate so large coefficients still move.
        let mut h = eps * xi.abs().max(1.0);
        if let Some(&(lo, hi)) = bounds.and_then(|b| b.get(i)) {
            if xi + h > hi {
                if xi - h < lo {
                    grad.push(0.0);
                    continue;
                }
                h = -h;
            }
        }
        shifted[i] = xi + h;
        grad.push((f(&shifted) - fx) / h);
        shifted[i] = xi;
    }
    grad
}

/// Clamp every coordinate into its `(lo, hi)` pair.
pub(crate) fn clamp_into(x: &mut [f64], bounds: &[(f64, f64)]) {
    for (v, &(lo, hi)) in x.iter_mut().zip(bounds) {
        *v = v.clamp(lo, hi);
    }
}
