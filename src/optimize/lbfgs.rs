//! L-BFGS (limited-memory BFGS) with finite-difference gradients.
//!
//! L-BFGS keeps the `m` most recent correction pairs
//!
//! - `s_k = x_{k+1} - x_k`
//! - `y_k = ∇f_{k+1} - ∇f_k`
//!
//! and applies the inverse-Hessian approximation to the gradient with the
//! two-loop recursion, without ever forming a matrix.
//!
//! Steps are accepted only under the Armijo sufficient-decrease condition, so
//! the returned objective value never exceeds the value at `x0`.
//!
//! [`lbfgs_bounded`] runs the same iteration projected onto a box: every trial
//! point is clamped into the bounds, search directions never push an active
//! coordinate outward, and convergence is measured on the projected gradient.

use std::collections::VecDeque;

use log::{debug, warn};

use super::utils::{clamp_into, dot, forward_difference_gradient, norm, norm_inf};
use super::{OptimizeError, OptimizeResult};

/// Armijo sufficient-decrease constant.
const ARMIJO_C1: f64 = 1e-4;

/// Maximum step halvings before the line search gives up.
const MAX_BACKTRACKS: usize = 50;

/// Correction pairs with `yᵀs` below this are skipped (curvature condition).
const CURVATURE_EPS: f64 = 1e-12;

/// Options for [`lbfgs`].
#[derive(Debug, Clone)]
pub struct LbfgsOptions {
    /// Number of correction pairs kept.
    pub history: usize,
    pub max_iter: usize,
    /// Budget of objective evaluations (gradient evaluations included).
    pub max_fev: usize,
    /// Stop when `(f_k - f_{k+1}) / max(|f_k|, |f_{k+1}|, 1) <= f_tol`.
    pub f_tol: f64,
    /// Stop when the gradient's largest component is `<= g_tol`.
    pub g_tol: f64,
    /// Relative finite-difference step.
    pub eps: f64,
}

impl Default for LbfgsOptions {
    fn default() -> Self {
        Self {
            history: 10,
            max_iter: 15_000,
            max_fev: 15_000,
            f_tol: 1e7 * f64::EPSILON,
            g_tol: 1e-5,
            eps: 1e-8,
        }
    }
}

/// Result of a local minimization.
#[derive(Debug, Clone)]
pub struct MinimizeResult {
    pub x: Vec<f64>,
    pub fun: f64,
    pub iterations: usize,
    pub nfev: usize,
    pub converged: bool,
}

struct Correction {
    s: Vec<f64>,
    y: Vec<f64>,
    rho: f64,
}

/// Minimize `f` starting from `x0`.
pub fn lbfgs<F>(f: F, x0: &[f64], options: &LbfgsOptions) -> OptimizeResult<MinimizeResult>
where
    F: Fn(&[f64]) -> f64,
{
    minimize(&f, x0, None, options)
}

/// Minimize `f` inside `bounds` (`[(lo, hi), ...]`), starting from `x0` clamped
/// into the box. Every evaluated point and the returned `x` lie inside the box.
pub fn lbfgs_bounded<F>(
    f: F,
    x0: &[f64],
    bounds: &[(f64, f64)],
    options: &LbfgsOptions,
) -> OptimizeResult<MinimizeResult>
where
    F: Fn(&[f64]) -> f64,
{
    if bounds.len() != x0.len() {
        return Err(OptimizeError::InvalidInput {
            context: format!(
                "lbfgs: {} bounds for {} coordinates",
                bounds.len(),
                x0.len()
            ),
        });
    }
    for (index, &(lo, hi)) in bounds.iter().enumerate() {
        if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
            return Err(OptimizeError::InvalidBounds { index, lo, hi });
        }
    }
    minimize(&f, x0, Some(bounds), options)
}

fn minimize<F>(
    f: &F,
    x0: &[f64],
    bounds: Option<&[(f64, f64)]>,
    options: &LbfgsOptions,
) -> OptimizeResult<MinimizeResult>
where
    F: Fn(&[f64]) -> f64,
{
    let n = x0.len();
    if n == 0 {
        return Err(OptimizeError::InvalidInput {
            context: "lbfgs: empty initial guess".to_string(),
        });
    }
    if options.history == 0 {
        return Err(OptimizeError::InvalidInput {
            context: "lbfgs: history size must be > 0".to_string(),
        });
    }
    if !(options.eps.is_finite() && options.eps > 0.0) {
        return Err(OptimizeError::InvalidInput {
            context: format!("lbfgs: finite-difference step must be > 0, got {}", options.eps),
        });
    }

    let mut x = x0.to_vec();
    if let Some(b) = bounds {
        clamp_into(&mut x, b);
    }
    let mut fx = f(&x);
    let mut nfev = 1;
    if !fx.is_finite() {
        return Err(OptimizeError::NumericalError {
            message: format!("lbfgs: objective is {fx} at the initial point"),
        });
    }

    let mut grad = forward_difference_gradient(f, &x, fx, options.eps, bounds);
    nfev += n;

    let mut history: VecDeque<Correction> = VecDeque::with_capacity(options.history);

    for iter in 0..options.max_iter {
        if norm_inf(&projected_gradient(&x, &grad, bounds)) <= options.g_tol {
            return Ok(done(x, fx, iter, nfev, true));
        }
        if nfev >= options.max_fev {
            warn!("lbfgs: evaluation budget ({}) exhausted after {iter} iterations", options.max_fev);
            return Ok(done(x, fx, iter, nfev, false));
        }

        let mut direction = two_loop_recursion(&grad, &history);
        freeze_active(&x, &mut direction, bounds);
        let mut slope = dot(&grad, &direction);
        if !(slope < 0.0) {
            debug!("lbfgs: iteration {iter}: not a descent direction, resetting history");
            history.clear();
            direction = grad.iter().map(|g| -g).collect();
            freeze_active(&x, &mut direction, bounds);
            slope = dot(&grad, &direction);
            if !(slope < 0.0) {
                warn!("lbfgs: no descent direction at f={fx:.6e}; stopping");
                return Ok(done(x, fx, iter, nfev, false));
            }
        }

        // Without curvature information, cap the first trial step at unit length.
        let alpha0 = if history.is_empty() {
            (1.0 / norm(&direction)).min(1.0)
        } else {
            1.0
        };

        let (accepted, evals) =
            backtracking_line_search(f, &x, fx, &grad, &direction, alpha0, bounds);
        nfev += evals;

        let Some((x_new, fx_new)) = accepted else {
            if !history.is_empty() {
                debug!("lbfgs: iteration {iter}: line search failed, retrying along -grad");
                history.clear();
                continue;
            }
            warn!("lbfgs: line search failed at f={fx:.6e}; stopping");
            return Ok(done(x, fx, iter, nfev, false));
        };

        let grad_new = forward_difference_gradient(f, &x_new, fx_new, options.eps, bounds);
        nfev += n;

        let s: Vec<f64> = x_new.iter().zip(&x).map(|(a, b)| a - b).collect();
        let y: Vec<f64> = grad_new.iter().zip(&grad).map(|(a, b)| a - b).collect();
        let ys = dot(&y, &s);
        if ys > CURVATURE_EPS * dot(&y, &y).max(f64::MIN_POSITIVE) {
            if history.len() == options.history {
                history.pop_front();
            }
            history.push_back(Correction { s, y, rho: 1.0 / ys });
        }

        let rel_reduction = (fx - fx_new) / fx.abs().max(fx_new.abs()).max(1.0);
        debug!("lbfgs: iteration {iter}: f={fx_new:.6e} |g|inf={:.3e}", norm_inf(&grad_new));

        x = x_new;
        fx = fx_new;
        grad = grad_new;

        if rel_reduction <= options.f_tol {
            return Ok(done(x, fx, iter + 1, nfev, true));
        }
    }

    warn!("lbfgs: reached max_iter={} without converging", options.max_iter);
    Ok(done(x, fx, options.max_iter, nfev, false))
}

fn done(x: Vec<f64>, fun: f64, iterations: usize, nfev: usize, converged: bool) -> MinimizeResult {
    MinimizeResult {
        x,
        fun,
        iterations,
        nfev,
        converged,
    }
}

/// Compute `-H_k ∇f` from the stored correction pairs.
fn two_loop_recursion(grad: &[f64], history: &VecDeque<Correction>) -> Vec<f64> {
    let mut q = grad.to_vec();
    let mut alphas = Vec::with_capacity(history.len());

    for c in history.iter().rev() {
        let a = c.rho * dot(&c.s, &q);
        for (qi, yi) in q.iter_mut().zip(&c.y) {
            *qi -= a * yi;
        }
        alphas.push(a);
    }

    // Initial Hessian scaling gamma = sᵀy / yᵀy from the newest pair.
    let gamma = history
        .back()
        .map(|c| dot(&c.s, &c.y) / dot(&c.y, &c.y))
        .filter(|g| g.is_finite() && *g > 0.0)
        .unwrap_or(1.0);
    let mut r: Vec<f64> = q.iter().map(|v| gamma * v).collect();

    for (c, a) in history.iter().zip(alphas.iter().rev()) {
        let b = c.rho * dot(&c.y, &r);
        for (ri, si) in r.iter_mut().zip(&c.s) {
            *ri += si * (a - b);
        }
    }

    r.iter().map(|v| -v).collect()
}

/// `x - P(x - g)` where `P` clamps into the box; plain `g` without bounds.
fn projected_gradient(x: &[f64], grad: &[f64], bounds: Option<&[(f64, f64)]>) -> Vec<f64> {
    match bounds {
        None => grad.to_vec(),
        Some(b) => x
            .iter()
            .zip(grad)
            .zip(b)
            .map(|((xi, gi), &(lo, hi))| xi - (xi - gi).clamp(lo, hi))
            .collect(),
    }
}

/// Zero the direction on coordinates sitting at a bound and pointing outward.
fn freeze_active(x: &[f64], direction: &mut [f64], bounds: Option<&[(f64, f64)]>) {
    let Some(b) = bounds else {
        return;
    };
    for ((di, xi), &(lo, hi)) in direction.iter_mut().zip(x).zip(b) {
        if (*xi <= lo && *di < 0.0) || (*xi >= hi && *di > 0.0) {
            *di = 0.0;
        }
    }
}

/// Backtracking line search with the Armijo condition.
///
/// With bounds, each trial `x + alpha * d` is clamped into the box and the
/// decrease is measured against the step actually taken.
///
/// Returns the accepted point (if any) and the number of evaluations spent.
fn backtracking_line_search<F>(
    f: &F,
    x: &[f64],
    fx: f64,
    grad: &[f64],
    direction: &[f64],
    alpha0: f64,
    bounds: Option<&[(f64, f64)]>,
) -> (Option<(Vec<f64>, f64)>, usize)
where
    F: Fn(&[f64]) -> f64,
{
    let mut alpha = alpha0;
    let mut evals = 0;

    for _ in 0..MAX_BACKTRACKS {
        let mut x_new: Vec<f64> = x.iter().zip(direction).map(|(a, d)| a + alpha * d).collect();
        if let Some(b) = bounds {
            clamp_into(&mut x_new, b);
        }
        let fx_new = f(&x_new);
        evals += 1;

        let step_slope: f64 = grad
            .iter()
            .zip(x_new.iter().zip(x))
            .map(|(g, (a, b))| g * (a - b))
            .sum();
        if fx_new.is_finite() && step_slope < 0.0 && fx_new <= fx + ARMIJO_C1 * step_slope {
            return (Some((x_new, fx_new)), evals);
        }
        alpha *= 0.5;
    }

    (None, evals)
}
