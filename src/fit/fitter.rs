//! Optimizer runs over a `CurveFitCost`.
//!
//! Each run hands the flat objective to a generic solver, then rebuilds the
//! structured `CurveParams` from the solver's answer and re-scores it so the
//! reported breakdown always comes from the cost itself.

use std::time::Instant;

use log::{info, warn};

use crate::domain::{CurveParams, FitConfig, FitRun, OptimizerKind};
use crate::error::AppError;
use crate::fit::bounds::{global_bounds, initial_guess};
use crate::fit::cost::CurveFitCost;
use crate::optimize::{DeOptions, LbfgsOptions, differential_evolution, lbfgs};

/// Local quasi-Newton fit from `x0`.
pub fn fit_local(cost: &CurveFitCost, x0: &[f64], opts: &LbfgsOptions) -> Result<FitRun, AppError> {
    let initial_cost = cost.evaluate_flat(x0)?;
    let started = Instant::now();

    info!("lbfgs: start, dimension={}, f(x0)={initial_cost:.6e}", x0.len());
    let res = lbfgs(cost.objective(), x0, opts)?;

    let params = CurveParams::from_flat(&res.x, cost.n_coeffs())?;
    let breakdown = cost.evaluate(&params)?;
    if !res.converged {
        warn!("lbfgs: stopped without meeting tolerances (iterations={})", res.iterations);
    }
    info!(
        "lbfgs: done, f={:.6e} iterations={} nfev={}",
        breakdown.total, res.iterations, res.nfev
    );

    Ok(FitRun {
        kind: OptimizerKind::Lbfgs,
        params,
        cost: breakdown,
        initial_cost: Some(initial_cost),
        iterations: res.iterations,
        nfev: res.nfev,
        converged: res.converged,
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}

/// Global derivative-free fit inside `bounds`.
pub fn fit_global(
    cost: &CurveFitCost,
    bounds: &[(f64, f64)],
    opts: &DeOptions,
) -> Result<FitRun, AppError> {
    if bounds.len() != cost.dimension() {
        return Err(AppError::input(format!(
            "Expected {} bounds, got {}.",
            cost.dimension(),
            bounds.len()
        )));
    }
    let started = Instant::now();

    info!(
        "differential_evolution: start, dimension={}, popsize={}",
        bounds.len(),
        opts.popsize
    );
    let res = differential_evolution(cost.objective(), bounds, opts)?;

    let params = CurveParams::from_flat(&res.x, cost.n_coeffs())?;
    let breakdown = cost.evaluate(&params)?;
    if !res.converged {
        warn!(
            "differential_evolution: population did not converge in {} generations",
            res.iterations
        );
    }
    info!(
        "differential_evolution: done, f={:.6e} generations={} nfev={}",
        breakdown.total, res.iterations, res.nfev
    );

    Ok(FitRun {
        kind: OptimizerKind::DifferentialEvolution,
        params,
        cost: breakdown,
        initial_cost: None,
        iterations: res.iterations,
        nfev: res.nfev,
        converged: res.converged,
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}

/// Run the optimizers selected by `config.method`, in order.
///
/// Runs are independent: the global search does not start from the local answer.
pub fn run_fits(cost: &CurveFitCost, config: &FitConfig) -> Result<Vec<FitRun>, AppError> {
    let mut runs = Vec::new();
    for &kind in config.method.kinds() {
        let run = match kind {
            OptimizerKind::Lbfgs => fit_local(cost, &initial_guess(cost.n_coeffs()), &LbfgsOptions::default())?,
            OptimizerKind::DifferentialEvolution => {
                let bounds = global_bounds(cost.data(), cost.n_coeffs(), config.bound_scale)?;
                fit_global(cost, &bounds, &de_options(config))?
            }
        };
        runs.push(run);
    }
    Ok(runs)
}

/// Best (lowest total cost) run; ties keep the earlier run.
pub fn best_run(runs: &[FitRun]) -> Option<&FitRun> {
    let mut best: Option<&FitRun> = None;
    for run in runs {
        if best.is_none_or(|b| run.cost.total < b.cost.total) {
            best = Some(run);
        }
    }
    best
}

fn de_options(config: &FitConfig) -> DeOptions {
    DeOptions {
        popsize: config.popsize,
        max_iter: config.max_generations,
        tol: config.de_tol,
        seed: Some(config.seed),
        polish: config.polish,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::helix_points;
    use crate::domain::{DataPoints, DataSource, Method};

    fn config(method: Method) -> FitConfig {
        FitConfig {
            data: DataSource::Helix {
                n_points: 10,
                z_max: 2.0,
                noise: 0.0,
                seed: 42,
            },
            n_coeffs: 3,
            n_samples: 40,
            backward_weight: 0.1,
            method,
            popsize: 5,
            max_generations: 40,
            de_tol: 0.01,
            polish: false,
            seed: 42,
            bound_scale: 3.0,
            plot: false,
            plot_width: 40,
            plot_height: 12,
            svg_dir: None,
            export_curve: None,
            export_samples: None,
        }
    }

    fn cost() -> CurveFitCost {
        let data = DataPoints::new(helix_points(10, 2.0)).unwrap();
        CurveFitCost::new(data, 3, 40, 0.1).unwrap()
    }

    #[test]
    fn local_run_reports_consistent_costs() {
        let cost = cost();
        let run = fit_local(&cost, &initial_guess(3), &LbfgsOptions::default()).unwrap();
        assert_eq!(run.kind, OptimizerKind::Lbfgs);
        assert!(run.cost.total <= run.initial_cost.unwrap());
        assert_eq!(run.cost, cost.evaluate(&run.params).unwrap());
    }

    #[test]
    fn global_run_respects_bounds_and_seed() {
        let cost = cost();
        let cfg = config(Method::Global);
        let a = run_fits(&cost, &cfg).unwrap();
        let b = run_fits(&cost, &cfg).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].params, b[0].params);

        let bounds = global_bounds(cost.data(), 3, cfg.bound_scale).unwrap();
        for (v, &(lo, hi)) in a[0].params.to_flat().iter().zip(&bounds) {
            assert!(*v >= lo && *v <= hi);
        }
    }

    #[test]
    fn both_runs_local_first_and_best_is_lowest() {
        let cost = cost();
        let runs = run_fits(&cost, &config(Method::Both)).unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].kind, OptimizerKind::Lbfgs);
        assert_eq!(runs[1].kind, OptimizerKind::DifferentialEvolution);

        let best = best_run(&runs).unwrap();
        assert!(runs.iter().all(|r| best.cost.total <= r.cost.total));
    }

    #[test]
    fn polish_improves_global_result_on_default_helix() {
        let data = DataPoints::new(helix_points(10, 2.0)).unwrap();
        let cost = CurveFitCost::new(data, 5, 100, 0.1).unwrap();
        let bounds = global_bounds(cost.data(), 5, 3.0).unwrap();
        let rough = DeOptions {
            popsize: 50,
            seed: Some(42),
            polish: false,
            ..Default::default()
        };
        let polished = DeOptions {
            polish: true,
            ..rough.clone()
        };

        let a = fit_global(&cost, &bounds, &rough).unwrap();
        let b = fit_global(&cost, &bounds, &polished).unwrap();
        assert!(
            b.cost.total < a.cost.total,
            "polished {:.6e} vs rough {:.6e}",
            b.cost.total,
            a.cost.total
        );
        for (v, &(lo, hi)) in b.params.to_flat().iter().zip(&bounds) {
            assert!(*v >= lo && *v <= hi);
        }
    }

    #[test]
    fn mismatched_bounds_are_rejected() {
        let cost = cost();
        assert!(fit_global(&cost, &[(-1.0, 1.0); 4], &DeOptions::default()).is_err());
    }
}
