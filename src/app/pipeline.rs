//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place keeps the core workflow separate from printing:
//! load data -> build the cost context -> run optimizers -> pick the best run

use log::info;

use crate::data::load_data;
use crate::domain::{FitConfig, FitRun};
use crate::error::AppError;
use crate::fit::{CurveFitCost, best_run, run_fits};

/// All computed outputs of a single `pf3 fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub cost: CurveFitCost,
    pub runs: Vec<FitRun>,
}

impl RunOutput {
    /// Lowest-cost run; `None` only if no optimizer was selected.
    pub fn best(&self) -> Option<&FitRun> {
        best_run(&self.runs)
    }
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let data = load_data(&config.data)?;
    info!("loaded {} data points", data.len());

    let cost = CurveFitCost::new(data, config.n_coeffs, config.n_samples, config.backward_weight)?;
    let runs = run_fits(&cost, config)?;

    Ok(RunOutput { cost, runs })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataSource, Method, OptimizerKind};

    #[test]
    fn local_pipeline_on_default_helix() {
        let config = FitConfig {
            data: DataSource::Helix {
                n_points: 10,
                z_max: 2.0,
                noise: 0.0,
                seed: 42,
            },
            n_coeffs: 5,
            n_samples: 100,
            backward_weight: 0.1,
            method: Method::Local,
            popsize: 50,
            max_generations: 1000,
            de_tol: 0.01,
            polish: true,
            seed: 42,
            bound_scale: 3.0,
            plot: false,
            plot_width: 80,
            plot_height: 24,
            svg_dir: None,
            export_curve: None,
            export_samples: None,
        };

        let out = run_fit(&config).unwrap();
        assert_eq!(out.cost.data().len(), 10);
        assert_eq!(out.runs.len(), 1);

        let best = out.best().unwrap();
        assert_eq!(best.kind, OptimizerKind::Lbfgs);
        assert!(best.cost.total < best.initial_cost.unwrap());
    }
}
