//! Command-line parsing for the polynomial space-curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Method;
use crate::plot::Projection;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pf3", version, about = "Fit a 3D polynomial curve to a point set")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a curve with L-BFGS and/or differential evolution, report, plot, export.
    Fit(FitArgs),
    /// Score a saved curve JSON against a dataset.
    Cost(CostArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// Where the data points come from.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Read `x,y,z` points from a CSV file instead of generating a helix.
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,

    /// Number of synthetic helix points.
    #[arg(long, default_value_t = 10)]
    pub n_data: usize,

    /// Helix height: z runs over [0, z_max].
    #[arg(long, default_value_t = 2.0)]
    pub z_max: f64,

    /// Standard deviation of Gaussian noise added to the helix points.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed (helix noise and differential evolution).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Coefficients per axis (polynomial degree + 1).
    #[arg(short = 'k', long, default_value_t = 5)]
    pub n_coeffs: usize,

    /// Curve samples per cost evaluation.
    #[arg(short = 'm', long, default_value_t = 100)]
    pub n_samples: usize,

    /// Weight of the curve-to-data term.
    #[arg(long, default_value_t = 0.1)]
    pub backward_weight: f64,

    /// Which optimizer(s) to run.
    #[arg(long, value_enum, default_value_t = Method::Both)]
    pub method: Method,

    /// Differential evolution population multiplier (population = popsize * 3K).
    #[arg(long, default_value_t = 50)]
    pub popsize: usize,

    /// Maximum differential evolution generations.
    #[arg(long, default_value_t = 1000)]
    pub max_gen: usize,

    /// Differential evolution relative convergence tolerance.
    #[arg(long, default_value_t = 0.01)]
    pub de_tol: f64,

    /// Skip the L-BFGS polish of the differential evolution result.
    #[arg(long)]
    pub no_polish: bool,

    /// Global bounds are ±scale * max|data coordinate| on every coefficient.
    #[arg(long, default_value_t = 3.0)]
    pub bound_scale: f64,

    /// Render an ASCII projection per run (the default).
    #[arg(long, overrides_with = "no_plot")]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long, overrides_with = "plot")]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,

    /// Directory receiving one 3D scatter SVG per run (`lbfgs.svg`, `de.svg`).
    #[arg(long, value_name = "DIR", default_value = "pf3-plots")]
    pub svg_dir: PathBuf,

    /// Skip the 3D scatter SVGs.
    #[arg(long)]
    pub no_svg: bool,

    /// Export the best curve (coefficients + samples + data) to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,

    /// Export the best curve's samples to CSV.
    #[arg(long = "export-samples", value_name = "CSV")]
    pub export_samples: Option<PathBuf>,
}

/// Options for scoring a saved curve.
#[derive(Debug, Parser)]
pub struct CostArgs {
    /// Curve JSON file produced by `pf3 fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    #[command(flatten)]
    pub data: DataArgs,

    /// Score against the data stored in the curve file instead of `--data`/helix.
    #[arg(long)]
    pub stored_data: bool,

    /// Curve samples per evaluation (defaults to the value stored in the file).
    #[arg(short = 'm', long)]
    pub n_samples: Option<usize>,

    /// Weight of the curve-to-data term (defaults to the value stored in the file).
    #[arg(long)]
    pub backward_weight: Option<f64>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `pf3 fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Axes to project onto.
    #[arg(long, value_enum, default_value_t = Projection::Xy)]
    pub projection: Projection,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,

    /// Also write a 3D scatter SVG.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}
