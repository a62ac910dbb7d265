//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or re-scoring

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// Which optimizer(s) a fit run should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// L-BFGS from the all-ones initial guess.
    Local,
    /// Differential evolution inside symmetric per-coordinate bounds.
    Global,
    /// Local first, then global (the global run is not seeded by the local one).
    Both,
}

impl Method {
    pub fn kinds(self) -> &'static [OptimizerKind] {
        match self {
            Method::Local => &[OptimizerKind::Lbfgs],
            Method::Global => &[OptimizerKind::DifferentialEvolution],
            Method::Both => &[OptimizerKind::Lbfgs, OptimizerKind::DifferentialEvolution],
        }
    }
}

/// Concrete optimizer used for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    Lbfgs,
    DifferentialEvolution,
}

impl OptimizerKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            OptimizerKind::Lbfgs => "L-BFGS (local, quasi-Newton)",
            OptimizerKind::DifferentialEvolution => "Differential evolution (global)",
        }
    }

    /// Short file-name friendly label.
    pub fn slug(self) -> &'static str {
        match self {
            OptimizerKind::Lbfgs => "lbfgs",
            OptimizerKind::DifferentialEvolution => "de",
        }
    }
}

/// The fixed, read-only set of observed points a curve is fitted to.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoints {
    points: Vec<Point3>,
}

impl DataPoints {
    pub fn new(points: Vec<Point3>) -> Result<Self, AppError> {
        if points.is_empty() {
            return Err(AppError::input("Data set is empty."));
        }
        if let Some(i) = points.iter().position(|p| !p.coords.iter().all(|v| v.is_finite())) {
            return Err(AppError::input(format!("Data point {i} has a non-finite coordinate.")));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest absolute coordinate over all points and axes.
    pub fn max_abs_coordinate(&self) -> f64 {
        self.points
            .iter()
            .flat_map(|p| p.coords.iter().copied())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }
}

/// Coefficients of three power-basis polynomials `x(t)`, `y(t)`, `z(t)`.
///
/// Index `k` of each array multiplies `t^k`. All three arrays always share the
/// same length `K` (the coefficient count, i.e. degree + 1); the constructors are
/// the only way to build a value, so a mis-sized vector can never be sliced
/// silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCurveParams")]
pub struct CurveParams {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

#[derive(Deserialize)]
struct RawCurveParams {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl TryFrom<RawCurveParams> for CurveParams {
    type Error = AppError;

    fn try_from(raw: RawCurveParams) -> Result<Self, Self::Error> {
        CurveParams::new(raw.x, raw.y, raw.z)
    }
}

impl CurveParams {
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self, AppError> {
        if x.is_empty() {
            return Err(AppError::input("Curve needs at least one coefficient per axis."));
        }
        if x.len() != y.len() || x.len() != z.len() {
            return Err(AppError::input(format!(
                "Coefficient counts differ between axes: x={}, y={}, z={}.",
                x.len(),
                y.len(),
                z.len()
            )));
        }
        Ok(Self { x, y, z })
    }

    /// Split a flat `[x.., y.., z..]` vector of length exactly `3 * n_coeffs`.
    pub fn from_flat(flat: &[f64], n_coeffs: usize) -> Result<Self, AppError> {
        if n_coeffs == 0 {
            return Err(AppError::input("Coefficient count must be >= 1."));
        }
        if flat.len() != 3 * n_coeffs {
            return Err(AppError::input(format!(
                "Expected {} coefficients (3 x {n_coeffs}), got {}.",
                3 * n_coeffs,
                flat.len()
            )));
        }
        let (x, rest) = flat.split_at(n_coeffs);
        let (y, z) = rest.split_at(n_coeffs);
        Self::new(x.to_vec(), y.to_vec(), z.to_vec())
    }

    pub fn n_coeffs(&self) -> usize {
        self.x.len()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Optimizer-facing flat layout `[x.., y.., z..]`.
    pub fn to_flat(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(3 * self.n_coeffs());
        out.extend_from_slice(&self.x);
        out.extend_from_slice(&self.y);
        out.extend_from_slice(&self.z);
        out
    }
}

/// A curve evaluated on a fixed parameter grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledCurve {
    pub t: Vec<f64>,
    pub points: Vec<Point3>,
}

/// The two directional terms of the curve-to-data distance and their weighted sum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Mean over data points of the squared distance to the nearest curve sample.
    pub forward: f64,
    /// Mean over curve samples of the squared distance to the nearest data point.
    pub backward: f64,
    pub backward_weight: f64,
    pub total: f64,
}

/// Outcome of one optimizer run.
#[derive(Debug, Clone)]
pub struct FitRun {
    pub kind: OptimizerKind,
    pub params: CurveParams,
    pub cost: CostBreakdown,
    /// Cost at the starting point (local runs only).
    pub initial_cost: Option<f64>,
    pub iterations: usize,
    pub nfev: usize,
    pub converged: bool,
    pub elapsed_secs: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub data: DataSource,

    /// Coefficients per axis (`K`, degree + 1).
    pub n_coeffs: usize,
    /// Curve samples per evaluation (`M`).
    pub n_samples: usize,
    pub backward_weight: f64,

    pub method: Method,
    /// Differential evolution population multiplier (population = popsize * 3K).
    pub popsize: usize,
    pub max_generations: usize,
    pub de_tol: f64,
    pub polish: bool,
    /// Seed for the differential evolution RNG.
    pub seed: u64,
    /// Global bounds are `±bound_scale * max|data|` on every coefficient.
    pub bound_scale: f64,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub svg_dir: Option<PathBuf>,

    pub export_curve: Option<PathBuf>,
    pub export_samples: Option<PathBuf>,
}

/// Where the data points come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Points on the helix `x = cos z`, `y = sin z`, `z` uniform in `[0, z_max]`.
    Helix {
        n_points: usize,
        z_max: f64,
        /// Standard deviation of Gaussian noise added to every coordinate.
        noise: f64,
        seed: u64,
    },
    /// `x,y,z` CSV file.
    Csv(PathBuf),
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub method: OptimizerKind,
    pub n_coeffs: usize,
    pub n_samples: usize,
    pub coefficients: CurveParams,
    pub cost: CostBreakdown,
    pub data: Vec<Point3>,
    pub samples: SampledCurve,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_flat_splits_axes_in_order() {
        let flat: Vec<f64> = (0..6).map(|v| v as f64).collect();
        let params = CurveParams::from_flat(&flat, 2).unwrap();
        assert_eq!(params.x(), &[0.0, 1.0]);
        assert_eq!(params.y(), &[2.0, 3.0]);
        assert_eq!(params.z(), &[4.0, 5.0]);
        assert_eq!(params.to_flat(), flat);
    }

    #[test]
    fn from_flat_rejects_wrong_length() {
        let err = CurveParams::from_flat(&[1.0; 14], 5).unwrap_err();
        assert_eq!(err.exit_code(), AppError::INPUT);
        assert!(CurveParams::from_flat(&[], 0).is_err());
    }

    #[test]
    fn mismatched_axes_are_rejected() {
        assert!(CurveParams::new(vec![1.0], vec![1.0, 2.0], vec![1.0]).is_err());
    }

    #[test]
    fn deserialize_validates_lengths() {
        let bad = r#"{"x":[1.0],"y":[1.0,2.0],"z":[1.0]}"#;
        assert!(serde_json::from_str::<CurveParams>(bad).is_err());

        let good = r#"{"x":[1.0,0.5],"y":[0.0,2.0],"z":[0.0,1.0]}"#;
        let params: CurveParams = serde_json::from_str(good).unwrap();
        assert_eq!(params.n_coeffs(), 2);
    }

    #[test]
    fn data_points_reject_empty_and_non_finite() {
        assert!(DataPoints::new(Vec::new()).is_err());
        assert!(DataPoints::new(vec![Point3::new(0.0, f64::NAN, 0.0)]).is_err());
        let data = DataPoints::new(vec![Point3::new(0.5, -2.0, 1.0)]).unwrap();
        assert_eq!(data.max_abs_coordinate(), 2.0);
    }
}
