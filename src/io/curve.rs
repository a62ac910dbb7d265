//! Read/write curve JSON files.
//!
//! Curve JSON is the portable representation of a fitted curve:
//! - optimizer + coefficients (per-axis power-basis arrays)
//! - cost breakdown at those coefficients
//! - the data the curve was fitted to and the sampled curve, for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::Utc;

use crate::domain::{CurveFile, FitRun};
use crate::error::AppError;
use crate::fit::CurveFitCost;

/// Assemble the JSON document for a finished run.
pub fn curve_file(run: &FitRun, cost: &CurveFitCost) -> CurveFile {
    CurveFile {
        tool: "pf3".to_string(),
        generated: Utc::now(),
        method: run.kind,
        n_coeffs: run.params.n_coeffs(),
        n_samples: cost.n_samples(),
        coefficients: run.params.clone(),
        cost: run.cost,
        data: cost.data().points().to_vec(),
        samples: cost.sample(&run.params),
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, curve: &CurveFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create curve JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), curve)
        .map_err(|e| AppError::input(format!("Failed to write curve JSON: {e}")))
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::input(format!("Invalid curve JSON: {e}")))?;

    if curve.samples.t.len() != curve.samples.points.len() {
        return Err(AppError::input(format!(
            "Invalid curve JSON: {} sample parameters but {} sample points.",
            curve.samples.t.len(),
            curve.samples.points.len()
        )));
    }
    if curve.coefficients.n_coeffs() != curve.n_coeffs {
        return Err(AppError::input(format!(
            "Invalid curve JSON: n_coeffs={} but coefficients have {} entries per axis.",
            curve.n_coeffs,
            curve.coefficients.n_coeffs()
        )));
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::helix_points;
    use crate::domain::{CurveParams, DataPoints, OptimizerKind};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("pf3_{}_{name}", std::process::id()))
    }

    #[test]
    fn curve_json_survives_a_round_trip() {
        let data = DataPoints::new(helix_points(6, 2.0)).unwrap();
        let cost = CurveFitCost::new(data, 2, 11, 0.1).unwrap();
        let params = CurveParams::new(vec![1.0, -0.5], vec![0.0, 0.9], vec![0.0, 2.0]).unwrap();
        let run = FitRun {
            kind: OptimizerKind::Lbfgs,
            cost: cost.evaluate(&params).unwrap(),
            params,
            initial_cost: Some(3.0),
            iterations: 4,
            nfev: 40,
            converged: true,
            elapsed_secs: 0.01,
        };

        let path = temp_path("roundtrip.json");
        let written = curve_file(&run, &cost);
        write_curve_json(&path, &written).unwrap();
        let read = read_curve_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(read.method, OptimizerKind::Lbfgs);
        assert_eq!(read.coefficients, run.params);
        assert_eq!(read.samples.points.len(), 11);
        assert_eq!(read.data.len(), 6);
        assert!((read.cost.total - run.cost.total).abs() < 1e-12);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = read_curve_json(&temp_path("does_not_exist.json")).unwrap_err();
        assert_eq!(err.exit_code(), AppError::INPUT);
    }
}
