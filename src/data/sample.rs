//! Synthetic helix data.
//!
//! The reference dataset is `N` points on the helix
//!
//! ```text
//! z ∈ linspace(0, z_max, N),  x = cos z,  y = sin z
//! ```
//!
//! optionally perturbed by i.i.d. Gaussian noise on every coordinate. With a
//! fixed seed the noisy sample is reproducible.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{DataPoints, DataSource, Point3};
use crate::error::AppError;
use crate::math::linspace;

/// Noise-free helix points.
pub fn helix_points(n_points: usize, z_max: f64) -> Vec<Point3> {
    linspace(0.0, z_max, n_points)
        .into_iter()
        .map(|z| Point3::new(z.cos(), z.sin(), z))
        .collect()
}

/// Helix points with Gaussian noise of standard deviation `noise`.
pub fn generate_helix(n_points: usize, z_max: f64, noise: f64, seed: u64) -> Result<DataPoints, AppError> {
    if n_points == 0 {
        return Err(AppError::input("Number of data points must be > 0."));
    }
    if !z_max.is_finite() {
        return Err(AppError::input(format!("Helix z range must be finite, got {z_max}.")));
    }
    if !(noise.is_finite() && noise >= 0.0) {
        return Err(AppError::input(format!("Noise must be finite and >= 0, got {noise}.")));
    }

    let mut points = helix_points(n_points, z_max);
    if noise > 0.0 {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, noise)
            .map_err(|e| AppError::input(format!("Noise distribution error: {e}")))?;
        for p in &mut points {
            p.coords += nalgebra::Vector3::from_fn(|_, _| normal.sample(&mut rng));
        }
    }
    DataPoints::new(points)
}

/// Build or load the data set described by `source`.
pub fn load_data(source: &DataSource) -> Result<DataPoints, AppError> {
    match source {
        DataSource::Helix {
            n_points,
            z_max,
            noise,
            seed,
        } => generate_helix(*n_points, *z_max, *noise, *seed),
        DataSource::Csv(path) => crate::io::ingest::read_points_csv(path),
    }
}
