//! CSV ingest of 3D data points.
//!
//! Accepted layout:
//!
//! ```text
//! # optional comment lines
//! x,y,z            <- optional header (any non-numeric first row)
//! 1.0,0.0,0.0
//! 0.54,0.84,1.0
//! ```
//!
//! Exactly three numeric columns per row; surrounding whitespace is trimmed and
//! blank lines are skipped. Any malformed row fails the whole load with its line
//! number, since a fit against a silently shortened dataset is worse than none.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{DataPoints, Point3};
use crate::error::AppError;

/// Load data points from a CSV file.
pub fn read_points_csv(path: &Path) -> Result<DataPoints, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open data CSV '{}': {e}", path.display())))?;
    parse_points_csv(file)
        .map_err(|e| AppError::input(format!("{}: {}", path.display(), e.message())))
}

/// Parse data points from any CSV reader.
pub fn parse_points_csv<R: Read>(reader: R) -> Result<DataPoints, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::input(format!("CSV parse error: {e}")))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 1);

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        match parse_row(&record) {
            Ok(p) => points.push(p),
            // A leading non-numeric row is a header.
            Err(_) if points.is_empty() && idx == 0 && looks_like_header(&record) => continue,
            Err(message) => return Err(AppError::input(format!("line {line}: {message}"))),
        }
    }

    DataPoints::new(points)
}

fn parse_row(record: &StringRecord) -> Result<Point3, String> {
    if record.len() != 3 {
        return Err(format!("expected 3 columns (x,y,z), found {}", record.len()));
    }
    let mut coords = [0.0; 3];
    for (slot, (field, axis)) in coords.iter_mut().zip(record.iter().zip(["x", "y", "z"])) {
        let v: f64 = field
            .parse()
            .map_err(|_| format!("invalid {axis} value '{field}'"))?;
        if !v.is_finite() {
            return Err(format!("non-finite {axis} value '{field}'"));
        }
        *slot = v;
    }
    Ok(Point3::new(coords[0], coords[1], coords[2]))
}

fn looks_like_header(record: &StringRecord) -> bool {
    record.iter().all(|field| field.parse::<f64>().is_err())
}
