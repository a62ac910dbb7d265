//! Export a sampled curve to CSV.
//!
//! One row per curve sample, easy to load into a spreadsheet or a plotting
//! script.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::SampledCurve;
use crate::error::AppError;

/// Write `t,x,y,z` rows for every sample.
pub fn write_samples_csv(path: &Path, curve: &SampledCurve) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create samples CSV '{}': {e}", path.display())))?;
    write_samples(BufWriter::new(file), curve)
}

fn write_samples<W: Write>(mut out: W, curve: &SampledCurve) -> Result<(), AppError> {
    let err = |e: std::io::Error| AppError::input(format!("Failed to write samples CSV: {e}"));

    writeln!(out, "t,x,y,z").map_err(err)?;
    for (t, p) in curve.t.iter().zip(&curve.points) {
        writeln!(out, "{t:.10},{:.10},{:.10},{:.10}", p.x, p.y, p.z).map_err(err)?;
    }
    out.flush().map_err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Point3;

    #[test]
    fn writes_header_and_rows() {
        let curve = SampledCurve {
            t: vec![0.0, 1.0],
            points: vec![Point3::new(1.0, 0.0, 0.0), Point3::new(0.5, -0.25, 2.0)],
        };
        let mut buf = Vec::new();
        write_samples(&mut buf, &curve).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "t,x,y,z");
        assert_eq!(lines[2], "1.0000000000,0.5000000000,-0.2500000000,2.0000000000");
        assert_eq!(lines.len(), 3);
    }
}
