//! 3D scatter of data vs. fitted curve, written as SVG with Plotters.
//!
//! Data points are drawn as large green circles, curve samples as small blue
//! dots. Plotters' 3D coordinate system has its second axis pointing up, so
//! points are passed as `(x, z, y)` to keep the physical `z` axis vertical.

use std::ops::Range;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::Point3;
use crate::error::AppError;

/// Default image size in pixels.
pub const SVG_SIZE: (u32, u32) = (800, 640);

/// Render the comparison to `path`.
pub fn write_scatter_svg(
    path: &Path,
    title: &str,
    data: &[Point3],
    curve: &[Point3],
    size: (u32, u32),
) -> Result<(), AppError> {
    let bounds = scene_bounds(data.iter().chain(curve.iter()));

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(16)
        .build_cartesian_3d(bounds[0].clone(), bounds[2].clone(), bounds[1].clone())
        .map_err(render_err)?;

    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.35;
        pb.scale = 0.85;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            curve
                .iter()
                .filter(|p| in_scene(p, &bounds))
                .map(|p| Circle::new((p.x, p.z, p.y), 2, BLUE.filled())),
        )
        .map_err(render_err)?;

    chart
        .draw_series(
            data.iter()
                .map(|p| Circle::new((p.x, p.z, p.y), 5, GREEN.filled())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn render_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::new(AppError::RENDER, format!("Failed to render SVG plot: {e}"))
}

/// Padded per-axis ranges covering every finite point.
fn scene_bounds<'a>(points: impl Iterator<Item = &'a Point3>) -> [Range<f64>; 3] {
    let mut lo = [f64::INFINITY; 3];
    let mut hi = [f64::NEG_INFINITY; 3];
    for p in points {
        for axis in 0..3 {
            let v = p[axis];
            if v.is_finite() {
                lo[axis] = lo[axis].min(v);
                hi[axis] = hi[axis].max(v);
            }
        }
    }

    std::array::from_fn(|axis| {
        let (a, b) = (lo[axis], hi[axis]);
        if !(a.is_finite() && b.is_finite()) {
            return -1.0..1.0;
        }
        let span = b - a;
        let pad = if span < 1e-12 { 0.5 } else { span * 0.05 };
        (a - pad)..(b + pad)
    })
}

fn in_scene(p: &Point3, bounds: &[Range<f64>; 3]) -> bool {
    (0..3).all(|axis| bounds[axis].contains(&p[axis]))
}
