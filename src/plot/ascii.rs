//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid, orthographic projection),
//! optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - data points: `o`
//! - fitted curve: `-` line through consecutive samples

use clap::ValueEnum;

use crate::domain::Point3;

/// Which pair of axes to keep when flattening 3D points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Projection {
    /// Top view.
    Xy,
    Xz,
    Yz,
}

impl Projection {
    fn axes(self) -> (usize, usize) {
        match self {
            Projection::Xy => (0, 1),
            Projection::Xz => (0, 2),
            Projection::Yz => (1, 2),
        }
    }

    fn label(self) -> (&'static str, &'static str) {
        match self {
            Projection::Xy => ("x", "y"),
            Projection::Xz => ("x", "z"),
            Projection::Yz => ("y", "z"),
        }
    }

    fn project(self, p: &Point3) -> (f64, f64) {
        let (a, b) = self.axes();
        (p[a], p[b])
    }
}

/// Render data points over a sampled curve, projected onto two axes.
pub fn render_projection(
    data: &[Point3],
    curve: &[Point3],
    projection: Projection,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let data_2d: Vec<(f64, f64)> = data.iter().map(|p| projection.project(p)).collect();
    let curve_2d: Vec<(f64, f64)> = curve.iter().map(|p| projection.project(p)).collect();

    let all = || data_2d.iter().chain(curve_2d.iter());
    let (u_min, u_max) = range(all().map(|&(u, _)| u)).unwrap_or((0.0, 1.0));
    let (v_min, v_max) = range(all().map(|&(_, v)| v)).unwrap_or((0.0, 1.0));
    let (u_min, u_max) = pad_range(u_min, u_max, 0.05);
    let (v_min, v_max) = pad_range(v_min, v_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    let mut prev = None;
    for &(u, v) in &curve_2d {
        let x = map_col(u, u_min, u_max, width);
        let y = map_row(v, v_min, v_max, height);
        match prev {
            Some((x0, y0)) => draw_line(&mut grid, x0, y0, x, y, '-'),
            None => grid[y][x] = '-',
        }
        prev = Some((x, y));
    }

    for &(u, v) in &data_2d {
        let x = map_col(u, u_min, u_max, width);
        let y = map_row(v, v_min, v_max, height);
        grid[y][x] = 'o';
    }

    let (u_name, v_name) = projection.label();
    let mut out = format!(
        "Plot ({u_name}-{v_name}): {u_name}=[{u_min:.3}, {u_max:.3}] | {v_name}=[{v_min:.3}, {v_max:.3}]\n"
    );
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo.is_finite() && hi.is_finite() {
        Some((lo, hi))
    } else {
        None
    }
}

/// Pad by a fraction of the span; a zero span still gets a unit-sized window.
fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    if span < 1e-12 {
        return (min - 0.5, max + 0.5);
    }
    let pad = span * frac;
    (min - pad, max + pad)
}

fn map_col(u: f64, u_min: f64, u_max: f64, width: usize) -> usize {
    let s = ((u - u_min) / (u_max - u_min)).clamp(0.0, 1.0);
    (s * (width as f64 - 1.0)).round() as usize
}

fn map_row(v: f64, v_min: f64, v_max: f64, height: usize) -> usize {
    let s = ((v - v_min) / (v_max - v_min)).clamp(0.0, 1.0);
    // top row is the maximum
    (height as f64 - 1.0 - (s * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if let Some(cell) = grid
            .get_mut(y0 as usize)
            .and_then(|row| row.get_mut(x0 as usize))
        {
            if *cell == ' ' {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
