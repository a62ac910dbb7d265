//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::domain::{CostBreakdown, CurveParams, DataPoints, DataSource, FitRun};
use crate::report::PointResidual;

/// Describe the dataset: source, size, and bounding box.
pub fn format_data_summary(data: &DataPoints, source: &DataSource) -> String {
    let mut out = String::new();
    out.push_str("=== pf3 - polynomial space-curve fit ===\n");

    match source {
        DataSource::Helix {
            z_max, noise, seed, ..
        } => out.push_str(&format!(
            "Data: helix x=cos z, y=sin z, z in [0, {z_max}] | noise={noise} seed={seed}\n"
        )),
        DataSource::Csv(path) => out.push_str(&format!("Data: {}\n", path.display())),
    }

    let (lo, hi) = bounding_box(data);
    out.push_str(&format!(
        "Points: n={} | x=[{:.3}, {:.3}] y=[{:.3}, {:.3}] z=[{:.3}, {:.3}]\n",
        data.len(),
        lo[0],
        hi[0],
        lo[1],
        hi[1],
        lo[2],
        hi[2]
    ));
    out
}

/// Full report for one optimizer run.
pub fn format_run(run: &FitRun, worst: &[PointResidual]) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n--- {} ---\n", run.kind.display_name()));
    out.push_str(&format!(
        "Status: {} | iterations={} nfev={} time={:.2}s\n",
        if run.converged { "converged" } else { "not converged" },
        run.iterations,
        run.nfev,
        run.elapsed_secs
    ));
    if let Some(initial) = run.initial_cost {
        out.push_str(&format!("Initial cost: {initial:.6e}\n"));
    }
    out.push_str(&format_cost(&run.cost));
    out.push_str(&format_coefficients(&run.params));

    if !worst.is_empty() {
        out.push_str("Farthest data points:\n");
        out.push_str(&format!("{:>5} {:>10} {:>10} {:>10} {:>10}\n", "idx", "x", "y", "z", "dist"));
        out.push_str(&format!("{:->5} {:->10} {:->10} {:->10} {:->10}\n", "", "", "", "", ""));
        for r in worst {
            out.push_str(&format!(
                "{:>5} {:>10.4} {:>10.4} {:>10.4} {:>10.4}\n",
                r.index, r.point.x, r.point.y, r.point.z, r.distance
            ));
        }
    }
    out
}

/// Cost breakdown block.
pub fn format_cost(cost: &CostBreakdown) -> String {
    format!(
        "Cost: total={:.6e} | forward={:.6e} backward={:.6e} (weight {})\n",
        cost.total, cost.forward, cost.backward, cost.backward_weight
    )
}

/// Per-axis coefficient table, lowest power first.
pub fn format_coefficients(params: &CurveParams) -> String {
    let mut out = String::from("Coefficients (t^0 .. t^K-1):\n");
    out.push_str(&format!("- x: {}\n", fmt_vec(params.x())));
    out.push_str(&format!("- y: {}\n", fmt_vec(params.y())));
    out.push_str(&format!("- z: {}\n", fmt_vec(params.z())));
    out
}

/// One line per run, best marked with `*`.
pub fn format_comparison(runs: &[FitRun], best: Option<&FitRun>) -> String {
    let mut out = String::from("\nSummary:\n");
    for run in runs {
        let chosen = if best.is_some_and(|b| std::ptr::eq(b, run)) { "*" } else { " " };
        out.push_str(&format!(
            "{chosen} {:<34} cost={:.6e}\n",
            run.kind.display_name(),
            run.cost.total
        ));
    }
    out
}

fn bounding_box(data: &DataPoints) -> ([f64; 3], [f64; 3]) {
    let mut lo = [f64::INFINITY; 3];
    let mut hi = [f64::NEG_INFINITY; 3];
    for p in data.points() {
        for axis in 0..3 {
            lo[axis] = lo[axis].min(p[axis]);
            hi[axis] = hi[axis].max(p[axis]);
        }
    }
    (lo, hi)
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OptimizerKind, Point3};

    #[test]
    fn coefficients_are_listed_per_axis() {
        let params = CurveParams::new(vec![1.0, 0.5], vec![0.0, -2.0], vec![0.25, 0.0]).unwrap();
        let txt = format_coefficients(&params);
        assert!(txt.contains("- x: [1.000000, 0.500000]"));
        assert!(txt.contains("- y: [0.000000, -2.000000]"));
        assert!(txt.contains("- z: [0.250000, 0.000000]"));
    }

    #[test]
    fn data_summary_reports_bounding_box() {
        let data = DataPoints::new(vec![Point3::new(1.0, 0.0, 0.0), Point3::new(-1.0, 2.0, 0.5)]).unwrap();
        let txt = format_data_summary(&data, &DataSource::Csv("pts.csv".into()));
        assert!(txt.contains("Data: pts.csv"));
        assert!(txt.contains("n=2 | x=[-1.000, 1.000] y=[0.000, 2.000] z=[0.000, 0.500]"));
    }

    #[test]
    fn comparison_marks_best_run() {
        let params = CurveParams::new(vec![0.0], vec![0.0], vec![0.0]).unwrap();
        let run = |kind, total| FitRun {
            kind,
            params: params.clone(),
            cost: CostBreakdown {
                forward: total,
                backward: 0.0,
                backward_weight: 0.1,
                total,
            },
            initial_cost: None,
            iterations: 1,
            nfev: 1,
            converged: true,
            elapsed_secs: 0.0,
        };
        let runs = vec![run(OptimizerKind::Lbfgs, 2.0), run(OptimizerKind::DifferentialEvolution, 1.0)];
        let txt = format_comparison(&runs, Some(&runs[1]));
        let lines: Vec<&str> = txt.lines().collect();
        assert!(lines[2].starts_with("  L-BFGS"));
        assert!(lines[3].starts_with("* Differential"));
    }
}
