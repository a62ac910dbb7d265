//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds or loads the data set
//! - runs the local and/or global fits
//! - prints reports/plots
//! - writes optional exports

use std::path::Path;

use clap::Parser;
use log::info;

use crate::cli::{Command, CostArgs, DataArgs, FitArgs, PlotArgs};
use crate::data::load_data;
use crate::domain::{CostBreakdown, CurveFile, DataPoints, DataSource, FitConfig, FitRun};
use crate::error::AppError;
use crate::fit::CurveFitCost;
use crate::plot::{Projection, SVG_SIZE, render_projection, write_scatter_svg};
use crate::report::{
    format_comparison, format_cost, format_data_summary, format_run, point_residuals, worst_points,
};

pub mod pipeline;

/// How many of the farthest data points each run report lists.
const WORST_POINTS: usize = 5;

/// Entry point for the `pf3` binary.
pub fn run() -> Result<(), AppError> {
    // `pf3` and `pf3 --n-coeffs 7` behave like `pf3 fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Cost(args) => handle_cost(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let out = pipeline::run_fit(&config)?;

    println!("{}", format_data_summary(out.cost.data(), &config.data));

    for run in &out.runs {
        let samples = out.cost.sample(&run.params);
        let residuals = point_residuals(out.cost.data().points(), &samples);
        println!("{}", format_run(run, &worst_points(&residuals, WORST_POINTS)));

        if config.plot {
            let plot = render_projection(
                out.cost.data().points(),
                &samples.points,
                Projection::Xy,
                config.plot_width,
                config.plot_height,
            );
            println!("{plot}");
        }

        if let Some(dir) = &config.svg_dir {
            write_run_svg(dir, run, &out.cost)?;
        }
    }

    let best = out.best();
    println!("{}", format_comparison(&out.runs, best));

    if let Some(best) = best {
        if let Some(path) = &config.export_curve {
            crate::io::write_curve_json(path, &crate::io::curve_file(best, &out.cost))?;
            info!("wrote curve JSON to {}", path.display());
        }
        if let Some(path) = &config.export_samples {
            crate::io::write_samples_csv(path, &out.cost.sample(&best.params))?;
            info!("wrote curve samples to {}", path.display());
        }
    }

    Ok(())
}

fn write_run_svg(dir: &Path, run: &FitRun, cost: &CurveFitCost) -> Result<(), AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(
            AppError::RENDER,
            format!("Failed to create SVG directory '{}': {e}", dir.display()),
        )
    })?;

    let path = dir.join(format!("{}.svg", run.kind.slug()));
    let title = format!("{} | cost {:.6e}", run.kind.display_name(), run.cost.total);
    let samples = cost.sample(&run.params);
    write_scatter_svg(&path, &title, cost.data().points(), &samples.points, SVG_SIZE)?;
    info!("wrote {}", path.display());
    Ok(())
}

fn handle_cost(args: CostArgs) -> Result<(), AppError> {
    let file = crate::io::read_curve_json(&args.curve)?;
    let scored = score_curve(&file, &args)?;

    println!("{}", scored.header);
    println!(
        "Curve: {} (K={}, M={})",
        args.curve.display(),
        file.n_coeffs,
        scored.n_samples
    );
    println!("{}", format_cost(&scored.cost));
    Ok(())
}

/// A saved curve re-scored against a data set.
#[derive(Debug, Clone)]
struct ScoredCurve {
    header: String,
    n_samples: usize,
    cost: CostBreakdown,
}

/// Score `file` against the stored data or the data selected by `args`.
///
/// `M` and the backward weight default to the values the file was written with.
fn score_curve(file: &CurveFile, args: &CostArgs) -> Result<ScoredCurve, AppError> {
    let (data, header) = if args.stored_data {
        let data = DataPoints::new(file.data.clone())?;
        let header = format!("Data: stored in {} (n={})\n", args.curve.display(), data.len());
        (data, header)
    } else {
        let source = data_source(&args.data);
        let data = load_data(&source)?;
        let header = format_data_summary(&data, &source);
        (data, header)
    };

    let n_samples = args.n_samples.unwrap_or(file.n_samples);
    let weight = args.backward_weight.unwrap_or(file.cost.backward_weight);
    let cost = CurveFitCost::new(data, file.n_coeffs, n_samples, weight)?;

    Ok(ScoredCurve {
        header,
        n_samples,
        cost: cost.evaluate(&file.coefficients)?,
    })
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_curve_json(&args.curve)?;
    println!("{}", render_curve_file(&file, &args)?);
    Ok(())
}

/// ASCII projection of a saved curve over its stored data, plus the optional SVG.
fn render_curve_file(file: &CurveFile, args: &PlotArgs) -> Result<String, AppError> {
    let plot = render_projection(
        &file.data,
        &file.samples.points,
        args.projection,
        args.width,
        args.height,
    );

    if let Some(path) = &args.svg {
        let title = format!("{} | cost {:.6e}", file.method.display_name(), file.cost.total);
        write_scatter_svg(path, &title, &file.data, &file.samples.points, SVG_SIZE)?;
        info!("wrote {}", path.display());
    }
    Ok(plot)
}

fn data_source(args: &DataArgs) -> DataSource {
    match &args.data {
        Some(path) => DataSource::Csv(path.clone()),
        None => DataSource::Helix {
            n_points: args.n_data,
            z_max: args.z_max,
            noise: args.noise,
            seed: args.seed,
        },
    }
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        data: data_source(&args.data),
        n_coeffs: args.n_coeffs,
        n_samples: args.n_samples,
        backward_weight: args.backward_weight,
        method: args.method,
        popsize: args.popsize,
        max_generations: args.max_gen,
        de_tol: args.de_tol,
        polish: !args.no_polish,
        seed: args.data.seed,
        bound_scale: args.bound_scale,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        svg_dir: (!args.no_svg).then(|| args.svg_dir.clone()),
        export_curve: args.export_curve.clone(),
        export_samples: args.export_samples.clone(),
    }
}

/// Rewrite argv so `pf3` defaults to `pf3 fit`.
///
/// Rules:
/// - `pf3`                      -> `pf3 fit`
/// - `pf3 -k 7 ...`             -> `pf3 fit -k 7 ...`
/// - `pf3 --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "cost" | "plot");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    argv
}
