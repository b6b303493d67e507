//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs the request handler
//! - prints reports/plots
//! - writes optional exports

use std::fs::OpenOptions;
use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::cli::{Command, ControlArgs, CurveArgs, FitArgs, PlotArgs, RenderArgs, TuiArgs};
use crate::domain::{CalibrationSet, LabConfig, RenderRequest};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `phlab` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is normal; anything it sets (RUST_LOG, PHLAB_*) is picked up below.
    let _ = dotenvy::dotenv();

    // `phlab` and `phlab --ph 4` behave like `phlab tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_logging(log_sink(&cli.command));

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Render(args) => handle_render(args),
        Command::Curve(args) => handle_curve(args),
        Command::Plot(args) => handle_plot(args),
    }
}

/// Log file used while the TUI owns the terminal.
pub const TUI_LOG_FILE: &str = "phlab.log";

/// Where log records go for a given subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    /// Append to a file; stderr shares the tty with the alternate screen.
    File(PathBuf),
}

pub fn log_sink(command: &Command) -> LogSink {
    match command {
        Command::Tui(args) => LogSink::File(args.snapshot_dir.join(TUI_LOG_FILE)),
        Command::Render(_) | Command::Curve(_) | Command::Plot(_) => LogSink::Stderr,
    }
}

/// Install the logger; `warn` unless `RUST_LOG` says otherwise.
///
/// If the log file cannot be opened no logger is installed, so nothing ever
/// reaches the terminal behind the TUI.
fn init_logging(sink: LogSink) {
    let env = env_logger::Env::default().default_filter_or("warn");
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp(None);

    match sink {
        LogSink::Stderr => {
            builder.target(env_logger::Target::Stderr);
        }
        LogSink::File(path) => {
            let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
                return;
            };
            builder.format_timestamp_secs().target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    let _ = builder.try_init();
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let config = lab_config_from_fit_args(&args.fit);
    let request = request_from_controls(&args.controls);
    crate::tui::run(request, config, args.snapshot_dir)
}

fn handle_render(args: RenderArgs) -> Result<(), AppError> {
    let config = lab_config_from_render_args(&args);
    let request = request_from_controls(&args.controls);
    let result = pipeline::handle(request, &config)?;

    println!("{}", crate::report::format_run_summary(&result));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &result.curves,
            &result.points,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    // Optional exports.
    for path in crate::io::export::write_render_outputs(&result, &config)? {
        println!("wrote {}", path.display());
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &result.curves, &CalibrationSet::standard())?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn handle_curve(args: CurveArgs) -> Result<(), AppError> {
    let config = lab_config_from_fit_args(&args.fit);
    let calibration = CalibrationSet::standard();
    let grid = crate::fit::ph_grid(&config)?;
    let fitter = crate::fit::fitter_for(args.mode, &config);
    let curves = crate::fit::fit_curve_set(fitter.as_ref(), &calibration, &grid)?;

    crate::io::curve::write_curve_json(&args.output, &curves, &calibration)?;
    print!("{}", crate::report::format_curve_table(&curves));
    info!("curve export complete: {}", args.output.display());
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, !args.no_points, args.width, args.height);

    println!("{plot}");
    Ok(())
}

pub fn request_from_controls(controls: &ControlArgs) -> RenderRequest {
    RenderRequest {
        ph: controls.ph,
        show_points: !controls.no_points,
        use_sigmoid: controls.mode == crate::domain::FitMode::Sigmoid,
    }
    .normalized()
}

pub fn lab_config_from_fit_args(args: &FitArgs) -> LabConfig {
    LabConfig {
        grid_samples: args.samples,
        max_evals: args.max_evals,
        ..LabConfig::default()
    }
}

pub fn lab_config_from_render_args(args: &RenderArgs) -> LabConfig {
    LabConfig {
        out_dir: args.out_dir.clone(),
        write_images: !args.no_images,
        write_samples: args.samples_csv,
        export_curve: args.export_curve.clone(),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        ..lab_config_from_fit_args(&args.fit)
    }
}

/// Rewrite argv so `phlab` defaults to `phlab tui`.
///
/// Rules:
/// - `phlab`                      -> `phlab tui`
/// - `phlab --ph 4 ...`           -> `phlab tui --ph 4 ...`
/// - `phlab --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "render" | "curve" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
