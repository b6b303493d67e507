//! Command-line parsing for the pH color lab.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/rendering code.
//!
//! Flags that make sense as per-machine defaults also read `PHLAB_*`
//! environment variables (a `.env` file is loaded before parsing).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_GRID_SAMPLES, DEFAULT_MAX_EVALS, DEFAULT_PH, FitMode};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "phlab", version, about = "pH → RGB color lab: fitted channel curves, swatch and gradient")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI (default).
    ///
    /// Adjust pH with the arrow keys and toggle data points / sigmoid fit; the
    /// chart, swatch, gradient bar and RGB readout refresh on every change.
    Tui(TuiArgs),
    /// Render one request: print the RGB value, fit summary and an ASCII chart,
    /// and write the swatch/gradient PNGs.
    Render(RenderArgs),
    /// Fit the channel curves and export them as JSON.
    Curve(CurveArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// The three user controls.
#[derive(Debug, Args, Clone)]
pub struct ControlArgs {
    /// pH value (0-14, snapped to 0.1 steps).
    #[arg(long, env = "PHLAB_PH", default_value_t = DEFAULT_PH, allow_negative_numbers = true)]
    pub ph: f64,

    /// Curve mode: logistic fit or linear interpolation.
    #[arg(long, value_enum, default_value_t = FitMode::Sigmoid)]
    pub mode: FitMode,

    /// Hide the calibration data points.
    #[arg(long)]
    pub no_points: bool,
}

/// Curve sampling and solver options.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Residual evaluation cap for the logistic fit.
    #[arg(long, env = "PHLAB_MAX_EVALS", default_value_t = DEFAULT_MAX_EVALS)]
    pub max_evals: usize,

    /// Number of samples on the plotting grid.
    #[arg(long, default_value_t = DEFAULT_GRID_SAMPLES)]
    pub samples: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub controls: ControlArgs,

    #[command(flatten)]
    pub fit: FitArgs,

    /// Directory snapshot bundles are written to (key `e`).
    #[arg(long, env = "PHLAB_OUT_DIR", default_value = ".")]
    pub snapshot_dir: PathBuf,
}

#[derive(Debug, Parser, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub controls: ControlArgs,

    #[command(flatten)]
    pub fit: FitArgs,

    /// Output directory for PNG/CSV files.
    #[arg(long, env = "PHLAB_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Do not write swatch.png / gradient.png.
    #[arg(long)]
    pub no_images: bool,

    /// Also write the sampled curves to curve_samples.csv.
    #[arg(long)]
    pub samples_csv: bool,

    /// Export curve (mode + params + sampled grid) to JSON.
    #[arg(long = "export-curve", value_name = "JSON")]
    pub export_curve: Option<PathBuf>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct CurveArgs {
    /// Curve mode: logistic fit or linear interpolation.
    #[arg(long, value_enum, default_value_t = FitMode::Sigmoid)]
    pub mode: FitMode,

    #[command(flatten)]
    pub fit: FitArgs,

    /// Destination JSON file.
    #[arg(short, long, value_name = "JSON")]
    pub output: PathBuf,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `phlab curve` or `phlab render --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Hide the calibration data points.
    #[arg(long)]
    pub no_points: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
