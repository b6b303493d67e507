//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting and rendering
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lower bound of the pH scale exposed by the controls.
pub const PH_MIN: f64 = 0.0;
/// Upper bound of the pH scale exposed by the controls.
pub const PH_MAX: f64 = 14.0;
/// Slider resolution.
pub const PH_STEP: f64 = 0.1;
/// Neutral pH, the slider's starting position.
pub const DEFAULT_PH: f64 = 7.0;

/// Number of samples in the dense plotting grid.
pub const DEFAULT_GRID_SAMPLES: usize = 300;
/// Residual evaluation cap for the logistic fit.
pub const DEFAULT_MAX_EVALS: usize = 10_000;

/// An 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Value of a single channel.
    pub fn channel(self, channel: Channel) -> u8 {
        match channel {
            Channel::Red => self.r,
            Channel::Green => self.g,
            Channel::Blue => self.b,
        }
    }

    /// `#rrggbb` notation.
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.r, self.g, self.b)
    }
}

/// One color channel; curves are fitted per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn display_name(self) -> &'static str {
        match self {
            Channel::Red => "Red",
            Channel::Green => "Green",
            Channel::Blue => "Blue",
        }
    }

    /// Fully saturated color used to draw this channel's curve.
    pub fn plot_color(self) -> Rgb {
        match self {
            Channel::Red => Rgb::new(255, 0, 0),
            Channel::Green => Rgb::new(0, 200, 0),
            Channel::Blue => Rgb::new(60, 120, 255),
        }
    }
}

/// How channel curves are produced from calibration data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// 4-parameter logistic fit per channel.
    Sigmoid,
    /// Piecewise-linear interpolation through the calibration points.
    Linear,
}

impl FitMode {
    pub fn from_flag(use_sigmoid: bool) -> Self {
        if use_sigmoid { FitMode::Sigmoid } else { FitMode::Linear }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            FitMode::Sigmoid => "Sigmoid",
            FitMode::Linear => "Linear",
        }
    }
}

/// A single reference observation: the color measured at a given pH.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    pub ph: f64,
    pub rgb: Rgb,
}

impl CalibrationPoint {
    pub const fn new(ph: f64, r: u8, g: u8, b: u8) -> Self {
        Self { ph, rgb: Rgb::new(r, g, b) }
    }
}

/// The fixed reference table the curves are fitted against.
pub const STANDARD_CALIBRATION: [CalibrationPoint; 7] = [
    CalibrationPoint::new(1.0, 230, 20, 60),
    CalibrationPoint::new(3.0, 200, 60, 80),
    CalibrationPoint::new(5.0, 160, 100, 120),
    CalibrationPoint::new(7.0, 120, 160, 180),
    CalibrationPoint::new(9.0, 80, 200, 140),
    CalibrationPoint::new(11.0, 40, 220, 100),
    CalibrationPoint::new(13.0, 20, 230, 80),
];

/// Calibration points sorted by strictly increasing pH.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSet {
    points: Vec<CalibrationPoint>,
}

impl CalibrationSet {
    /// Validate and wrap a list of calibration points.
    ///
    /// Requires at least two points with finite, strictly increasing pH.
    pub fn new(points: Vec<CalibrationPoint>) -> Result<Self, AppError> {
        if points.len() < 2 {
            return Err(AppError::io(format!(
                "Calibration needs at least 2 points, got {}.",
                points.len()
            )));
        }
        if let Some(bad) = points.iter().find(|p| !p.ph.is_finite()) {
            return Err(AppError::io(format!("Non-finite calibration pH: {}", bad.ph)));
        }
        if points.windows(2).any(|w| w[1].ph <= w[0].ph) {
            return Err(AppError::io("Calibration pH values must be strictly increasing."));
        }
        Ok(Self { points })
    }

    /// The built-in 7-point table.
    pub fn standard() -> Self {
        Self {
            points: STANDARD_CALIBRATION.to_vec(),
        }
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    // Never empty: `new` requires at least two points.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn ph_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.ph).collect()
    }

    pub fn channel_values(&self, channel: Channel) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| f64::from(p.rgb.channel(channel)))
            .collect()
    }

    /// `(pH, intensity)` pairs for one channel (scatter overlay).
    pub fn channel_points(&self, channel: Channel) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.ph, f64::from(p.rgb.channel(channel))))
            .collect()
    }
}

impl Default for CalibrationSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Logistic curve `L / (1 + exp(-k (x - x0))) + b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticParams {
    #[serde(rename = "L")]
    pub l: f64,
    pub x0: f64,
    pub k: f64,
    pub b: f64,
}

impl LogisticParams {
    pub fn to_array(self) -> [f64; 4] {
        [self.l, self.x0, self.k, self.b]
    }

    pub fn from_slice(v: &[f64]) -> Self {
        Self {
            l: v[0],
            x0: v[1],
            k: v[2],
            b: v[3],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    /// Residual evaluations spent by the solver.
    pub evaluations: usize,
    pub n: usize,
}

/// A dense-sampled curve for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelCurve {
    pub channel: Channel,
    /// `(pH, intensity)` samples in increasing pH order.
    pub samples: Vec<(f64, f64)>,
    /// Present in sigmoid mode only.
    pub params: Option<LogisticParams>,
    /// Present in sigmoid mode only.
    pub quality: Option<FitQuality>,
}

/// The three channel curves produced by one fit request.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveSet {
    pub mode: FitMode,
    pub red: ChannelCurve,
    pub green: ChannelCurve,
    pub blue: ChannelCurve,
}

impl CurveSet {
    pub fn channel(&self, channel: Channel) -> &ChannelCurve {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelCurve> {
        [&self.red, &self.green, &self.blue].into_iter()
    }

    /// Number of samples per channel.
    pub fn len(&self) -> usize {
        self.red.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.red.samples.is_empty()
    }
}

/// The control state of one interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub ph: f64,
    pub show_points: bool,
    pub use_sigmoid: bool,
}

impl RenderRequest {
    pub fn mode(&self) -> FitMode {
        FitMode::from_flag(self.use_sigmoid)
    }

    /// Snap the pH to the slider domain and resolution.
    pub fn normalized(self) -> Self {
        Self {
            ph: snap_ph(self.ph),
            ..self
        }
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self {
            ph: DEFAULT_PH,
            show_points: true,
            use_sigmoid: true,
        }
    }
}

/// Clamp to `[PH_MIN, PH_MAX]` and round to the nearest `PH_STEP`.
///
/// Non-finite input falls back to `DEFAULT_PH`.
pub fn snap_ph(ph: f64) -> f64 {
    if !ph.is_finite() {
        return DEFAULT_PH;
    }
    let stepped = (ph / PH_STEP).round() * PH_STEP;
    // Round again to one decimal so repeated stepping does not accumulate drift.
    // `+ 0.0` turns a clamped `-0.0` into `0.0`.
    ((stepped * 10.0).round() / 10.0).clamp(PH_MIN, PH_MAX) + 0.0
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct LabConfig {
    pub grid_min: f64,
    pub grid_max: f64,
    pub grid_samples: usize,
    pub max_evals: usize,

    pub out_dir: PathBuf,
    pub write_images: bool,
    pub write_samples: bool,
    pub export_curve: Option<PathBuf>,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            grid_min: PH_MIN,
            grid_max: PH_MAX,
            grid_samples: DEFAULT_GRID_SAMPLES,
            max_evals: DEFAULT_MAX_EVALS,
            out_dir: PathBuf::from("."),
            write_images: true,
            write_samples: false,
            export_curve: None,
            plot: true,
            plot_width: 100,
            plot_height: 25,
        }
    }
}

/// Per-channel entry of a saved curve file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub params: Option<LogisticParams>,
    pub quality: Option<FitQuality>,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub mode: FitMode,
    pub calibration: Vec<CalibrationPoint>,
    pub channels: Vec<ChannelSummary>,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub ph: Vec<f64>,
    pub red: Vec<f64>,
    pub green: Vec<f64>,
    pub blue: Vec<f64>,
}

impl CurveGrid {
    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_calibration_is_valid() {
        let set = CalibrationSet::new(STANDARD_CALIBRATION.to_vec()).unwrap();
        assert_eq!(set.len(), 7);
        assert_eq!(set.ph_values(), vec![1.0, 3.0, 5.0, 7.0, 9.0, 11.0, 13.0]);
        assert_eq!(
            set.channel_values(Channel::Blue),
            vec![60.0, 80.0, 120.0, 180.0, 140.0, 100.0, 80.0]
        );
    }

    #[test]
    fn calibration_rejects_unsorted_or_short_input() {
        assert!(CalibrationSet::new(vec![CalibrationPoint::new(1.0, 0, 0, 0)]).is_err());
        let unsorted = vec![
            CalibrationPoint::new(3.0, 0, 0, 0),
            CalibrationPoint::new(1.0, 0, 0, 0),
        ];
        assert!(CalibrationSet::new(unsorted).is_err());
    }

    #[test]
    fn snap_ph_clamps_and_rounds() {
        assert_eq!(snap_ph(7.04), 7.0);
        assert_eq!(snap_ph(7.06), 7.1);
        assert_eq!(snap_ph(-3.0), 0.0);
        assert_eq!(snap_ph(99.0), 14.0);
        assert_eq!(snap_ph(f64::NAN), DEFAULT_PH);

        // Tiny negatives must not print as "-0.0".
        let zero = snap_ph(-0.04);
        assert!(zero.is_sign_positive());
        assert_eq!(format!("{zero:.1}"), "0.0");
    }

    #[test]
    fn rgb_formats() {
        let c = Rgb::new(80, 175, 255);
        assert_eq!(c.to_string(), "(80, 175, 255)");
        assert_eq!(c.hex(), "#50afff");
    }

    #[test]
    fn request_defaults_match_controls() {
        let req = RenderRequest::default();
        assert_eq!(req.ph, 7.0);
        assert!(req.show_points);
        assert_eq!(req.mode(), FitMode::Sigmoid);
    }
}
