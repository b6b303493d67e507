//! Shared request handler used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! request -> curve fit -> swatch + gradient render -> color lookup
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).
//! Every call recomputes everything from scratch; no state survives between
//! requests.

use image::RgbImage;
use log::debug;

use crate::color::ph_to_rgb;
use crate::domain::{CalibrationSet, Channel, CurveSet, LabConfig, RenderRequest, Rgb};
use crate::error::AppError;
use crate::fit::{fit_curve_set, fitter_for, ph_grid};
use crate::render::{render_gradient_bar, render_swatch};

/// Calibration scatter for one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub channel: Channel,
    pub points: Vec<(f64, f64)>,
}

/// All computed outputs of a single interaction.
#[derive(Debug, Clone)]
pub struct RenderResult {
    /// The request after snapping pH to the slider domain.
    pub request: RenderRequest,
    pub curves: CurveSet,
    /// Empty when the request hides data points.
    pub points: Vec<ScatterSeries>,
    pub swatch: RgbImage,
    pub gradient: RgbImage,
    pub rgb: Rgb,
}

/// Handle a request against the built-in calibration table.
pub fn handle(request: RenderRequest, config: &LabConfig) -> Result<RenderResult, AppError> {
    handle_with_calibration(request, &CalibrationSet::standard(), config)
}

/// Handle a request against an explicit calibration set.
pub fn handle_with_calibration(
    request: RenderRequest,
    calibration: &CalibrationSet,
    config: &LabConfig,
) -> Result<RenderResult, AppError> {
    let request = request.normalized();

    // 1) Fit or interpolate the channel curves.
    let grid = ph_grid(config)?;
    let fitter = fitter_for(request.mode(), config);
    let curves = fit_curve_set(fitter.as_ref(), calibration, &grid)?;

    // 2) Optional scatter overlay.
    let points = if request.show_points {
        Channel::ALL
            .iter()
            .map(|&channel| ScatterSeries {
                channel,
                points: calibration.channel_points(channel),
            })
            .collect()
    } else {
        Vec::new()
    };

    // 3) Images and the color readout.
    let rgb = ph_to_rgb(request.ph);
    let swatch = render_swatch(request.ph);
    let gradient = render_gradient_bar();

    debug!(
        "handled request ph={:.1} mode={} points={} -> rgb={rgb}",
        request.ph,
        curves.mode.display_name(),
        request.show_points
    );

    Ok(RenderResult {
        request,
        curves,
        points,
        swatch,
        gradient,
        rgb,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitMode;

    #[test]
    fn default_request_renders_everything() {
        let out = handle(RenderRequest::default(), &LabConfig::default()).unwrap();
        assert_eq!(out.rgb, Rgb::new(80, 175, 255));
        assert_eq!(out.curves.mode, FitMode::Sigmoid);
        assert_eq!(out.curves.len(), 300);
        assert_eq!(out.points.len(), 3);
        assert_eq!(out.swatch.dimensions(), (100, 300));
        assert_eq!(out.gradient.dimensions(), (256, 50));
    }

    #[test]
    fn hidden_points_leave_scatter_empty() {
        let request = RenderRequest {
            show_points: false,
            ..RenderRequest::default()
        };
        let out = handle(request, &LabConfig::default()).unwrap();
        assert!(out.points.is_empty());
    }

    #[test]
    fn request_ph_is_snapped() {
        let request = RenderRequest {
            ph: 20.0,
            use_sigmoid: false,
            ..RenderRequest::default()
        };
        let out = handle(request, &LabConfig::default()).unwrap();
        assert_eq!(out.request.ph, 14.0);
        assert_eq!(out.rgb, Rgb::new(0, 255, 31));
        assert_eq!(out.curves.mode, FitMode::Linear);
    }

    #[test]
    fn fit_failure_propagates() {
        let config = LabConfig {
            max_evals: 1,
            ..LabConfig::default()
        };
        let err = handle(RenderRequest::default(), &config).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_FIT);
    }
}
