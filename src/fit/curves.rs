//! Channel curve fitters and curve-set assembly.
//!
//! Both curve strategies sit behind `CurveFitter` so either can be swapped or
//! tested independently:
//!
//! - `SigmoidFit`: 4-parameter logistic per channel
//! - `LinearInterp`: piecewise-linear through the calibration points
//!
//! `fit_curve_set` runs one fitter over all three channels and samples each
//! fitted model on the shared grid. Nothing is cached; every call refits.

use log::debug;

use crate::domain::{CalibrationSet, Channel, CurveSet, FitMode, LabConfig};
use crate::error::AppError;
use crate::fit::fitter::{LogisticFitOptions, fit_logistic};
use crate::models::ChannelModel;

/// Produces a model for one channel from calibration data.
pub trait CurveFitter {
    fn mode(&self) -> FitMode;

    fn fit(&self, calibration: &CalibrationSet, channel: Channel) -> Result<ChannelModel, AppError>;
}

/// Logistic least-squares fit.
#[derive(Debug, Clone, Default)]
pub struct SigmoidFit {
    pub options: LogisticFitOptions,
}

impl SigmoidFit {
    pub fn with_max_evals(max_evals: usize) -> Self {
        Self {
            options: LogisticFitOptions {
                max_evals,
                ..LogisticFitOptions::default()
            },
        }
    }
}

impl CurveFitter for SigmoidFit {
    fn mode(&self) -> FitMode {
        FitMode::Sigmoid
    }

    fn fit(&self, calibration: &CalibrationSet, channel: Channel) -> Result<ChannelModel, AppError> {
        let xs = calibration.ph_values();
        let ys = calibration.channel_values(channel);
        let fit = fit_logistic(&xs, &ys, &self.options).map_err(|e| {
            AppError::fit(format!("{} channel: {}", channel.display_name(), e.message()))
        })?;
        Ok(ChannelModel::Logistic {
            params: fit.params,
            quality: fit.quality,
        })
    }
}

/// Piecewise-linear interpolation; never fails for a valid calibration set.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterp;

impl CurveFitter for LinearInterp {
    fn mode(&self) -> FitMode {
        FitMode::Linear
    }

    fn fit(&self, calibration: &CalibrationSet, channel: Channel) -> Result<ChannelModel, AppError> {
        Ok(ChannelModel::Linear {
            xs: calibration.ph_values(),
            ys: calibration.channel_values(channel),
        })
    }
}

/// Fit all three channels with `fitter` and sample them on `grid`.
pub fn fit_curve_set<F: CurveFitter + ?Sized>(
    fitter: &F,
    calibration: &CalibrationSet,
    grid: &[f64],
) -> Result<CurveSet, AppError> {
    let red = fitter.fit(calibration, Channel::Red)?.into_curve(Channel::Red, grid);
    let green = fitter.fit(calibration, Channel::Green)?.into_curve(Channel::Green, grid);
    let blue = fitter.fit(calibration, Channel::Blue)?.into_curve(Channel::Blue, grid);

    debug!(
        "fitted {} curves: {} samples per channel",
        fitter.mode().display_name(),
        grid.len()
    );

    Ok(CurveSet {
        mode: fitter.mode(),
        red,
        green,
        blue,
    })
}

/// Build the fitter for `mode` with the config's solver limits.
pub fn fitter_for(mode: FitMode, config: &LabConfig) -> Box<dyn CurveFitter> {
    match mode {
        FitMode::Sigmoid => Box::new(SigmoidFit::with_max_evals(config.max_evals)),
        FitMode::Linear => Box::new(LinearInterp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CalibrationPoint;
    use crate::fit::grid::ph_grid;

    fn grid() -> Vec<f64> {
        ph_grid(&LabConfig::default()).unwrap()
    }

    #[test]
    fn linear_mode_passes_through_calibration_points() {
        let calibration = CalibrationSet::standard();
        for channel in Channel::ALL {
            let model = LinearInterp.fit(&calibration, channel).unwrap();
            for p in calibration.points() {
                assert_eq!(model.predict(p.ph), f64::from(p.rgb.channel(channel)));
            }
        }
    }

    #[test]
    fn linear_mode_clamps_outside_calibrated_range() {
        let calibration = CalibrationSet::standard();
        let set = fit_curve_set(&LinearInterp, &calibration, &grid()).unwrap();
        let first = set.red.samples.first().copied().unwrap();
        let last = set.red.samples.last().copied().unwrap();
        assert_eq!(first, (0.0, 230.0));
        assert_eq!(last, (14.0, 20.0));
        assert!(set.red.params.is_none());
    }

    #[test]
    fn sigmoid_mode_produces_monotone_finite_curves() {
        let calibration = CalibrationSet::standard();
        let set = fit_curve_set(&SigmoidFit::default(), &calibration, &grid()).unwrap();
        assert_eq!(set.mode, FitMode::Sigmoid);
        assert_eq!(set.len(), 300);

        for curve in set.iter() {
            assert!(curve.params.is_some());
            assert!(curve.samples.iter().all(|&(_, y)| y.is_finite()));
            let diffs: Vec<f64> = curve.samples.windows(2).map(|w| w[1].1 - w[0].1).collect();
            let non_increasing = diffs.iter().all(|&d| d <= 1e-9);
            let non_decreasing = diffs.iter().all(|&d| d >= -1e-9);
            assert!(non_increasing || non_decreasing, "{:?} is not logistic-shaped", curve.channel);
        }

        let red = &set.red.samples;
        let green = &set.green.samples;
        assert!(red[0].1 > red[red.len() - 1].1, "red should fall with pH");
        assert!(green[0].1 < green[green.len() - 1].1, "green should rise with pH");
    }

    #[test]
    fn sigmoid_curves_stay_near_color_range() {
        let calibration = CalibrationSet::standard();
        let set = fit_curve_set(&SigmoidFit::default(), &calibration, &grid()).unwrap();
        for curve in set.iter() {
            for &(_, y) in &curve.samples {
                assert!(y > -50.0 && y < 300.0, "{:?}: {y}", curve.channel);
            }
        }
    }

    #[test]
    fn toggling_modes_is_stateless() {
        let calibration = CalibrationSet::standard();
        let grid = grid();
        let a = fit_curve_set(&SigmoidFit::default(), &calibration, &grid).unwrap();
        let b = fit_curve_set(&LinearInterp, &calibration, &grid).unwrap();
        let c = fit_curve_set(&SigmoidFit::default(), &calibration, &grid).unwrap();
        let d = fit_curve_set(&LinearInterp, &calibration, &grid).unwrap();
        assert_eq!(a, c);
        assert_eq!(b, d);
        assert_ne!(a, b);
    }

    #[test]
    fn sigmoid_failure_names_the_channel() {
        let calibration = CalibrationSet::new(vec![
            CalibrationPoint::new(1.0, 0, 0, 0),
            CalibrationPoint::new(2.0, 10, 10, 10),
        ])
        .unwrap();
        let err = SigmoidFit::default().fit(&calibration, Channel::Green).unwrap_err();
        assert!(err.to_string().starts_with("Green channel:"));
        // Two points are plenty for interpolation.
        assert!(LinearInterp.fit(&calibration, Channel::Green).is_ok());
    }

    #[test]
    fn fitter_for_matches_mode() {
        let config = LabConfig::default();
        assert_eq!(fitter_for(FitMode::Sigmoid, &config).mode(), FitMode::Sigmoid);
        assert_eq!(fitter_for(FitMode::Linear, &config).mode(), FitMode::Linear);
    }
}
