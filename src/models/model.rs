//! Evaluation of a fitted channel curve.
//!
//! A `ChannelModel` is what a fitter hands back: either logistic parameters or
//! the interpolation knots. Sampling it over a grid produces the plotted curve.

use crate::domain::{Channel, ChannelCurve, FitQuality, LogisticParams};
use crate::math::{interp, logistic};

/// A fitted curve for one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelModel {
    Logistic {
        params: LogisticParams,
        quality: FitQuality,
    },
    Linear {
        xs: Vec<f64>,
        ys: Vec<f64>,
    },
}

impl ChannelModel {
    /// Predict the channel intensity at `ph`.
    pub fn predict(&self, ph: f64) -> f64 {
        match self {
            ChannelModel::Logistic { params, .. } => logistic(ph, &params.to_array()),
            ChannelModel::Linear { xs, ys } => interp(ph, xs, ys),
        }
    }

    /// Sample the model at each grid point.
    pub fn sample(&self, grid: &[f64]) -> Vec<(f64, f64)> {
        grid.iter().map(|&x| (x, self.predict(x))).collect()
    }

    pub fn params(&self) -> Option<LogisticParams> {
        match self {
            ChannelModel::Logistic { params, .. } => Some(*params),
            ChannelModel::Linear { .. } => None,
        }
    }

    pub fn quality(&self) -> Option<&FitQuality> {
        match self {
            ChannelModel::Logistic { quality, .. } => Some(quality),
            ChannelModel::Linear { .. } => None,
        }
    }

    /// Sample over `grid` and package the result as a plotted curve.
    pub fn into_curve(self, channel: Channel, grid: &[f64]) -> ChannelCurve {
        let samples = self.sample(grid);
        let params = self.params();
        let quality = match self {
            ChannelModel::Logistic { quality, .. } => Some(quality),
            ChannelModel::Linear { .. } => None,
        };
        ChannelCurve {
            channel,
            samples,
            params,
            quality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_model_predicts_from_params() {
        let model = ChannelModel::Logistic {
            params: LogisticParams { l: 100.0, x0: 7.0, k: 1.0, b: 10.0 },
            quality: FitQuality { sse: 0.0, rmse: 0.0, evaluations: 1, n: 7 },
        };
        assert!((model.predict(7.0) - 60.0).abs() < 1e-12);
        assert!(model.params().is_some());
    }

    #[test]
    fn linear_model_samples_grid_in_order() {
        let model = ChannelModel::Linear {
            xs: vec![1.0, 13.0],
            ys: vec![0.0, 120.0],
        };
        let samples = model.sample(&[0.0, 1.0, 7.0, 14.0]);
        assert_eq!(samples, vec![(0.0, 0.0), (1.0, 0.0), (7.0, 60.0), (14.0, 120.0)]);
        assert!(model.quality().is_none());
    }
}
