//! The dense pH grid curves are sampled on.

use crate::domain::LabConfig;
use crate::error::AppError;
use crate::math::linspace;

/// Sample grid described by the config (300 points over `[0, 14]` by default).
pub fn ph_grid(config: &LabConfig) -> Result<Vec<f64>, AppError> {
    linspace(config.grid_min, config.grid_max, config.grid_samples)
}
