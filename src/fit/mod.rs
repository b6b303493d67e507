//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - fit a logistic curve per channel (Levenberg–Marquardt)
//! - interpolate channels piecewise-linearly
//! - sample every channel on a shared dense pH grid

pub mod curves;
pub mod fitter;
pub mod grid;

pub use curves::*;
pub use fitter::*;
pub use grid::*;
