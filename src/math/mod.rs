//! Mathematical utilities: logistic function, interpolation, and least squares.

pub mod interp;
pub mod logistic;
pub mod ols;

pub use interp::*;
pub use logistic::*;
pub use ols::*;
