//! Channel curve models.
//!
//! Models are small, pure values so that fitting code stays generic and the
//! plotting/export code only needs `predict`.

pub mod model;

pub use model::*;
