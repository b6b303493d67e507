//! Input/output helpers.
//!
//! - curve JSON read/write (`curve`)
//! - PNG / CSV exports and snapshot bundles (`export`)

pub mod curve;
pub mod export;

pub use curve::*;
pub use export::*;
