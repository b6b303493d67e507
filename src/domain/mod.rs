//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - colors and channels (`Rgb`, `Channel`)
//! - the calibration dataset (`CalibrationSet`)
//! - fit outputs (`LogisticParams`, `FitQuality`, `ChannelCurve`, `CurveSet`)
//! - request/config types (`RenderRequest`, `LabConfig`, `CurveFile`)

pub mod types;

pub use types::*;
