//! Reporting utilities: formatted terminal output for a render result.

pub mod format;

pub use format::*;
