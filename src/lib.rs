//! `ph-lab` library crate.
//!
//! The binary (`phlab`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the request handler can be driven from the TUI, the CLI or tests alike
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod color;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod render;
pub mod report;
pub mod tui;
