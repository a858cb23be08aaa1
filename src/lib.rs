//! venvjail library exports.
//!
//! The binary in `main.rs` is a thin clap layer over these modules; they
//! are public so the integration tests in `tests/` can drive them.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod extract;
pub mod logging;
pub mod patterns;
pub mod preflight;
pub mod process;
pub mod relocate;
pub mod report;
pub mod select;
pub mod timing;
pub mod venv;
