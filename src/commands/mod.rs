//! CLI command handlers.
//!
//! - `create` - Build a relocatable environment from a repository
//! - `generate` - Print include/exclude pattern files and package queries
//! - `preflight` - Check for the external tools

pub mod create;
pub mod generate;
mod preflight;

pub use create::{cmd_create, create, CreateOptions, CreateSummary};
pub use generate::{cmd_binary, cmd_exclude, cmd_include, cmd_requires};
pub use preflight::cmd_preflight;
