//! Fatal errors raised by the relocation pipeline.
//!
//! Anything that can be skipped is reported as an
//! [`Outcome::Skipped`](crate::relocate::Outcome) instead; an error here
//! always stops the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelocateError {
    /// One of the known activation scripts does not exist.
    #[error("activation script not found: {}", path.display())]
    MissingActivator { path: PathBuf },

    /// The anchor line the export is inserted after is missing.
    #[error("line '{anchor}' not found in {}", path.display())]
    MissingAnchor { path: PathBuf, anchor: String },

    /// A rewrite pattern failed to compile.
    #[error("invalid rewrite pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl RelocateError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, RelocateError>;
