//! Activation script rewriting.
//!
//! `virtualenv` writes the build-time path into `VIRTUAL_ENV`. Each script
//! gets the relocated path instead, plus an `LD_LIBRARY_PATH` export so
//! the libraries unpacked from the RPMs are found.

use std::fs;
use std::path::Path;

use super::text::{insert_after, replace_pattern};
use super::{Fixup, Outcome, RelocateContext, StageReport};
use crate::error::{RelocateError, Result};

/// Line the library path export is inserted after, in every script.
pub const ANCHOR: &str = "deactivate nondestructive";

/// How one activation script sets a variable.
#[derive(Debug, Clone, Copy)]
pub struct Activator {
    /// File name under `bin/`.
    pub file: &'static str,
    /// Assignment up to the opening quote, e.g. `setenv VIRTUAL_ENV `.
    pub set_root: &'static str,
    pub set_library_path: &'static str,
    pub anchor: &'static str,
}

impl Activator {
    fn root_pattern(&self) -> String {
        format!(r#"{}".*""#, regex::escape(self.set_root))
    }

    fn root_line(&self, value: &Path) -> String {
        format!("{}\"{}\"", self.set_root, value.display())
    }

    fn library_line(&self, value: &Path) -> String {
        format!("{}\"{}\"", self.set_library_path, value.display())
    }

    /// Rewrite the script text for `ctx`.
    ///
    /// Returns `None` when the anchor line is missing.
    pub fn apply(&self, content: &str, ctx: &RelocateContext) -> Result<Option<String>> {
        let content = replace_pattern(
            content,
            &self.root_pattern(),
            &self.root_line(&ctx.virtual_env),
        )?;
        Ok(insert_after(
            &content,
            self.anchor,
            &self.library_line(&ctx.library_path()),
        ))
    }
}

pub const ACTIVATORS: &[Activator] = &[
    Activator {
        file: "activate",
        set_root: "VIRTUAL_ENV=",
        set_library_path: "export LD_LIBRARY_PATH=",
        anchor: ANCHOR,
    },
    Activator {
        file: "activate.csh",
        set_root: "setenv VIRTUAL_ENV ",
        set_library_path: "setenv LD_LIBRARY_PATH ",
        anchor: ANCHOR,
    },
    Activator {
        file: "activate.fish",
        set_root: "set -gx VIRTUAL_ENV ",
        set_library_path: "set -gx LD_LIBRARY_PATH ",
        anchor: ANCHOR,
    },
];

/// Rewrite all [`ACTIVATORS`]. A missing script or anchor is fatal.
pub fn rewrite(ctx: &RelocateContext) -> Result<StageReport> {
    let mut report = StageReport::new(Fixup::Activators);
    let bin = ctx.root.join("bin");

    for activator in ACTIVATORS {
        let path = bin.join(activator.file);
        if !path.is_file() {
            return Err(RelocateError::MissingActivator { path });
        }
        let content =
            fs::read_to_string(&path).map_err(|e| RelocateError::io("read", &path, e))?;

        let updated = activator
            .apply(&content, ctx)?
            .ok_or_else(|| RelocateError::MissingAnchor {
                path: path.clone(),
                anchor: activator.anchor.to_string(),
            })?;

        if updated == content {
            report.record(path, Outcome::Unchanged);
            continue;
        }
        fs::write(&path, updated).map_err(|e| RelocateError::io("write", &path, e))?;
        report.record(path, Outcome::Applied);
    }

    Ok(report)
}
