//! Fixups that make a populated tree work from its relocated path.
//!
//! The tree is built under one path and moved to another afterwards, so
//! every absolute path baked into it has to point at the final location.
//! Each fixup is a variant of [`Fixup`] and [`PIPELINE`] fixes their order:
//!
//! ```text
//! Permissions → Alternatives → Shebangs → Activators → Services
//! ```
//!
//! Permissions go first because the rewriting fixups need writable
//! directories. Per-item problems that do not break the tree are reported
//! as [`Outcome::Skipped`]; anything else is a [`RelocateError`] and stops
//! the pipeline.

mod activate;
mod alternatives;
pub mod context;
mod permissions;
mod shebang;
mod systemd;
pub mod text;

pub use activate::{Activator, ACTIVATORS, ANCHOR};
pub use context::{virtual_env_path, RelocateContext};
pub use permissions::DIRECTORY_MODES;
pub use systemd::{SERVICE_DIR, SERVICE_PREFIX};

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;

use crate::error::RelocateError;
use crate::timing::Timer;

/// One relocation fixup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixup {
    /// Reset modes of well-known hierarchy directories.
    Permissions,
    /// Point alternatives links at the relocated versioned sibling.
    Alternatives,
    /// Rewrite Python `#!` lines to the relocated interpreter.
    Shebangs,
    /// Rewrite `VIRTUAL_ENV` and add `LD_LIBRARY_PATH` to activation scripts.
    Activators,
    /// Prefix `ExecStart`/`ExecStartPre` commands in systemd units.
    Services,
}

/// Fixups in the order they must run.
pub const PIPELINE: &[Fixup] = &[
    Fixup::Permissions,
    Fixup::Alternatives,
    Fixup::Shebangs,
    Fixup::Activators,
    Fixup::Services,
];

impl fmt::Display for Fixup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Fixup::Permissions => "permissions",
            Fixup::Alternatives => "alternatives",
            Fixup::Shebangs => "shebangs",
            Fixup::Activators => "activators",
            Fixup::Services => "services",
        };
        f.write_str(name)
    }
}

/// What a fixup did to a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// Already in the wanted state.
    Unchanged,
    /// Left untouched; the tree is incomplete in that respect only.
    Skipped(String),
}

/// Per-path outcomes of one fixup.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub fixup: Fixup,
    pub items: Vec<(PathBuf, Outcome)>,
}

impl StageReport {
    pub fn new(fixup: Fixup) -> Self {
        Self {
            fixup,
            items: Vec::new(),
        }
    }

    pub fn record(&mut self, path: impl Into<PathBuf>, outcome: Outcome) {
        self.items.push((path.into(), outcome));
    }

    pub fn applied(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, o)| *o == Outcome::Applied)
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&PathBuf, &str)> {
        self.items.iter().filter_map(|(path, outcome)| match outcome {
            Outcome::Skipped(reason) => Some((path, reason.as_str())),
            _ => None,
        })
    }

    pub fn outcome(&self, path: &std::path::Path) -> Option<&Outcome> {
        self.items
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, outcome)| outcome)
    }
}

/// Run a single fixup over the tree.
pub fn execute(ctx: &RelocateContext, fixup: Fixup) -> Result<StageReport, RelocateError> {
    match fixup {
        Fixup::Permissions => permissions::normalize(ctx),
        Fixup::Alternatives => alternatives::retarget(ctx),
        Fixup::Shebangs => shebang::rewrite(ctx),
        Fixup::Activators => activate::rewrite(ctx),
        Fixup::Services => systemd::rewrite(ctx),
    }
}

/// Run the whole [`PIPELINE`], stopping at the first fatal error.
pub fn relocate(ctx: &RelocateContext) -> Result<Vec<StageReport>> {
    tracing::info!(
        "relocating {} to {}",
        ctx.root.display(),
        ctx.virtual_env.display()
    );

    let mut reports = Vec::with_capacity(PIPELINE.len());
    for &fixup in PIPELINE {
        let timer = Timer::start(&format!("fix {}", fixup));
        let report =
            execute(ctx, fixup).with_context(|| format!("relocation step '{}' failed", fixup))?;

        for (path, reason) in report.skipped() {
            tracing::warn!("{}: skipped {}: {}", fixup, path.display(), reason);
        }
        tracing::info!("{}: {} paths updated", fixup, report.applied());
        timer.finish();
        reports.push(report);
    }
    Ok(reports)
}
