//! `packages.log` ledger of included and excluded packages.
//!
//! Useful for tailoring `include-rpm`/`exclude-rpm` after a build.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::select::Selection;

pub const LEDGER_FILE: &str = "packages.log";

/// Render the ledger text. Both sections are sorted.
pub fn render(selection: &Selection) -> String {
    let mut out = String::from("# Included packages\n");
    for name in &selection.installed {
        out.push_str(name);
        out.push('\n');
    }
    out.push_str("\n\n# Excluded packages\n");
    for name in &selection.excluded {
        out.push_str(name);
        out.push('\n');
    }
    out
}

/// Write the ledger into `dest`, returning its path.
pub fn write_ledger(dest: &Path, selection: &Selection) -> Result<PathBuf> {
    let path = dest.join(LEDGER_FILE);
    fs::write(&path, render(selection))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
