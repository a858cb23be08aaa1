//! Retargeting of `update-alternatives` links.
//!
//! A link such as `bin/python -> /etc/alternatives/python` points at the
//! build host. It is replaced by a link to the versioned sibling
//! (`bin/python-2.7`) at the tree's relocated location.

use std::fs;
use std::os::unix::fs::symlink;
use std::path::Path;

use walkdir::WalkDir;

use super::{Fixup, Outcome, RelocateContext, StageReport};
use crate::error::{RelocateError, Result};

pub fn retarget(ctx: &RelocateContext) -> Result<StageReport> {
    let mut report = StageReport::new(Fixup::Alternatives);

    for entry in WalkDir::new(&ctx.root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("cannot walk {}: {}", ctx.root.display(), e);
                continue;
            }
        };
        if !entry.path_is_symlink() {
            continue;
        }
        let link = entry.path();
        let target = fs::read_link(link).map_err(|e| RelocateError::io("readlink", link, e))?;
        if !target.to_string_lossy().contains("alternatives") {
            continue;
        }

        let outcome = retarget_link(ctx, link)?;
        report.record(link, outcome);
    }

    Ok(report)
}

fn retarget_link(ctx: &RelocateContext, link: &Path) -> Result<Outcome> {
    let Some(name) = link.file_name() else {
        return Ok(Outcome::Skipped("link has no file name".to_string()));
    };
    let mut sibling_name = name.to_os_string();
    sibling_name.push(&ctx.alternative_suffix);
    let sibling = link.with_file_name(&sibling_name);

    if !sibling.exists() {
        return Ok(Outcome::Skipped(format!(
            "alternative link {} not found",
            sibling.display()
        )));
    }

    let new_target = ctx.relocated_path(&sibling);
    fs::remove_file(link).map_err(|e| RelocateError::io("remove", link, e))?;
    symlink(&new_target, link).map_err(|e| RelocateError::io("symlink", link, e))?;
    tracing::debug!("{} -> {}", link.display(), new_target.display());
    Ok(Outcome::Applied)
}
