//! Directory mode normalization.
//!
//! `cpio` does not apply the process umask, so hierarchy directories can
//! come out of extraction with the archive's restrictive modes.

use std::fs;
use std::os::unix::fs::PermissionsExt;

use super::{Fixup, Outcome, RelocateContext, StageReport};
use crate::error::{RelocateError, Result};

/// Directories relative to the tree root and the mode each must have.
pub const DIRECTORY_MODES: &[(&str, u32)] = &[
    ("etc", 0o755),
    ("etc/cron.daily", 0o755),
    ("etc/logrotate.d", 0o755),
    ("etc/sudoers.d", 0o750),
    ("srv", 0o755),
    ("usr", 0o755),
    ("usr/share", 0o755),
    ("var", 0o755),
    ("var/lib", 0o755),
    ("var/log", 0o755),
];

pub fn normalize(ctx: &RelocateContext) -> Result<StageReport> {
    let mut report = StageReport::new(Fixup::Permissions);

    for &(dir, mode) in DIRECTORY_MODES {
        let path = ctx.root.join(dir);
        // symlink_metadata: never chmod through a link out of the tree
        let Ok(meta) = fs::symlink_metadata(&path) else {
            continue;
        };
        if !meta.is_dir() {
            continue;
        }

        if meta.permissions().mode() & 0o7777 == mode {
            report.record(path, Outcome::Unchanged);
            continue;
        }
        fs::set_permissions(&path, fs::Permissions::from_mode(mode))
            .map_err(|e| RelocateError::io("chmod", &path, e))?;
        report.record(path, Outcome::Applied);
    }

    Ok(report)
}
