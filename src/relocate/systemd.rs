//! Systemd unit rewriting.
//!
//! Units shipped by the packages start binaries by their `/usr` path.
//! The commands are prefixed with the relocated tree and the unit is
//! renamed with [`SERVICE_PREFIX`] so it does not clash with the system
//! package's unit once installed.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use super::text::prefix_after_key;
use super::{Fixup, Outcome, RelocateContext, StageReport};
use crate::error::{RelocateError, Result};

/// Unit directory relative to the tree root.
pub const SERVICE_DIR: &str = "usr/lib/systemd/system";

pub const SERVICE_PREFIX: &str = "venv-";

/// Keys whose command gets the relocated prefix.
const EXEC_KEYS: &[&str] = &["ExecStart=", "ExecStartPre=-"];

const WRITABLE: u32 = 0o644;
const READ_ONLY: u32 = 0o444;

/// Prefix every exec key command in `content` with `virtual_env`.
pub fn rewrite_unit(content: &str, virtual_env: &Path) -> Result<String> {
    let prefix = virtual_env.to_string_lossy();
    let mut content = content.to_string();
    for key in EXEC_KEYS {
        content = prefix_after_key(&content, key, &prefix)?;
    }
    Ok(content)
}

pub fn rewrite(ctx: &RelocateContext) -> Result<StageReport> {
    let mut report = StageReport::new(Fixup::Services);
    let dir = ctx.root.join(SERVICE_DIR);
    if !dir.is_dir() {
        return Ok(report);
    }

    for unit in service_units(&dir)? {
        let rewritten = rewrite_service(&unit, &ctx.virtual_env)?;
        if is_prefixed(&unit) {
            let outcome = if rewritten { Outcome::Applied } else { Outcome::Unchanged };
            report.record(unit, outcome);
            continue;
        }

        let renamed = prefixed_name(&unit);
        if renamed.symlink_metadata().is_ok() {
            report.record(
                unit,
                Outcome::Skipped(format!("{} already exists", renamed.display())),
            );
            continue;
        }
        fs::rename(&unit, &renamed).map_err(|e| RelocateError::io("rename", &unit, e))?;
        tracing::debug!("{} -> {}", unit.display(), renamed.display());
        report.record(renamed, Outcome::Applied);
    }

    Ok(report)
}

/// Every `*.service` file in `dir`, sorted.
fn service_units(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| RelocateError::io("read", dir, e))?;

    let mut units = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RelocateError::io("read", dir, e))?;
        let path = entry.path();
        if entry.file_name().to_string_lossy().ends_with(".service") && path.is_file() {
            units.push(path);
        }
    }
    units.sort();
    Ok(units)
}

fn is_prefixed(unit: &Path) -> bool {
    unit.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with(SERVICE_PREFIX))
}

fn prefixed_name(unit: &Path) -> PathBuf {
    let mut name = SERVICE_PREFIX.to_string();
    if let Some(file_name) = unit.file_name() {
        name.push_str(&file_name.to_string_lossy());
    }
    unit.with_file_name(name)
}

/// Rewrite the exec lines of one unit in place. Returns false when the
/// unit already pointed into the relocated tree and was left untouched.
fn rewrite_service(unit: &Path, virtual_env: &Path) -> Result<bool> {
    let content = fs::read_to_string(unit).map_err(|e| RelocateError::io("read", unit, e))?;
    let updated = rewrite_unit(&content, virtual_env)?;
    if updated == content {
        return Ok(false);
    }

    // units are installed read-only
    set_mode(unit, WRITABLE)?;
    fs::write(unit, updated).map_err(|e| RelocateError::io("write", unit, e))?;
    set_mode(unit, READ_ONLY)?;
    Ok(true)
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| RelocateError::io("chmod", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_unit_exec_lines() {
        let unit = "[Service]\n\
                    ExecStartPre=-/usr/bin/nova-manage db sync\n\
                    ExecStart=/usr/bin/nova-api --config-file /etc/nova/nova.conf\n\
                    Restart=on-failure\n";
        let out = rewrite_unit(unit, Path::new("/opt/env/build/nova")).unwrap();
        assert_eq!(
            out,
            "[Service]\n\
             ExecStartPre=-/opt/env/build/nova/usr/bin/nova-manage db sync\n\
             ExecStart=/opt/env/build/nova/usr/bin/nova-api --config-file /etc/nova/nova.conf\n\
             Restart=on-failure\n"
        );
    }

    #[test]
    fn test_rewrite_unit_without_exec_lines() {
        let unit = "[Unit]\nDescription=nothing to run\n";
        assert_eq!(rewrite_unit(unit, Path::new("/opt")).unwrap(), unit);
    }

    #[test]
    fn test_rewrite_unit_is_idempotent() {
        let venv = Path::new("/opt/env/build/nova");
        let once = rewrite_unit("ExecStart=/usr/bin/nova-api\n", venv).unwrap();
        assert_eq!(rewrite_unit(&once, venv).unwrap(), once);
    }
}
