//! Package discovery and payload extraction into the destination tree.
//!
//! Extraction is best-effort: a package that fails to unpack is recorded
//! in the [`ExtractReport`] and the run moves on to the next one.

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use crate::process::{shell_in, shell_quote};

/// Links that let packages installing into `/usr` land in the tree's
/// own `bin` and `lib`.
pub const USR_LINKS: &[(&str, &str)] = &[
    ("usr/bin", "../bin"),
    ("usr/lib", "../lib"),
    ("usr/lib64", "../lib"),
];

/// Unpacks one package archive into a destination root.
pub trait Unpacker {
    fn unpack(&self, package: &Path, dest: &Path) -> Result<()>;
}

/// Unpacks RPMs with `rpm2cpio | cpio`.
///
/// Existing files are overwritten, symlinks are extracted through,
/// directories are created and modification times are preserved.
#[derive(Debug, Default, Clone, Copy)]
pub struct RpmUnpacker;

impl RpmUnpacker {
    /// Shell pipeline unpacking `package` into the current directory.
    fn command(&self, package: &Path) -> String {
        format!(
            "rpm2cpio {} | cpio --extract --unconditional --preserve-modification-time \
             --make-directories --extract-over-symlinks --quiet",
            shell_quote(&package.to_string_lossy())
        )
    }
}

impl Unpacker for RpmUnpacker {
    fn unpack(&self, package: &Path, dest: &Path) -> Result<()> {
        let package = fs::canonicalize(package)
            .with_context(|| format!("Package not found: {}", package.display()))?;
        shell_in(&self.command(&package), dest)
            .with_context(|| format!("Failed to unpack {}", package.display()))?;
        Ok(())
    }
}

/// List `*.rpm` files directly inside `repo`, sorted by file name.
pub fn list_packages(repo: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(repo)
        .with_context(|| format!("Failed to read repository: {}", repo.display()))?;

    let mut packages = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "rpm") && path.is_file() {
            packages.push(path);
        }
    }
    packages.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(packages)
}

/// On-disk basename used as the package reference.
pub fn package_ref(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Create `usr/` and the [`USR_LINKS`] inside `dest`.
///
/// Links that already exist are left alone.
pub fn prepare_usr_links(dest: &Path) -> Result<()> {
    let usr = dest.join("usr");
    fs::create_dir_all(&usr).with_context(|| format!("Failed to create {}", usr.display()))?;

    for (link, target) in USR_LINKS {
        let link_path = dest.join(link);
        if link_path.symlink_metadata().is_ok() {
            continue;
        }
        symlink(target, &link_path)
            .with_context(|| format!("Failed to create {} -> {}", link_path.display(), target))?;
    }
    Ok(())
}

/// A package that did not unpack cleanly.
#[derive(Debug, Clone)]
pub struct UnpackFailure {
    pub package: String,
    pub reason: String,
}

/// Outcome of unpacking the installed set.
#[derive(Debug, Clone, Default)]
pub struct ExtractReport {
    pub unpacked: Vec<String>,
    pub failed: Vec<UnpackFailure>,
}

impl ExtractReport {
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Unpack every package in `packages` into `dest`, in order.
pub fn extract_all(unpacker: &dyn Unpacker, packages: &[PathBuf], dest: &Path) -> ExtractReport {
    let mut report = ExtractReport::default();

    for package in packages {
        let name = package_ref(package);
        match unpacker.unpack(package, dest) {
            Ok(()) => {
                tracing::debug!("unpacked {}", name);
                report.unpacked.push(name);
            }
            Err(e) => {
                tracing::warn!("failed to unpack {}: {:#}", name, e);
                report.failed.push(UnpackFailure {
                    package: name,
                    reason: format!("{:#}", e),
                });
            }
        }
    }

    if report.is_clean() {
        tracing::info!("unpacked {} packages", report.unpacked.len());
    } else {
        tracing::warn!(
            "unpacked {}/{} packages, {} failed",
            report.unpacked.len(),
            packages.len(),
            report.failure_count()
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpm_unpack_command() {
        assert_eq!(
            RpmUnpacker.command(Path::new("/repo/python-six-1.11.0-1.1.noarch.rpm")),
            "rpm2cpio '/repo/python-six-1.11.0-1.1.noarch.rpm' | cpio --extract --unconditional \
             --preserve-modification-time --make-directories --extract-over-symlinks --quiet"
        );
    }

    #[test]
    fn test_rpm_unpack_command_quotes_path() {
        let cmd = RpmUnpacker.command(Path::new("/repo/it's here.rpm"));
        assert!(cmd.starts_with(r"rpm2cpio '/repo/it'\''s here.rpm' | cpio "));
    }

    #[test]
    fn test_rpm_unpack_missing_package() {
        let dest = tempfile::tempdir().unwrap();
        let err = RpmUnpacker
            .unpack(Path::new("/nonexistent/a-1.rpm"), dest.path())
            .unwrap_err();
        assert!(err.to_string().contains("Package not found"));
    }
    use anyhow::bail;

    struct FailOn(&'static str);

    impl Unpacker for FailOn {
        fn unpack(&self, package: &Path, dest: &Path) -> Result<()> {
            if package_ref(package) == self.0 {
                bail!("corrupt archive");
            }
            fs::write(dest.join(package_ref(package)), "payload")?;
            Ok(())
        }
    }

    #[test]
    fn test_list_packages_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b-1.rpm", "a-1.rpm", "notes.txt", "c-1.src.rpm"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::create_dir(dir.path().join("sub.rpm")).unwrap();

        let names: Vec<String> = list_packages(dir.path())
            .unwrap()
            .iter()
            .map(|p| package_ref(p))
            .collect();

        assert_eq!(names, ["a-1.rpm", "b-1.rpm", "c-1.src.rpm"]);
    }

    #[test]
    fn test_list_packages_missing_repo_fails() {
        assert!(list_packages(Path::new("/nonexistent/venvjail-repo")).is_err());
    }

    #[test]
    fn test_prepare_usr_links() {
        let dir = tempfile::tempdir().unwrap();
        prepare_usr_links(dir.path()).unwrap();

        for (link, target) in USR_LINKS {
            let link = dir.path().join(link);
            assert!(link.is_symlink(), "{} should be a symlink", link.display());
            assert_eq!(fs::read_link(&link).unwrap(), Path::new(target));
        }

        // second call keeps the existing links
        prepare_usr_links(dir.path()).unwrap();
    }

    #[test]
    fn test_extract_all_continues_after_failure() {
        let repo = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let packages: Vec<PathBuf> = ["a.rpm", "bad.rpm", "c.rpm"]
            .iter()
            .map(|n| repo.path().join(n))
            .collect();

        let report = extract_all(&FailOn("bad.rpm"), &packages, dest.path());

        assert_eq!(report.unpacked, ["a.rpm", "c.rpm"]);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failed[0].package, "bad.rpm");
        assert!(report.failed[0].reason.contains("corrupt archive"));
        assert!(dest.path().join("c.rpm").exists());
    }
}
