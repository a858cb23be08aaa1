//! Shared test utilities for venvjail tests.
#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use venvjail::relocate::RelocateContext;

/// Relocation root used throughout the tests.
pub const RELOCATED: &str = "/opt/ardana/venvs";

/// Temporary destination tree and package repository.
pub struct TestEnv {
    /// Kept alive for the lifetime of the TestEnv.
    pub _temp_dir: TempDir,
    /// Destination tree being built.
    pub dest: PathBuf,
    /// Directory holding package files.
    pub repo: PathBuf,
    /// Scratch directory for pattern files.
    pub base_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let dest = base.join("venv");
        let repo = base.join("repo");
        fs::create_dir_all(&dest).expect("Failed to create dest dir");
        fs::create_dir_all(&repo).expect("Failed to create repo dir");

        Self {
            base_dir: base.to_path_buf(),
            _temp_dir: temp_dir,
            dest,
            repo,
        }
    }

    pub fn context(&self) -> RelocateContext {
        RelocateContext::new(&self.dest, Path::new(RELOCATED))
    }

    /// Write a file relative to the destination tree.
    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        write_file(&self.dest.join(rel), content)
    }

    /// Write a pattern file into the scratch directory.
    pub fn pattern_file(&self, name: &str, content: &str) -> PathBuf {
        write_file(&self.base_dir.join(name), content)
    }
}

pub fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
    path.to_path_buf()
}

pub fn set_mode(path: &Path, mode: u32) {
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("Failed to chmod");
}

pub fn mode_of(path: &Path) -> u32 {
    fs::symlink_metadata(path)
        .expect("Failed to stat")
        .permissions()
        .mode()
        & 0o7777
}

/// `bin/activate` as written by virtualenv for `venv_dir`.
pub fn bash_activate(venv_dir: &Path) -> String {
    format!(
        "# This file must be used with \"source bin/activate\" *from bash*\n\
         deactivate () {{\n    unset -f pydoc >/dev/null 2>&1\n    unset VIRTUAL_ENV\n}}\n\n\
         # unset irrelevant variables\n\
         deactivate nondestructive\n\n\
         VIRTUAL_ENV=\"{}\"\n\
         export VIRTUAL_ENV\n",
        venv_dir.display()
    )
}

pub fn csh_activate(venv_dir: &Path) -> String {
    format!(
        "# This file must be used with \"source bin/activate.csh\" *from csh*.\n\
         alias deactivate 'test $?_OLD_VIRTUAL_PATH != 0 && \
         setenv PATH \"$_OLD_VIRTUAL_PATH:q\"'\n\n\
         # Unset irrelevant variables.\n\
         deactivate nondestructive\n\n\
         setenv VIRTUAL_ENV \"{}\"\n",
        venv_dir.display()
    )
}

pub fn fish_activate(venv_dir: &Path) -> String {
    format!(
        "# This file must be used using `. bin/activate.fish` *within a running fish*\n\
         function deactivate -d 'Exit virtualenv mode and return to the normal environment.'\n\
         end\n\n\
         # Unset irrelevant variables.\n\
         deactivate nondestructive\n\n\
         set -gx VIRTUAL_ENV \"{}\"\n",
        venv_dir.display()
    )
}

/// Write the three activation scripts into `dest/bin`.
pub fn create_mock_venv(dest: &Path) {
    let bin = dest.join("bin");
    write_file(&bin.join("activate"), &bash_activate(dest));
    write_file(&bin.join("activate.csh"), &csh_activate(dest));
    write_file(&bin.join("activate.fish"), &fish_activate(dest));
    fs::create_dir_all(dest.join("lib")).expect("Failed to create lib");
}

pub fn assert_symlink(path: &Path, expected_target: &Path) {
    assert!(
        path.is_symlink(),
        "Expected symlink at {}, but it's not a symlink",
        path.display()
    );
    let target = fs::read_link(path).expect("Failed to read symlink");
    assert_eq!(
        target,
        expected_target,
        "Symlink {} points to {:?}, expected {:?}",
        path.display(),
        target,
        expected_target
    );
}

pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}

pub fn first_line(path: &Path) -> String {
    let content = fs::read(path).expect("Failed to read file");
    let end = content
        .iter()
        .position(|&b| b == b'\n')
        .unwrap_or(content.len());
    String::from_utf8_lossy(&content[..end]).into_owned()
}
