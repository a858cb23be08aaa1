//! Paths shared by every relocation fixup.

use std::path::{Component, Path, PathBuf};

/// Default suffix of the sibling link an alternatives link is retargeted to.
pub const DEFAULT_ALTERNATIVE_SUFFIX: &str = "-2.7";

/// Default interpreter written into rewritten shebangs.
pub const DEFAULT_INTERPRETER: &str = "python2";

/// Where the tree is now, and where it will live once moved.
#[derive(Debug, Clone)]
pub struct RelocateContext {
    /// Build-time destination directory (the tree being fixed).
    pub root: PathBuf,
    /// Relocation root the tree will be moved under.
    pub relocated: PathBuf,
    /// Final location of the tree: `relocated` joined with `root`.
    pub virtual_env: PathBuf,
    pub alternative_suffix: String,
    pub interpreter: String,
}

impl RelocateContext {
    pub fn new(root: &Path, relocated: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            relocated: relocated.to_path_buf(),
            virtual_env: virtual_env_path(relocated, root),
            alternative_suffix: DEFAULT_ALTERNATIVE_SUFFIX.to_string(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
        }
    }

    pub fn with_alternative_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.alternative_suffix = suffix.into();
        self
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// The `#!` line every Python script gets.
    pub fn shebang(&self) -> String {
        format!(
            "#!{}",
            self.virtual_env.join("bin").join(&self.interpreter).display()
        )
    }

    /// Value exported as `LD_LIBRARY_PATH` by the activation scripts.
    ///
    /// `lib` rather than `lib64`, since `usr/lib64` links to it anyway.
    pub fn library_path(&self) -> PathBuf {
        self.virtual_env.join("lib")
    }

    /// Relocated location of a path inside the tree.
    pub fn relocated_path(&self, path: &Path) -> PathBuf {
        match path.strip_prefix(&self.root) {
            Ok(rel) => self.virtual_env.join(rel),
            Err(_) => self.virtual_env.join(path),
        }
    }
}

/// Join `dest` under `relocated`, dropping root and `.` components of
/// `dest` so an absolute destination nests instead of replacing.
pub fn virtual_env_path(relocated: &Path, dest: &Path) -> PathBuf {
    let mut path = relocated.to_path_buf();
    for component in dest.components() {
        match component {
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            other => path.push(other),
        }
    }
    path
}
