//! Configuration management for venvjail.
//!
//! Defaults can be overridden by a `.env` file in the working directory
//! and by environment variables, which take precedence over `.env`.
//! Command line flags override both.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::relocate::context::{DEFAULT_ALTERNATIVE_SUFFIX, DEFAULT_INTERPRETER};

pub const DEFAULT_RELOCATE: &str = "/opt/ardana/venvs";
pub const DEFAULT_REPO: &str = "/.build.binaries";
pub const DEFAULT_INCLUDE: &str = "include-rpm";
pub const DEFAULT_EXCLUDE: &str = "exclude-rpm";
pub const DEFAULT_APIURL: &str = "https://api.opensuse.org";
pub const DEFAULT_PROJECT: &str = "Cloud:OpenStack:Master";
pub const DEFAULT_REPOSITORY: &str = "SLE_12_SP3";
pub const DEFAULT_ARCH: &str = "x86_64";

/// Exclude template used when no template file is configured.
pub const BUILTIN_EXCLUDE_TEMPLATE: &str = include_str!("../resources/exclude-rpm");

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the environments are moved under after the build.
    pub relocate: PathBuf,
    /// Directory holding the binary RPMs.
    pub repo: PathBuf,
    pub include: PathBuf,
    pub exclude: PathBuf,
    pub apiurl: String,
    pub project: String,
    /// Build-service repository name (e.g. `SLE_12_SP3`).
    pub repository: String,
    pub arch: String,
    pub alternative_suffix: String,
    pub interpreter: String,
    /// File printed by `venvjail exclude` instead of the built-in template.
    pub exclude_template: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_vars(&HashMap::new())
    }
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("ignoring .env: {}", e);
            }
        }
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build a config from `VENVJAIL_*` variables.
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str, default: &str| -> String {
            vars.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        };

        Self {
            relocate: PathBuf::from(get("VENVJAIL_RELOCATE", DEFAULT_RELOCATE)),
            repo: PathBuf::from(get("VENVJAIL_REPO", DEFAULT_REPO)),
            include: PathBuf::from(get("VENVJAIL_INCLUDE", DEFAULT_INCLUDE)),
            exclude: PathBuf::from(get("VENVJAIL_EXCLUDE", DEFAULT_EXCLUDE)),
            apiurl: get("VENVJAIL_APIURL", DEFAULT_APIURL),
            project: get("VENVJAIL_PROJECT", DEFAULT_PROJECT),
            repository: get("VENVJAIL_REPOSITORY", DEFAULT_REPOSITORY),
            arch: get("VENVJAIL_ARCH", DEFAULT_ARCH),
            alternative_suffix: get("VENVJAIL_ALT_SUFFIX", DEFAULT_ALTERNATIVE_SUFFIX),
            interpreter: get("VENVJAIL_INTERPRETER", DEFAULT_INTERPRETER),
            exclude_template: vars
                .get("VENVJAIL_EXCLUDE_TEMPLATE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Text printed by `venvjail exclude`.
    ///
    /// Falls back to the built-in template when the configured file
    /// cannot be read.
    pub fn exclude_template_text(&self) -> String {
        if let Some(path) = &self.exclude_template {
            match fs::read_to_string(path) {
                Ok(text) => return text,
                Err(e) => tracing::warn!(
                    "cannot read exclude template {}: {}, using built-in",
                    path.display(),
                    e
                ),
            }
        }
        BUILTIN_EXCLUDE_TEMPLATE.to_string()
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  VENVJAIL_RELOCATE: {}", self.relocate.display());
        println!("  VENVJAIL_REPO: {}", self.repo.display());
        println!("  VENVJAIL_INCLUDE: {}", self.include.display());
        println!("  VENVJAIL_EXCLUDE: {}", self.exclude.display());
        println!("  VENVJAIL_APIURL: {}", self.apiurl);
        println!("  VENVJAIL_PROJECT: {}", self.project);
        println!("  VENVJAIL_REPOSITORY: {}", self.repository);
        println!("  VENVJAIL_ARCH: {}", self.arch);
        println!("  VENVJAIL_ALT_SUFFIX: {}", self.alternative_suffix);
        println!("  VENVJAIL_INTERPRETER: {}", self.interpreter);
        match &self.exclude_template {
            Some(path) => println!("  VENVJAIL_EXCLUDE_TEMPLATE: {}", path.display()),
            None => println!("  VENVJAIL_EXCLUDE_TEMPLATE: (built-in)"),
        }
    }
}
