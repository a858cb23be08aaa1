//! Build-service queries used to generate pattern files.
//!
//! The Open Build Service is reached through `osc api`, which prints the
//! raw XML or spec file text. Parsing is kept in plain functions so it can
//! be tested without a server.

use anyhow::{Context, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::process::Cmd;

/// Build-service location of a binary repository.
#[derive(Debug, Clone)]
pub struct RepoTarget {
    pub project: String,
    pub repository: String,
    pub arch: String,
}

/// Source of package listings and spec files.
pub trait Catalog {
    /// Binary file names published in a repository.
    fn repository_binaries(&self, target: &RepoTarget) -> Result<Vec<String>>;
    /// Binary file names built from one source package.
    fn package_binaries(&self, target: &RepoTarget, package: &str) -> Result<Vec<String>>;
    /// Raw text of a source package's spec file.
    fn spec_text(&self, project: &str, package: &str) -> Result<String>;
}

/// [`Catalog`] backed by the `osc` command line client.
#[derive(Debug, Clone)]
pub struct OscCatalog {
    pub apiurl: String,
}

impl OscCatalog {
    pub fn new(apiurl: impl Into<String>) -> Self {
        Self {
            apiurl: apiurl.into(),
        }
    }

    fn api(&self, path: &str) -> Result<String> {
        let result = Cmd::new("osc")
            .args(["--apiurl", &self.apiurl, "api", path])
            .error_msg(format!("osc api {} failed", path))
            .run()?;
        Ok(result.stdout)
    }
}

impl Catalog for OscCatalog {
    fn repository_binaries(&self, target: &RepoTarget) -> Result<Vec<String>> {
        let path = format!(
            "/build/{}/{}/{}/_repository",
            target.project, target.repository, target.arch
        );
        Ok(binary_filenames(&self.api(&path)?))
    }

    fn package_binaries(&self, target: &RepoTarget, package: &str) -> Result<Vec<String>> {
        let path = format!(
            "/build/{}/{}/{}/{}",
            target.project, target.repository, target.arch, package
        );
        Ok(binary_filenames(&self.api(&path)?))
    }

    fn spec_text(&self, project: &str, package: &str) -> Result<String> {
        let path = format!("/source/{}/{}/{}.spec", project, package, package);
        self.api(&path)
            .with_context(|| format!("Failed to fetch spec file of {}", package))
    }
}

static BINARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<binary\s[^>]*?\bfilename="([^"]*)""#).expect("valid binary list regex")
});

static RPM_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*)-([^-]+)-([^-]+)\.([^-.]+)\.rpm$").expect("valid package name regex")
});

static REQUIRES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Requires:\s*([-.\w]+)(.*)$").expect("valid requires regex")
});

/// File names of `<binary>` elements, without build logs, source RPMs
/// and internal `_` entries.
pub fn binary_filenames(xml: &str) -> Vec<String> {
    BINARY_RE
        .captures_iter(xml)
        .map(|caps| caps[1].to_string())
        .filter(|name| {
            !name.starts_with('_') && !name.ends_with(".log") && !name.ends_with("src.rpm")
        })
        .collect()
}

/// Package name of a `name-version-release.arch.rpm` file name.
pub fn package_name(filename: &str) -> Option<&str> {
    RPM_NAME_RE
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `Requires:` lines of a spec file as name → version expression.
///
/// A package listed twice keeps its last version expression.
pub fn parse_requires(spec: &str) -> BTreeMap<String, String> {
    REQUIRES_RE
        .captures_iter(spec)
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
        .collect()
}
