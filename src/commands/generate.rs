//! Pattern file generators: include, exclude, binary, requires.
//!
//! These print to a writer (stdout from the CLI) so their output can be
//! redirected straight into `include-rpm`/`exclude-rpm`.

use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::catalog::{self, Catalog, RepoTarget};
use crate::patterns::PatternList;
use crate::select;

/// Drop names matched by the exclude list unless `all` is set.
fn filter_excluded(names: Vec<String>, exclude: &PatternList, all: bool) -> Vec<String> {
    if all {
        return names;
    }
    names.into_iter().filter(|n| !exclude.matches(n)).collect()
}

/// Print an initial include list covering the whole repository.
pub fn cmd_include(
    out: &mut dyn Write,
    catalog: &dyn Catalog,
    target: &RepoTarget,
    exclude: &Path,
    all: bool,
) -> Result<()> {
    let names = catalog
        .repository_binaries(target)?
        .into_iter()
        .map(|name| name.replace(".rpm", ""))
        .collect();
    let names = filter_excluded(names, &PatternList::load(exclude), all);

    writeln!(out, "# List of packages to include (regular expressions, one per line)")?;
    writeln!(out)?;
    writeln!(out, "# Packages from the repository")?;
    for name in names {
        writeln!(out, "{}.*", name)?;
    }
    Ok(())
}

/// Print the exclude template.
pub fn cmd_exclude(out: &mut dyn Write, template: &str) -> Result<()> {
    writeln!(out, "{}", template)?;
    Ok(())
}

/// Print the package names built from a source package.
pub fn cmd_binary(
    out: &mut dyn Write,
    catalog: &dyn Catalog,
    target: &RepoTarget,
    package: &str,
    exclude: &Path,
    all: bool,
) -> Result<()> {
    let mut names = Vec::new();
    for filename in catalog.package_binaries(target, package)? {
        match catalog::package_name(&filename) {
            Some(name) => names.push(name.to_string()),
            None => tracing::warn!("skipping unrecognized binary name {}", filename),
        }
    }

    for name in filter_excluded(names, &PatternList::load(exclude), all) {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

/// Print the requirements of a package that the environment does not
/// provide, with their version constraints.
pub fn cmd_requires(
    out: &mut dyn Write,
    catalog: &dyn Catalog,
    project: &str,
    package: &str,
    include: &Path,
    exclude: &Path,
) -> Result<()> {
    let spec = catalog.spec_text(project, package)?;
    let requires = catalog::parse_requires(&spec);

    let include = PatternList::load(include);
    let exclude = PatternList::load(exclude);
    for (name, version) in &requires {
        if select::decide(name, &include, &exclude).is_install() {
            continue;
        }
        let line = format!("{} {}", name, version);
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}
