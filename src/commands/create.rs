//! Create command - builds a relocatable environment from a repository.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{DEFAULT_EXCLUDE, DEFAULT_INCLUDE};
use crate::extract::{self, ExtractReport, RpmUnpacker, Unpacker};
use crate::patterns::PatternList;
use crate::relocate::context::{DEFAULT_ALTERNATIVE_SUFFIX, DEFAULT_INTERPRETER};
use crate::relocate::{self, RelocateContext, StageReport};
use crate::report;
use crate::select::{self, Selection};
use crate::timing::Timer;
use crate::venv::{EnvironmentBuilder, Virtualenv};

/// Everything `create` needs to know.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Destination directory the environment is built in.
    pub dest: PathBuf,
    /// Directory the environment will be moved under.
    pub relocate: PathBuf,
    /// Directory holding the binary RPMs.
    pub repo: PathBuf,
    pub include: PathBuf,
    pub exclude: PathBuf,
    pub alternative_suffix: String,
    pub interpreter: String,
    /// Fail after extraction if any package did not unpack.
    pub strict_unpack: bool,
}

/// What a finished `create` run did.
#[derive(Debug)]
pub struct CreateSummary {
    pub selection: Selection,
    pub extract: ExtractReport,
    pub stages: Vec<StageReport>,
    pub ledger: PathBuf,
}

/// Execute the create command with the real external tools.
pub fn cmd_create(opts: &CreateOptions, system_site_packages: bool) -> Result<()> {
    let virtualenv = Virtualenv {
        system_site_packages,
        ..Default::default()
    };
    let summary = create(opts, &virtualenv, &RpmUnpacker)?;

    println!(
        "Created {}: {} packages included, {} excluded",
        opts.dest.display(),
        summary.selection.installed.len(),
        summary.selection.excluded.len()
    );
    if !summary.extract.is_clean() {
        println!(
            "  {} package(s) failed to unpack (see log above)",
            summary.extract.failure_count()
        );
    }
    println!("  Package log: {}", summary.ledger.display());
    Ok(())
}

/// Build the environment: skeleton, selection, extraction, relocation
/// fixups and the package ledger, strictly in that order.
pub fn create(
    opts: &CreateOptions,
    builder: &dyn EnvironmentBuilder,
    unpacker: &dyn Unpacker,
) -> Result<CreateSummary> {
    let timer = Timer::start("virtualenv");
    builder.create(&opts.dest)?;
    extract::prepare_usr_links(&opts.dest)?;
    timer.finish();

    let include = PatternList::load(&opts.include);
    let exclude = PatternList::load(&opts.exclude);
    tracing::info!(
        "{} include and {} exclude patterns",
        include.len(),
        exclude.len()
    );

    let packages = extract::list_packages(&opts.repo)?;
    let selection = select::select(
        packages.iter().map(|p| extract::package_ref(p)),
        &include,
        &exclude,
    );
    let installed: Vec<PathBuf> = packages
        .into_iter()
        .filter(|p| selection.is_installed(&extract::package_ref(p)))
        .collect();

    let timer = Timer::start("extract packages");
    let extract_report = extract::extract_all(unpacker, &installed, &opts.dest);
    timer.finish();
    if opts.strict_unpack && !extract_report.is_clean() {
        let names: Vec<&str> = extract_report
            .failed
            .iter()
            .map(|f| f.package.as_str())
            .collect();
        bail!(
            "{} package(s) failed to unpack: {}",
            names.len(),
            names.join(", ")
        );
    }

    let ctx = relocation_context(opts);
    let stages = relocate::relocate(&ctx)
        .with_context(|| format!("Failed to relocate {}", opts.dest.display()))?;

    let ledger = report::write_ledger(&opts.dest, &selection)?;

    Ok(CreateSummary {
        selection,
        extract: extract_report,
        stages,
        ledger,
    })
}

fn relocation_context(opts: &CreateOptions) -> RelocateContext {
    RelocateContext::new(&opts.dest, &opts.relocate)
        .with_alternative_suffix(&opts.alternative_suffix)
        .with_interpreter(&opts.interpreter)
}

impl CreateOptions {
    /// Options with the CLI defaults for everything but the three paths.
    pub fn new(dest: &Path, relocate: &Path, repo: &Path) -> Self {
        Self {
            dest: dest.to_path_buf(),
            relocate: relocate.to_path_buf(),
            repo: repo.to_path_buf(),
            include: PathBuf::from(DEFAULT_INCLUDE),
            exclude: PathBuf::from(DEFAULT_EXCLUDE),
            alternative_suffix: DEFAULT_ALTERNATIVE_SUFFIX.to_string(),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            strict_unpack: false,
        }
    }
}
