//! Host tool checks.
//!
//! `venvjail create` shells out to `virtualenv`, `rpm2cpio` and `cpio`;
//! the generator commands need `osc`. Run `venvjail preflight` to see
//! what is missing before a build.

use anyhow::{bail, Result};

/// A tool venvjail may invoke, and whether `create` needs it.
#[derive(Debug, Clone, Copy)]
pub struct Tool {
    pub name: &'static str,
    pub required: bool,
    pub purpose: &'static str,
}

pub const TOOLS: &[Tool] = &[
    Tool {
        name: "virtualenv",
        required: true,
        purpose: "creates the environment skeleton",
    },
    Tool {
        name: "rpm2cpio",
        required: true,
        purpose: "converts packages to cpio archives",
    },
    Tool {
        name: "cpio",
        required: true,
        purpose: "unpacks package payloads",
    },
    Tool {
        name: "osc",
        required: false,
        purpose: "queries the build service (include/binary/requires)",
    },
];

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    /// A required tool is missing; `create` will fail.
    Fail,
    /// An optional tool is missing.
    Warn,
}

pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    pub fn all_passed(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    pub fn fail_count(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .count()
    }

    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");
        for check in &self.checks {
            let status = match check.status {
                CheckStatus::Pass => "PASS",
                CheckStatus::Fail => "FAIL",
                CheckStatus::Warn => "WARN",
            };
            println!("  [{}] {}: {}", status, check.name, check.details);
        }
        println!();

        let passed = self
            .checks
            .iter()
            .filter(|c| c.status == CheckStatus::Pass)
            .count();
        println!("Summary: {}/{} passed", passed, self.checks.len());
        if self.fail_count() > 0 {
            println!("         {} FAILED - create will not succeed", self.fail_count());
        }
    }
}

/// Check one tool, using `lookup` to resolve it on `PATH`.
fn check_tool(tool: &Tool, lookup: &dyn Fn(&str) -> Option<String>) -> CheckResult {
    match lookup(tool.name) {
        Some(path) => CheckResult {
            name: tool.name.to_string(),
            status: CheckStatus::Pass,
            details: path,
        },
        None => CheckResult {
            name: tool.name.to_string(),
            status: if tool.required {
                CheckStatus::Fail
            } else {
                CheckStatus::Warn
            },
            details: format!("not found on PATH ({})", tool.purpose),
        },
    }
}

fn which_path(name: &str) -> Option<String> {
    which::which(name)
        .ok()
        .map(|p| p.to_string_lossy().into_owned())
}

pub fn run_preflight() -> PreflightReport {
    PreflightReport {
        checks: TOOLS.iter().map(|t| check_tool(t, &which_path)).collect(),
    }
}

/// Run the checks and fail if a required tool is missing.
pub fn run_preflight_or_fail() -> Result<()> {
    let report = run_preflight();
    report.print();
    if !report.all_passed() {
        bail!(
            "Preflight failed: {} required tool(s) missing",
            report.fail_count()
        );
    }
    Ok(())
}
