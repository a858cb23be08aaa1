//! Pattern file generators driven by an in-memory catalog.

mod helpers;

use anyhow::{bail, Result};
use helpers::TestEnv;
use venvjail::catalog::{Catalog, RepoTarget};
use venvjail::commands::{cmd_binary, cmd_exclude, cmd_include, cmd_requires};
use venvjail::config::BUILTIN_EXCLUDE_TEMPLATE;

struct FakeCatalog;

impl Catalog for FakeCatalog {
    fn repository_binaries(&self, _target: &RepoTarget) -> Result<Vec<String>> {
        Ok(vec![
            "python-six-1.11.0-1.1.noarch.rpm".to_string(),
            "python-six-doc-1.11.0-1.1.noarch.rpm".to_string(),
            "openstack-nova-17.0.0-1.1.noarch.rpm".to_string(),
        ])
    }

    fn package_binaries(&self, _target: &RepoTarget, package: &str) -> Result<Vec<String>> {
        if package != "openstack-nova" {
            bail!("package {} not found", package);
        }
        Ok(vec![
            "openstack-nova-17.0.0-1.1.noarch.rpm".to_string(),
            "openstack-nova-api-17.0.0-1.1.noarch.rpm".to_string(),
            "openstack-nova-test-17.0.0-1.1.noarch.rpm".to_string(),
        ])
    }

    fn spec_text(&self, _project: &str, _package: &str) -> Result<String> {
        Ok("Name: openstack-nova\n\
            Requires:       python-six >= 1.10\n\
            Requires:       python-oslo.config\n\
            Requires:       openssl\n\
            Requires:       sudo >= 1.8\n\
            BuildRequires:  python-devel\n"
            .to_string())
    }
}

fn target() -> RepoTarget {
    RepoTarget {
        project: "Cloud:OpenStack:Master".to_string(),
        repository: "SLE_12_SP3".to_string(),
        arch: "x86_64".to_string(),
    }
}

fn output(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
    let mut out = Vec::new();
    f(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_include_lists_repository_filtered() {
    let env = TestEnv::new();
    let exclude = env.pattern_file("exclude-rpm", ".*-doc\n");

    let text = output(|out| cmd_include(out, &FakeCatalog, &target(), &exclude, false));

    assert_eq!(
        text,
        "# List of packages to include (regular expressions, one per line)\n\
         \n\
         # Packages from the repository\n\
         python-six-1.11.0-1.1.noarch.*\n\
         openstack-nova-17.0.0-1.1.noarch.*\n"
    );
}

#[test]
fn test_include_all_ignores_exclude() {
    let env = TestEnv::new();
    let exclude = env.pattern_file("exclude-rpm", ".*-doc\n");

    let text = output(|out| cmd_include(out, &FakeCatalog, &target(), &exclude, true));

    assert!(text.contains("python-six-doc-1.11.0-1.1.noarch.*\n"));
}

#[test]
fn test_exclude_prints_template() {
    let text = output(|out| cmd_exclude(out, BUILTIN_EXCLUDE_TEMPLATE));
    assert!(text.starts_with("# List of packages to ignore"));
    assert!(text.contains("python3.*\n"));
}

#[test]
fn test_binary_prints_package_names() {
    let env = TestEnv::new();
    let exclude = env.pattern_file("exclude-rpm", ".*-test\n");

    let text = output(|out| {
        cmd_binary(out, &FakeCatalog, &target(), "openstack-nova", &exclude, false)
    });

    assert_eq!(text, "openstack-nova\nopenstack-nova-api\n");
}

#[test]
fn test_binary_unknown_package_fails() {
    let env = TestEnv::new();
    let exclude = env.base_dir.join("missing");
    let mut out = Vec::new();
    assert!(cmd_binary(&mut out, &FakeCatalog, &target(), "nope", &exclude, false).is_err());
}

#[test]
fn test_requires_lists_host_dependencies() {
    let env = TestEnv::new();
    let include = env.pattern_file("include-rpm", "python-.*\nsudo\n");
    let exclude = env.pattern_file("exclude-rpm", "sudo\n");

    let text = output(|out| {
        cmd_requires(
            out,
            &FakeCatalog,
            "Cloud:OpenStack:Master",
            "openstack-nova",
            &include,
            &exclude,
        )
    });

    // python-* come from the environment; sudo is excluded so the host provides it
    assert_eq!(text, "openssl\nsudo >= 1.8\n");
}
