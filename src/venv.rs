//! Creation of the empty virtual environment the packages are unpacked into.

use anyhow::Result;
use std::path::Path;

use crate::process::Cmd;

/// Creates a fresh environment skeleton at a destination directory.
pub trait EnvironmentBuilder {
    fn create(&self, dest: &Path) -> Result<()>;
}

/// Runs the `virtualenv` tool.
#[derive(Debug, Clone)]
pub struct Virtualenv {
    pub program: String,
    pub system_site_packages: bool,
}

impl Default for Virtualenv {
    fn default() -> Self {
        Self {
            program: "virtualenv".to_string(),
            system_site_packages: true,
        }
    }
}

impl Virtualenv {
    fn command(&self, dest: &Path) -> Cmd {
        let mut cmd = Cmd::new(&self.program);
        if self.system_site_packages {
            cmd = cmd.arg("--system-site-packages");
        }
        cmd.arg_path(dest)
            .error_msg(format!("{} could not create {}", self.program, dest.display()))
    }
}

impl EnvironmentBuilder for Virtualenv {
    fn create(&self, dest: &Path) -> Result<()> {
        tracing::info!("creating virtual environment at {}", dest.display());
        self.command(dest).run()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_with_system_site_packages() {
        let venv = Virtualenv::default();
        assert_eq!(
            venv.command(Path::new("/build/nova")).display(),
            "virtualenv --system-site-packages /build/nova"
        );
    }

    #[test]
    fn test_command_without_system_site_packages() {
        let venv = Virtualenv {
            system_site_packages: false,
            ..Default::default()
        };
        assert_eq!(venv.command(Path::new("nova")).display(), "virtualenv nova");
    }
}
