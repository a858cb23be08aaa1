//! venvjail - relocatable virtual environments from binary RPMs.
//!
//! Builds a virtualenv, unpacks the selected RPMs of a repository into it
//! and rewrites every absolute path so the tree works once moved under
//! the relocation directory. Used to jail OpenStack services.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use venvjail::catalog::{OscCatalog, RepoTarget};
use venvjail::commands;
use venvjail::config::Config;

#[derive(Parser)]
#[command(name = "venvjail")]
#[command(about = "Create relocatable virtual environments from binary RPMs")]
#[command(
    after_help = "QUICK START:\n  \
        venvjail exclude > exclude-rpm      Write the default exclude list\n  \
        venvjail include > include-rpm      List every package of the repository\n  \
        venvjail create /build/nova         Build the environment\n\n\
        Defaults can be set with VENVJAIL_* variables or a .env file."
)]
struct Cli {
    /// Log verbosity when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a virtual environment
    Create {
        /// Virtual environment directory
        dest_dir: PathBuf,

        /// Do not give the environment access to the global site-packages
        #[arg(long)]
        no_system_site_packages: bool,

        /// Relocated virtual environment directory
        #[arg(short = 'l', long)]
        relocate: Option<PathBuf>,

        /// Repository directory
        #[arg(short, long)]
        repo: Option<PathBuf>,

        /// File with the list of packages to install
        #[arg(short, long)]
        include: Option<PathBuf>,

        /// File with packages to exclude
        #[arg(short = 'x', long)]
        exclude: Option<PathBuf>,

        /// Fail if any selected package does not unpack cleanly
        #[arg(long)]
        strict_unpack: bool,
    },

    /// Generate initial include-rpm file
    Include {
        #[command(flatten)]
        service: ServiceArgs,

        /// Include all packages
        #[arg(long)]
        all: bool,

        /// File with packages to exclude
        #[arg(short = 'x', long)]
        exclude: Option<PathBuf>,
    },

    /// Generate initial exclude-rpm file
    Exclude,

    /// List the binary packages of a source package
    Binary {
        /// Source package name
        package: String,

        #[command(flatten)]
        service: ServiceArgs,

        /// Include all packages
        #[arg(long)]
        all: bool,

        /// File with packages to exclude
        #[arg(short = 'x', long)]
        exclude: Option<PathBuf>,
    },

    /// List requirements of a package not provided by the environment
    Requires {
        /// Source package name
        package: String,

        /// API address
        #[arg(short = 'A', long)]
        apiurl: Option<String>,

        /// Project name
        #[arg(short, long)]
        project: Option<String>,

        /// File with the list of packages to install
        #[arg(short, long)]
        include: Option<PathBuf>,

        /// File with packages to exclude
        #[arg(short = 'x', long)]
        exclude: Option<PathBuf>,
    },

    /// Check that the external tools are installed
    Preflight {
        /// Fail if a required tool is missing (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show the effective configuration
    Config,
}

/// Build-service location flags shared by the query commands.
#[derive(clap::Args)]
struct ServiceArgs {
    /// API address
    #[arg(short = 'A', long)]
    apiurl: Option<String>,

    /// Project name
    #[arg(short, long)]
    project: Option<String>,

    /// Repository name
    #[arg(short, long)]
    repo: Option<String>,

    /// Architecture
    #[arg(short, long)]
    arch: Option<String>,
}

impl ServiceArgs {
    fn resolve(self, config: &Config) -> (OscCatalog, RepoTarget) {
        let catalog = OscCatalog::new(self.apiurl.unwrap_or_else(|| config.apiurl.clone()));
        let target = RepoTarget {
            project: self.project.unwrap_or_else(|| config.project.clone()),
            repository: self.repo.unwrap_or_else(|| config.repository.clone()),
            arch: self.arch.unwrap_or_else(|| config.arch.clone()),
        };
        (catalog, target)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    venvjail::logging::init(&cli.log_level);
    let config = Config::load();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Create {
            dest_dir,
            no_system_site_packages,
            relocate,
            repo,
            include,
            exclude,
            strict_unpack,
        } => {
            let opts = commands::CreateOptions {
                dest: dest_dir,
                relocate: relocate.unwrap_or(config.relocate.clone()),
                repo: repo.unwrap_or(config.repo.clone()),
                include: include.unwrap_or(config.include.clone()),
                exclude: exclude.unwrap_or(config.exclude.clone()),
                alternative_suffix: config.alternative_suffix.clone(),
                interpreter: config.interpreter.clone(),
                strict_unpack,
            };
            commands::cmd_create(&opts, !no_system_site_packages)?;
        }

        Commands::Include {
            service,
            all,
            exclude,
        } => {
            let (catalog, target) = service.resolve(&config);
            let exclude = exclude.unwrap_or(config.exclude.clone());
            commands::cmd_include(&mut stdout, &catalog, &target, &exclude, all)?;
        }

        Commands::Exclude => {
            commands::cmd_exclude(&mut stdout, &config.exclude_template_text())?;
        }

        Commands::Binary {
            package,
            service,
            all,
            exclude,
        } => {
            let (catalog, target) = service.resolve(&config);
            let exclude = exclude.unwrap_or(config.exclude.clone());
            commands::cmd_binary(&mut stdout, &catalog, &target, &package, &exclude, all)?;
        }

        Commands::Requires {
            package,
            apiurl,
            project,
            include,
            exclude,
        } => {
            let catalog = OscCatalog::new(apiurl.unwrap_or(config.apiurl.clone()));
            let project = project.unwrap_or(config.project.clone());
            let include = include.unwrap_or(config.include.clone());
            let exclude = exclude.unwrap_or(config.exclude.clone());
            commands::cmd_requires(&mut stdout, &catalog, &project, &package, &include, &exclude)?;
        }

        Commands::Preflight { strict } => {
            commands::cmd_preflight(strict)?;
        }

        Commands::Config => {
            config.print();
        }
    }

    Ok(())
}
