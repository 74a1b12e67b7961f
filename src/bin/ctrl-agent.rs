//! ctrl-agent CLI - run the build step hooks by hand
//!
//! Usage:
//!   ctrl-agent deps [--json]               Show steps to build first
//!   ctrl-agent build                       Configure, compile and install
//!   ctrl-agent clean                       Remove the build tree
//!   ctrl-agent deploy [--mode dev ...]     Package for the given modes
//!   ctrl-agent test                        Run package tests

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ctrl_agent::{
    BuildContext, BuildStep, CleanContext, CtrlAgent, DeployContext, DeployMode, PackagePaths,
    SdkConfig, SystemToolchain, TestContext, output,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ctrl-agent")]
#[command(about = "Build, clean and deploy the ctrl-agent asio wrapper package")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Package source directory
    #[arg(short, long, global = true, default_value = ".")]
    package: PathBuf,

    /// Build output directory (default: <package>/build)
    #[arg(short, long, global = true)]
    build_dir: Option<PathBuf>,

    /// Deploy output directory (default: <package>/deploy)
    #[arg(short, long, global = true)]
    deploy_dir: Option<PathBuf>,

    /// Installation prefix used by `build`
    #[arg(long, global = true, default_value = "/usr/local")]
    prefix: PathBuf,

    /// SDK config file (default: $CTRL_AGENT_CONFIG, <package>/sdk.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of parallel compile jobs (default: CPU count)
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    /// Print tool commands and their output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print tool commands without running them
    #[arg(long, global = true)]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show steps that must be built before this one
    Deps {
        /// Print as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Configure, compile and install for every SDK environment
    Build,

    /// Remove the build tree
    Clean,

    /// Stage an install and package it per deployment mode
    Deploy {
        /// Deployment mode (dev, run, src); repeatable
        #[arg(short, long = "mode", default_values_t = vec![DeployMode::Dev])]
        modes: Vec<DeployMode>,
    },

    /// Run package tests
    Test,
}

fn main() {
    if let Err(e) = run() {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let paths = package_paths(&cli);

    match cli.command {
        Commands::Deps { json } => {
            let step = CtrlAgent::new(SystemToolchain::default());
            let deps = step.dependencies();
            if json {
                println!("{}", serde_json::to_string(&deps)?);
            } else {
                output::info(&format!("Dependencies for {}:", step.name()));
                for dep in deps {
                    println!("  - {}", dep);
                }
            }
        }

        Commands::Build => {
            let step = create_step(&cli, &paths)?;
            step.build(&BuildContext::new(paths))
                .context("build failed")?;
        }

        Commands::Clean => {
            let step = CtrlAgent::new(SystemToolchain::default());
            step.clean(&CleanContext::new(paths))
                .context("clean failed")?;
        }

        Commands::Deploy { ref modes } => {
            let step = create_step(&cli, &paths)?;
            let mut ctx = DeployContext::new(paths, modes.iter().copied());
            step.deploy(&mut ctx).context("deploy failed")?;
        }

        Commands::Test => {
            let step = CtrlAgent::new(SystemToolchain::default());
            step.test(&TestContext::new(paths))
                .context("test failed")?;
        }
    }

    Ok(())
}

fn package_paths(cli: &Cli) -> PackagePaths {
    let mut paths = PackagePaths::with_package(&cli.package).prefix(&cli.prefix);
    if let Some(dir) = &cli.build_dir {
        paths = paths.build_dir(dir);
    }
    if let Some(dir) = &cli.deploy_dir {
        paths = paths.deploy_dir(dir);
    }
    paths
}

/// Create the step with a toolchain configured from the CLI and SDK config
fn create_step(cli: &Cli, paths: &PackagePaths) -> Result<CtrlAgent> {
    let config = SdkConfig::discover(cli.config.as_deref(), &paths.package)
        .context("Failed to load SDK config")?;

    let mut toolchain = SystemToolchain::new(config)
        .dry_run(cli.dry_run)
        .verbose(cli.verbose);
    if let Some(jobs) = cli.jobs {
        toolchain = toolchain.jobs(jobs);
    }

    Ok(CtrlAgent::new(toolchain))
}
