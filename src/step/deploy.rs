//! Deploy hook - stages an install and packages it per deployment mode.
//!
//! The install prefix is baked in at configure time and a destination-root
//! override (`DESTDIR`) is prepended to it rather than replacing it, so the
//! build tree is reconfigured with the staging directory as its prefix
//! before installing.

use std::path::Path;

use tempfile::TempDir;

use crate::context::{DeployContext, DeployMode, PackagePaths};
use crate::error::StepError;
use crate::install::{InstallCreator, PackageSummary};
use crate::output;
use crate::sdk::CMAKE_INSTALL_PREFIX;
use crate::toolchain::Toolchain;

use super::{BuildStep, CtrlAgent};

/// Modes this package can be deployed in.
pub const SUPPORTED_MODES: &[DeployMode] = &[DeployMode::Dev];

/// Staged entries that make up the dev package. CMake package config
/// (`/cmake*`) is not shipped.
pub const DEV_INCLUDE_PATTERNS: &[&str] = &["/lib*", "/include*"];

/// How a deployment mode turns the staged tree into a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packaging {
    /// Copy the staged entries matching `include`
    Filtered {
        include: &'static [&'static str],
        skip_empty: bool,
    },
    /// No packaging defined yet; the mode directory stays empty
    NotYetImplemented { intent: &'static str },
}

impl Packaging {
    pub fn for_mode(mode: DeployMode) -> Self {
        match mode {
            DeployMode::Dev => Packaging::Filtered {
                include: DEV_INCLUDE_PATTERNS,
                skip_empty: true,
            },
            DeployMode::Run => Packaging::NotYetImplemented {
                intent: "applications and libraries only",
            },
            DeployMode::Src => Packaging::NotYetImplemented {
                intent: "package sources",
            },
        }
    }
}

/// Execute the deploy hook.
pub fn deploy<T: Toolchain>(step: &CtrlAgent<T>, ctx: &mut DeployContext) -> Result<(), StepError> {
    ctx.set_supported_modes(SUPPORTED_MODES)?;

    output::action(&format!("Deploying {}", step.name()));

    // released by drop on every early return below
    let staging = acquire_staging(step.staging_parent.as_deref())?;
    output::detail(&format!("staging in {}", staging.path().display()));

    stage_install(step, &ctx.paths, staging.path())?;

    for &mode in ctx.modes() {
        output::sub_action(&format!("package {}", mode));
        package_mode(mode, staging.path(), &ctx.paths.mode_deploy_dir(mode))?;
    }

    staging.close()?;

    output::success(&format!("{} deployed", step.name()));
    Ok(())
}

fn acquire_staging(parent: Option<&Path>) -> Result<TempDir, StepError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("ctrl-agent-stage-");
    let staging = match parent {
        Some(dir) => builder.tempdir_in(dir)?,
        None => builder.tempdir()?,
    };
    Ok(staging)
}

/// Reconfigure each existing build tree with `staging` as prefix and install.
fn stage_install<T: Toolchain>(
    step: &CtrlAgent<T>,
    paths: &PackagePaths,
    staging: &Path,
) -> Result<(), StepError> {
    let toolchain = step.toolchain();

    for &env in step.environments() {
        // reused from a previous build, not created here
        let build_path = paths.env_build_dir(env);

        let sdk_env = toolchain.sdk_environment_load(paths, env)?;
        let mut cmake_variables = toolchain.cmake_variables_load(paths, env)?;
        cmake_variables.set(CMAKE_INSTALL_PREFIX, staging.to_string_lossy());

        output::sub_action(&format!("configure ({})", env));
        toolchain.cmake_execute(paths, &paths.package, &sdk_env, &build_path, &cmake_variables)?;

        output::sub_action(&format!("install ({})", env));
        toolchain.ninja_install(paths, &sdk_env, &build_path)?;
    }

    Ok(())
}

/// Package one mode from the staged tree into `target_dir`.
pub(crate) fn package_mode(
    mode: DeployMode,
    staging: &Path,
    target_dir: &Path,
) -> Result<PackageSummary, StepError> {
    let installer = InstallCreator::new(staging, target_dir)?;

    let summary = match Packaging::for_mode(mode) {
        Packaging::Filtered {
            include,
            skip_empty,
        } => installer.convert_dir_to_package(staging, include, skip_empty)?,
        Packaging::NotYetImplemented { intent } => {
            output::warning(&format!(
                "{} packaging ({}) is not implemented yet",
                mode, intent
            ));
            PackageSummary::default()
        }
    };

    installer.self_copy_to_target()?;
    Ok(summary)
}
