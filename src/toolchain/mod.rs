//! External toolchain collaborators: environment loading, configure, compile
//! and install.
//!
//! Steps only talk to the toolchain through [`Toolchain`]. The default
//! implementation, [`SystemToolchain`], runs `cmake` and `ninja`.

mod process;
mod system;

pub use process::{RunOptions, command_line, run_tool, shell_quote};
pub use system::SystemToolchain;

use std::path::Path;

use crate::context::PackagePaths;
use crate::error::StepError;
use crate::sdk::{CmakeVariables, SdkEnv, SdkEnvironment};

/// Configure/build/install tooling used by a step.
pub trait Toolchain {
    /// Load the environment descriptor for an SDK environment.
    fn sdk_environment_load(
        &self,
        ctx: &PackagePaths,
        env: SdkEnv,
    ) -> Result<SdkEnvironment, StepError>;

    /// Load the CMake variables for an SDK environment.
    fn cmake_variables_load(
        &self,
        ctx: &PackagePaths,
        env: SdkEnv,
    ) -> Result<CmakeVariables, StepError>;

    /// Configure the project at `src_path` into the build directory `cwd`.
    ///
    /// Must succeed when `cwd` already holds a configured tree.
    fn cmake_execute(
        &self,
        ctx: &PackagePaths,
        src_path: &Path,
        env: &SdkEnvironment,
        cwd: &Path,
        cmake_variables: &CmakeVariables,
    ) -> Result<(), StepError>;

    /// Compile the configured tree in `cwd`.
    fn ninja_build(&self, ctx: &PackagePaths, env: &SdkEnvironment, cwd: &Path)
    -> Result<(), StepError>;

    /// Install the configured tree in `cwd` to its configured prefix.
    fn ninja_install(
        &self,
        ctx: &PackagePaths,
        env: &SdkEnvironment,
        cwd: &Path,
    ) -> Result<(), StepError>;
}

impl<T: Toolchain + ?Sized> Toolchain for &T {
    fn sdk_environment_load(
        &self,
        ctx: &PackagePaths,
        env: SdkEnv,
    ) -> Result<SdkEnvironment, StepError> {
        (**self).sdk_environment_load(ctx, env)
    }

    fn cmake_variables_load(
        &self,
        ctx: &PackagePaths,
        env: SdkEnv,
    ) -> Result<CmakeVariables, StepError> {
        (**self).cmake_variables_load(ctx, env)
    }

    fn cmake_execute(
        &self,
        ctx: &PackagePaths,
        src_path: &Path,
        env: &SdkEnvironment,
        cwd: &Path,
        cmake_variables: &CmakeVariables,
    ) -> Result<(), StepError> {
        (**self).cmake_execute(ctx, src_path, env, cwd, cmake_variables)
    }

    fn ninja_build(
        &self,
        ctx: &PackagePaths,
        env: &SdkEnvironment,
        cwd: &Path,
    ) -> Result<(), StepError> {
        (**self).ninja_build(ctx, env, cwd)
    }

    fn ninja_install(
        &self,
        ctx: &PackagePaths,
        env: &SdkEnvironment,
        cwd: &Path,
    ) -> Result<(), StepError> {
        (**self).ninja_install(ctx, env, cwd)
    }
}
