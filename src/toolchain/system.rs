//! Toolchain backed by the host's `cmake` and `ninja`.

use std::collections::BTreeMap;
use std::path::Path;

use super::Toolchain;
use super::process::{RunOptions, run_tool};
use crate::config::SdkConfig;
use crate::context::PackagePaths;
use crate::error::StepError;
use crate::sdk::{CMAKE_BUILD_TYPE, CMAKE_INSTALL_PREFIX, CmakeVariables, SdkEnv, SdkEnvironment};

const DEFAULT_BUILD_TYPE: &str = "Release";

/// Runs `cmake` and `ninja` as child processes.
#[derive(Debug, Clone)]
pub struct SystemToolchain {
    config: SdkConfig,
    jobs: usize,
    opts: RunOptions,
}

impl Default for SystemToolchain {
    fn default() -> Self {
        Self::new(SdkConfig::default())
    }
}

impl SystemToolchain {
    pub fn new(config: SdkConfig) -> Self {
        Self {
            config,
            jobs: num_cpus::get(),
            opts: RunOptions::default(),
        }
    }

    /// Set the number of parallel compile jobs.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set dry run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.opts.dry_run = dry_run;
        self
    }

    /// Set verbose mode.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.opts.verbose = verbose;
        self
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    fn configure_args(&self, src_path: &Path, cwd: &Path, vars: &CmakeVariables) -> Vec<String> {
        let mut args = vec![
            "-G".to_string(),
            self.config.generator().to_string(),
            "-S".to_string(),
            src_path.to_string_lossy().to_string(),
            "-B".to_string(),
            cwd.to_string_lossy().to_string(),
        ];
        args.extend(vars.to_args());
        args
    }
}

impl Toolchain for SystemToolchain {
    fn sdk_environment_load(
        &self,
        _ctx: &PackagePaths,
        env: SdkEnv,
    ) -> Result<SdkEnvironment, StepError> {
        let vars = self
            .config
            .environment(env)
            .map(|section| section.env.clone())
            .unwrap_or_else(BTreeMap::new);
        Ok(SdkEnvironment::new(env, vars))
    }

    fn cmake_variables_load(
        &self,
        ctx: &PackagePaths,
        env: SdkEnv,
    ) -> Result<CmakeVariables, StepError> {
        let mut vars = CmakeVariables::new();
        vars.set(CMAKE_BUILD_TYPE, DEFAULT_BUILD_TYPE);
        vars.set(CMAKE_INSTALL_PREFIX, ctx.prefix.to_string_lossy());
        if let Some(section) = self.config.environment(env) {
            for (name, value) in &section.cmake {
                vars.set(name.as_str(), value.as_str());
            }
        }
        Ok(vars)
    }

    fn cmake_execute(
        &self,
        _ctx: &PackagePaths,
        src_path: &Path,
        env: &SdkEnvironment,
        cwd: &Path,
        cmake_variables: &CmakeVariables,
    ) -> Result<(), StepError> {
        let args = self.configure_args(src_path, cwd, cmake_variables);
        run_tool(self.opts, "cmake", &args, cwd, env)?;
        Ok(())
    }

    fn ninja_build(
        &self,
        _ctx: &PackagePaths,
        env: &SdkEnvironment,
        cwd: &Path,
    ) -> Result<(), StepError> {
        let args = vec![
            "-C".to_string(),
            cwd.to_string_lossy().to_string(),
            format!("-j{}", self.jobs),
        ];
        run_tool(self.opts, "ninja", &args, cwd, env)?;
        Ok(())
    }

    fn ninja_install(
        &self,
        _ctx: &PackagePaths,
        env: &SdkEnvironment,
        cwd: &Path,
    ) -> Result<(), StepError> {
        let args = vec![
            "-C".to_string(),
            cwd.to_string_lossy().to_string(),
            "install".to_string(),
        ];
        run_tool(self.opts, "ninja", &args, cwd, env)?;
        Ok(())
    }
}
