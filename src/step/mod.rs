//! The ctrl-agent build step and the hook contract it implements.

mod build;
mod clean;
mod deploy;

pub use deploy::{DEV_INCLUDE_PATTERNS, Packaging, SUPPORTED_MODES};

use std::path::PathBuf;

use crate::context::{BuildContext, CleanContext, DeployContext, TestContext};
use crate::error::StepError;
use crate::sdk::SdkEnv;
use crate::toolchain::{SystemToolchain, Toolchain};

/// Lifecycle hooks an orchestrator calls on a build step.
pub trait BuildStep {
    /// Step identifier.
    fn name(&self) -> &str;

    /// Steps that must be built before this one.
    fn dependencies(&self) -> Vec<&'static str>;

    /// Configure, compile and install.
    fn build(&self, ctx: &BuildContext) -> Result<(), StepError>;

    /// Remove build outputs.
    fn clean(&self, ctx: &CleanContext) -> Result<(), StepError>;

    /// Produce deploy packages for the requested modes.
    fn deploy(&self, ctx: &mut DeployContext) -> Result<(), StepError>;

    /// Run package tests.
    fn test(&self, _ctx: &TestContext) -> Result<(), StepError> {
        Ok(())
    }
}

/// Environments the package is built for.
pub const TARGET_ENVIRONMENTS: [SdkEnv; 1] = [SdkEnv::Bit64];

/// Header-only asio wrapper library, built with CMake and Ninja.
pub struct CtrlAgent<T = SystemToolchain> {
    toolchain: T,
    environments: Vec<SdkEnv>,
    staging_parent: Option<PathBuf>,
}

impl<T: Toolchain> CtrlAgent<T> {
    pub fn new(toolchain: T) -> Self {
        Self {
            toolchain,
            environments: TARGET_ENVIRONMENTS.to_vec(),
            staging_parent: None,
        }
    }

    /// Override the environments to build for, processed in order.
    pub fn with_environments(mut self, environments: impl IntoIterator<Item = SdkEnv>) -> Self {
        self.environments = environments.into_iter().collect();
        self
    }

    /// Create deploy staging directories under `dir` instead of the system
    /// temp directory.
    pub fn with_staging_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_parent = Some(dir.into());
        self
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    pub fn environments(&self) -> &[SdkEnv] {
        &self.environments
    }
}

impl<T: Toolchain> BuildStep for CtrlAgent<T> {
    fn name(&self) -> &str {
        "ctrl-agent"
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["asio"]
    }

    fn build(&self, ctx: &BuildContext) -> Result<(), StepError> {
        build::build(self, ctx)
    }

    fn clean(&self, ctx: &CleanContext) -> Result<(), StepError> {
        clean::clean(self, ctx)
    }

    fn deploy(&self, ctx: &mut DeployContext) -> Result<(), StepError> {
        deploy::deploy(self, ctx)
    }
}
