//! Hook contexts handed to a step by the orchestrator.
//!
//! Every context carries the same [`PackagePaths`]; the deploy context also
//! carries the requested deployment modes.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::StepError;
use crate::sdk::SdkEnv;

/// Filesystem locations a step works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePaths {
    /// Package source directory (where the CMake project lives)
    pub package: PathBuf,
    /// Build output root; one subdirectory per SDK environment
    pub build: PathBuf,
    /// Deploy output root; one subdirectory per deployment mode
    pub deploy: PathBuf,
    /// Canonical install prefix used by `build` (default: /usr/local)
    pub prefix: PathBuf,
}

impl PackagePaths {
    /// Create paths for a package, with build and deploy roots inside it.
    pub fn with_package(package: impl Into<PathBuf>) -> Self {
        let package = package.into();
        Self {
            build: package.join("build"),
            deploy: package.join("deploy"),
            prefix: PathBuf::from("/usr/local"),
            package,
        }
    }

    /// Set the build output root.
    pub fn build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build = dir.into();
        self
    }

    /// Set the deploy output root.
    pub fn deploy_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.deploy = dir.into();
        self
    }

    /// Set the install prefix.
    pub fn prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// `{build}/{tag}`
    pub fn env_build_dir(&self, env: SdkEnv) -> PathBuf {
        self.build.join(env.tag())
    }

    /// `{deploy}/{mode}`
    pub fn mode_deploy_dir(&self, mode: DeployMode) -> PathBuf {
        self.deploy.join(mode.as_str())
    }
}

/// Context for the build hook.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub paths: PackagePaths,
}

/// Context for the clean hook.
#[derive(Debug, Clone)]
pub struct CleanContext {
    pub paths: PackagePaths,
}

/// Context for the test hook.
#[derive(Debug, Clone)]
pub struct TestContext {
    pub paths: PackagePaths,
}

impl BuildContext {
    pub fn new(paths: PackagePaths) -> Self {
        Self { paths }
    }
}

impl CleanContext {
    pub fn new(paths: PackagePaths) -> Self {
        Self { paths }
    }
}

impl TestContext {
    pub fn new(paths: PackagePaths) -> Self {
        Self { paths }
    }
}

/// Kind of package produced by a deploy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeployMode {
    /// Headers and libraries for downstream builds
    Dev,
    /// Applications and runtime libraries
    Run,
    /// Sources
    Src,
}

impl DeployMode {
    /// Directory name under the deploy root.
    pub fn as_str(self) -> &'static str {
        match self {
            DeployMode::Dev => "dev",
            DeployMode::Run => "run",
            DeployMode::Src => "src",
        }
    }
}

impl fmt::Display for DeployMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeployMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(DeployMode::Dev),
            "run" => Ok(DeployMode::Run),
            "src" => Ok(DeployMode::Src),
            other => Err(format!(
                "unknown deployment mode '{}' (expected dev, run or src)",
                other
            )),
        }
    }
}

/// Context for the deploy hook.
#[derive(Debug, Clone)]
pub struct DeployContext {
    pub paths: PackagePaths,
    modes: Vec<DeployMode>,
    supported: Option<Vec<DeployMode>>,
}

impl DeployContext {
    /// Create a deploy context; duplicate modes are dropped, order is kept.
    pub fn new(paths: PackagePaths, modes: impl IntoIterator<Item = DeployMode>) -> Self {
        let mut requested = Vec::new();
        for mode in modes {
            if !requested.contains(&mode) {
                requested.push(mode);
            }
        }
        Self {
            paths,
            modes: requested,
            supported: None,
        }
    }

    /// Requested modes, in request order.
    pub fn modes(&self) -> &[DeployMode] {
        &self.modes
    }

    /// Modes the package declared via [`set_supported_modes`](Self::set_supported_modes).
    pub fn supported_modes(&self) -> Option<&[DeployMode]> {
        self.supported.as_deref()
    }

    /// Declare the modes this package accepts.
    ///
    /// Fails on the first requested mode outside `supported`.
    pub fn set_supported_modes(&mut self, supported: &[DeployMode]) -> Result<(), StepError> {
        if let Some(mode) = self.modes.iter().find(|m| !supported.contains(m)) {
            return Err(StepError::UnsupportedMode {
                mode: *mode,
                supported: supported
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        self.supported = Some(supported.to_vec());
        Ok(())
    }
}
