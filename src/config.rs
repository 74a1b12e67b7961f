//! SDK configuration (`sdk.toml`).
//!
//! Supplies per-environment tool variables and CMake cache variables to
//! [`SystemToolchain`](crate::toolchain::SystemToolchain).
//!
//! ```toml
//! generator = "Ninja"
//!
//! [environments.64bit.env]
//! CC = "gcc"
//!
//! [environments.64bit.cmake]
//! CMAKE_BUILD_TYPE = "Release"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::StepError;
use crate::sdk::SdkEnv;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "CTRL_AGENT_CONFIG";

/// Config file name looked up in the package directory.
pub const CONFIG_FILE: &str = "sdk.toml";

const DEFAULT_GENERATOR: &str = "Ninja";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SdkConfig {
    /// CMake generator (default: Ninja)
    pub generator: Option<String>,
    /// Sections keyed by environment tag (e.g. "64bit")
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Variables set on every tool invocation
    pub env: BTreeMap<String, String>,
    /// CMake cache variables
    pub cmake: BTreeMap<String, String>,
}

impl SdkConfig {
    /// Parse config text; `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self, StepError> {
        toml::from_str(text).map_err(|e| StepError::Config {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, StepError> {
        let text = std::fs::read_to_string(path).map_err(|e| StepError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// Find and load the config for a package.
    ///
    /// Lookup order: `explicit`, `$CTRL_AGENT_CONFIG`, `{package}/sdk.toml`,
    /// `{config_dir}/ctrl-agent/sdk.toml`. Falls back to defaults.
    pub fn discover(explicit: Option<&Path>, package: &Path) -> Result<Self, StepError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Self::load(Path::new(&path));
        }
        match candidate_paths(package).into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn generator(&self) -> &str {
        self.generator.as_deref().unwrap_or(DEFAULT_GENERATOR)
    }

    pub fn environment(&self, env: SdkEnv) -> Option<&EnvironmentConfig> {
        self.environments.get(env.tag())
    }
}

fn candidate_paths(package: &Path) -> Vec<PathBuf> {
    let mut paths = vec![package.join(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("ctrl-agent").join(CONFIG_FILE));
    }
    paths
}
