//! SDK environments, environment descriptors and CMake variable mappings.

use std::collections::BTreeMap;
use std::fmt;

/// CMake variable holding the install prefix.
pub const CMAKE_INSTALL_PREFIX: &str = "CMAKE_INSTALL_PREFIX";

/// CMake variable holding the build type.
pub const CMAKE_BUILD_TYPE: &str = "CMAKE_BUILD_TYPE";

/// Target SDK environment a package is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SdkEnv {
    Bit32,
    Bit64,
}

impl SdkEnv {
    /// Tag used for build subdirectories and config sections.
    pub fn tag(self) -> &'static str {
        match self {
            SdkEnv::Bit32 => "32bit",
            SdkEnv::Bit64 => "64bit",
        }
    }
}

impl fmt::Display for SdkEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Environment variables a tool invocation runs with.
///
/// Applied per command, never to the current process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkEnvironment {
    env: SdkEnv,
    vars: BTreeMap<String, String>,
}

impl SdkEnvironment {
    pub fn new(env: SdkEnv, vars: BTreeMap<String, String>) -> Self {
        Self { env, vars }
    }

    pub fn env(&self) -> SdkEnv {
        self.env
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// CMake cache variables passed as `-D<name>=<value>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CmakeVariables {
    vars: BTreeMap<String, String>,
}

impl CmakeVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Command line definitions, sorted by name.
    pub fn to_args(&self) -> Vec<String> {
        self.vars
            .iter()
            .map(|(k, v)| format!("-D{}={}", k, v))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CmakeVariables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = CmakeVariables::new();
        for (k, v) in iter {
            vars.set(k, v);
        }
        vars
    }
}
