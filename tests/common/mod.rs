//! Common test utilities: a recording toolchain and filesystem fixtures.

#![allow(dead_code)]

use ctrl_agent::sdk::CMAKE_INSTALL_PREFIX;
use ctrl_agent::{
    CmakeVariables, PackagePaths, SdkEnv, SdkEnvironment, StepError, Toolchain,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Files the fake install step writes below the configured prefix.
pub const ASIO_WRAPPER_LAYOUT: &[(&str, &str)] = &[
    ("include/asio_wrapper/asio_wrapper.hpp", "#pragma once\n"),
    ("include/asio_wrapper/detail/socket.hpp", "#pragma once\n"),
    ("cmake/asio_wrapper-config.cmake", "include(asio_wrapper-targets.cmake)\n"),
    ("cmake/asio_wrapper-targets.cmake", "add_library(asio_wrapper INTERFACE)\n"),
];

/// A tool invocation seen by [`FakeToolchain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Configure {
        env: SdkEnv,
        cwd: PathBuf,
        prefix: PathBuf,
    },
    Build {
        env: SdkEnv,
        cwd: PathBuf,
    },
    Install {
        env: SdkEnv,
        cwd: PathBuf,
        prefix: PathBuf,
    },
}

/// Which invocation should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Configure,
    Build,
    Install,
}

/// Toolchain that records calls and fakes an install tree.
pub struct FakeToolchain {
    layout: Vec<(String, String)>,
    fail_on: Option<FailOn>,
    calls: RefCell<Vec<Call>>,
    configured: RefCell<HashMap<PathBuf, PathBuf>>,
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self::with_layout(ASIO_WRAPPER_LAYOUT)
    }

    pub fn with_layout(layout: &[(&str, &str)]) -> Self {
        Self {
            layout: layout
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            fail_on: None,
            calls: RefCell::new(Vec::new()),
            configured: RefCell::new(HashMap::new()),
        }
    }

    pub fn failing_on(mut self, fail_on: FailOn) -> Self {
        self.fail_on = Some(fail_on);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Prefixes the build trees were configured with, in call order.
    pub fn configured_prefixes(&self) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Configure { prefix, .. } => Some(prefix.clone()),
                _ => None,
            })
            .collect()
    }

    fn fail(&self, what: FailOn, cmd: &str) -> Result<(), StepError> {
        if self.fail_on == Some(what) {
            return Err(StepError::CommandFailed {
                cmd: cmd.to_string(),
                code: Some(1),
            });
        }
        Ok(())
    }
}

impl Toolchain for FakeToolchain {
    fn sdk_environment_load(
        &self,
        _ctx: &PackagePaths,
        env: SdkEnv,
    ) -> Result<SdkEnvironment, StepError> {
        let mut vars = BTreeMap::new();
        vars.insert("SDK_ENV".to_string(), env.tag().to_string());
        Ok(SdkEnvironment::new(env, vars))
    }

    fn cmake_variables_load(
        &self,
        ctx: &PackagePaths,
        _env: SdkEnv,
    ) -> Result<CmakeVariables, StepError> {
        let mut vars = CmakeVariables::new();
        vars.set(CMAKE_INSTALL_PREFIX, ctx.prefix.to_string_lossy());
        Ok(vars)
    }

    fn cmake_execute(
        &self,
        _ctx: &PackagePaths,
        _src_path: &Path,
        env: &SdkEnvironment,
        cwd: &Path,
        cmake_variables: &CmakeVariables,
    ) -> Result<(), StepError> {
        if !cwd.is_dir() {
            return Err(StepError::MissingDirectory(cwd.to_path_buf()));
        }
        let prefix = PathBuf::from(cmake_variables.get(CMAKE_INSTALL_PREFIX).unwrap_or_default());
        self.calls.borrow_mut().push(Call::Configure {
            env: env.env(),
            cwd: cwd.to_path_buf(),
            prefix: prefix.clone(),
        });
        self.fail(FailOn::Configure, "cmake")?;

        std::fs::write(
            cwd.join("CMakeCache.txt"),
            format!("CMAKE_INSTALL_PREFIX={}\n", prefix.display()),
        )?;
        self.configured.borrow_mut().insert(cwd.to_path_buf(), prefix);
        Ok(())
    }

    fn ninja_build(
        &self,
        _ctx: &PackagePaths,
        env: &SdkEnvironment,
        cwd: &Path,
    ) -> Result<(), StepError> {
        self.calls.borrow_mut().push(Call::Build {
            env: env.env(),
            cwd: cwd.to_path_buf(),
        });
        self.fail(FailOn::Build, "ninja")?;
        std::fs::write(cwd.join(".ninja_log"), "# ninja log v5\n")?;
        Ok(())
    }

    fn ninja_install(
        &self,
        _ctx: &PackagePaths,
        env: &SdkEnvironment,
        cwd: &Path,
    ) -> Result<(), StepError> {
        let prefix = self
            .configured
            .borrow()
            .get(cwd)
            .cloned()
            .ok_or_else(|| StepError::MissingDirectory(cwd.to_path_buf()))?;
        self.calls.borrow_mut().push(Call::Install {
            env: env.env(),
            cwd: cwd.to_path_buf(),
            prefix: prefix.clone(),
        });
        self.fail(FailOn::Install, "ninja install")?;

        for (rel, content) in &self.layout {
            let dest = prefix.join(rel);
            std::fs::create_dir_all(dest.parent().unwrap())?;
            std::fs::write(dest, content)?;
        }
        Ok(())
    }
}

/// Scratch layout for one test.
pub struct TestEnv {
    pub dir: TempDir,
    pub paths: PackagePaths,
    pub staging_root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let package = dir.path().join("pkg/asio-wrapper");
        std::fs::create_dir_all(&package).unwrap();
        std::fs::write(package.join("CMakeLists.txt"), "project(asio_wrapper CXX)\n").unwrap();

        let staging_root = dir.path().join("staging");
        std::fs::create_dir_all(&staging_root).unwrap();

        let paths = PackagePaths::with_package(&package)
            .build_dir(dir.path().join("build"))
            .deploy_dir(dir.path().join("deploy"))
            .prefix(dir.path().join("sysroot/usr"));

        Self {
            dir,
            paths,
            staging_root,
        }
    }

    /// Number of entries currently in the staging root.
    pub fn staging_entries(&self) -> usize {
        std::fs::read_dir(&self.staging_root).unwrap().count()
    }
}

/// All files below `root`, relative and sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| !e.file_type().is_dir())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
