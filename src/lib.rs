//! Build step for the ctrl-agent asio wrapper
//!
//! The step is driven by an orchestrator through the [`BuildStep`] hooks:
//!
//! - `dependencies()` - steps to build first (`asio`)
//! - `build(ctx)` - configure, compile and install per SDK environment
//! - `clean(ctx)` - remove the build tree
//! - `deploy(ctx)` - stage an install and package it per deployment mode
//! - `test(ctx)` - nothing to run for a header-only library
//!
//! # Layout
//!
//! ```text
//! {build}/{env}/      one CMake build tree per SDK environment (e.g. 64bit)
//! {deploy}/{mode}/    one package per deployment mode (e.g. dev)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use ctrl_agent::{BuildStep, CtrlAgent, DeployContext, DeployMode, PackagePaths, SystemToolchain};
//!
//! let paths = PackagePaths::with_package("/pkg/asio-wrapper")
//!     .build_dir("/tmp/build")
//!     .deploy_dir("/tmp/deploy");
//! let step = CtrlAgent::new(SystemToolchain::default());
//!
//! let mut ctx = DeployContext::new(paths, [DeployMode::Dev]);
//! step.deploy(&mut ctx)?;
//! # Ok::<(), ctrl_agent::StepError>(())
//! ```
//!
//! # Deployment modes
//!
//! Only `dev` is supported: headers and libraries (`/include*`, `/lib*`)
//! of the staged install. Requesting `run` or `src` fails before anything
//! is staged.

pub mod config;
pub mod context;
pub mod error;
pub mod fs_utils;
pub mod install;
pub mod output;
pub mod sdk;
pub mod step;
pub mod toolchain;

pub use config::SdkConfig;
pub use context::{BuildContext, CleanContext, DeployContext, DeployMode, PackagePaths, TestContext};
pub use error::StepError;
pub use install::{InstallCreator, PackageSummary};
pub use sdk::{CmakeVariables, SdkEnv, SdkEnvironment};
pub use step::{BuildStep, CtrlAgent};
pub use toolchain::{SystemToolchain, Toolchain};
