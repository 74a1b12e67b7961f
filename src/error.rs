//! Step error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::context::DeployMode;

/// Errors that can occur while running a step hook.
#[derive(Error, Debug)]
pub enum StepError {
    #[error("deployment mode '{mode}' is not supported (supported: {supported})")]
    UnsupportedMode { mode: DeployMode, supported: String },

    #[error("command failed: {cmd}\nstderr: {stderr}")]
    CommandFailedWithStderr { cmd: String, stderr: String },

    #[error("command failed: {cmd} (exit code: {code:?})")]
    CommandFailed { cmd: String, code: Option<i32> },

    #[error("directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid include pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("no files match pattern: {0}")]
    NoMatch(String),

    #[error("invalid SDK config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}
