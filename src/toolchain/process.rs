//! Process helpers for tool invocations.

use std::path::Path;
use std::process::{Command, ExitStatus, Output};

use crate::error::StepError;
use crate::output;
use crate::sdk::SdkEnvironment;

/// How tool invocations are executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// If true, log commands without executing them
    pub dry_run: bool,
    /// If true, print commands and their output as they execute
    pub verbose: bool,
}

/// Shell-quote a value for display.
pub fn shell_quote(s: impl std::fmt::Display) -> String {
    let s = s.to_string();
    if !s.is_empty()
        && s.chars().all(|c| {
            c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '=' | ':' | ',' | '+')
        })
    {
        s
    } else {
        format!("'{}'", s.replace('\'', "'\"'\"'"))
    }
}

/// Render a program and its arguments as a shell command line.
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(shell_quote(program))
        .chain(args.iter().map(shell_quote))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a tool in `cwd` with the variables of `env` applied.
///
/// The current process environment is inherited but never modified.
pub fn run_tool(
    opts: RunOptions,
    program: &str,
    args: &[String],
    cwd: &Path,
    env: &SdkEnvironment,
) -> Result<Output, StepError> {
    let cmd = command_line(program, args);

    if opts.verbose || opts.dry_run {
        output::command(opts.dry_run, &cmd);
    }

    if opts.dry_run {
        return Ok(Output {
            status: ExitStatus::default(),
            stdout: Vec::new(),
            stderr: Vec::new(),
        });
    }

    if !cwd.is_dir() {
        return Err(StepError::MissingDirectory(cwd.to_path_buf()));
    }

    let pb = (!opts.verbose).then(|| output::spinner(&format!("{} ({})", program, env.env())));

    let result = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .envs(env.iter())
        .output();

    if let Some(pb) = pb {
        output::progress_done(pb);
    }
    let out = result?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        // ninja reports compiler errors on stdout
        let stderr = if stderr.is_empty() {
            String::from_utf8_lossy(&out.stdout).trim().to_string()
        } else {
            stderr
        };
        if stderr.is_empty() {
            return Err(StepError::CommandFailed {
                cmd,
                code: out.status.code(),
            });
        }
        return Err(StepError::CommandFailedWithStderr { cmd, stderr });
    }

    if opts.verbose {
        for line in String::from_utf8_lossy(&out.stdout).lines() {
            output::detail(line);
        }
    }

    Ok(out)
}
