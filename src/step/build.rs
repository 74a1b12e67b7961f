//! Build hook - configure, compile and install per SDK environment.

use crate::context::BuildContext;
use crate::error::StepError;
use crate::output;
use crate::toolchain::Toolchain;

use super::{BuildStep, CtrlAgent};

/// Execute the build hook.
pub fn build<T: Toolchain>(step: &CtrlAgent<T>, ctx: &BuildContext) -> Result<(), StepError> {
    let paths = &ctx.paths;
    let toolchain = step.toolchain();

    output::action(&format!("Building {}", step.name()));

    // header only lib, one build tree per environment
    for &env in step.environments() {
        let build_path = paths.env_build_dir(env);
        std::fs::create_dir_all(&build_path)?;

        let sdk_env = toolchain.sdk_environment_load(paths, env)?;
        let cmake_variables = toolchain.cmake_variables_load(paths, env)?;

        output::sub_action(&format!("configure ({})", env));
        toolchain.cmake_execute(paths, &paths.package, &sdk_env, &build_path, &cmake_variables)?;

        output::sub_action(&format!("compile ({})", env));
        toolchain.ninja_build(paths, &sdk_env, &build_path)?;

        output::sub_action(&format!("install ({})", env));
        toolchain.ninja_install(paths, &sdk_env, &build_path)?;
    }

    output::success(&format!("{} built", step.name()));
    Ok(())
}
