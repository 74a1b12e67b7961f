//! Clean hook - removes the build output tree.

use crate::context::CleanContext;
use crate::error::StepError;
use crate::fs_utils::remove_dir_all_if_exists;
use crate::output;
use crate::toolchain::Toolchain;

use super::{BuildStep, CtrlAgent};

/// Execute the clean hook. An already clean tree is success.
pub fn clean<T: Toolchain>(step: &CtrlAgent<T>, ctx: &CleanContext) -> Result<(), StepError> {
    output::action(&format!("Cleaning {}", step.name()));

    if remove_dir_all_if_exists(&ctx.paths.build)? {
        output::detail(&format!("removed {}", ctx.paths.build.display()));
    } else {
        output::detail(&format!("{} already clean", ctx.paths.build.display()));
    }
    Ok(())
}
