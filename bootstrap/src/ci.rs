//! Travis CI activation.

use crate::deps::{CommandExecutor, err_source};
use crate::error::{BootstrapError, Result};

/// Enables the project on Travis CI without prompting.
///
/// # Errors
///
/// Returns [`BootstrapError::CiEnable`] if the `travis` CLI cannot be started
/// or exits unsuccessfully. Callers treat this as a warning.
pub fn enable_travis(executor: &dyn CommandExecutor) -> Result<()> {
    let status = executor
        .run_inherited("travis", &["enable", "--no-interactive"])
        .map_err(|err| BootstrapError::CiEnable {
            reason: err_source(&err),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(BootstrapError::CiEnable {
            reason: format!("travis exited with {status}"),
        })
    }
}
