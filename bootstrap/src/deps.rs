//! External command execution and Composer dependency installation.
//!
//! Every subprocess the bootstrapper starts goes through [`CommandExecutor`],
//! so that tests can observe and stub invocations.

use crate::error::{BootstrapError, Result};
use camino::Utf8PathBuf;
use log::{debug, warn};
use std::process::{Command, ExitStatus, Output};

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use library_bootstrap::deps::{CommandExecutor, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor::default();
    /// let output = executor.run("git", &["--version"])?;
    /// assert!(output.status.success());
    /// # Ok::<(), library_bootstrap::error::BootstrapError>(())
    /// ```
    fn run<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<Output>;

    /// Runs a command with the caller's standard streams and returns its
    /// exit status.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning the command.
    fn run_inherited<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<ExitStatus>;
}

/// Executes commands on the host system.
///
/// Commands run in `working_dir` when one is set, otherwise in the current
/// directory.
///
/// # Examples
///
/// ```no_run
/// use camino::Utf8PathBuf;
/// use library_bootstrap::deps::{CommandExecutor, SystemCommandExecutor};
///
/// let executor = SystemCommandExecutor::in_dir(Utf8PathBuf::from("/tmp/my-lib"));
/// let status = executor.run_inherited("git", &["status"])?;
/// assert!(status.success());
/// # Ok::<(), library_bootstrap::error::BootstrapError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor {
    working_dir: Option<Utf8PathBuf>,
}

impl SystemCommandExecutor {
    /// Creates an executor that runs commands inside `dir`.
    #[must_use]
    pub fn in_dir(dir: Utf8PathBuf) -> Self {
        Self {
            working_dir: Some(dir),
        }
    }

    fn command(&self, cmd: &str, args: &[&str]) -> Command {
        let mut command = Command::new(cmd);
        command.args(args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir.as_std_path());
        }
        command
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        debug!("running {cmd} {}", args.join(" "));
        self.command(cmd, args)
            .output()
            .map_err(BootstrapError::from)
    }

    fn run_inherited(&self, cmd: &str, args: &[&str]) -> Result<ExitStatus> {
        debug!("running {cmd} {}", args.join(" "));
        self.command(cmd, args)
            .status()
            .map_err(BootstrapError::from)
    }
}

/// Result of the best-effort `composer install` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Composer exited successfully.
    Installed,
    /// Composer ran but exited with a failure status.
    Failed {
        /// Exit code, when the process was not killed by a signal.
        code: Option<i32>,
    },
    /// Composer could not be started.
    Unavailable,
}

/// Installs the project's Composer dependencies.
///
/// The outcome is reported but never treated as an error; later stages
/// surface any missing files themselves.
///
/// # Examples
///
/// ```no_run
/// use library_bootstrap::deps::{InstallOutcome, SystemCommandExecutor, install_dependencies};
///
/// let outcome = install_dependencies(&SystemCommandExecutor::default());
/// assert_eq!(outcome, InstallOutcome::Installed);
/// ```
#[must_use]
pub fn install_dependencies(executor: &dyn CommandExecutor) -> InstallOutcome {
    match executor.run_inherited("composer", &["install"]) {
        Ok(status) if status.success() => InstallOutcome::Installed,
        Ok(status) => {
            warn!("composer install exited with {status}");
            InstallOutcome::Failed {
                code: status.code(),
            }
        }
        Err(err) => {
            warn!("composer install could not be started: {}", err_source(&err));
            InstallOutcome::Unavailable
        }
    }
}

/// Describes an executor error including its underlying cause.
pub(crate) fn err_source(err: &BootstrapError) -> String {
    match std::error::Error::source(err) {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::exit_status;

    fn expect_composer(executor: &mut MockCommandExecutor, result: Result<ExitStatus>) {
        let mut result = Some(result);
        executor
            .expect_run_inherited()
            .withf(|cmd, args| cmd == "composer" && args == ["install"])
            .times(1)
            .returning(move |_, _| {
                result
                    .take()
                    .unwrap_or_else(|| Err(std::io::Error::other("called twice").into()))
            });
    }

    #[test]
    fn install_dependencies_reports_success() {
        let mut executor = MockCommandExecutor::new();
        expect_composer(&mut executor, Ok(exit_status(0)));

        assert_eq!(install_dependencies(&executor), InstallOutcome::Installed);
    }

    #[test]
    fn install_dependencies_tolerates_failure_status() {
        let mut executor = MockCommandExecutor::new();
        expect_composer(&mut executor, Ok(exit_status(2)));

        assert_eq!(
            install_dependencies(&executor),
            InstallOutcome::Failed { code: Some(2) }
        );
    }

    #[test]
    fn install_dependencies_tolerates_missing_composer() {
        let mut executor = MockCommandExecutor::new();
        expect_composer(
            &mut executor,
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "composer").into()),
        );

        assert_eq!(install_dependencies(&executor), InstallOutcome::Unavailable);
    }

    #[cfg(unix)]
    #[test]
    fn system_executor_runs_commands_in_working_dir() {
        let temp = tempfile::TempDir::new().expect("failed to create temp dir");
        let dir =
            Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("non-UTF8 temp path");
        std::fs::write(dir.join("composer.json.dist"), "{}").expect("write marker");

        let output = SystemCommandExecutor::in_dir(dir)
            .run("ls", &[])
            .expect("ls should run");

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("composer.json.dist"));
    }
}
