//! Git configuration lookups and GitHub repository provisioning.
//!
//! Author details are read from the global git configuration. Provisioning
//! initialises the local repository, commits the rendered project, creates
//! the GitHub repository through `hub` and pushes. It is skipped entirely
//! when the project already has a `.git` directory.

use crate::deps::{CommandExecutor, err_source};
use crate::error::{BootstrapError, Result};
use crate::identity::{AuthorInfo, ProjectIdentity};
use camino::Utf8Path;
use log::{debug, info};
use std::fmt;

/// Message of the initial commit.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit";

/// Reads one key from the global git configuration.
///
/// Failures and empty values both yield `None`.
fn global_config_value(executor: &dyn CommandExecutor, key: &str) -> Option<String> {
    match executor.run("git", &["config", "--global", "--get", key]) {
        Ok(output) if output.status.success() => {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_owned();
            (!value.is_empty()).then_some(value)
        }
        Ok(_) => None,
        Err(err) => {
            debug!("git config lookup for {key} failed: {}", err_source(&err));
            None
        }
    }
}

/// Looks up `user.name`, `user.email` and `user.homepage` in the global git
/// configuration.
///
/// Returns `None` when none of them is set.
#[must_use]
pub fn lookup_author(executor: &dyn CommandExecutor) -> Option<AuthorInfo> {
    AuthorInfo::from_parts(
        global_config_value(executor, "user.name"),
        global_config_value(executor, "user.email"),
        global_config_value(executor, "user.homepage"),
    )
}

/// Returns `true` when version control is already initialised in `project_dir`.
#[must_use]
pub fn is_repository_initialized(project_dir: &Utf8Path) -> bool {
    project_dir.join(".git").exists()
}

/// One command of the provisioning sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionStep {
    /// Program to run.
    pub program: &'static str,
    /// Program arguments.
    pub args: Vec<String>,
}

impl ProvisionStep {
    fn new(program: &'static str, args: &[&str]) -> Self {
        Self {
            program,
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
        }
    }
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// The ordered provisioning commands for `identity`.
///
/// # Examples
///
/// ```
/// use library_bootstrap::git::provision_steps;
/// use library_bootstrap::identity::ProjectIdentity;
///
/// let steps = provision_steps(&ProjectIdentity::new("acme", "my-lib", None));
/// let lines: Vec<String> = steps.iter().map(ToString::to_string).collect();
/// assert_eq!(lines[3], "hub create -d \"My Lib\" acme/my-lib");
/// ```
#[must_use]
pub fn provision_steps(identity: &ProjectIdentity) -> Vec<ProvisionStep> {
    vec![
        ProvisionStep::new("git", &["init"]),
        ProvisionStep::new("git", &["add", "."]),
        ProvisionStep::new("git", &["commit", "-m", INITIAL_COMMIT_MESSAGE]),
        ProvisionStep::new("hub", &["create", "-d", identity.title(), identity.repo_slug()]),
        ProvisionStep::new("git", &["push", "-u", "origin", "HEAD"]),
    ]
}

/// Result of the provisioning stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A `.git` directory already existed; nothing ran.
    AlreadyInitialized,
    /// Every step succeeded.
    Created,
}

/// Initialises git, commits, creates the GitHub repository and pushes.
///
/// Steps run in order and the first failure stops the sequence. Nothing is
/// rolled back.
///
/// # Errors
///
/// Returns [`BootstrapError::RepositoryCreation`] naming the first step that
/// could not be started or exited unsuccessfully.
pub fn provision_repository(
    executor: &dyn CommandExecutor,
    project_dir: &Utf8Path,
    identity: &ProjectIdentity,
) -> Result<ProvisionOutcome> {
    if is_repository_initialized(project_dir) {
        info!("{project_dir} is already a git repository; skipping provisioning");
        return Ok(ProvisionOutcome::AlreadyInitialized);
    }

    for step in provision_steps(identity) {
        let args: Vec<&str> = step.args.iter().map(String::as_str).collect();
        let succeeded = match executor.run_inherited(step.program, &args) {
            Ok(status) => status.success(),
            Err(err) => {
                debug!("{step} could not be started: {}", err_source(&err));
                false
            }
        };

        if !succeeded {
            return Err(BootstrapError::RepositoryCreation {
                step: step.to_string(),
            });
        }
    }

    Ok(ProvisionOutcome::Created)
}
