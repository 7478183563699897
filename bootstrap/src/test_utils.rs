//! Shared test utilities for the bootstrap crate.

use crate::config::Environment;
use crate::deps::CommandExecutor;
use crate::error::{BootstrapError, Result};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with the given stdout.
#[must_use]
pub fn success_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "git").
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<&'static str>,
    /// The result to return when this command is invoked.
    ///
    /// Inherited-stdio invocations only see the exit status.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Expects `cmd args...` and answers with `result`.
    #[must_use]
    pub fn new(cmd: &'static str, args: &[&'static str], result: Result<Output>) -> Self {
        Self {
            cmd,
            args: args.to_vec(),
            result,
        }
    }

    /// Expects `cmd args...` and answers with a successful, silent run.
    #[must_use]
    pub fn succeeding(cmd: &'static str, args: &[&'static str]) -> Self {
        Self::new(cmd, args, Ok(success_output("")))
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Returns the number of expected calls not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.expected.borrow().len()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }

    fn next_call(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let call = self.expected.borrow_mut().pop_front().ok_or_else(|| {
            BootstrapError::StubMismatch {
                message: format!("unexpected command invocation: {cmd} {}", args.join(" ")),
            }
        })?;

        if call.cmd != cmd || call.args.as_slice() != args {
            return Err(BootstrapError::StubMismatch {
                message: format!(
                    "expected `{} {}`, got `{cmd} {}`",
                    call.cmd,
                    call.args.join(" "),
                    args.join(" ")
                ),
            });
        }

        call.result
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        self.next_call(cmd, args)
    }

    fn run_inherited(&self, cmd: &str, args: &[&str]) -> Result<ExitStatus> {
        self.next_call(cmd, args).map(|output| output.status)
    }
}

/// An in-memory [`Environment`].
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    /// Creates an environment holding `vars`.
    #[must_use]
    pub fn new<'a>(vars: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        }
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Result<Option<String>> {
        Ok(self.vars.get(key).filter(|value| !value.is_empty()).cloned())
    }
}
