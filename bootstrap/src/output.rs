//! User-facing output for the bootstrap CLI.
//!
//! Progress lines, warnings and errors are written to a caller-supplied
//! stream (stderr in the binary). Warnings are yellow and errors red when
//! colour is enabled.

use crate::error::BootstrapError;
use crate::git::provision_steps;
use crate::identity::ProjectIdentity;
use crate::pipeline::StageSelection;
use crate::quality::{QUALITY_CONFIGS, QUALITY_PACKAGE_DIR};
use camino::Utf8Path;
use owo_colors::OwoColorize;
use std::io::Write;

/// Writes progress, warnings and errors.
pub struct Reporter<'a> {
    out: &'a mut dyn Write,
    quiet: bool,
    color: bool,
}

impl<'a> Reporter<'a> {
    /// Create a reporter writing to `out`.
    ///
    /// With `quiet` set only warnings and errors are written.
    pub fn new(out: &'a mut dyn Write, quiet: bool, color: bool) -> Self {
        Self { out, quiet, color }
    }

    /// Writes a progress line unless the reporter is quiet.
    pub fn progress(&mut self, message: impl std::fmt::Display) {
        if !self.quiet {
            self.line(message);
        }
    }

    /// Writes a line even when the reporter is quiet.
    pub fn message(&mut self, message: impl std::fmt::Display) {
        self.line(message);
    }

    /// Writes a non-fatal warning.
    pub fn warning(&mut self, message: &str) {
        if self.color {
            self.line(message.yellow());
        } else {
            self.line(message);
        }
    }

    /// Writes a fatal error, preceded by a blank line.
    pub fn error(&mut self, err: &BootstrapError) {
        let text = format_error(err);
        self.line("");
        if self.color {
            self.line(text.red());
        } else {
            self.line(text);
        }
    }

    fn line(&mut self, message: impl std::fmt::Display) {
        if writeln!(self.out, "{message}").is_err() {
            // Best-effort output; ignore write failures.
        }
    }
}

/// Formats an error for display.
///
/// Operational errors are shown as their message alone; any other error is
/// followed by its chain of causes.
///
/// # Examples
///
/// ```
/// use library_bootstrap::error::BootstrapError;
/// use library_bootstrap::output::format_error;
///
/// let err = BootstrapError::MissingEnvironment { name: "PACKAGIST_VENDOR" };
/// assert_eq!(format_error(&err), "'PACKAGIST_VENDOR' environment variable not set");
///
/// let err = BootstrapError::Io(std::io::Error::other("disk full"));
/// assert_eq!(format_error(&err), "I/O error\n  caused by: disk full");
/// ```
#[must_use]
pub fn format_error(err: &BootstrapError) -> String {
    let mut text = err.to_string();
    if err.is_operational() {
        return text;
    }

    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        text.push_str("\n  caused by: ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Configuration shown by `--dry-run`.
pub struct DryRunInfo<'a> {
    /// Project directory.
    pub project_dir: &'a Utf8Path,
    /// Resolved identity.
    pub identity: &'a ProjectIdentity,
    /// Author description used for `{{author}}`.
    pub author: &'a str,
    /// Stages that would run.
    pub stages: &'a StageSelection,
    /// Whether Scrutinizer registration is configured.
    pub analysis_configured: bool,
}

impl DryRunInfo<'_> {
    /// Format the plan as display lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let identity = self.identity;
        let mut lines = vec![
            "Dry run - no files will be modified".to_owned(),
            String::new(),
            format!("Project directory: {}", self.project_dir),
            format!("Library: {}", identity.library()),
            format!("Title: {}", identity.title()),
            format!("Namespace: {}", identity.namespace()),
            format!("Repository: {}", identity.repo_slug()),
            format!("Author: {}", self.author),
            String::new(),
            "Templates: README.md.dist -> README.md, LICENSE, composer.json.dist -> composer.json"
                .to_owned(),
        ];

        lines.push(plan_line("composer install", self.stages.install));
        lines.push(format!("Quality configs from {QUALITY_PACKAGE_DIR}:"));
        lines.extend(
            QUALITY_CONFIGS
                .iter()
                .map(|config| format!("  {} -> {}", config.source, config.destination)),
        );

        if self.stages.remote {
            lines.push("GitHub repository (unless .git exists):".to_owned());
            lines.extend(provision_steps(identity).iter().map(|step| format!("  {step}")));
        } else {
            lines.push(plan_line("GitHub repository", false));
        }

        lines.push(plan_line("travis enable", self.stages.ci));
        lines.push(plan_line(
            "Scrutinizer registration",
            self.stages.analysis && self.analysis_configured,
        ));
        lines
    }
}

fn plan_line(stage: &str, enabled: bool) -> String {
    let state = if enabled { "yes" } else { "skipped" };
    format!("{stage}: {state}")
}

/// Format the closing message after a successful run.
#[must_use]
pub fn success_message(identity: &ProjectIdentity, warnings: usize) -> String {
    match warnings {
        0 => format!("Library {} is ready", identity.library()),
        1 => format!("Library {} is ready (1 warning)", identity.library()),
        n => format!("Library {} is ready ({n} warnings)", identity.library()),
    }
}
