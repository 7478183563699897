//! Bootstrap pipeline orchestration.
//!
//! This module resolves the project once and then runs each stage in order:
//! template rendering, dependency installation, quality-config copying,
//! repository provisioning, CI activation and analysis registration. Fatal
//! stages stop the run; CI and analysis failures become warnings.

use crate::analysis::{AnalysisRegistrar, RegistrationOutcome, register_repository};
use crate::ci::enable_travis;
use crate::config::{BootstrapConfig, Environment};
use crate::deps::{CommandExecutor, InstallOutcome, install_dependencies};
use crate::error::Result;
use crate::git::{ProvisionOutcome, lookup_author, provision_repository};
use crate::identity::{AuthorInfo, ProjectIdentity, author_description};
use crate::manifest::render_manifest;
use crate::output::{DryRunInfo, Reporter};
use crate::quality::ConfigCopier;
use crate::template::{LICENSE_TEMPLATE, README_TEMPLATE, SubstitutionMap, render_file};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Datelike;
use log::{debug, warn};
use std::fmt;

/// Warning shown when `travis enable` fails.
pub const TRAVIS_WARNING: &str = "Failed to enable project on Travis";
/// Warning shown when the Scrutinizer request fails.
pub const SCRUTINIZER_WARNING: &str = "Failed to enable project on Scrutinizer";
/// Warning shown when no Scrutinizer access token is configured.
pub const SCRUTINIZER_SKIP_WARNING: &str = "Skipping scrutinizer: access token not configured";

/// Which optional stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSelection {
    /// Run `composer install`.
    pub install: bool,
    /// Initialise git and create the GitHub repository.
    pub remote: bool,
    /// Enable the project on Travis CI.
    pub ci: bool,
    /// Register the project with Scrutinizer.
    pub analysis: bool,
}

impl Default for StageSelection {
    fn default() -> Self {
        Self {
            install: true,
            remote: true,
            ci: true,
            analysis: true,
        }
    }
}

/// A pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// README, LICENSE and composer.json rendering.
    Templates,
    /// `composer install`.
    Install,
    /// Quality-tooling configuration copying.
    QualityConfig,
    /// Git initialisation and GitHub repository creation.
    Remote,
    /// Travis CI activation.
    Ci,
    /// Scrutinizer registration.
    Analysis,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Templates => "templates",
            Self::Install => "composer install",
            Self::QualityConfig => "quality configuration",
            Self::Remote => "github repository",
            Self::Ci => "travis",
            Self::Analysis => "scrutinizer",
        })
    }
}

/// External collaborators used by the pipeline.
pub struct Services<'a> {
    /// Runs `git`, `hub`, `composer` and `travis`.
    pub executor: &'a dyn CommandExecutor,
    /// Registers the repository with Scrutinizer.
    pub registrar: &'a dyn AnalysisRegistrar,
}

/// Everything resolved about the project before any stage runs.
#[derive(Debug, Clone)]
pub struct Project {
    dir: Utf8PathBuf,
    config: BootstrapConfig,
    identity: ProjectIdentity,
    author: Option<AuthorInfo>,
}

impl Project {
    /// Reads the environment and global git configuration for `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if `PACKAGIST_VENDOR` is unset or `dir` has no name.
    pub fn resolve(
        env: &dyn Environment,
        executor: &dyn CommandExecutor,
        dir: &Utf8Path,
    ) -> Result<Self> {
        let config = BootstrapConfig::from_env(env)?;
        let identity = ProjectIdentity::resolve(&config, dir)?;
        let author = lookup_author(executor);
        debug!("resolved {} (author: {author:?})", identity.library());

        Ok(Self {
            dir: dir.to_owned(),
            config,
            identity,
            author,
        })
    }

    /// Project directory.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Configuration read from the environment.
    #[must_use]
    pub const fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Derived names.
    #[must_use]
    pub const fn identity(&self) -> &ProjectIdentity {
        &self.identity
    }

    /// Author from the global git configuration.
    #[must_use]
    pub const fn author(&self) -> Option<&AuthorInfo> {
        self.author.as_ref()
    }

    /// Text substituted for `{{author}}`.
    #[must_use]
    pub fn author_description(&self) -> String {
        author_description(self.author.as_ref(), self.identity.vendor())
    }
}

/// Outcome of a completed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Stages that ran.
    pub completed: Vec<Stage>,
    /// Stages skipped by flags or guards.
    pub skipped: Vec<Stage>,
    /// Warnings shown to the user.
    pub warnings: Vec<String>,
}

impl RunSummary {
    fn warn(&mut self, reporter: &mut Reporter<'_>, message: &str) {
        reporter.warning(message);
        self.warnings.push(message.to_owned());
    }
}

/// The current calendar year in local time.
#[must_use]
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Renders README, LICENSE and composer.json, in that order.
///
/// # Errors
///
/// Returns an error if any template is missing or cannot be rewritten.
/// Files rendered before the failure are left in place.
pub fn render_templates(project: &Project, year: i32) -> Result<Vec<Utf8PathBuf>> {
    let substitutions = SubstitutionMap::new(project.identity(), &project.author_description(), year);

    Ok(vec![
        render_file(project.dir(), &README_TEMPLATE, &substitutions)?,
        render_file(project.dir(), &LICENSE_TEMPLATE, &substitutions)?,
        render_manifest(project.dir(), project.identity(), project.author())?,
    ])
}

/// Runs every selected stage against `project`.
///
/// # Errors
///
/// Returns an error from template rendering, config copying or repository
/// provisioning. Install, CI and analysis failures never abort the run.
pub fn run_pipeline(
    project: &Project,
    services: &Services<'_>,
    stages: &StageSelection,
    year: i32,
    reporter: &mut Reporter<'_>,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    reporter.progress("Rendering templates...");
    render_templates(project, year)?;
    summary.completed.push(Stage::Templates);

    if stages.install {
        reporter.progress("Installing dependencies...");
        match install_dependencies(services.executor) {
            InstallOutcome::Installed => {}
            outcome => debug!("continuing after composer install: {outcome:?}"),
        }
        summary.completed.push(Stage::Install);
    } else {
        summary.skipped.push(Stage::Install);
    }

    reporter.progress("Copying quality configuration...");
    ConfigCopier::new(project.dir()).copy_all()?;
    summary.completed.push(Stage::QualityConfig);

    run_remote_stage(project, services, stages, reporter, &mut summary)?;
    run_ci_stage(services, stages, reporter, &mut summary);
    run_analysis_stage(project, services, stages, reporter, &mut summary);

    Ok(summary)
}

fn run_remote_stage(
    project: &Project,
    services: &Services<'_>,
    stages: &StageSelection,
    reporter: &mut Reporter<'_>,
    summary: &mut RunSummary,
) -> Result<()> {
    if !stages.remote {
        summary.skipped.push(Stage::Remote);
        return Ok(());
    }

    reporter.progress(format!(
        "Creating GitHub repository {}...",
        project.identity().repo_slug()
    ));
    match provision_repository(services.executor, project.dir(), project.identity())? {
        ProvisionOutcome::Created => summary.completed.push(Stage::Remote),
        ProvisionOutcome::AlreadyInitialized => {
            reporter.progress("Git repository already initialised; skipping.");
            summary.skipped.push(Stage::Remote);
        }
    }
    Ok(())
}

fn run_ci_stage(
    services: &Services<'_>,
    stages: &StageSelection,
    reporter: &mut Reporter<'_>,
    summary: &mut RunSummary,
) {
    if !stages.ci {
        summary.skipped.push(Stage::Ci);
        return;
    }

    reporter.progress("Enabling Travis CI...");
    match enable_travis(services.executor) {
        Ok(()) => summary.completed.push(Stage::Ci),
        Err(err) => {
            warn!("{err}");
            summary.warn(reporter, TRAVIS_WARNING);
        }
    }
}

fn run_analysis_stage(
    project: &Project,
    services: &Services<'_>,
    stages: &StageSelection,
    reporter: &mut Reporter<'_>,
    summary: &mut RunSummary,
) {
    if !stages.analysis {
        summary.skipped.push(Stage::Analysis);
        return;
    }

    reporter.progress("Registering with Scrutinizer...");
    match register_repository(
        services.registrar,
        &project.config().scrutinizer,
        project.identity().library(),
    ) {
        RegistrationOutcome::Registered => summary.completed.push(Stage::Analysis),
        RegistrationOutcome::Skipped => {
            summary.skipped.push(Stage::Analysis);
            summary.warn(reporter, SCRUTINIZER_SKIP_WARNING);
        }
        RegistrationOutcome::Failed(err) => {
            warn!("{err}");
            summary.warn(reporter, SCRUTINIZER_WARNING);
        }
    }
}

/// Prints what a run would do without doing it.
pub fn print_plan(project: &Project, stages: &StageSelection, reporter: &mut Reporter<'_>) {
    let author = project.author_description();
    let info = DryRunInfo {
        project_dir: project.dir(),
        identity: project.identity(),
        author: &author,
        stages,
        analysis_configured: project.config().scrutinizer.access_token.is_some(),
    };

    for line in info.lines() {
        reporter.message(line);
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
