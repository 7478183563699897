//! Library bootstrap CLI entrypoint.
//!
//! This binary renders a PHP library skeleton's templates, installs its
//! dependencies and publishes it to GitHub, Travis CI and Scrutinizer.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use library_bootstrap::analysis::HttpRegistrar;
use library_bootstrap::cli::Cli;
use library_bootstrap::config::SystemEnvironment;
use library_bootstrap::deps::SystemCommandExecutor;
use library_bootstrap::error::{BootstrapError, Result};
use library_bootstrap::logging;
use library_bootstrap::output::{Reporter, success_message};
use library_bootstrap::pipeline::{Project, Services, current_year, print_plan, run_pipeline};
use std::io::{IsTerminal, Write};

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let color = stderr.is_terminal();
    let run_result = run(&cli, &mut stderr, color);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr, color);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write, color: bool) -> Result<()> {
    logging::init(cli.verbosity)?;

    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;
    let executor = SystemCommandExecutor::in_dir(project_dir.clone());
    let project = Project::resolve(&SystemEnvironment, &executor, &project_dir)?;
    let stages = cli.stages();
    let mut reporter = Reporter::new(stderr, cli.quiet, color);

    if cli.dry_run {
        print_plan(&project, &stages, &mut reporter);
        return Ok(());
    }

    let registrar = HttpRegistrar::default();
    let services = Services {
        executor: &executor,
        registrar: &registrar,
    };
    let summary = run_pipeline(&project, &services, &stages, current_year(), &mut reporter)?;

    reporter.progress("");
    reporter.progress(success_message(
        project.identity(),
        summary.warnings.len(),
    ));
    Ok(())
}

/// Resolves the project directory to an absolute UTF-8 path.
fn resolve_project_dir(requested: Option<&Utf8Path>) -> Result<Utf8PathBuf> {
    let path = match requested {
        Some(dir) => dir.as_std_path().to_path_buf(),
        None => std::env::current_dir()?,
    };

    let canonical =
        std::fs::canonicalize(&path).map_err(|err| BootstrapError::InvalidProjectDirectory {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

    if !canonical.is_dir() {
        return Err(BootstrapError::InvalidProjectDirectory {
            path: canonical.display().to_string(),
            reason: "not a directory".to_owned(),
        });
    }

    Utf8PathBuf::try_from(canonical).map_err(|err| BootstrapError::InvalidProjectDirectory {
        path: err.as_path().display().to_string(),
        reason: "path is not valid UTF-8".to_owned(),
    })
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write, color: bool) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            Reporter::new(stderr, false, color).error(&err);
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn exit_with(err: BootstrapError) -> (i32, String) {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr, false);
        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        (exit_code, text)
    }

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr, false);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn operational_error_prints_message_only() {
        let (exit_code, text) = exit_with(BootstrapError::MissingEnvironment {
            name: "PACKAGIST_VENDOR",
        });

        assert_eq!(exit_code, 1);
        assert_eq!(text, "\n'PACKAGIST_VENDOR' environment variable not set\n");
    }

    #[test]
    fn other_errors_print_their_cause() {
        let (exit_code, text) = exit_with(BootstrapError::Io(std::io::Error::other("disk full")));

        assert_eq!(exit_code, 1);
        assert!(text.contains("I/O error"));
        assert!(text.contains("caused by: disk full"));
    }

    #[test]
    fn resolve_project_dir_canonicalises_existing_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = Utf8Path::from_path(temp.path()).expect("non-UTF8 temp path");
        std::fs::create_dir(dir.join("my-lib")).expect("create project dir");

        let requested = dir.join("my-lib/../my-lib");
        let resolved =
            resolve_project_dir(Some(requested.as_path())).expect("directory should resolve");

        assert!(resolved.is_absolute());
        assert_eq!(resolved.file_name(), Some("my-lib"));
    }

    #[rstest]
    #[case::missing("does-not-exist")]
    #[case::file("README.md.dist")]
    fn resolve_project_dir_rejects_unusable_paths(#[case] entry: &str) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = Utf8Path::from_path(temp.path()).expect("non-UTF8 temp path");
        std::fs::write(dir.join("README.md.dist"), "").expect("write file");

        let requested = dir.join(entry);
        let err = resolve_project_dir(Some(requested.as_path())).expect_err("path is unusable");

        assert!(matches!(err, BootstrapError::InvalidProjectDirectory { .. }));
    }
}
