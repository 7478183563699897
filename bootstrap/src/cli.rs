//! CLI argument definitions for the library bootstrapper.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::pipeline::StageSelection;
use camino::Utf8PathBuf;
use clap::Parser;

/// Turn a freshly cloned PHP library skeleton into a named project.
#[derive(Parser, Debug, Clone)]
#[command(name = "library-bootstrap")]
#[command(version, about)]
#[command(long_about = concat!(
    "Turn a freshly cloned PHP library skeleton into a named project.\n\n",
    "The package name is taken from the project directory and the vendor from ",
    "PACKAGIST_VENDOR. README, LICENSE and composer.json are rendered from their ",
    "templates, dependencies are installed, quality-tooling configuration is ",
    "copied into place, and the project is published to GitHub and enabled on ",
    "Travis CI and Scrutinizer.",
))]
#[command(after_help = concat!(
    "ENVIRONMENT:\n",
    "  PACKAGIST_VENDOR            Package vendor (required)\n",
    "  GITHUB_REPO                 Repository slug [default: vendor/name]\n",
    "  SCRUTINIZER_ACCESS_TOKEN    Enables Scrutinizer registration\n",
    "  SCRUTINIZER_ORGANIZATION    Scrutinizer organisation\n",
    "  SCRUTINIZER_GLOBAL_CONFIG   Scrutinizer global configuration\n",
    "  RUST_LOG                    Diagnostic log filter\n\n",
    "EXAMPLES:\n",
    "  Bootstrap the current directory:\n",
    "    $ PACKAGIST_VENDOR=acme library-bootstrap\n\n",
    "  Render files only, without touching the network:\n",
    "    $ library-bootstrap --skip-install --skip-remote --skip-ci --skip-analysis\n\n",
    "  Preview the derived names:\n",
    "    $ library-bootstrap --dry-run",
))]
pub struct Cli {
    /// Project directory to bootstrap [default: current directory].
    #[arg(short = 'C', long, value_name = "DIR")]
    pub project_dir: Option<Utf8PathBuf>,

    /// Show the derived configuration and exit without changing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Skip `composer install`.
    #[arg(long)]
    pub skip_install: bool,

    /// Skip git initialisation and GitHub repository creation.
    #[arg(long)]
    pub skip_remote: bool,

    /// Skip enabling the project on Travis CI.
    #[arg(long)]
    pub skip_ci: bool,

    /// Skip Scrutinizer registration.
    #[arg(long)]
    pub skip_analysis: bool,

    /// Increase diagnostic log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (warnings and errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Default for Cli {
    /// Creates a `Cli` with every stage enabled and no directory override.
    ///
    /// # Examples
    ///
    /// ```
    /// use library_bootstrap::cli::Cli;
    ///
    /// let cli = Cli::default();
    /// assert!(!cli.dry_run);
    /// assert!(cli.project_dir.is_none());
    /// ```
    fn default() -> Self {
        Self {
            project_dir: None,
            dry_run: false,
            skip_install: false,
            skip_remote: false,
            skip_ci: false,
            skip_analysis: false,
            verbosity: 0,
            quiet: false,
        }
    }
}

impl Cli {
    /// Returns the stages enabled by the skip flags.
    #[must_use]
    pub const fn stages(&self) -> StageSelection {
        StageSelection {
            install: !self.skip_install,
            remote: !self.skip_remote,
            ci: !self.skip_ci,
            analysis: !self.skip_analysis,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
