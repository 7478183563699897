//! Quality-tooling configuration staging.
//!
//! `jasny/php-code-quality` ships `.dist` configuration for PHPStan,
//! PHPUnit, PHP_CodeSniffer, Travis and Scrutinizer. After `composer install`
//! those files are copied into the project root under their working names.

use crate::error::{BootstrapError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Installed location of the quality-tooling package, relative to the
/// project root.
pub const QUALITY_PACKAGE_DIR: &str = "vendor/jasny/php-code-quality";

/// A configuration file shipped by the quality-tooling package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigFile {
    /// File name inside the package directory.
    pub source: &'static str,
    /// File name in the project root.
    pub destination: &'static str,
}

/// Every configuration file copied into a new project.
pub const QUALITY_CONFIGS: &[ConfigFile] = &[
    ConfigFile {
        source: "phpstan.neon.dist",
        destination: "phpstan.neon",
    },
    ConfigFile {
        source: "phpunit.xml.dist",
        destination: "phpunit.xml.dist",
    },
    ConfigFile {
        source: "phpcs.xml.dist",
        destination: "phpcs.xml",
    },
    ConfigFile {
        source: "travis.yml.dist",
        destination: ".travis.yml",
    },
    ConfigFile {
        source: "scrutinizer.yml.dist",
        destination: ".scrutinizer.yml",
    },
];

/// Copies quality-tooling configuration into a project.
pub struct ConfigCopier {
    project_dir: Utf8PathBuf,
}

impl ConfigCopier {
    /// Create a copier for the given project directory.
    #[must_use]
    pub fn new(project_dir: &Utf8Path) -> Self {
        Self {
            project_dir: project_dir.to_owned(),
        }
    }

    /// Directory the configuration files are copied from.
    #[must_use]
    pub fn package_dir(&self) -> Utf8PathBuf {
        self.project_dir.join(QUALITY_PACKAGE_DIR)
    }

    /// Copy a single configuration file, overwriting any existing copy.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::ConfigCopy`] if the copy fails, including
    /// when the source does not exist.
    pub fn copy(&self, config: &ConfigFile) -> Result<Utf8PathBuf> {
        let from = self.package_dir().join(config.source);
        let to = self.project_dir.join(config.destination);

        fs::copy(&from, &to).map_err(|source| BootstrapError::ConfigCopy {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        debug!("copied {from} to {to}");

        Ok(to)
    }

    /// Copy every file in [`QUALITY_CONFIGS`], stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error if any copy fails.
    pub fn copy_all(&self) -> Result<Vec<Utf8PathBuf>> {
        QUALITY_CONFIGS.iter().map(|config| self.copy(config)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct TempProject {
        _temp: TempDir,
        path: Utf8PathBuf,
    }

    #[fixture]
    fn project() -> TempProject {
        let temp = TempDir::new().expect("failed to create temp dir");
        let path = Utf8PathBuf::try_from(temp.path().to_owned()).expect("non-UTF8 temp path");
        TempProject { _temp: temp, path }
    }

    fn install_package(project: &Utf8Path) {
        let package = project.join(QUALITY_PACKAGE_DIR);
        fs::create_dir_all(&package).expect("create package dir");
        for config in QUALITY_CONFIGS {
            fs::write(package.join(config.source), config.source).expect("write config");
        }
    }

    #[rstest]
    fn copy_all_places_every_config_in_project_root(project: TempProject) {
        install_package(&project.path);

        let copied = ConfigCopier::new(&project.path)
            .copy_all()
            .expect("copy configs");

        assert_eq!(copied.len(), QUALITY_CONFIGS.len());
        for config in QUALITY_CONFIGS {
            let text = fs::read_to_string(project.path.join(config.destination))
                .expect("copied config exists");
            assert_eq!(text, config.source);
        }
    }

    #[rstest]
    fn copy_overwrites_existing_destination(project: TempProject) {
        install_package(&project.path);
        fs::write(project.path.join("phpcs.xml"), "old").expect("write stale config");

        let config = QUALITY_CONFIGS
            .iter()
            .find(|c| c.destination == "phpcs.xml")
            .expect("phpcs config is listed");
        ConfigCopier::new(&project.path)
            .copy(config)
            .expect("copy config");

        let text = fs::read_to_string(project.path.join("phpcs.xml")).expect("read config");
        assert_eq!(text, "phpcs.xml.dist");
    }

    #[rstest]
    fn copy_all_fails_when_package_is_missing(project: TempProject) {
        let err = ConfigCopier::new(&project.path)
            .copy_all()
            .expect_err("package is not installed");

        match err {
            BootstrapError::ConfigCopy { from, to, .. } => {
                assert!(from.ends_with("phpstan.neon.dist"));
                assert!(to.ends_with("phpstan.neon"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
