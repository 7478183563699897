//! Environment-driven configuration.
//!
//! All environment variables are read once, up front, into a
//! [`BootstrapConfig`]. Lookups go through the [`Environment`] trait so that
//! callers can substitute an in-memory source.

use crate::error::{BootstrapError, Result};
use std::env::VarError;

/// Vendor segment of the package identifier. Required.
pub const VENDOR_VAR: &str = "PACKAGIST_VENDOR";
/// Overrides the GitHub repository slug.
pub const GITHUB_REPO_VAR: &str = "GITHUB_REPO";
/// Access token that enables Scrutinizer registration.
pub const SCRUTINIZER_TOKEN_VAR: &str = "SCRUTINIZER_ACCESS_TOKEN";
/// Scrutinizer organisation that should own the repository.
pub const SCRUTINIZER_ORGANIZATION_VAR: &str = "SCRUTINIZER_ORGANIZATION";
/// Scrutinizer global configuration to attach to the repository.
pub const SCRUTINIZER_GLOBAL_CONFIG_VAR: &str = "SCRUTINIZER_GLOBAL_CONFIG";

/// Source of environment variables.
pub trait Environment {
    /// Returns the value of `key`, or `None` when it is unset or empty.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::InvalidEnvironment`] when the value is not
    /// valid UTF-8.
    fn var(&self, key: &str) -> Result<Option<String>>;
}

/// Reads variables from the process environment.
///
/// # Examples
///
/// ```
/// use library_bootstrap::config::{Environment, SystemEnvironment};
///
/// let env = SystemEnvironment;
/// assert_eq!(env.var("LIBRARY_BOOTSTRAP_SURELY_UNSET")?, None);
/// # Ok::<(), library_bootstrap::error::BootstrapError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, key: &str) -> Result<Option<String>> {
        match std::env::var(key) {
            Ok(value) => Ok(Some(value).filter(|value| !value.is_empty())),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(BootstrapError::InvalidEnvironment {
                name: key.to_owned(),
            }),
        }
    }
}

/// Scrutinizer registration settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrutinizerSettings {
    /// API access token; registration is skipped without it.
    pub access_token: Option<String>,
    /// Optional owning organisation.
    pub organization: Option<String>,
    /// Optional global configuration name.
    pub global_config: Option<String>,
}

/// Configuration gathered from the environment at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    /// Package vendor.
    pub vendor: String,
    /// Repository slug override.
    pub github_repo: Option<String>,
    /// Scrutinizer settings.
    pub scrutinizer: ScrutinizerSettings,
}

impl BootstrapConfig {
    /// Reads every supported variable from `env`.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::MissingEnvironment`] when `PACKAGIST_VENDOR`
    /// is unset or empty, and [`BootstrapError::InvalidEnvironment`] when any
    /// supported variable is not valid UTF-8.
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        let vendor = env
            .var(VENDOR_VAR)?
            .ok_or(BootstrapError::MissingEnvironment { name: VENDOR_VAR })?;

        Ok(Self {
            vendor,
            github_repo: env.var(GITHUB_REPO_VAR)?,
            scrutinizer: ScrutinizerSettings {
                access_token: env.var(SCRUTINIZER_TOKEN_VAR)?,
                organization: env.var(SCRUTINIZER_ORGANIZATION_VAR)?,
                global_config: env.var(SCRUTINIZER_GLOBAL_CONFIG_VAR)?,
            },
        })
    }
}
