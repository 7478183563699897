//! Error types for the library bootstrap CLI.
//!
//! Errors fall into two user-visible classes. Operational errors (a missing
//! vendor variable, a failed GitHub provisioning step) are expected in normal
//! use and are reported with their message only. Every other error is
//! reported together with its chain of underlying causes.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can abort the bootstrap process.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// A required environment variable is unset or empty.
    #[error("'{name}' environment variable not set")]
    MissingEnvironment {
        /// Name of the missing variable.
        name: &'static str,
    },

    /// An environment variable holds a value that is not valid UTF-8.
    #[error("'{name}' environment variable is not valid UTF-8")]
    InvalidEnvironment {
        /// Name of the offending variable.
        name: String,
    },

    /// The project directory cannot be used to derive a package name.
    #[error("invalid project directory {path}: {reason}")]
    InvalidProjectDirectory {
        /// The offending directory.
        path: String,
        /// Why the directory was rejected.
        reason: String,
    },

    /// A template file could not be read.
    #[error("failed to read template {path}")]
    TemplateRead {
        /// Path of the template.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A rendered file could not be written.
    #[error("failed to write {path}")]
    WriteFailed {
        /// Destination path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A consumed template could not be removed.
    #[error("failed to remove template {path}")]
    RemoveFailed {
        /// Path of the template.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The manifest template is not valid JSON.
    #[error("invalid manifest template {path}")]
    ManifestParse {
        /// Path of the manifest template.
        path: Utf8PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The manifest template parsed, but its top level is not an object.
    #[error("manifest template {path} must contain a JSON object")]
    ManifestShape {
        /// Path of the manifest template.
        path: Utf8PathBuf,
    },

    /// The manifest could not be serialised.
    #[error("failed to serialise manifest")]
    ManifestSerialise(#[source] serde_json::Error),

    /// A quality-tooling configuration file could not be copied.
    #[error("failed to copy {from} to {to}")]
    ConfigCopy {
        /// Source path inside the installed dependency tree.
        from: Utf8PathBuf,
        /// Destination path in the project root.
        to: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Creating the GitHub repository failed at the given step.
    #[error("Failed to create github repo at `{step}` (is hub installed?)")]
    RepositoryCreation {
        /// The command line of the failing step.
        step: String,
    },

    /// Enabling the project on the CI provider failed.
    #[error("travis enable failed: {reason}")]
    CiEnable {
        /// Description of the failure.
        reason: String,
    },

    /// The log subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),

    /// An I/O operation failed.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// Test stub received an unexpected or mismatched command invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

impl BootstrapError {
    /// Returns `true` for errors that are reported by message alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use library_bootstrap::error::BootstrapError;
    ///
    /// let err = BootstrapError::MissingEnvironment { name: "PACKAGIST_VENDOR" };
    /// assert!(err.is_operational());
    /// ```
    #[must_use]
    pub const fn is_operational(&self) -> bool {
        matches!(
            self,
            Self::MissingEnvironment { .. }
                | Self::InvalidEnvironment { .. }
                | Self::RepositoryCreation { .. }
        )
    }
}

/// Result type alias using [`BootstrapError`].
pub type Result<T> = std::result::Result<T, BootstrapError>;
