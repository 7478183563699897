//! Library bootstrap core.
//!
//! This crate turns a freshly cloned PHP library skeleton into a named
//! project. It is used by the `library-bootstrap` CLI binary and can be
//! driven programmatically for testing.
//!
//! # Modules
//!
//! - [`analysis`] - Scrutinizer repository registration over HTTP
//! - [`ci`] - Travis CI activation
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Environment variable configuration
//! - [`deps`] - Process execution and `composer install`
//! - [`error`] - Error types and reporting classes
//! - [`git`] - Author lookup and GitHub repository provisioning
//! - [`identity`] - Package, title and namespace derivation
//! - [`logging`] - Diagnostic log subscriber setup
//! - [`manifest`] - `composer.json` rendering
//! - [`output`] - User-facing progress, warnings and errors
//! - [`pipeline`] - Stage orchestration
//! - [`quality`] - Quality-tooling configuration copying
//! - [`template`] - Placeholder substitution for README and LICENSE

pub mod analysis;
pub mod ci;
pub mod cli;
pub mod config;
pub mod deps;
pub mod error;
pub mod git;
pub mod identity;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod quality;
pub mod template;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
