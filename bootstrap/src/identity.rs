//! Project identity and author resolution.
//!
//! The identity of a new package is derived from the vendor, the project
//! directory name and an optional repository override. Author details come
//! from the global git configuration (see [`crate::git::lookup_author`]).

use crate::config::BootstrapConfig;
use crate::error::{BootstrapError, Result};
use camino::Utf8Path;
use serde::Serialize;
use std::fmt;

/// Separator between words in vendor and package names.
const WORD_SEPARATOR: char = '-';

/// PHP namespace separator.
const NAMESPACE_SEPARATOR: char = '\\';

/// Identity of the package being bootstrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectIdentity {
    vendor: String,
    name: String,
    library: String,
    title: String,
    namespace: String,
    repo_slug: String,
}

impl ProjectIdentity {
    /// Derives the identity from its inputs.
    ///
    /// # Examples
    ///
    /// ```
    /// use library_bootstrap::identity::ProjectIdentity;
    ///
    /// let identity = ProjectIdentity::new("acme", "my-lib", None);
    /// assert_eq!(identity.library(), "acme/my-lib");
    /// assert_eq!(identity.title(), "My Lib");
    /// assert_eq!(identity.namespace(), "Acme\\MyLib\\");
    /// assert_eq!(identity.repo_slug(), "acme/my-lib");
    /// ```
    #[must_use]
    pub fn new(vendor: &str, name: &str, repo_override: Option<&str>) -> Self {
        let library = format!("{vendor}/{name}");
        let namespace = format!(
            "{}{NAMESPACE_SEPARATOR}{}{NAMESPACE_SEPARATOR}",
            namespace_segment(vendor),
            namespace_segment(name),
        );
        let repo_slug = repo_override.map_or_else(|| library.clone(), ToOwned::to_owned);

        Self {
            vendor: vendor.to_owned(),
            name: name.to_owned(),
            title: humanize(name, " "),
            library,
            namespace,
            repo_slug,
        }
    }

    /// Resolves the identity for `project_dir` using the configured vendor.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::InvalidProjectDirectory`] when the directory
    /// has no final path segment (for example the filesystem root).
    pub fn resolve(config: &BootstrapConfig, project_dir: &Utf8Path) -> Result<Self> {
        let name = project_dir
            .file_name()
            .ok_or_else(|| BootstrapError::InvalidProjectDirectory {
                path: project_dir.to_string(),
                reason: "the directory has no name to use as the package name".to_owned(),
            })?;

        Ok(Self::new(&config.vendor, name, config.github_repo.as_deref()))
    }

    /// Package vendor.
    #[must_use]
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// Package name (the project directory name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library identifier, `vendor/name`.
    #[must_use]
    pub fn library(&self) -> &str {
        &self.library
    }

    /// Human-readable title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// PSR-4 namespace prefix, including the trailing separator.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Namespace prefix for the test suite.
    #[must_use]
    pub fn test_namespace(&self) -> String {
        format!("{}Tests{NAMESPACE_SEPARATOR}", self.namespace)
    }

    /// GitHub repository slug, `owner/repo`.
    #[must_use]
    pub fn repo_slug(&self) -> &str {
        &self.repo_slug
    }
}

/// Capitalises each `-`-separated word of `text` and joins them with `glue`.
///
/// Only the first character of each word changes; the rest is kept as is.
/// Empty words from doubled, leading or trailing hyphens are dropped.
///
/// # Examples
///
/// ```
/// use library_bootstrap::identity::humanize;
///
/// assert_eq!(humanize("my-lib", " "), "My Lib");
/// assert_eq!(humanize("my-lib", ""), "MyLib");
/// assert_eq!(humanize("phpUnit-x", " "), "PhpUnit X");
/// assert_eq!(humanize("my--lib-", " "), "My Lib");
/// ```
#[must_use]
pub fn humanize(text: &str, glue: &str) -> String {
    text.split(WORD_SEPARATOR)
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(glue)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Converts a vendor or package name into a valid PHP namespace segment.
///
/// Characters PHP does not allow in identifiers are dropped and a leading
/// digit is prefixed with an underscore.
fn namespace_segment(text: &str) -> String {
    let segment: String = humanize(text, "")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || !c.is_ascii())
        .collect();

    match segment.chars().next() {
        Some(first) if first.is_ascii_digit() => format!("_{segment}"),
        Some(_) => segment,
        None => "_".to_owned(),
    }
}

/// Author details taken from the global git configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorInfo {
    /// Author name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Author email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Author homepage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

impl AuthorInfo {
    /// Builds an author record, or `None` when every field is absent.
    ///
    /// Empty strings count as absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use library_bootstrap::identity::AuthorInfo;
    ///
    /// assert!(AuthorInfo::from_parts(None, Some(String::new()), None).is_none());
    /// let author = AuthorInfo::from_parts(None, Some("jo@example.com".to_owned()), None);
    /// assert!(author.is_some());
    /// ```
    #[must_use]
    pub fn from_parts(
        name: Option<String>,
        email: Option<String>,
        homepage: Option<String>,
    ) -> Option<Self> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());
        let author = Self {
            name: non_empty(name),
            email: non_empty(email),
            homepage: non_empty(homepage),
        };

        (author != Self::default()).then_some(author)
    }
}

impl fmt::Display for AuthorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.email, &self.homepage) {
            (Some(name), Some(email), _) => write!(f, "{name} <{email}>"),
            (Some(name), None, _) => f.write_str(name),
            (None, Some(email), _) => f.write_str(email),
            (None, None, Some(homepage)) => f.write_str(homepage),
            (None, None, None) => Ok(()),
        }
    }
}

/// Describes the author for the `{{author}}` placeholder.
///
/// Falls back to the vendor when no author details are configured.
///
/// # Examples
///
/// ```
/// use library_bootstrap::identity::{AuthorInfo, author_description};
///
/// let author = AuthorInfo::from_parts(Some("Jo".to_owned()), Some("jo@example.com".to_owned()), None);
/// assert_eq!(author_description(author.as_ref(), "acme"), "Jo <jo@example.com>");
/// assert_eq!(author_description(None, "acme"), "acme");
/// ```
#[must_use]
pub fn author_description(author: Option<&AuthorInfo>, vendor: &str) -> String {
    author.map_or_else(|| vendor.to_owned(), ToString::to_string)
}
