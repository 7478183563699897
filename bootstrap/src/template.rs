//! Placeholder substitution for the README and LICENSE templates.
//!
//! Placeholders are literal `{{token}}` strings. Rendering is a single
//! left-to-right pass: substituted values are never scanned again, so a value
//! that happens to contain placeholder text is emitted verbatim.

use crate::error::{BootstrapError, Result};
use crate::identity::ProjectIdentity;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

const PLACEHOLDER_OPEN: &str = "{{";

/// A template file and the file it renders to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateFile {
    /// Template path relative to the project root.
    pub source: &'static str,
    /// Rendered path relative to the project root.
    pub destination: &'static str,
}

impl TemplateFile {
    /// Whether the template is rendered over itself.
    #[must_use]
    pub fn in_place(&self) -> bool {
        self.source == self.destination
    }
}

/// The README template.
pub const README_TEMPLATE: TemplateFile = TemplateFile {
    source: "README.md.dist",
    destination: "README.md",
};

/// The LICENSE template, rendered in place.
pub const LICENSE_TEMPLATE: TemplateFile = TemplateFile {
    source: "LICENSE",
    destination: "LICENSE",
};

/// Placeholder tokens mapped to their values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionMap {
    entries: Vec<(&'static str, String)>,
}

impl SubstitutionMap {
    /// Builds the placeholder map for a project.
    ///
    /// # Examples
    ///
    /// ```
    /// use library_bootstrap::identity::ProjectIdentity;
    /// use library_bootstrap::template::SubstitutionMap;
    ///
    /// let identity = ProjectIdentity::new("acme", "my-lib", None);
    /// let map = SubstitutionMap::new(&identity, "Jo <jo@example.com>", 2024);
    /// assert_eq!(map.render("# {{title}} ({{year}})"), "# My Lib (2024)");
    /// ```
    #[must_use]
    pub fn new(identity: &ProjectIdentity, author: &str, year: i32) -> Self {
        Self {
            entries: vec![
                ("{{library}}", identity.library().to_owned()),
                ("{{vendor}}", identity.vendor().to_owned()),
                ("{{name}}", identity.name().to_owned()),
                ("{{title}}", identity.title().to_owned()),
                ("{{author}}", author.to_owned()),
                ("{{year}}", year.to_string()),
            ],
        }
    }

    /// Replaces every known placeholder in `text`.
    ///
    /// Unknown `{{...}}` sequences are left untouched.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let mut rendered = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(start) = rest.find(PLACEHOLDER_OPEN) {
            let (before, candidate) = rest.split_at(start);
            rendered.push_str(before);

            let matched = self.entries.iter().find_map(|(token, value)| {
                candidate
                    .strip_prefix(token)
                    .map(|after| (value.as_str(), after))
            });

            match matched {
                Some((value, after)) => {
                    rendered.push_str(value);
                    rest = after;
                }
                None => {
                    rendered.push('{');
                    rest = candidate.get(1..).unwrap_or_default();
                }
            }
        }

        rendered.push_str(rest);
        rendered
    }
}

/// Renders `template` inside `project_dir`.
///
/// The source is removed afterwards unless it was rendered in place. Returns
/// the path of the rendered file.
///
/// # Errors
///
/// Returns an error if the template cannot be read, the output cannot be
/// written, or the template cannot be removed.
pub fn render_file(
    project_dir: &Utf8Path,
    template: &TemplateFile,
    substitutions: &SubstitutionMap,
) -> Result<Utf8PathBuf> {
    let source = project_dir.join(template.source);
    let destination = project_dir.join(template.destination);

    let text = fs::read_to_string(&source).map_err(|source_err| BootstrapError::TemplateRead {
        path: source.clone(),
        source: source_err,
    })?;

    fs::write(&destination, substitutions.render(&text)).map_err(|source_err| {
        BootstrapError::WriteFailed {
            path: destination.clone(),
            source: source_err,
        }
    })?;
    debug!("rendered {source} to {destination}");

    if !template.in_place() {
        fs::remove_file(&source).map_err(|source_err| BootstrapError::RemoveFailed {
            path: source.clone(),
            source: source_err,
        })?;
    }

    Ok(destination)
}
