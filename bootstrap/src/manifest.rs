//! Composer manifest rendering.
//!
//! The manifest template is kept as a JSON object so that keys this crate
//! does not manage survive untouched and in their original order.

use crate::error::{BootstrapError, Result};
use crate::identity::{AuthorInfo, ProjectIdentity};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;

/// Manifest template path relative to the project root.
pub const MANIFEST_TEMPLATE: &str = "composer.json.dist";
/// Rendered manifest path relative to the project root.
pub const MANIFEST_FILE: &str = "composer.json";
/// Directory mapped to the library namespace.
pub const SOURCE_DIR: &str = "src/";
/// Directory mapped to the test namespace.
pub const TESTS_DIR: &str = "tests/";

const AUTOLOAD_STANDARD: &str = "psr-4";

/// A parsed Composer manifest.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDocument {
    root: Map<String, Value>,
}

impl ManifestDocument {
    /// Parses manifest text; `path` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or its top level is not an
    /// object.
    pub fn parse(text: &str, path: &Utf8Path) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|source| BootstrapError::ManifestParse {
                path: path.to_owned(),
                source,
            })?;

        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(BootstrapError::ManifestShape {
                path: path.to_owned(),
            }),
        }
    }

    /// Sets the package name.
    pub fn set_name(&mut self, name: &str) {
        self.root.insert("name".to_owned(), Value::from(name));
    }

    /// Sets the package description.
    pub fn set_description(&mut self, description: &str) {
        self.root
            .insert("description".to_owned(), Value::from(description));
    }

    /// Points the support links at the GitHub repository `repo_slug`.
    pub fn set_support(&mut self, repo_slug: &str) {
        edit_object(&mut self.root, "support", |support| {
            support.insert(
                "issues".to_owned(),
                Value::from(format!("https://github.com/{repo_slug}/issues")),
            );
            support.insert(
                "source".to_owned(),
                Value::from(format!("https://github.com/{repo_slug}")),
            );
        });
    }

    /// Maps `namespace` to `dir` under `section` (`autoload` or `autoload-dev`).
    pub fn add_autoload(&mut self, section: &str, namespace: &str, dir: &str) {
        edit_object(&mut self.root, section, |container| {
            edit_object(container, AUTOLOAD_STANDARD, |mappings| {
                mappings.insert(namespace.to_owned(), Value::from(dir));
            });
        });
    }

    /// Appends an author record.
    ///
    /// # Errors
    ///
    /// Returns an error if the author cannot be converted to JSON.
    pub fn push_author(&mut self, author: &AuthorInfo) -> Result<()> {
        let record = serde_json::to_value(author).map_err(BootstrapError::ManifestSerialise)?;
        let slot = self
            .root
            .entry("authors")
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(authors) = slot {
            authors.push(record);
        }
        Ok(())
    }

    /// Applies the project identity and author to the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the author record cannot be serialised.
    pub fn apply(&mut self, identity: &ProjectIdentity, author: Option<&AuthorInfo>) -> Result<()> {
        self.set_name(identity.library());
        self.set_description(identity.title());
        self.set_support(identity.repo_slug());
        self.add_autoload("autoload", identity.namespace(), SOURCE_DIR);
        self.add_autoload("autoload-dev", &identity.test_namespace(), TESTS_DIR);
        if let Some(author) = author {
            self.push_author(author)?;
        }
        Ok(())
    }

    /// Serialises the manifest with four-space indentation and unescaped
    /// slashes, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation fails.
    pub fn to_pretty_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        self.root
            .serialize(&mut serializer)
            .map_err(BootstrapError::ManifestSerialise)?;
        buffer.push(b'\n');

        String::from_utf8(buffer).map_err(|err| {
            BootstrapError::ManifestSerialise(serde::ser::Error::custom(err.to_string()))
        })
    }
}

/// Runs `edit` on the object stored under `key`.
///
/// A missing or non-object value is replaced by an empty object. The entry
/// keeps its position in the document.
fn edit_object(map: &mut Map<String, Value>, key: &str, edit: impl FnOnce(&mut Map<String, Value>)) {
    let slot = map.entry(key).or_insert(Value::Null);
    let mut object = match std::mem::take(slot) {
        Value::Object(object) => object,
        _ => Map::new(),
    };
    edit(&mut object);
    *slot = Value::Object(object);
}

/// Renders `composer.json.dist` into `composer.json` and removes the template.
///
/// # Errors
///
/// Returns an error if the template is missing or invalid, or if the
/// manifest cannot be written or the template removed.
pub fn render_manifest(
    project_dir: &Utf8Path,
    identity: &ProjectIdentity,
    author: Option<&AuthorInfo>,
) -> Result<Utf8PathBuf> {
    let source = project_dir.join(MANIFEST_TEMPLATE);
    let destination = project_dir.join(MANIFEST_FILE);

    let text = fs::read_to_string(&source).map_err(|source_err| BootstrapError::TemplateRead {
        path: source.clone(),
        source: source_err,
    })?;

    let mut manifest = ManifestDocument::parse(&text, &source)?;
    manifest.apply(identity, author)?;

    fs::write(&destination, manifest.to_pretty_string()?).map_err(|source_err| {
        BootstrapError::WriteFailed {
            path: destination.clone(),
            source: source_err,
        }
    })?;
    fs::remove_file(&source).map_err(|source_err| BootstrapError::RemoveFailed {
        path: source.clone(),
        source: source_err,
    })?;
    debug!("rendered {source} to {destination}");

    Ok(destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    const TEMPLATE: &str = r#"{
    "name": "jasny/library-template",
    "description": "template",
    "type": "library",
    "license": "MIT",
    "require": {
        "php": ">=7.4"
    },
    "require-dev": {
        "jasny/php-code-quality": "^2.6"
    }
}"#;

    fn template_path() -> &'static Utf8Path {
        Utf8Path::new("composer.json.dist")
    }

    #[fixture]
    fn identity() -> ProjectIdentity {
        ProjectIdentity::new("acme", "my-lib", Some("acme/php-my-lib"))
    }

    fn to_value(manifest: &ManifestDocument) -> Value {
        let text = manifest.to_pretty_string().expect("serialise");
        serde_json::from_str(&text).expect("rendered manifest is JSON")
    }

    fn rendered(identity: &ProjectIdentity, author: Option<&AuthorInfo>) -> Value {
        let mut manifest = ManifestDocument::parse(TEMPLATE, template_path()).expect("parse");
        manifest.apply(identity, author).expect("apply");
        to_value(&manifest)
    }

    #[rstest]
    fn apply_sets_identity_fields(identity: ProjectIdentity) {
        let value = rendered(&identity, None);

        assert_eq!(value["name"], "acme/my-lib");
        assert_eq!(value["description"], "My Lib");
        assert_eq!(
            value["support"]["issues"],
            "https://github.com/acme/php-my-lib/issues"
        );
        assert_eq!(value["support"]["source"], "https://github.com/acme/php-my-lib");
        assert_eq!(value["autoload"]["psr-4"]["Acme\\MyLib\\"], "src/");
        assert_eq!(value["autoload-dev"]["psr-4"]["Acme\\MyLib\\Tests\\"], "tests/");
        assert!(value.get("authors").is_none());
    }

    #[rstest]
    fn apply_appends_author(identity: ProjectIdentity) {
        let mut manifest = ManifestDocument::parse(
            r#"{"authors": [{"name": "Template Author"}]}"#,
            template_path(),
        )
        .expect("parse");
        let author = AuthorInfo::from_parts(None, Some("jo@example.com".to_owned()), None);

        manifest.apply(&identity, author.as_ref()).expect("apply");

        assert_eq!(
            to_value(&manifest)["authors"],
            json!([{"name": "Template Author"}, {"email": "jo@example.com"}])
        );
    }

    #[rstest]
    fn apply_preserves_existing_keys_in_order(identity: ProjectIdentity) {
        let value = rendered(&identity, None);

        let keys: Vec<_> = value
            .as_object()
            .expect("manifest is an object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            [
                "name",
                "description",
                "type",
                "license",
                "require",
                "require-dev",
                "support",
                "autoload",
                "autoload-dev"
            ]
        );
    }

    #[rstest]
    fn apply_replaces_non_object_sections(identity: ProjectIdentity) {
        let mut manifest =
            ManifestDocument::parse(r#"{"support": "none", "autoload": []}"#, template_path())
                .expect("parse");
        manifest.apply(&identity, None).expect("apply");

        assert_eq!(
            to_value(&manifest)["autoload"],
            json!({"psr-4": {"Acme\\MyLib\\": "src/"}})
        );
    }

    #[test]
    fn pretty_output_keeps_slashes_and_four_space_indent() {
        let manifest =
            ManifestDocument::parse(r#"{"homepage": "https://example.com/a"}"#, template_path())
                .expect("parse");
        let text = manifest.to_pretty_string().expect("serialise");
        assert_eq!(text, "{\n    \"homepage\": \"https://example.com/a\"\n}\n");
    }

    #[rstest]
    #[case::not_json("{", "invalid manifest template")]
    #[case::not_object("[1, 2]", "must contain a JSON object")]
    fn parse_rejects_bad_templates(#[case] text: &str, #[case] message: &str) {
        let err = ManifestDocument::parse(text, template_path()).expect_err("should fail");
        assert!(err.to_string().contains(message), "unexpected error: {err}");
    }

    #[rstest]
    fn render_manifest_writes_file_and_removes_template(identity: ProjectIdentity) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = Utf8PathBuf::try_from(temp.path().to_owned()).expect("non-UTF8 temp path");
        fs::write(dir.join(MANIFEST_TEMPLATE), TEMPLATE).expect("write template");

        let path = render_manifest(&dir, &identity, None).expect("render manifest");

        assert_eq!(path, dir.join(MANIFEST_FILE));
        assert!(!dir.join(MANIFEST_TEMPLATE).exists());
        let value: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("JSON");
        assert_eq!(value["name"], "acme/my-lib");
    }

    #[rstest]
    fn render_manifest_fails_without_template(identity: ProjectIdentity) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = Utf8PathBuf::try_from(temp.path().to_owned()).expect("non-UTF8 temp path");

        let err = render_manifest(&dir, &identity, None).expect_err("template is missing");

        let BootstrapError::TemplateRead { path, .. } = &err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(*path, dir.join(MANIFEST_TEMPLATE));
        assert!(!dir.join(MANIFEST_FILE).exists());
    }

    #[rstest]
    fn render_manifest_replaces_non_array_authors(identity: ProjectIdentity) {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dir = Utf8PathBuf::try_from(temp.path().to_owned()).expect("non-UTF8 temp path");
        fs::write(dir.join(MANIFEST_TEMPLATE), r#"{"authors": "Template Author"}"#)
            .expect("write template");
        let author = AuthorInfo::from_parts(
            Some("Jo".to_owned()),
            Some("jo@example.com".to_owned()),
            None,
        );

        let path = render_manifest(&dir, &identity, author.as_ref()).expect("render manifest");

        let value: Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("JSON");
        assert_eq!(value["authors"], json!([{"name": "Jo", "email": "jo@example.com"}]));
    }
}
