//! Dependency catalog loaded from the `[metadata]` table of a TOML document.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Dependency, PaktError, Result};

/// Catalog metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Catalog {
    /// Constraint to use per dependency id when the caller gives none
    #[serde(default)]
    pub default_versions: BTreeMap<String, String>,

    #[serde(default)]
    pub dependencies: Vec<Dependency>,

    /// Files to include when packaging
    #[serde(default)]
    pub include_files: Vec<String>,

    /// Command to run before packaging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_package: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    metadata: Option<Catalog>,
}

impl Catalog {
    /// Parse a TOML document carrying a `[metadata]` table
    ///
    /// A document without `[metadata]` is an empty catalog.
    pub fn parse(content: &str) -> Result<Self> {
        let document: CatalogDocument = toml::from_str(content)?;
        let catalog = document.metadata.unwrap_or_default();

        for dependency in &catalog.dependencies {
            dependency.validate().map_err(|e| {
                PaktError::InvalidCatalog(format!("dependency {}: {}", dependency, e))
            })?;
        }

        log::debug!(
            "Loaded catalog with {} dependencies",
            catalog.dependencies.len()
        );

        Ok(catalog)
    }

    /// Load a catalog file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|e| PaktError::InvalidCatalog(format!("{}: {}", path.display(), e)))
    }

    /// Default constraint for a dependency id, or `""` (any version)
    pub fn default_version(&self, id: &str) -> &str {
        self.default_versions
            .get(id)
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
[buildpack]
id = "example/jvm"

[metadata]
include-files = ["bin/build", "buildpack.toml"]
pre-package = "scripts/build.sh"

[metadata.default-versions]
jdk = "11.*"

[[metadata.dependencies]]
id = "jdk"
name = "JDK"
version = "11.0.2"
uri = "https://example.com/jdk-11.0.2.tgz"
sha256 = "576dd8416de5619ea001d9662291d62444d1292a38e96956bc4651c01f14bca1"
stacks = ["stack-a", "stack-b"]

  [[metadata.dependencies.licenses]]
  type = "GPL-2.0 WITH Classpath-exception-2.0"
  uri = "https://openjdk.java.net/legal/gplv2+ce.html"

[[metadata.dependencies]]
id = "jdk"
version = "8.0.222"
uri = "https://example.com/jdk-8.0.222.tgz"
stacks = ["stack-a"]
"#;

    #[test]
    fn test_parse() {
        let catalog = Catalog::parse(CATALOG).unwrap();

        assert_eq!(catalog.dependencies.len(), 2);
        assert_eq!(catalog.include_files, vec!["bin/build", "buildpack.toml"]);
        assert_eq!(catalog.pre_package.as_deref(), Some("scripts/build.sh"));

        let jdk11 = &catalog.dependencies[0];
        assert_eq!(jdk11.name, "JDK");
        assert_eq!(jdk11.licenses.len(), 1);
        assert_eq!(jdk11.licenses[0].kind, "GPL-2.0 WITH Classpath-exception-2.0");
        assert!(jdk11.supports_stack("stack-b"));

        let jdk8 = &catalog.dependencies[1];
        assert_eq!(jdk8.name, "");
        assert_eq!(jdk8.sha256, None);
        assert!(jdk8.licenses.is_empty());
    }

    #[test]
    fn test_default_version() {
        let catalog = Catalog::parse(CATALOG).unwrap();
        assert_eq!(catalog.default_version("jdk"), "11.*");
        assert_eq!(catalog.default_version("jre"), "");
    }

    #[test]
    fn test_missing_metadata_is_empty() {
        let catalog = Catalog::parse("[buildpack]\nid = \"x\"\n").unwrap();
        assert!(catalog.dependencies.is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let result = Catalog::parse(
            r#"
[[metadata.dependencies]]
id = "jdk"
uri = "https://example.com/a.tgz"
"#,
        );
        assert!(matches!(result, Err(PaktError::TomlParse(_))));
    }

    #[test]
    fn test_unknown_license_key() {
        let result = Catalog::parse(
            r#"
[[metadata.dependencies]]
id = "jdk"
version = "1.0.0"
uri = "https://example.com/a.tgz"

  [[metadata.dependencies.licenses]]
  type = "MIT"
  url = "https://example.com/license"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_digest() {
        let result = Catalog::parse(
            r#"
[[metadata.dependencies]]
id = "jdk"
version = "1.0.0"
uri = "https://example.com/a.tgz"
sha256 = "not-a-digest"
"#,
        );
        assert!(matches!(result, Err(PaktError::InvalidCatalog(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("buildpack.toml");
        std::fs::write(&path, CATALOG).unwrap();

        let catalog = Catalog::from_file(&path).unwrap();
        assert_eq!(catalog.dependencies.len(), 2);

        let missing = Catalog::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(PaktError::Io(_))));
    }
}
