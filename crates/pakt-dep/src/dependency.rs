//! Dependency descriptor as found in a catalog and in cache sidecars.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{PaktError, Result};

/// A license attached to a dependency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct License {
    /// SPDX identifier or free-form license name
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub uri: String,
}

/// A downloadable dependency artifact
///
/// This is both the catalog entry and the sidecar written next to each
/// cached artifact, so the serialized form must round-trip exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependency {
    pub id: String,

    #[serde(default)]
    pub name: String,

    pub version: String,

    pub uri: String,

    /// Lowercase hex sha256 of the artifact; an empty string reads as absent
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub sha256: Option<String>,

    #[serde(default)]
    pub stacks: BTreeSet<String>,

    #[serde(default)]
    pub licenses: Vec<License>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

impl Dependency {
    /// Check the invariants that do not need a version parser
    pub fn validate(&self) -> Result<()> {
        if let Some(digest) = &self.sha256 {
            if !is_sha256_hex(digest) {
                return Err(PaktError::InvalidDigest {
                    digest: digest.clone(),
                });
            }
        }
        Ok(())
    }

    /// Check if this dependency is built for the given stack
    pub fn supports_stack(&self, stack: &str) -> bool {
        self.stacks.contains(stack)
    }

    /// File name the artifact is stored under: the last path segment of the URI
    pub fn artifact_name(&self) -> String {
        let from_url = url::Url::parse(&self.uri).ok().and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
                .filter(|s| !s.is_empty())
        });

        from_url
            .or_else(|| {
                self.uri
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "artifact".to_string())
    }
}

// Field by field so a sidecar only matches when every recorded attribute agrees
impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.version == other.version
            && self.uri == other.uri
            && self.sha256 == other.sha256
            && self.stacks == other.stacks
            && self.licenses == other.licenses
    }
}

impl Eq for Dependency {}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// Check for exactly 64 lowercase hex characters
pub fn is_sha256_hex(digest: &str) -> bool {
    digest.len() == 64
        && digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Render a catalog for error messages
pub fn format_dependencies(dependencies: &[Dependency]) -> String {
    let entries: Vec<String> = dependencies
        .iter()
        .map(|d| {
            let stacks: Vec<&str> = d.stacks.iter().map(String::as_str).collect();
            format!("{} {} (stacks: {})", d.id, d.version, stacks.join(", "))
        })
        .collect();

    format!("[{}]", entries.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "576dd8416de5619ea001d9662291d62444d1292a38e96956bc4651c01f14bca1";

    fn dependency() -> Dependency {
        Dependency {
            id: "jdk".to_string(),
            name: "JDK".to_string(),
            version: "11.0.2".to_string(),
            uri: "https://example.com/jdk/jdk-11.0.2.tgz".to_string(),
            sha256: Some(DIGEST.to_string()),
            stacks: ["stack-a".to_string()].into_iter().collect(),
            licenses: vec![License {
                kind: "GPL-2.0 WITH Classpath-exception-2.0".to_string(),
                uri: "https://openjdk.java.net/legal/gplv2+ce.html".to_string(),
            }],
        }
    }

    #[test]
    fn test_equality_covers_every_field() {
        let a = dependency();
        assert_eq!(a, dependency());

        let mut b = dependency();
        b.stacks.insert("stack-b".to_string());
        assert_ne!(a, b);

        let mut c = dependency();
        c.licenses[0].uri = "https://example.com/other".to_string();
        assert_ne!(a, c);

        let mut d = dependency();
        d.sha256 = None;
        assert_ne!(a, d);
    }

    #[test]
    fn test_toml_round_trip() {
        let dep = dependency();
        let encoded = toml::to_string(&dep).unwrap();
        let decoded: Dependency = toml::from_str(&encoded).unwrap();
        assert_eq!(dep, decoded);
    }

    #[test]
    fn test_empty_sha256_reads_as_absent() {
        let dep: Dependency = toml::from_str(
            r#"
id = "jdk"
version = "1.0.0"
uri = "https://example.com/a.tgz"
sha256 = ""
"#,
        )
        .unwrap();

        assert_eq!(dep.sha256, None);
        assert!(dep.stacks.is_empty());
        assert!(toml::to_string(&dep).unwrap().find("sha256").is_none());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: std::result::Result<Dependency, _> = toml::from_str(
            r#"
id = "jdk"
version = "1.0.0"
uri = "https://example.com/a.tgz"
colour = "blue"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        assert!(dependency().validate().is_ok());

        let mut dep = dependency();
        dep.sha256 = Some(DIGEST.to_uppercase());
        assert!(matches!(dep.validate(), Err(PaktError::InvalidDigest { .. })));

        dep.sha256 = Some("abc".to_string());
        assert!(dep.validate().is_err());
    }

    #[test]
    fn test_artifact_name() {
        assert_eq!(dependency().artifact_name(), "jdk-11.0.2.tgz");

        let mut dep = dependency();
        dep.uri = "https://example.com/download/a.zip?token=1".to_string();
        assert_eq!(dep.artifact_name(), "a.zip");

        dep.uri = "file:///tmp/fixtures/test-fixture".to_string();
        assert_eq!(dep.artifact_name(), "test-fixture");
    }

    #[test]
    fn test_format_dependencies() {
        let rendered = format_dependencies(&[dependency()]);
        assert_eq!(rendered, "[jdk 11.0.2 (stacks: stack-a)]");
    }
}
