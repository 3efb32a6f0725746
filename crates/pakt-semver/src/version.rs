//! Semantic version value type and precedence ordering

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::version_parser::{VersionParser, VersionParserError};

/// A single dot-separated pre-release identifier
///
/// Variant order matters: numeric identifiers always have lower precedence
/// than alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Identifier {
    /// Identifier made only of digits (compared numerically)
    Numeric(u64),
    /// Identifier with at least one non-digit (compared in ASCII order)
    AlphaNumeric(String),
}

impl Identifier {
    pub(crate) fn parse(s: &str) -> Self {
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<u64>() {
                return Identifier::Numeric(n);
            }
        }
        Identifier::AlphaNumeric(s.to_string())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::AlphaNumeric(s) => write!(f, "{}", s),
        }
    }
}

/// A parsed semantic version
///
/// Equality and ordering follow semantic version precedence: build metadata
/// and the original spelling are ignored.
#[derive(Debug, Clone)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Vec<Identifier>,
    build: Option<String>,
    original: String,
}

impl Version {
    /// Create a release version from its numeric components
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            pre: Vec::new(),
            build: None,
            original: format!("{}.{}.{}", major, minor, patch),
        }
    }

    pub(crate) fn from_parts(
        major: u64,
        minor: u64,
        patch: u64,
        pre: Vec<Identifier>,
        build: Option<String>,
        original: &str,
    ) -> Self {
        Version {
            major,
            minor,
            patch,
            pre,
            build,
            original: original.to_string(),
        }
    }

    /// Parse a version string
    pub fn parse(version: &str) -> Result<Self, VersionParserError> {
        VersionParser::new().parse_version(version)
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Pre-release identifiers (empty for a release)
    pub fn pre_release(&self) -> &[Identifier] {
        &self.pre
    }

    /// Build metadata, if any
    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// The string this version was parsed from
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Check if this version carries a pre-release tag
    pub fn is_pre_release(&self) -> bool {
        !self.pre.is_empty()
    }

    fn cmp_pre(&self, other: &Self) -> Ordering {
        match (self.pre.is_empty(), other.pre.is_empty()) {
            (true, true) => Ordering::Equal,
            // A release has higher precedence than any of its pre-releases
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.pre.cmp(&other.pre),
        }
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| self.cmp_pre(other))
    }
}

impl FromStr for Version {
    type Err = VersionParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            let pre: Vec<String> = self.pre.iter().map(|i| i.to_string()).collect();
            write!(f, "-{}", pre.join("."))?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{}", build)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_numeric_ordering_is_not_lexicographic() {
        assert!(v("1.10.0") > v("1.9.0"));
        assert!(v("11.0.2") > v("8.0.222"));
        assert!(v("2.0.0") > v("1.99.99"));
    }

    #[test]
    fn test_pre_release_precedence() {
        // Example chain from the SemVer 2.0.0 specification
        let chain = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];

        for pair in chain.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_build_metadata_ignored() {
        assert_eq!(v("1.2.3+build.1"), v("1.2.3+build.2"));
        assert_eq!(v("1.2.3+build.1").build(), Some("build.1"));
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(v("v1.2").to_string(), "1.2.0");
        assert_eq!(v("1.2.3-beta.1+exp").to_string(), "1.2.3-beta.1+exp");
        assert_eq!(v("v1.2").original(), "v1.2");
    }

    #[test]
    fn test_identifier_parse() {
        assert_eq!(Identifier::parse("11"), Identifier::Numeric(11));
        assert_eq!(
            Identifier::parse("rc1"),
            Identifier::AlphaNumeric("rc1".to_string())
        );
        assert!(Identifier::parse("2") < Identifier::parse("alpha"));
    }
}
