//! Semantic versioning for pakt dependency catalogs
//!
//! This crate provides semantic version parsing, precedence ordering, and range
//! constraint matching for the version strings found in dependency catalogs.

pub mod constraint;
mod version;
mod version_parser;

pub use constraint::{Comparator, Constraint, Operator};
pub use version::{Identifier, Version};
pub use version_parser::{VersionParser, VersionParserError};

/// Check if a version satisfies a constraint expression.
///
/// Returns `false` when either side fails to parse.
pub fn satisfies(version: &str, constraint: &str) -> bool {
    let parser = VersionParser::new();

    let version = match parser.parse_version(version) {
        Ok(v) => v,
        Err(_) => return false,
    };

    match parser.parse_constraints(constraint) {
        Ok(c) => c.matches(&version),
        Err(_) => false,
    }
}
