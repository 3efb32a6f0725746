//! Compound constraint: OR of AND groups

use std::fmt;

use super::Comparator;
use crate::Version;

/// A parsed constraint expression
///
/// Holds a disjunction of conjunctive comparator groups. A group with no
/// comparators matches every release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    groups: Vec<Vec<Comparator>>,
    pretty_string: Option<String>,
}

impl Constraint {
    /// Create a constraint from OR-ed groups of AND-ed comparators
    pub fn new(groups: Vec<Vec<Comparator>>) -> Self {
        Constraint {
            groups,
            pretty_string: None,
        }
    }

    /// A constraint matching any release (`*`)
    pub fn match_all() -> Self {
        Constraint::new(vec![Vec::new()])
    }

    /// Check if this is a conjunction-free wildcard
    pub fn is_match_all(&self) -> bool {
        self.groups.iter().any(|g| g.is_empty())
    }

    /// Get the OR-ed comparator groups
    pub fn groups(&self) -> &[Vec<Comparator>] {
        &self.groups
    }

    /// Check if a version satisfies any group
    ///
    /// A pre-release version only satisfies a group in which at least one
    /// comparator names a pre-release itself.
    pub fn matches(&self, version: &Version) -> bool {
        self.groups.iter().any(|group| {
            if version.is_pre_release() && !group.iter().any(|c| c.version().is_pre_release()) {
                return false;
            }
            group.iter().all(|c| c.matches(version))
        })
    }

    /// Get the pretty string representation (the expression as written)
    pub fn pretty_string(&self) -> String {
        self.pretty_string
            .clone()
            .unwrap_or_else(|| self.to_string())
    }

    /// Set the pretty string representation
    pub fn set_pretty_string(&mut self, pretty: Option<String>) {
        self.pretty_string = pretty;
    }
}

impl Default for Constraint {
    fn default() -> Self {
        Self::match_all()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self
            .groups
            .iter()
            .map(|group| {
                if group.is_empty() {
                    "*".to_string()
                } else {
                    group
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                }
            })
            .collect();

        write!(f, "{}", groups.join(" || "))
    }
}
