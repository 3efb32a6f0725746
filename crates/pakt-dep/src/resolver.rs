//! Selects the best catalog entry for an id, a constraint and a stack.

use pakt_semver::{Version, VersionParser};

use crate::dependency::format_dependencies;
use crate::{Dependency, PaktError, Result};

/// Resolves dependencies against a catalog for a single stack
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    dependencies: Vec<Dependency>,
    stack_id: String,
}

impl DependencyResolver {
    pub fn new(dependencies: Vec<Dependency>, stack_id: impl Into<String>) -> Self {
        Self {
            dependencies,
            stack_id: stack_id.into(),
        }
    }

    pub fn stack_id(&self) -> &str {
        &self.stack_id
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Return the highest version of `id` satisfying `constraint` on this stack
    ///
    /// An empty constraint means any version. Every catalog version must
    /// parse, even those of other ids.
    pub fn resolve(&self, id: &str, constraint: &str) -> Result<Dependency> {
        let constraint = if constraint.trim().is_empty() {
            "*"
        } else {
            constraint
        };

        let parser = VersionParser::new();
        let parsed = parser
            .parse_constraints(constraint)
            .map_err(|e| PaktError::ConstraintParse {
                constraint: constraint.to_string(),
                reason: e.to_string(),
            })?;

        let mut best: Option<(Version, &Dependency)> = None;

        for candidate in &self.dependencies {
            let version =
                parser
                    .parse_version(&candidate.version)
                    .map_err(|e| PaktError::VersionParse {
                        id: candidate.id.clone(),
                        version: candidate.version.clone(),
                        reason: e.to_string(),
                    })?;

            if candidate.id != id
                || !parsed.matches(&version)
                || !candidate.supports_stack(&self.stack_id)
            {
                continue;
            }

            log::trace!("Candidate {} satisfies {}", candidate, constraint);

            if best.as_ref().map_or(true, |(current, _)| version > *current) {
                best = Some((version, candidate));
            }
        }

        match best {
            Some((_, dependency)) => {
                log::debug!(
                    "Resolved {} {} on {} to {}",
                    id,
                    constraint,
                    self.stack_id,
                    dependency.version
                );
                Ok(dependency.clone())
            }
            None => Err(PaktError::NoValidDependency {
                id: id.to_string(),
                constraint: constraint.to_string(),
                stack: self.stack_id.clone(),
                catalog: format_dependencies(&self.dependencies),
            }),
        }
    }

    /// Check if `resolve` would succeed
    pub fn any(&self, id: &str, constraint: &str) -> bool {
        self.resolve(id, constraint).is_ok()
    }
}
