//! Version and constraint parsing

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::constraint::{Comparator, Constraint, Operator, Precision};
use crate::version::{Identifier, Version};

/// Error type for version parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionParserError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Invalid operator \"{0}\"")]
    InvalidOperator(String),
    #[error("Could not parse version constraint {constraint}: {reason}")]
    ConstraintParseError { constraint: String, reason: String },
}

lazy_static! {
    static ref VERSION_RE: Regex = Regex::new(
        r"^[vV]?(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$"
    ).unwrap();

    // Constraint versions may use x, X or * for trailing components
    static ref PARTIAL_RE: Regex = Regex::new(
        r"^[vV]?(\d+|[xX*])(?:\.(\d+|[xX*]))?(?:\.(\d+|[xX*]))?(?:-([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+([0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$"
    ).unwrap();

    static ref WILDCARD_RE: Regex = Regex::new(r"^[vV]?[xX*](\.[xX*]){0,2}$").unwrap();

    static ref OR_CONSTRAINT_RE: Regex = Regex::new(r"\s*\|\|\s*").unwrap();

    static ref AND_SEPARATOR_RE: Regex = Regex::new(r"[,\s]+").unwrap();

    static ref TILDE_RE: Regex = Regex::new(r"^~>?\s*(.+)$").unwrap();

    static ref CARET_RE: Regex = Regex::new(r"^\^\s*(.+)$").unwrap();

    static ref HYPHEN_RE: Regex = Regex::new(r"^(?P<from>\S+) +- +(?P<to>\S+)$").unwrap();

    static ref BASIC_COMPARATOR_RE: Regex = Regex::new(r"^(!=|==|=<|>=|<=|=|<|>)?\s*(.*)$").unwrap();
}

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '!', '~', '^'];

/// A version that may leave out trailing components
struct PartialVersion {
    version: Version,
    /// `None` when every component was a wildcard
    precision: Option<Precision>,
}

/// Version parser
#[derive(Debug, Clone, Default)]
pub struct VersionParser;

impl VersionParser {
    pub fn new() -> Self {
        VersionParser
    }

    /// Check if a string parses as a version
    pub fn is_valid(&self, version: &str) -> bool {
        self.parse_version(version).is_ok()
    }

    /// Parse a version string such as `1.2.3`, `v1.2` or `2.0.0-rc.1+build.5`
    ///
    /// Missing minor and patch components are read as zero.
    pub fn parse_version(&self, version: &str) -> Result<Version, VersionParserError> {
        let trimmed = version.trim();
        let invalid = || VersionParserError::InvalidVersion(version.to_string());

        let caps = VERSION_RE.captures(trimmed).ok_or_else(invalid)?;
        let component = |idx: usize| -> Result<u64, VersionParserError> {
            match caps.get(idx) {
                Some(m) => m.as_str().parse::<u64>().map_err(|_| invalid()),
                None => Ok(0),
            }
        };

        let major = component(1)?;
        let minor = component(2)?;
        let patch = component(3)?;
        let pre = parse_pre_release(caps.get(4).map(|m| m.as_str()));
        let build = caps.get(5).map(|m| m.as_str().to_string());

        Ok(Version::from_parts(major, minor, patch, pre, build, trimmed))
    }

    /// Parse a constraint expression
    ///
    /// OR groups are separated by `||`; terms inside a group by commas or
    /// whitespace. An empty expression matches any release.
    pub fn parse_constraints(&self, constraints: &str) -> Result<Constraint, VersionParserError> {
        let pretty_constraint = constraints.to_string();
        let mut constraints = constraints.trim();

        if constraints.is_empty() {
            constraints = "*";
        }

        let or_constraints: Vec<&str> = OR_CONSTRAINT_RE.split(constraints).collect();

        if or_constraints.first().map_or(false, |s| s.is_empty()) {
            return Err(VersionParserError::ConstraintParseError {
                constraint: constraints.to_string(),
                reason: "leading operator".to_string(),
            });
        }
        if or_constraints.last().map_or(false, |s| s.is_empty()) {
            return Err(VersionParserError::ConstraintParseError {
                constraint: constraints.to_string(),
                reason: "trailing operator".to_string(),
            });
        }

        let mut or_groups = Vec::with_capacity(or_constraints.len());

        for or_constraint in or_constraints {
            let and_constraints = self.split_and_constraints(or_constraint)?;
            if and_constraints.is_empty() {
                return Err(VersionParserError::ConstraintParseError {
                    constraint: constraints.to_string(),
                    reason: "empty constraint group".to_string(),
                });
            }

            let mut group = Vec::new();
            for and_constraint in &and_constraints {
                group.extend(self.parse_constraint(and_constraint)?);
            }
            or_groups.push(group);
        }

        let mut parsed_constraint = Constraint::new(or_groups);
        parsed_constraint.set_pretty_string(Some(pretty_constraint));

        Ok(parsed_constraint)
    }

    /// Split a group into its AND terms
    ///
    /// Keeps an operator attached to a version written after a space
    /// (`>= 1.0`) and keeps hyphen ranges (`1.0 - 2.0`) together.
    fn split_and_constraints(&self, input: &str) -> Result<Vec<String>, VersionParserError> {
        let mut parts: Vec<String> = Vec::new();
        let mut pending_operator: Option<&str> = None;
        let mut tokens = AND_SEPARATOR_RE.split(input.trim()).filter(|t| !t.is_empty());

        while let Some(token) = tokens.next() {
            if token == "-" {
                let from = match (pending_operator, parts.pop()) {
                    (None, Some(from)) => from,
                    _ => {
                        return Err(VersionParserError::ConstraintParseError {
                            constraint: input.to_string(),
                            reason: "hyphen range without lower bound".to_string(),
                        })
                    }
                };
                let to = tokens
                    .next()
                    .ok_or_else(|| VersionParserError::ConstraintParseError {
                        constraint: input.to_string(),
                        reason: "hyphen range without upper bound".to_string(),
                    })?;
                parts.push(format!("{} - {}", from, to));
                continue;
            }

            if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
                if pending_operator.is_some() {
                    return Err(VersionParserError::ConstraintParseError {
                        constraint: input.to_string(),
                        reason: format!("unexpected operator \"{}\"", token),
                    });
                }
                pending_operator = Some(token);
                continue;
            }

            match pending_operator.take() {
                Some(operator) => parts.push(format!("{}{}", operator, token)),
                None => parts.push(token.to_string()),
            }
        }

        if let Some(operator) = pending_operator {
            return Err(VersionParserError::ConstraintParseError {
                constraint: operator.to_string(),
                reason: "empty version".to_string(),
            });
        }

        Ok(parts)
    }

    /// Parse a single term into zero or more comparators
    ///
    /// Zero comparators means the term matches any release.
    fn parse_constraint(&self, constraint: &str) -> Result<Vec<Comparator>, VersionParserError> {
        let constraint = constraint.trim();

        if WILDCARD_RE.is_match(constraint) {
            return Ok(Vec::new());
        }

        if let Some(caps) = TILDE_RE.captures(constraint) {
            return self.parse_tilde_constraint(constraint, &caps[1]);
        }

        if let Some(caps) = CARET_RE.captures(constraint) {
            return self.parse_caret_constraint(constraint, &caps[1]);
        }

        if let Some(caps) = HYPHEN_RE.captures(constraint) {
            return self.parse_hyphen_constraint(constraint, &caps["from"], &caps["to"]);
        }

        if let Some(caps) = BASIC_COMPARATOR_RE.captures(constraint) {
            let operator = caps.get(1).map_or("=", |m| m.as_str());
            let version_str = caps.get(2).map_or("", |m| m.as_str()).trim();

            if version_str.is_empty() {
                return Err(VersionParserError::ConstraintParseError {
                    constraint: constraint.to_string(),
                    reason: "empty version".to_string(),
                });
            }

            let op: Operator = operator
                .parse()
                .map_err(|_| VersionParserError::InvalidOperator(operator.to_string()))?;
            let partial = self.parse_partial(constraint, version_str)?;

            return match partial.precision {
                Some(precision) => Ok(vec![Comparator::partial(op, partial.version, precision)]),
                // `=*`, `>=x` and `<=*` are satisfied by every release
                None if matches!(
                    op,
                    Operator::Equal | Operator::GreaterThanOrEqual | Operator::LessThanOrEqual
                ) =>
                {
                    Ok(Vec::new())
                }
                None => Err(VersionParserError::ConstraintParseError {
                    constraint: constraint.to_string(),
                    reason: format!("operator \"{}\" cannot be used with a wildcard", op),
                }),
            };
        }

        Err(VersionParserError::ConstraintParseError {
            constraint: constraint.to_string(),
            reason: "Could not parse constraint".to_string(),
        })
    }

    /// `~1.2.3` allows patch-level changes, `~1` minor-level ones
    fn parse_tilde_constraint(
        &self,
        constraint: &str,
        version_str: &str,
    ) -> Result<Vec<Comparator>, VersionParserError> {
        let partial = self.parse_bound(constraint, version_str)?;
        let version = &partial.version;

        let high = match partial.precision {
            Some(Precision::Major) => Version::new(bump(constraint, version.major())?, 0, 0),
            _ => Version::new(version.major(), bump(constraint, version.minor())?, 0),
        };

        Ok(vec![
            Comparator::new(Operator::GreaterThanOrEqual, partial.version),
            Comparator::new(Operator::LessThan, high),
        ])
    }

    /// `^` allows changes that keep the left-most non-zero component
    fn parse_caret_constraint(
        &self,
        constraint: &str,
        version_str: &str,
    ) -> Result<Vec<Comparator>, VersionParserError> {
        let partial = self.parse_bound(constraint, version_str)?;
        let version = &partial.version;
        let precision = partial.precision.unwrap_or(Precision::Major);

        let high = if version.major() > 0 || precision == Precision::Major {
            Version::new(bump(constraint, version.major())?, 0, 0)
        } else if version.minor() > 0 || precision == Precision::Minor {
            Version::new(0, bump(constraint, version.minor())?, 0)
        } else {
            Version::new(0, 0, bump(constraint, version.patch())?)
        };

        Ok(vec![
            Comparator::new(Operator::GreaterThanOrEqual, partial.version),
            Comparator::new(Operator::LessThan, high),
        ])
    }

    /// `1.2 - 1.4.5` is inclusive on both ends; a partial upper bound covers
    /// every version it prefixes
    fn parse_hyphen_constraint(
        &self,
        constraint: &str,
        from: &str,
        to: &str,
    ) -> Result<Vec<Comparator>, VersionParserError> {
        let low = self.parse_bound(constraint, from)?;
        let high = self.parse_bound(constraint, to)?;
        let high_precision = high.precision.unwrap_or(Precision::Patch);

        Ok(vec![
            Comparator::new(Operator::GreaterThanOrEqual, low.version),
            Comparator::partial(Operator::LessThanOrEqual, high.version, high_precision),
        ])
    }

    /// Parse a range bound, which must name at least a major version
    fn parse_bound(
        &self,
        constraint: &str,
        version_str: &str,
    ) -> Result<PartialVersion, VersionParserError> {
        let partial = self.parse_partial(constraint, version_str)?;
        if partial.precision.is_none() {
            return Err(VersionParserError::ConstraintParseError {
                constraint: constraint.to_string(),
                reason: format!("range bound \"{}\" has no version", version_str),
            });
        }
        Ok(partial)
    }

    /// Parse a version that may be truncated or end in wildcards
    fn parse_partial(
        &self,
        constraint: &str,
        version_str: &str,
    ) -> Result<PartialVersion, VersionParserError> {
        let invalid = || VersionParserError::ConstraintParseError {
            constraint: constraint.to_string(),
            reason: format!("Invalid version \"{}\"", version_str),
        };

        let caps = PARTIAL_RE.captures(version_str).ok_or_else(invalid)?;

        let mut numbers = [0u64; 3];
        let mut given = 0;
        let mut seen_wildcard = false;
        for (idx, slot) in numbers.iter_mut().enumerate() {
            let Some(m) = caps.get(idx + 1) else {
                break;
            };
            let part = m.as_str();
            if matches!(part, "x" | "X" | "*") {
                seen_wildcard = true;
                continue;
            }
            // 1.x.3 is not a valid wildcard
            if seen_wildcard {
                return Err(invalid());
            }
            *slot = part.parse::<u64>().map_err(|_| invalid())?;
            given += 1;
        }

        let pre_str = caps.get(4).map(|m| m.as_str());
        if seen_wildcard && pre_str.is_some() {
            return Err(invalid());
        }

        let precision = match given {
            0 => None,
            1 => Some(Precision::Major),
            2 => Some(Precision::Minor),
            _ => Some(Precision::Patch),
        };

        let version = Version::from_parts(
            numbers[0],
            numbers[1],
            numbers[2],
            parse_pre_release(pre_str),
            caps.get(5).map(|m| m.as_str().to_string()),
            version_str,
        );

        Ok(PartialVersion { version, precision })
    }
}

fn parse_pre_release(pre: Option<&str>) -> Vec<Identifier> {
    pre.map(|p| p.split('.').map(Identifier::parse).collect())
        .unwrap_or_default()
}

/// Next value of a version component for an exclusive upper bound
fn bump(constraint: &str, component: u64) -> Result<u64, VersionParserError> {
    component
        .checked_add(1)
        .ok_or_else(|| VersionParserError::ConstraintParseError {
            constraint: constraint.to_string(),
            reason: "version component too large for an upper bound".to_string(),
        })
}
