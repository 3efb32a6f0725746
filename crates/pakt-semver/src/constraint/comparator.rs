//! Single operator/version comparison

use std::cmp::Ordering;
use std::fmt;

use super::Operator;
use crate::Version;

/// How many numeric components a constraint version spelled out
///
/// `>1.2` and `=1.2` compare only the components that were given, so they
/// behave like `>=1.3.0` and `1.2.x` respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Major,
    Minor,
    Patch,
}

/// A single comparison such as `>=1.2.3` or `!=2.1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    operator: Operator,
    version: Version,
    precision: Precision,
}

impl Comparator {
    /// Create a comparator against a fully specified version
    pub fn new(operator: Operator, version: Version) -> Self {
        Comparator {
            operator,
            version,
            precision: Precision::Patch,
        }
    }

    /// Create a comparator against a version with only some components given
    pub fn partial(operator: Operator, version: Version, precision: Precision) -> Self {
        // A pre-release pins the exact version
        let precision = if version.is_pre_release() {
            Precision::Patch
        } else {
            precision
        };

        Comparator {
            operator,
            version,
            precision,
        }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Check if `version` satisfies this comparison
    pub fn matches(&self, version: &Version) -> bool {
        match self.operator {
            Operator::Equal => self.truncated_cmp(version) == Ordering::Equal,
            Operator::NotEqual => self.truncated_cmp(version) != Ordering::Equal,
            Operator::GreaterThan => self.truncated_cmp(version) == Ordering::Greater,
            Operator::GreaterThanOrEqual => version >= &self.version,
            Operator::LessThan => version < &self.version,
            Operator::LessThanOrEqual => self.truncated_cmp(version) != Ordering::Greater,
        }
    }

    /// Compare `version` against the constraint version, looking only at the
    /// components the constraint spelled out
    fn truncated_cmp(&self, version: &Version) -> Ordering {
        match self.precision {
            Precision::Major => version.major().cmp(&self.version.major()),
            Precision::Minor => version
                .major()
                .cmp(&self.version.major())
                .then(version.minor().cmp(&self.version.minor())),
            Precision::Patch => version.cmp(&self.version),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision {
            Precision::Major => write!(f, "{}{}", self.operator, self.version.major()),
            Precision::Minor => write!(
                f,
                "{}{}.{}",
                self.operator,
                self.version.major(),
                self.version.minor()
            ),
            Precision::Patch => write!(f, "{}{}", self.operator, self.version),
        }
    }
}
