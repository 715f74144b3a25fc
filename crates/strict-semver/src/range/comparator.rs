//! A single operator and version pair

use std::fmt;

use super::{Bound, Operator};
use crate::precedence::Precedence;
use crate::version::Version;

/// The atomic unit of a range: `operator version`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comparator {
    operator: Operator,
    version: Version,
}

impl Comparator {
    pub fn new(operator: Operator, version: Version) -> Self {
        Comparator { operator, version }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Check whether `version` passes this comparator, ignoring the
    /// pre-release visibility rule applied by [`super::ComparatorSet`]
    pub fn matches(&self, version: &Version) -> bool {
        self.operator.accepts(Precedence::compare(version, &self.version))
    }

    /// Lowest version this comparator admits
    pub fn lower_bound(&self) -> Bound {
        match self.operator {
            Operator::Equal | Operator::GreaterThanOrEqual => Bound::new(self.version.clone(), true),
            Operator::GreaterThan => Bound::new(self.version.clone(), false),
            Operator::LessThan | Operator::LessThanOrEqual => Bound::zero(),
        }
    }

    /// Highest version this comparator admits
    pub fn upper_bound(&self) -> Bound {
        match self.operator {
            Operator::Equal | Operator::LessThanOrEqual => Bound::new(self.version.clone(), true),
            Operator::LessThan => Bound::new(self.version.clone(), false),
            Operator::GreaterThan | Operator::GreaterThanOrEqual => Bound::positive_infinity(),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(operator: Operator, version: &str) -> Comparator {
        Comparator::new(operator, Version::parse(version).unwrap())
    }

    #[test]
    fn test_matches() {
        let gte = c(Operator::GreaterThanOrEqual, "1.2.3");
        assert!(gte.matches(&Version::parse("1.2.3").unwrap()));
        assert!(gte.matches(&Version::parse("1.2.3+build").unwrap()));
        assert!(!gte.matches(&Version::parse("1.2.3-rc.1").unwrap()));

        let eq = c(Operator::Equal, "1.2.3");
        assert!(eq.matches(&Version::parse("1.2.3+other").unwrap()));
        assert!(!eq.matches(&Version::parse("1.2.4").unwrap()));
    }

    #[test]
    fn test_bounds() {
        let lt = c(Operator::LessThan, "2.0.0");
        assert!(lt.lower_bound().is_zero());
        assert_eq!(lt.upper_bound(), Bound::new(Version::parse("2.0.0").unwrap(), false));

        let gt = c(Operator::GreaterThan, "1.0.0");
        assert!(gt.upper_bound().is_positive_infinity());
        assert!(!gt.lower_bound().is_inclusive());
    }

    #[test]
    fn test_display() {
        assert_eq!(c(Operator::LessThanOrEqual, "1.0.0-beta").to_string(), "<=1.0.0-beta");
        assert_eq!(c(Operator::Equal, "1.0.0").to_string(), "=1.0.0");
    }
}
