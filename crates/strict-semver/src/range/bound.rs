//! Bound type for comparator set boundaries

use std::cmp::Ordering;
use std::fmt;

use crate::precedence::Precedence;
use crate::version::Version;

/// Represents a bound (lower or upper) of a comparator set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    /// `None` stands for positive infinity
    version: Option<Version>,
    is_inclusive: bool,
}

impl Bound {
    /// Create a new bound
    pub fn new(version: Version, is_inclusive: bool) -> Self {
        Bound {
            version: Some(version),
            is_inclusive,
        }
    }

    /// Get the version, `None` for positive infinity
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Check if the bound is inclusive
    pub fn is_inclusive(&self) -> bool {
        self.is_inclusive
    }

    /// Create the zero bound: `0.0.0-0`, the lowest possible version
    pub fn zero() -> Self {
        Bound::new(lowest_version(), true)
    }

    /// Create positive infinity bound (maximum possible version)
    pub fn positive_infinity() -> Self {
        Bound {
            version: None,
            is_inclusive: false,
        }
    }

    /// Check if this is the zero bound
    pub fn is_zero(&self) -> bool {
        self.is_inclusive && self.version.as_ref() == Some(&lowest_version())
    }

    /// Check if this is positive infinity
    pub fn is_positive_infinity(&self) -> bool {
        self.version.is_none()
    }

    /// Check whether `version` lies strictly beneath this bound
    pub fn is_above(&self, version: &Version) -> bool {
        match &self.version {
            None => true,
            Some(bound) => match Precedence::compare(version, bound) {
                Ordering::Less => true,
                Ordering::Equal => !self.is_inclusive,
                Ordering::Greater => false,
            },
        }
    }

    /// Check whether `version` lies strictly beyond this bound
    pub fn is_below(&self, version: &Version) -> bool {
        match &self.version {
            None => false,
            Some(bound) => match Precedence::compare(version, bound) {
                Ordering::Greater => true,
                Ordering::Equal => !self.is_inclusive,
                Ordering::Less => false,
            },
        }
    }

    /// The more restrictive of two lower bounds
    pub fn tighter_lower(self, other: Bound) -> Bound {
        match self.compare_position(&other) {
            Ordering::Less => other,
            Ordering::Greater => self,
            Ordering::Equal if self.is_inclusive => other,
            Ordering::Equal => self,
        }
    }

    /// The more restrictive of two upper bounds
    pub fn tighter_upper(self, other: Bound) -> Bound {
        match self.compare_position(&other) {
            Ordering::Less => self,
            Ordering::Greater => other,
            Ordering::Equal if self.is_inclusive => other,
            Ordering::Equal => self,
        }
    }

    fn compare_position(&self, other: &Bound) -> Ordering {
        match (&self.version, &other.version) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => Precedence::compare(a, b),
        }
    }
}

fn lowest_version() -> Version {
    Version::from_validated(0, 0, 0, vec!["0".to_string()], Vec::new())
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            None => write!(f, "+inf"),
            Some(version) => write!(
                f,
                "{} [{}]",
                version,
                if self.is_inclusive {
                    "inclusive"
                } else {
                    "exclusive"
                }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound(version: &str, is_inclusive: bool) -> Bound {
        Bound::new(Version::parse(version).unwrap(), is_inclusive)
    }

    #[test]
    fn test_bound_creation() {
        let b = bound("1.0.0", true);
        assert_eq!(b.version().map(ToString::to_string).as_deref(), Some("1.0.0"));
        assert!(b.is_inclusive());
    }

    #[test]
    fn test_zero_bound() {
        let zero = Bound::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive_infinity());
        assert!(!zero.is_above(&Version::parse("0.0.0-0").unwrap()));
    }

    #[test]
    fn test_positive_infinity() {
        let inf = Bound::positive_infinity();
        assert!(inf.is_positive_infinity());
        assert!(!inf.is_zero());
        assert!(inf.is_above(&Version::parse("2147483647.0.0").unwrap()));
        assert!(!inf.is_below(&Version::parse("2147483647.0.0").unwrap()));
    }

    #[test]
    fn test_is_above_and_below() {
        let v = Version::parse("1.0.0").unwrap();
        assert!(bound("1.0.0", false).is_above(&v));
        assert!(!bound("1.0.0", true).is_above(&v));
        assert!(bound("1.0.0", false).is_below(&v));
        assert!(!bound("1.0.0", true).is_below(&v));
        assert!(bound("0.9.0", true).is_below(&v));
        assert!(bound("1.0.1", true).is_above(&v));
    }

    #[test]
    fn test_tighter() {
        let lower = bound("1.0.0", true).tighter_lower(bound("1.0.0", false));
        assert!(!lower.is_inclusive());
        let lower = bound("1.0.0", true).tighter_lower(bound("1.2.0", true));
        assert_eq!(lower, bound("1.2.0", true));

        let upper = Bound::positive_infinity().tighter_upper(bound("2.0.0", false));
        assert_eq!(upper, bound("2.0.0", false));
        let upper = bound("2.0.0", true).tighter_upper(bound("2.0.0", false));
        assert!(!upper.is_inclusive());
    }

    #[test]
    fn test_display() {
        assert_eq!(bound("1.0.0", true).to_string(), "1.0.0 [inclusive]");
        assert_eq!(Bound::positive_infinity().to_string(), "+inf");
    }
}
