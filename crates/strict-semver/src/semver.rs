//! Semver facade providing string-level version operations

use std::cmp::Ordering;

use crate::precedence::Precedence;
use crate::range::{Range, RangeError};
use crate::version::Version;
use crate::version_parser::{ParseMode, VersionParser};

/// Main facade for semantic versioning operations on plain strings.
///
/// Version strings may carry a leading `v`. Anything that does not parse
/// never satisfies a range and is left out of sorted output.
pub struct Semver;

impl Semver {
    fn parser() -> VersionParser<'static> {
        VersionParser::new(ParseMode::ALLOW_PREFIX)
    }

    /// Check if a version satisfies a range
    pub fn satisfies(version: &str, range: &str) -> bool {
        let Ok(version) = Self::parser().parse(version) else {
            return false;
        };
        match Range::parse(range) {
            Ok(range) => range.satisfied_by(&version),
            Err(err) => {
                log::debug!("{}", err);
                false
            }
        }
    }

    /// Return all versions that satisfy the given range, in input order
    pub fn satisfied_by(versions: &[&str], range: &str) -> Vec<String> {
        let Ok(range) = Range::parse(range) else {
            return Vec::new();
        };
        let parser = Self::parser();

        versions
            .iter()
            .filter(|v| parser.parse(v).is_ok_and(|version| range.satisfied_by(&version)))
            .map(|v| v.to_string())
            .collect()
    }

    /// Parse a range once for repeated checks
    pub fn parse_range(range: &str) -> Result<Range, RangeError> {
        Range::parse(range)
    }

    /// Sort versions in ascending order
    pub fn sort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, true)
    }

    /// Sort versions in descending order (reverse sort)
    pub fn rsort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, false)
    }

    fn usort(versions: &[&str], ascending: bool) -> Vec<String> {
        let parser = Self::parser();

        let mut parsed: Vec<(Version, usize)> = versions
            .iter()
            .enumerate()
            .filter_map(|(i, v)| Some((parser.parse(v).ok()?, i)))
            .collect();

        parsed.sort_by(|(a, _), (b, _)| {
            let cmp: Ordering = Precedence::compare(a, b);
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });

        // Return original strings in sorted order
        parsed.into_iter().map(|(_, i)| versions[i].to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_satisfies_positive() {
        // Hyphen ranges
        assert!(Semver::satisfies("1.2.3", "1.0.0 - 2.0.0"));
        assert!(Semver::satisfies("1.2.3", "1.2.3+asdf - 2.4.3+asdf"));

        // Caret with build metadata
        assert!(Semver::satisfies("1.2.3", "^1.2.3+build"));
        assert!(Semver::satisfies("1.3.0", "^1.2.3+build"));

        // Basic constraints
        assert!(Semver::satisfies("1.0.0", "1.0.0"));
        assert!(Semver::satisfies("1.2.3", "*"));
        assert!(Semver::satisfies("v1.2.3", "*"));

        // Greater than/less than
        assert!(Semver::satisfies("1.0.1", ">1.0.0"));
        assert!(Semver::satisfies("2.0.0", "<=2.0.0"));
        assert!(Semver::satisfies("1.9999.9999", "<2.0.0"));

        // With spaces
        assert!(Semver::satisfies("1.0.0", ">= 1.0.0"));
        assert!(Semver::satisfies("1.1.0", ">=   1.0.0"));
        assert!(Semver::satisfies("0.2.9", "<=  2.0.0"));

        // Or constraints
        assert!(Semver::satisfies("1.2.4", "0.1.20 || 1.2.4"));
        assert!(Semver::satisfies("0.0.0", ">=0.2.3 || <0.0.1"));

        // Wildcard
        assert!(Semver::satisfies("2.1.3", "2.x.x"));
        assert!(Semver::satisfies("2.1.3", "1.2.* || 2.*"));

        // Tilde
        assert!(Semver::satisfies("2.4.5", "~2.4"));
        assert!(Semver::satisfies("1.2.3", "~1"));

        // Partial operands
        assert!(Semver::satisfies("1.0.0", ">= 1"));
        assert!(Semver::satisfies("1.3.0", ">1.2"));
        assert!(Semver::satisfies("1.1.1", "< 1.2"));
    }

    #[test]
    fn test_satisfies_negative() {
        assert!(!Semver::satisfies("2.2.3", "1.0.0 - 2.0.0"));
        assert!(!Semver::satisfies("2.4.3-alpha", "1.2.3+asdf - 2.4.3+asdf"));
        assert!(!Semver::satisfies("1.2.3-beta", "^1.2.3"));
        assert!(!Semver::satisfies("1.2.3-beta", "<=1.2.3"));
        assert!(!Semver::satisfies("1.3.0-beta", ">1.2"));
        assert!(!Semver::satisfies("1.2.8", ">1.2"));
        assert!(!Semver::satisfies("2.9.0", "~2.4"));
        assert!(!Semver::satisfies("1.2.3", "2.x.x"));
        assert!(!Semver::satisfies("not a version", "*"));
        assert!(!Semver::satisfies("1.2.3", ">=1.x"));
    }

    #[test]
    fn test_satisfied_by() {
        let versions = ["1.0.0", "1.2.0", "v1.9.9", "2.0.0", "garbage"];
        assert_eq!(Semver::satisfied_by(&versions, "^1.1"), vec!["1.2.0", "v1.9.9"]);
        assert!(Semver::satisfied_by(&versions, ">>1").is_empty());
    }

    #[test]
    fn test_parse_range() {
        let range = Semver::parse_range("~1.2").unwrap();
        assert!(range.satisfied_by(&Version::parse("1.2.9").unwrap()));
        assert!(Semver::parse_range("1.2.3 ||").is_err());
    }

    #[test]
    fn test_sort() {
        let versions = ["1.0.0", "0.1.0", "v0.1.1", "1.0.0-rc.1", "3.0.0+build", "bogus"];
        assert_eq!(
            Semver::sort(&versions),
            vec!["0.1.0", "v0.1.1", "1.0.0-rc.1", "1.0.0", "3.0.0+build"]
        );
        assert_eq!(
            Semver::rsort(&versions),
            vec!["3.0.0+build", "1.0.0", "1.0.0-rc.1", "v0.1.1", "0.1.0"]
        );
    }
}
