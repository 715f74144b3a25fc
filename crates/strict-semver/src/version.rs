//! The semantic version value type

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::identifier::{is_valid_metadata_item, is_valid_pre_release_identifier};
use crate::precedence::Precedence;
use crate::range::Range;
use crate::version_parser::{ParseError, ParseMode, VersionParser};

/// Largest value accepted for major, minor and patch.
///
/// Kept at the 32-bit signed maximum so versions round-trip through tooling
/// that stores components as `int`.
pub const MAX_COMPONENT: u64 = i32::MAX as u64;

/// Names the trio component an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrioComponent {
    Major,
    Minor,
    Patch,
}

impl TrioComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrioComponent::Major => "major",
            TrioComponent::Minor => "minor",
            TrioComponent::Patch => "patch",
        }
    }
}

impl fmt::Display for TrioComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for building a version from components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("The {component} component must not be negative, got {value}")]
    NegativeComponent { component: TrioComponent, value: i64 },
    #[error("The {component} component {value} exceeds the maximum of {max}", max = MAX_COMPONENT)]
    ComponentOverflow { component: TrioComponent, value: u64 },
    #[error("Invalid pre-release identifier \"{0}\"")]
    InvalidPreRelease(String),
    #[error("Invalid build metadata item \"{0}\"")]
    InvalidMetadata(String),
}

/// An immutable Semantic Versioning 2.0.0 version.
///
/// Equality and hashing take build metadata into account. Precedence
/// ([`Version::compare_to`]) does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    pre_release: Vec<String>,
    metadata: Vec<String>,
}

impl Version {
    /// Create a release version from the numeric trio
    pub fn new(major: i64, minor: i64, patch: i64) -> Result<Self, VersionError> {
        Self::with_parts(major, minor, patch, Vec::<String>::new(), Vec::<String>::new())
    }

    /// Create a version carrying pre-release identifiers
    pub fn with_pre_release<I, S>(major: i64, minor: i64, patch: i64, pre_release: I) -> Result<Self, VersionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_parts(major, minor, patch, pre_release, Vec::<String>::new())
    }

    /// Create a version from every component, validating each one
    pub fn with_parts<I, S, J, T>(
        major: i64,
        minor: i64,
        patch: i64,
        pre_release: I,
        metadata: J,
    ) -> Result<Self, VersionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let major = check_component(TrioComponent::Major, major)?;
        let minor = check_component(TrioComponent::Minor, minor)?;
        let patch = check_component(TrioComponent::Patch, patch)?;

        let pre_release = pre_release
            .into_iter()
            .map(Into::into)
            .map(|identifier: String| {
                if is_valid_pre_release_identifier(&identifier) {
                    Ok(identifier)
                } else {
                    Err(VersionError::InvalidPreRelease(identifier))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let metadata = metadata
            .into_iter()
            .map(Into::into)
            .map(|item: String| {
                if is_valid_metadata_item(&item) {
                    Ok(item)
                } else {
                    Err(VersionError::InvalidMetadata(item))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Version {
            major,
            minor,
            patch,
            pre_release,
            metadata,
        })
    }

    /// Build a version from parts the caller has already validated
    pub(crate) fn from_validated(
        major: u64,
        minor: u64,
        patch: u64,
        pre_release: Vec<String>,
        metadata: Vec<String>,
    ) -> Self {
        debug_assert!(major <= MAX_COMPONENT && minor <= MAX_COMPONENT && patch <= MAX_COMPONENT);
        debug_assert!(pre_release.iter().all(|i| is_valid_pre_release_identifier(i)));
        debug_assert!(metadata.iter().all(|m| is_valid_metadata_item(m)));
        Version {
            major,
            minor,
            patch,
            pre_release,
            metadata,
        }
    }

    /// Release version used as a range boundary
    pub(crate) fn from_trio(major: u64, minor: u64, patch: u64) -> Self {
        Self::from_validated(major, minor, patch, Vec::new(), Vec::new())
    }

    /// Parse a version with the strict grammar
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        VersionParser::new(ParseMode::STRICT).parse(input)
    }

    /// Parse a version under the given dialect
    pub fn parse_with(input: &str, mode: ParseMode) -> Result<Self, ParseError> {
        VersionParser::new(mode).parse(input)
    }

    /// Parse a version, returning `None` instead of an error
    pub fn try_parse(input: &str, mode: ParseMode) -> Option<Self> {
        VersionParser::new(mode).try_parse(input)
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

    /// Pre-release identifiers, in order
    pub fn pre_release(&self) -> &[String] {
        &self.pre_release
    }

    /// Build metadata items, in order
    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }

    /// The `(major, minor, patch)` triple
    pub fn trio(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre_release.is_empty()
    }

    /// Compare by Semantic Versioning precedence, ignoring build metadata
    pub fn compare_to(&self, other: &Version) -> Ordering {
        Precedence::compare(self, other)
    }

    /// Check whether both versions have the same precedence
    pub fn precedence_eq(&self, other: &Version) -> bool {
        self.compare_to(other) == Ordering::Equal
    }

    /// Check whether this version satisfies the range
    pub fn satisfies(&self, range: &Range) -> bool {
        range.satisfied_by(self)
    }

    /// The next major release: `1.2.3` becomes `2.0.0`, `2.0.0-rc.1` becomes `2.0.0`
    pub fn next_major(&self) -> Result<Self, VersionError> {
        if self.is_prerelease() && self.minor == 0 && self.patch == 0 {
            return Ok(Self::from_trio(self.major, 0, 0));
        }
        let major = bump(TrioComponent::Major, self.major)?;
        Ok(Self::from_trio(major, 0, 0))
    }

    /// The next minor release: `1.2.3` becomes `1.3.0`, `1.3.0-rc.1` becomes `1.3.0`
    pub fn next_minor(&self) -> Result<Self, VersionError> {
        if self.is_prerelease() && self.patch == 0 {
            return Ok(Self::from_trio(self.major, self.minor, 0));
        }
        let minor = bump(TrioComponent::Minor, self.minor)?;
        Ok(Self::from_trio(self.major, minor, 0))
    }

    /// The next patch release: `1.2.3` becomes `1.2.4`, `1.2.4-rc.1` becomes `1.2.4`
    pub fn next_patch(&self) -> Result<Self, VersionError> {
        if self.is_prerelease() {
            return Ok(Self::from_trio(self.major, self.minor, self.patch));
        }
        let patch = bump(TrioComponent::Patch, self.patch)?;
        Ok(Self::from_trio(self.major, self.minor, patch))
    }
}

fn check_component(component: TrioComponent, value: i64) -> Result<u64, VersionError> {
    if value < 0 {
        return Err(VersionError::NegativeComponent { component, value });
    }
    let value = value as u64;
    if value > MAX_COMPONENT {
        return Err(VersionError::ComponentOverflow { component, value });
    }
    Ok(value)
}

fn bump(component: TrioComponent, value: u64) -> Result<u64, VersionError> {
    let next = value + 1;
    if next > MAX_COMPONENT {
        return Err(VersionError::ComponentOverflow { component, value: next });
    }
    Ok(next)
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release.join("."))?;
        }
        if !self.metadata.is_empty() {
            write!(f, "+{}", self.metadata.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Orders by precedence. Metadata only breaks ties so that `Ord` agrees with `Eq`.
impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(other).then_with(|| self.metadata.cmp(&other.metadata))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_release() {
        let v = Version::new(1, 2, 3).unwrap();
        assert_eq!(v.trio(), (1, 2, 3));
        assert!(v.pre_release().is_empty());
        assert!(v.metadata().is_empty());
        assert!(!v.is_prerelease());
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_with_parts() {
        let v = Version::with_parts(1, 0, 0, ["alpha", "1"], ["build", "0150"]).unwrap();
        assert_eq!(v.pre_release(), ["alpha", "1"]);
        assert_eq!(v.metadata(), ["build", "0150"]);
        assert_eq!(v.to_string(), "1.0.0-alpha.1+build.0150");
    }

    #[test]
    fn test_negative_component() {
        assert_eq!(
            Version::new(1, -1, 0),
            Err(VersionError::NegativeComponent {
                component: TrioComponent::Minor,
                value: -1
            })
        );
    }

    #[test]
    fn test_component_overflow() {
        assert!(Version::new(i32::MAX as i64, 0, 0).is_ok());
        assert_eq!(
            Version::new(0, 0, i32::MAX as i64 + 1),
            Err(VersionError::ComponentOverflow {
                component: TrioComponent::Patch,
                value: i32::MAX as u64 + 1
            })
        );
    }

    #[test]
    fn test_invalid_identifiers() {
        assert_eq!(
            Version::with_pre_release(1, 0, 0, ["0150"]),
            Err(VersionError::InvalidPreRelease("0150".to_string()))
        );
        assert_eq!(
            Version::with_pre_release(1, 0, 0, [""]),
            Err(VersionError::InvalidPreRelease(String::new()))
        );
        assert_eq!(
            Version::with_parts(1, 0, 0, ["a"], ["b.c"]),
            Err(VersionError::InvalidMetadata("b.c".to_string()))
        );
        assert!(Version::with_pre_release(1, 0, 0, ["0"]).is_ok());
    }

    #[test]
    fn test_equality_includes_metadata() {
        let a = Version::with_parts(1, 0, 0, Vec::<String>::new(), ["meta1"]).unwrap();
        let b = Version::with_parts(1, 0, 0, Vec::<String>::new(), ["meta2"]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.compare_to(&b), Ordering::Equal);
        assert!(a.precedence_eq(&b));
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_ord_follows_precedence() {
        let mut versions: Vec<Version> = ["1.0.0", "1.0.0-rc.1", "0.9.9", "1.0.0-alpha"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        versions.sort();
        let sorted: Vec<String> = versions.iter().map(ToString::to_string).collect();
        assert_eq!(sorted, ["0.9.9", "1.0.0-alpha", "1.0.0-rc.1", "1.0.0"]);
    }

    #[test]
    fn test_round_trip_through_display() {
        for input in ["0.0.0", "1.2.3-alpha.1.x-y", "10.20.30+build.001", "1.0.0-0.3.7+exp.sha.5114f85"] {
            let v: Version = input.parse().unwrap();
            assert_eq!(v.to_string(), input);
            assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
        }
    }

    #[test]
    fn test_next_versions() {
        let v = Version::parse("1.2.3-beta+meta").unwrap();
        assert_eq!(v.next_patch().unwrap().to_string(), "1.2.3");
        assert_eq!(v.next_minor().unwrap().to_string(), "1.3.0");
        assert_eq!(v.next_major().unwrap().to_string(), "2.0.0");

        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.next_patch().unwrap().to_string(), "1.2.4");

        let v = Version::parse("2.0.0-rc.1").unwrap();
        assert_eq!(v.next_major().unwrap().to_string(), "2.0.0");
        assert_eq!(v.next_minor().unwrap().to_string(), "2.0.0");
    }

    #[test]
    fn test_next_overflow() {
        let v = Version::new(i32::MAX as i64, 0, 0).unwrap();
        assert!(matches!(
            v.next_major(),
            Err(VersionError::ComponentOverflow {
                component: TrioComponent::Major,
                ..
            })
        ));
        assert!(v.next_minor().is_ok());
    }
}
