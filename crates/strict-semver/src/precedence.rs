//! Version precedence comparison utilities

use std::cmp::Ordering;

use num_bigint::BigUint;

use crate::identifier::is_numeric;
use crate::version::Version;

/// Comparator implementing Semantic Versioning precedence.
///
/// Build metadata never takes part in these comparisons.
pub struct Precedence;

impl Precedence {
    /// Check if version1 > version2
    pub fn greater_than(version1: &Version, version2: &Version) -> bool {
        Self::compare(version1, version2) == Ordering::Greater
    }

    /// Check if version1 >= version2
    pub fn greater_than_or_equal_to(version1: &Version, version2: &Version) -> bool {
        Self::compare(version1, version2) != Ordering::Less
    }

    /// Check if version1 < version2
    pub fn less_than(version1: &Version, version2: &Version) -> bool {
        Self::compare(version1, version2) == Ordering::Less
    }

    /// Check if version1 <= version2
    pub fn less_than_or_equal_to(version1: &Version, version2: &Version) -> bool {
        Self::compare(version1, version2) != Ordering::Greater
    }

    /// Check if version1 and version2 have the same precedence
    pub fn equal_to(version1: &Version, version2: &Version) -> bool {
        Self::compare(version1, version2) == Ordering::Equal
    }

    /// Total precedence order between two versions
    pub fn compare(version1: &Version, version2: &Version) -> Ordering {
        version1
            .trio()
            .cmp(&version2.trio())
            .then_with(|| compare_pre_release(version1.pre_release(), version2.pre_release()))
    }

    /// Like [`Precedence::compare`], with an absent version sorting lowest
    pub fn compare_optional(version1: Option<&Version>, version2: Option<&Version>) -> Ordering {
        match (version1, version2) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => Self::compare(a, b),
        }
    }

    /// Sort versions in ascending precedence, keeping input order for ties
    pub fn sort(versions: &[Version]) -> Vec<Version> {
        let mut sorted = versions.to_vec();
        sorted.sort_by(Self::compare);
        sorted
    }

    /// Sort versions in descending precedence, keeping input order for ties
    pub fn rsort(versions: &[Version]) -> Vec<Version> {
        let mut sorted = versions.to_vec();
        sorted.sort_by(|a, b| Self::compare(b, a));
        sorted
    }
}

fn compare_pre_release(a: &[String], b: &[String]) -> Ordering {
    // A release outranks any pre-release of the same trio
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    for (left, right) in a.iter().zip(b) {
        match compare_identifier(left, right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    a.len().cmp(&b.len())
}

/// Numeric identifiers compare as integers of any size and sort below
/// alphanumeric ones, which compare by ASCII order.
pub(crate) fn compare_identifier(left: &str, right: &str) -> Ordering {
    if left == right {
        return Ordering::Equal;
    }

    match (is_numeric(left), is_numeric(right)) {
        (true, true) => compare_numeric(left, right),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => left.as_bytes().cmp(right.as_bytes()),
    }
}

fn compare_numeric(left: &str, right: &str) -> Ordering {
    if let (Ok(a), Ok(b)) = (left.parse::<u64>(), right.parse::<u64>()) {
        return a.cmp(&b);
    }

    match (
        BigUint::parse_bytes(left.as_bytes(), 10),
        BigUint::parse_bytes(right.as_bytes(), 10),
    ) {
        (Some(a), Some(b)) => a.cmp(&b),
        // Unreachable for digit-only input, keep the order total anyway
        _ => left.cmp(right),
    }
}
