//! Version ranges compatible with the node-semver range syntax
//!
//! A [`Range`] is a disjunction of [`ComparatorSet`]s, each a conjunction of
//! primitive [`Comparator`]s. Shorthand (`~`, `^`, X-ranges, hyphen ranges)
//! is expanded once, when the range is parsed.

mod bound;
mod comparator;
mod comparator_set;
mod operator;
mod parser;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub use bound::Bound;
pub use comparator::Comparator;
pub use comparator_set::ComparatorSet;
pub use operator::{InvalidOperatorError, Operator};
pub use parser::{RangeError, RangeErrorReason};

use crate::memo::Memoizer;
use crate::precedence::Precedence;
use crate::version::Version;
use parser::RangeParser;

/// A parsed, immutable version range
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    sets: Vec<ComparatorSet>,
}

impl Range {
    /// Parse a range expression such as `^1.2.3 || >=2.0.0 <2.5.0`
    pub fn parse(input: &str) -> Result<Self, RangeError> {
        let sets = RangeParser::new(input).parse()?;
        Ok(Range { sets })
    }

    /// The OR-ed comparator sets, in source order
    pub fn comparator_sets(&self) -> &[ComparatorSet] {
        &self.sets
    }

    /// Check if any comparator set accepts `version`
    pub fn satisfied_by(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set.satisfied_by(version))
    }

    /// Pair this range with a result cache keyed by version
    pub fn memoized<'r>(&'r self, cache: &'r dyn Memoizer<Version, bool>) -> MemoizedRange<'r> {
        MemoizedRange { range: self, cache }
    }

    /// Where `version` sits relative to the range.
    ///
    /// `Less` when it is below every comparator set, `Greater` when it is
    /// above every comparator set, `Equal` otherwise. A version in a gap
    /// between sets, or a pre-release the range does not admit, still
    /// reports `Equal`; use [`Range::satisfied_by`] for membership.
    pub fn compare(&self, version: &Version) -> Ordering {
        if self.satisfied_by(version) {
            return Ordering::Equal;
        }
        if self.sets.iter().all(|set| set.lower_bound().is_above(version)) {
            return Ordering::Less;
        }
        if self.sets.iter().all(|set| set.upper_bound().is_below(version)) {
            return Ordering::Greater;
        }
        Ordering::Equal
    }

    /// Highest-precedence version satisfying the range
    pub fn max_satisfying<'v>(&self, versions: &'v [Version]) -> Option<&'v Version> {
        versions
            .iter()
            .filter(|version| self.satisfied_by(version))
            .max_by(|a, b| Precedence::compare(a, b))
    }

    /// Lowest-precedence version satisfying the range
    pub fn min_satisfying<'v>(&self, versions: &'v [Version]) -> Option<&'v Version> {
        versions
            .iter()
            .filter(|version| self.satisfied_by(version))
            .min_by(|a, b| Precedence::compare(a, b))
    }

    /// Versions satisfying the range, in input order
    pub fn filter<'v>(&self, versions: &'v [Version]) -> Vec<&'v Version> {
        versions
            .iter()
            .filter(|version| self.satisfied_by(version))
            .collect()
    }
}

impl FromStr for Range {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Range::parse(s)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.sets.iter();
        if let Some(first) = iter.next() {
            write!(f, "{}", first)?;
        }
        for set in iter {
            write!(f, " || {}", set)?;
        }
        Ok(())
    }
}

/// A range answering from a caller-supplied cache when it can
pub struct MemoizedRange<'r> {
    range: &'r Range,
    cache: &'r dyn Memoizer<Version, bool>,
}

impl<'r> MemoizedRange<'r> {
    pub fn range(&self) -> &Range {
        self.range
    }

    pub fn satisfied_by(&self, version: &Version) -> bool {
        if let Some(hit) = self.cache.get(version) {
            log::trace!("Range cache hit for {} against \"{}\"", version, self.range);
            return hit;
        }
        let result = self.range.satisfied_by(version);
        self.cache.put(version.clone(), result);
        result
    }
}
