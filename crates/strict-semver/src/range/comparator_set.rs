//! ComparatorSet - conjunction of primitive comparators

use std::fmt;

use super::{Bound, Comparator};
use crate::version::Version;

/// Comparators ANDed together. An empty set accepts every release version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComparatorSet {
    comparators: Vec<Comparator>,
}

impl ComparatorSet {
    pub fn new(comparators: Vec<Comparator>) -> Self {
        ComparatorSet { comparators }
    }

    /// A set without comparators
    pub fn any() -> Self {
        ComparatorSet {
            comparators: Vec::new(),
        }
    }

    /// Get the comparators
    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    pub fn is_unconstrained(&self) -> bool {
        self.comparators.is_empty()
    }

    /// Check whether `version` passes every comparator.
    ///
    /// A pre-release only gets in when some comparator names a pre-release
    /// of the very same major.minor.patch.
    pub fn satisfied_by(&self, version: &Version) -> bool {
        if !self.comparators.iter().all(|comparator| comparator.matches(version)) {
            return false;
        }

        if !version.is_prerelease() {
            return true;
        }

        self.comparators.iter().any(|comparator| {
            let operand = comparator.version();
            operand.is_prerelease() && operand.trio() == version.trio()
        })
    }

    /// Lowest version the set could admit
    pub fn lower_bound(&self) -> Bound {
        self.comparators
            .iter()
            .map(Comparator::lower_bound)
            .fold(Bound::zero(), Bound::tighter_lower)
    }

    /// Highest version the set could admit
    pub fn upper_bound(&self) -> Bound {
        self.comparators
            .iter()
            .map(Comparator::upper_bound)
            .fold(Bound::positive_infinity(), Bound::tighter_upper)
    }
}

impl fmt::Display for ComparatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.comparators.iter();
        match iter.next() {
            None => return write!(f, "*"),
            Some(first) => write!(f, "{}", first)?,
        }
        for comparator in iter {
            write!(f, " {}", comparator)?;
        }
        Ok(())
    }
}
