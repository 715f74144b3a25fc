//! Strict Semantic Versioning 2.0.0 library
//!
//! This crate provides version parsing with opt-in relaxed dialects, precedence
//! comparison following the SemVer 2.0.0 rules, and range matching compatible
//! with the node-semver range syntax (`^`, `~`, X-ranges, hyphen ranges, `||`).

mod identifier;
pub mod memo;
mod precedence;
pub mod range;
mod semver;
mod version;
mod version_parser;

pub use memo::Memoizer;
pub use precedence::Precedence;
pub use range::{
    Bound, Comparator, ComparatorSet, InvalidOperatorError, MemoizedRange, Operator, Range, RangeError,
    RangeErrorReason,
};
pub use semver::Semver;
pub use version::{TrioComponent, Version, VersionError, MAX_COMPONENT};
pub use version_parser::{
    CachedVersion, ComponentState, ParseError, ParseErrorKind, ParseMode, ParseState, ParsedVersion, VersionParser,
};
