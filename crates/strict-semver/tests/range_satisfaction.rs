//! Integration tests for range parsing and evaluation
//!
//! These tests cover the node-semver range syntax end to end, from the
//! range string to the satisfaction answer.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use strict_semver::{Range, RangeErrorReason, Semver, Version};

fn v(input: &str) -> Version {
    Version::parse(input).unwrap()
}

fn assert_range(range: &str, satisfied: &[&str], unsatisfied: &[&str]) {
    let parsed = Range::parse(range).unwrap_or_else(|err| panic!("{}", err));
    for version in satisfied {
        assert!(parsed.satisfied_by(&v(version)), "{} should satisfy {}", version, range);
    }
    for version in unsatisfied {
        assert!(!parsed.satisfied_by(&v(version)), "{} should not satisfy {}", version, range);
    }
}

#[test]
fn test_disjunction_with_gap() {
    assert_range(
        "1.2.7 || >=1.2.9 <2.0.0",
        &["1.2.7", "1.2.9", "1.4.6"],
        &["1.2.8", "2.0.0"],
    );
}

#[test]
fn test_caret() {
    assert_range(
        "^1.2.3",
        &["1.2.3", "1.2.4", "1.5.0+meta"],
        &["1.2.2", "2.0.0", "1.2.3-alpha"],
    );
    assert_range("^0.2.3", &["0.2.3", "0.2.9"], &["0.3.0", "0.2.2"]);
    assert_range("^0.0.3", &["0.0.3"], &["0.0.4", "0.0.2"]);
    assert_range(
        "^1.2.3-beta.2",
        &["1.2.3-beta.2", "1.2.3-beta.4", "1.2.3", "1.9.9"],
        &["1.2.3-beta.1", "1.2.4-beta.2", "2.0.0"],
    );
}

#[test]
fn test_tilde() {
    assert_range("~1.2", &["1.2.0", "1.2.99"], &["1.3.0", "1.1.9"]);
    assert_range("~1.2.3", &["1.2.3", "1.2.10"], &["1.3.0", "1.2.2"]);
    assert_range("~1", &["1.0.0", "1.99.99"], &["2.0.0", "0.9.9"]);
    assert_range("~> 1.2.3", &["1.2.5"], &["1.3.0"]);
}

#[test]
fn test_hyphen() {
    assert_range(
        "1.0.0 - 2.0.0",
        &["1.0.0", "2.0.0", "1.9.9"],
        &["2.0.1", "0.9.9"],
    );
    assert_range("1.0 - 2.5", &["1.0.0", "2.5.99"], &["2.6.0"]);
    assert_range("1.5.7 - 2", &["1.5.7", "2.99.0"], &["3.0.0", "1.5.6"]);
}

#[test]
fn test_pre_release_visibility() {
    assert_range(">=1.2.3-alpha.2 <1.3.0", &["1.2.3-alpha.2", "1.2.3-alpha.3", "1.2.3"], &["1.2.4-alpha"]);
    assert_range(">=1.0.0 <2.0.0", &["1.2.3"], &["1.2.3-alpha.2"]);
}

#[test]
fn test_wildcards_reject_pre_releases() {
    for range in ["x", "*", "X", ""] {
        assert_range(range, &["0.0.0", "1.2.3", "2147483647.0.0"], &["1.2.3-alpha", "0.0.0-0"]);
    }
    assert_range("1.x", &["1.0.0", "1.9.9"], &["2.0.0", "1.5.0-rc.1"]);
    assert_range("1.2.*", &["1.2.0", "1.2.9"], &["1.3.0"]);
}

#[test]
fn test_whitespace_tolerance() {
    assert_range(">= 1.0.0\t<\t2.0.0", &["1.0.0"], &["2.0.0"]);
    assert_range("  1.0.0   ||   2.0.0  ", &["1.0.0", "2.0.0"], &["1.5.0"]);
}

#[test]
fn test_malformed_ranges() {
    let cases = [
        (">=1.x", RangeErrorReason::WildcardWithOperator(">=".to_string())),
        ("1.x-beta", RangeErrorReason::WildcardWithSuffix),
        ("*+build", RangeErrorReason::WildcardWithSuffix),
        ("1.0.0 ||", RangeErrorReason::EmptyComparatorSet),
        ("<", RangeErrorReason::MissingOperand("<".to_string())),
        ("=>1.0.0", RangeErrorReason::UnknownOperator(">".to_string())),
        ("!1.0.0", RangeErrorReason::UnknownOperator("!".to_string())),
    ];
    for (range, expected) in cases {
        let err = Range::parse(range).unwrap_err();
        assert_eq!(err.reason(), &expected, "{}", range);
        assert_eq!(err.range(), range);
    }
    assert!(Range::parse("1.0.0 - ").is_err());
    assert!("not a range".parse::<Range>().is_err());
}

#[test]
fn test_range_compare() {
    let range = Range::parse(">=1.2.0 <1.4.0").unwrap();
    assert_eq!(range.compare(&v("1.1.0")), Ordering::Less);
    assert_eq!(range.compare(&v("1.2.0")), Ordering::Equal);
    assert_eq!(range.compare(&v("1.3.9")), Ordering::Equal);
    assert_eq!(range.compare(&v("1.4.0")), Ordering::Greater);
    assert_eq!(range.compare(&v("1.3.0-rc.1")), Ordering::Equal);
}

#[test]
fn test_version_satisfies() {
    let range: Range = "^2.1".parse().unwrap();
    assert!(v("2.3.0").satisfies(&range));
    assert!(!v("3.0.0").satisfies(&range));
}

#[test]
fn test_max_satisfying() {
    let versions: Vec<Version> = ["1.0.0", "1.4.2", "1.4.10", "2.0.0-rc.1", "2.0.0", "1.5.0-beta"]
        .iter()
        .map(|s| v(s))
        .collect();

    let range = Range::parse("~1.4 || ^2.0.0-rc.1").unwrap();
    assert_eq!(range.max_satisfying(&versions), Some(&versions[4]));
    assert_eq!(range.min_satisfying(&versions), Some(&versions[1]));
    assert_eq!(range.filter(&versions).len(), 4);
}

#[test]
fn test_shared_memoized_range() {
    let range = Range::parse("^1.0.0 || >=3.0.0-rc.1").unwrap();
    let cache: RwLock<HashMap<Version, bool>> = RwLock::new(HashMap::new());

    std::thread::scope(|scope| {
        for chunk in [["1.0.0", "2.0.0", "3.0.0-rc.2"], ["1.0.0", "3.1.0", "3.1.0-rc.1"]] {
            let range = &range;
            let cache = &cache;
            scope.spawn(move || {
                let memoized = range.memoized(cache);
                for version in chunk {
                    let version = v(version);
                    assert_eq!(memoized.satisfied_by(&version), range.satisfied_by(&version));
                }
            });
        }
    });

    let cache = cache.read().unwrap();
    assert_eq!(cache.len(), 5);
    assert_eq!(cache.get(&v("3.0.0-rc.2")), Some(&true));
    assert_eq!(cache.get(&v("3.1.0-rc.1")), Some(&false));
}

#[test]
fn test_facade_matches_range() {
    let versions = ["1.0.0", "v1.2.0", "1.2.3-beta", "2.0.0"];
    assert_eq!(Semver::satisfied_by(&versions, ">=1.1"), vec!["v1.2.0", "2.0.0"]);
    assert_eq!(Semver::rsort(&versions), vec!["2.0.0", "1.2.3-beta", "v1.2.0", "1.0.0"]);
}
