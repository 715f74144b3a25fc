//! Range expression parsing and shorthand expansion

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::{Comparator, ComparatorSet, Operator};
use crate::version::{TrioComponent, Version, MAX_COMPONENT};
use crate::version_parser::{ParseError, ParseErrorKind, ParseFlags, ParseState, VersionParser};

/// Why a range expression was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeErrorReason {
    #[error("empty comparator set")]
    EmptyComparatorSet,
    #[error("unknown operator \"{0}\"")]
    UnknownOperator(String),
    #[error("missing version after operator \"{0}\"")]
    MissingOperand(String),
    #[error("wildcard versions cannot be combined with operator \"{0}\"")]
    WildcardWithOperator(String),
    #[error("wildcard versions cannot carry pre-release identifiers or build metadata")]
    WildcardWithSuffix,
    #[error("pre-release identifiers and build metadata need a complete major.minor.patch")]
    IncompleteVersionWithSuffix,
    #[error("malformed hyphen range")]
    MalformedHyphenRange,
    #[error("{0}")]
    InvalidVersion(ParseError),
}

/// Error type for range parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Could not parse version range \"{range}\" at offset {offset}: {reason}")]
pub struct RangeError {
    range: String,
    offset: usize,
    reason: RangeErrorReason,
}

impl RangeError {
    /// The range expression that failed to parse
    pub fn range(&self) -> &str {
        &self.range
    }

    /// Byte offset of the offending token
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reason(&self) -> &RangeErrorReason {
        &self.reason
    }
}

lazy_static! {
    static ref OR_SPLIT_RE: Regex = Regex::new(r"\s*\|\|\s*").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();

    // Hyphen range, the dash must be surrounded by whitespace
    static ref HYPHEN_RE: Regex = Regex::new(r"^(?P<from>\S+)\s+-\s+(?P<to>\S+)$").unwrap();

    // Operator followed by optional whitespace and the operand
    static ref COMPARATOR_RE: Regex = Regex::new(r"(?s)^(?P<op>~>|>=|<=|[~^<>=])?\s*(?P<version>.*)$").unwrap();

    // A token made of an operator only, its operand follows after whitespace
    static ref BARE_OPERATOR_RE: Regex = Regex::new(r"^(?:~>|>=|<=|[~^<>=])$").unwrap();
}

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '~', '^', '!', '|'];

/// Split `text` around `re`, keeping the byte offset of every piece
fn split_with_offsets<'a>(re: &Regex, text: &'a str) -> Vec<(usize, &'a str)> {
    let mut parts = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        parts.push((last, &text[last..m.start()]));
        last = m.end();
    }
    parts.push((last, &text[last..]));
    parts
}

/// Operand of a comparator after parsing with the range dialect
struct Operand {
    version: Version,
    state: ParseState,
}

impl Operand {
    fn specified(&self) -> usize {
        self.state.specified()
    }

    fn major(&self) -> u64 {
        self.version.major()
    }

    fn minor(&self) -> u64 {
        self.version.minor()
    }

    fn patch(&self) -> u64 {
        self.version.patch()
    }

    /// The operand with unspecified components zeroed, pre-release kept
    fn floor(&self) -> Version {
        self.version.clone()
    }

    /// The first release above everything the written components cover:
    /// `1.2` gives `1.3.0`, `1` gives `2.0.0`, `1.2.3` gives `1.2.4`
    fn ceiling(&self) -> Option<Version> {
        match self.specified() {
            0 => None,
            1 => next_release(self.major(), 0, 0, TrioComponent::Major),
            2 => next_release(self.major(), self.minor(), 0, TrioComponent::Minor),
            _ => next_release(self.major(), self.minor(), self.patch(), TrioComponent::Patch),
        }
    }
}

/// Bump one component and zero those to its right, `None` past the maximum
fn next_release(major: u64, minor: u64, patch: u64, component: TrioComponent) -> Option<Version> {
    let (major, minor, patch) = match component {
        TrioComponent::Major => (major + 1, 0, 0),
        TrioComponent::Minor => (major, minor + 1, 0),
        TrioComponent::Patch => (major, minor, patch + 1),
    };
    if major > MAX_COMPONENT || minor > MAX_COMPONENT || patch > MAX_COMPONENT {
        return None;
    }
    Some(Version::from_trio(major, minor, patch))
}

/// A comparator nothing can satisfy
fn unsatisfiable() -> Comparator {
    Comparator::new(
        Operator::LessThan,
        Version::from_validated(0, 0, 0, vec!["0".to_string()], Vec::new()),
    )
}

fn at_least(version: Version) -> Comparator {
    Comparator::new(Operator::GreaterThanOrEqual, version)
}

fn below(version: Option<Version>) -> Option<Comparator> {
    version.map(|version| Comparator::new(Operator::LessThan, version))
}

/// Builds normalized comparator sets from a range expression
pub(crate) struct RangeParser<'a> {
    input: &'a str,
    operand_parser: VersionParser<'static>,
}

impl<'a> RangeParser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        RangeParser {
            input,
            operand_parser: VersionParser::with_flags(ParseFlags::RANGE_OPERAND),
        }
    }

    fn error(&self, offset: usize, reason: RangeErrorReason) -> RangeError {
        RangeError {
            range: self.input.to_string(),
            offset,
            reason,
        }
    }

    /// Parse the whole expression into OR-ed comparator sets
    pub(crate) fn parse(&self) -> Result<Vec<ComparatorSet>, RangeError> {
        if self.input.trim().is_empty() {
            return Ok(vec![ComparatorSet::any()]);
        }

        let mut sets = Vec::new();
        for (offset, segment) in split_with_offsets(&OR_SPLIT_RE, self.input) {
            let text = segment.trim();
            let offset = offset + (segment.len() - segment.trim_start().len());
            if text.is_empty() {
                return Err(self.error(offset, RangeErrorReason::EmptyComparatorSet));
            }
            sets.push(self.parse_comparator_set(offset, text)?);
        }

        log::debug!(
            "Parsed range \"{}\" into {} comparator set(s)",
            self.input,
            sets.len()
        );
        Ok(sets)
    }

    fn parse_comparator_set(&self, offset: usize, text: &str) -> Result<ComparatorSet, RangeError> {
        if let Some(caps) = HYPHEN_RE.captures(text) {
            let (Some(from), Some(to)) = (caps.name("from"), caps.name("to")) else {
                return Err(self.error(offset, RangeErrorReason::MalformedHyphenRange));
            };
            let comparators = self.expand_hyphen(offset + from.start(), from.as_str(), offset + to.start(), to.as_str())?;
            return Ok(ComparatorSet::new(comparators));
        }

        let words = split_with_offsets(&WHITESPACE_RE, text);
        let mut comparators = Vec::new();
        let mut i = 0;
        while i < words.len() {
            let (start, word) = words[i];

            if word == "-" {
                return Err(self.error(offset + start, RangeErrorReason::MalformedHyphenRange));
            }

            // Rejoin an operator written apart from its operand, e.g. `>= 1.0.0`
            let token = if BARE_OPERATOR_RE.is_match(word) {
                let Some(&(next_start, next)) = words.get(i + 1) else {
                    return Err(self.error(offset + start, RangeErrorReason::MissingOperand(word.to_string())));
                };
                i += 1;
                &text[start..next_start + next.len()]
            } else {
                word
            };

            comparators.extend(self.expand_token(offset + start, token)?);
            i += 1;
        }

        Ok(ComparatorSet::new(comparators))
    }

    fn parse_operand(&self, offset: usize, text: &str) -> Result<Operand, RangeError> {
        if text.starts_with(OPERATOR_CHARS) {
            let operator: String = text.chars().take_while(|c| OPERATOR_CHARS.contains(c)).collect();
            return Err(self.error(offset, RangeErrorReason::UnknownOperator(operator)));
        }

        let parsed = self.operand_parser.parse_full(text).map_err(|err| {
            let bytes = text.as_bytes();
            let after_wildcard = err.offset() > 0
                && matches!(bytes.get(err.offset() - 1), Some(b'x' | b'X' | b'*'))
                && matches!(bytes.get(err.offset()), Some(b'-' | b'+'));
            let suffix_error = matches!(
                err.kind(),
                ParseErrorKind::InvalidPreReleaseIdentifier | ParseErrorKind::InvalidMetadataItem
            );
            if after_wildcard && suffix_error {
                self.error(offset + err.offset(), RangeErrorReason::WildcardWithSuffix)
            } else {
                self.error(offset + err.offset(), RangeErrorReason::InvalidVersion(err))
            }
        })?;

        let state = parsed.state();
        let version = parsed.into_version();
        if !state.is_complete() && !state.has_wildcard() && (version.is_prerelease() || !version.metadata().is_empty()) {
            return Err(self.error(offset, RangeErrorReason::IncompleteVersionWithSuffix));
        }

        // Build metadata never influences matching
        let version = Version::from_validated(
            version.major(),
            version.minor(),
            version.patch(),
            version.pre_release().to_vec(),
            Vec::new(),
        );

        Ok(Operand { version, state })
    }

    fn expand_token(&self, offset: usize, token: &str) -> Result<Vec<Comparator>, RangeError> {
        let Some(caps) = COMPARATOR_RE.captures(token) else {
            return Err(self.error(offset, RangeErrorReason::MissingOperand(token.to_string())));
        };
        let operator = caps.name("op").map_or("", |m| m.as_str());
        let Some(version) = caps.name("version") else {
            return Err(self.error(offset, RangeErrorReason::MissingOperand(operator.to_string())));
        };
        if version.as_str().is_empty() {
            return Err(self.error(offset, RangeErrorReason::MissingOperand(operator.to_string())));
        }

        let operand = self.parse_operand(offset + version.start(), version.as_str())?;

        let comparators = match operator {
            "" => Self::expand_x_range(&operand),
            "=" => {
                if operand.state.has_wildcard() {
                    return Err(self.error(offset, RangeErrorReason::WildcardWithOperator(operator.to_string())));
                }
                Self::expand_x_range(&operand)
            }
            "~" | "~>" => Self::expand_tilde(&operand),
            "^" => Self::expand_caret(&operand),
            _ => {
                if operand.state.has_wildcard() {
                    return Err(self.error(offset, RangeErrorReason::WildcardWithOperator(operator.to_string())));
                }
                let operator = operator
                    .parse::<Operator>()
                    .map_err(|err| self.error(offset, RangeErrorReason::UnknownOperator(err.0)))?;
                Self::expand_primitive(operator, &operand)
            }
        };

        log::trace!("Expanded range token \"{}\" into {:?}", token, comparators);
        Ok(comparators)
    }

    /// `1.2.3` exact, `1.2` / `1.2.x` → `>=1.2.0 <1.3.0`, `*` → unconstrained
    fn expand_x_range(operand: &Operand) -> Vec<Comparator> {
        match operand.specified() {
            3 => vec![Comparator::new(Operator::Equal, operand.floor())],
            0 => Vec::new(),
            _ => std::iter::once(at_least(operand.floor()))
                .chain(below(operand.ceiling()))
                .collect(),
        }
    }

    /// `~1.2.3` → `>=1.2.3 <1.3.0`, `~1.2` → `>=1.2.0 <1.3.0`, `~1` → `>=1.0.0 <2.0.0`
    fn expand_tilde(operand: &Operand) -> Vec<Comparator> {
        let upper = match operand.specified() {
            0 => return Vec::new(),
            1 => next_release(operand.major(), 0, 0, TrioComponent::Major),
            _ => next_release(operand.major(), operand.minor(), 0, TrioComponent::Minor),
        };
        std::iter::once(at_least(operand.floor()))
            .chain(below(upper))
            .collect()
    }

    /// Caret keeps the left-most non-zero written component fixed
    fn expand_caret(operand: &Operand) -> Vec<Comparator> {
        let (major, minor, patch) = (operand.major(), operand.minor(), operand.patch());
        let upper = match operand.specified() {
            0 => return Vec::new(),
            1 => next_release(major, 0, 0, TrioComponent::Major),
            2 if major != 0 => next_release(major, 0, 0, TrioComponent::Major),
            2 => next_release(major, minor, 0, TrioComponent::Minor),
            _ if major != 0 => next_release(major, 0, 0, TrioComponent::Major),
            _ if minor != 0 => next_release(major, minor, 0, TrioComponent::Minor),
            _ => next_release(major, minor, patch, TrioComponent::Patch),
        };
        std::iter::once(at_least(operand.floor()))
            .chain(below(upper))
            .collect()
    }

    /// Plain comparison; partial operands widen the way X-ranges do:
    /// `>1.2` → `>=1.3.0`, `<=1.2` → `<1.3.0`
    fn expand_primitive(operator: Operator, operand: &Operand) -> Vec<Comparator> {
        if operand.state.is_complete() {
            return vec![Comparator::new(operator, operand.floor())];
        }

        match operator {
            Operator::GreaterThan => match operand.ceiling() {
                Some(ceiling) => vec![at_least(ceiling)],
                None => vec![unsatisfiable()],
            },
            Operator::LessThanOrEqual => below(operand.ceiling()).into_iter().collect(),
            Operator::GreaterThanOrEqual | Operator::LessThan | Operator::Equal => {
                vec![Comparator::new(operator, operand.floor())]
            }
        }
    }

    /// `A - B` → `>=A <=B`, with a partial `B` widened to the next release
    fn expand_hyphen(
        &self,
        from_offset: usize,
        from: &str,
        to_offset: usize,
        to: &str,
    ) -> Result<Vec<Comparator>, RangeError> {
        let from = self.parse_operand(from_offset, from)?;
        let to = self.parse_operand(to_offset, to)?;

        let mut comparators = Vec::new();
        if from.specified() > 0 {
            comparators.push(at_least(from.floor()));
        }

        match to.specified() {
            0 => {}
            3 => comparators.push(Comparator::new(Operator::LessThanOrEqual, to.floor())),
            _ => comparators.extend(below(to.ceiling())),
        }

        log::trace!("Expanded hyphen range into {:?}", comparators);
        Ok(comparators)
    }
}
