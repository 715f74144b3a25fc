//! Version string parsing under configurable dialects

use std::fmt;

use bitflags::bitflags;
use thiserror::Error;

use crate::identifier::{has_leading_zero, is_identifier_byte, is_numeric};
use crate::memo::Memoizer;
use crate::version::{Version, MAX_COMPONENT};

bitflags! {
    /// Dialects accepted by [`VersionParser`]. Flags combine freely.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParseMode: u8 {
        /// Tolerate one leading `v` or `V`
        const ALLOW_PREFIX = 1;
        /// The patch component may be left out and defaults to 0
        const OPTIONAL_PATCH = 1 << 1;
        /// Keep the longest valid prefix and hand back the rest
        const GREEDY = 1 << 2;
    }
}

impl ParseMode {
    /// Exactly the Semantic Versioning 2.0.0 grammar
    pub const STRICT: ParseMode = ParseMode::empty();
}

impl Default for ParseMode {
    fn default() -> Self {
        ParseMode::STRICT
    }
}

bitflags! {
    /// Superset of [`ParseMode`] used by the range builder
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct ParseFlags: u8 {
        const ALLOW_PREFIX = 1;
        const OPTIONAL_PATCH = 1 << 1;
        const GREEDY = 1 << 2;
        /// The minor component may be left out too, only useful with OPTIONAL_PATCH
        const OPTIONAL_MINOR = 1 << 3;
        /// Trio components may be `x`, `X` or `*`
        const ALLOW_WILDCARD = 1 << 4;
    }
}

impl ParseFlags {
    /// Dialect for operands inside a range expression
    pub(crate) const RANGE_OPERAND: ParseFlags = ParseFlags::ALLOW_PREFIX
        .union(ParseFlags::OPTIONAL_PATCH)
        .union(ParseFlags::OPTIONAL_MINOR)
        .union(ParseFlags::ALLOW_WILDCARD);
}

impl From<ParseMode> for ParseFlags {
    fn from(mode: ParseMode) -> Self {
        ParseFlags::from_bits_truncate(mode.bits())
    }
}

/// What went wrong while parsing a version string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    NullOrEmptyInput,
    InvalidCharacterBeforeTrio,
    InvalidCharacterInTrio,
    LeadingZeroInTrio,
    MissingTrioComponent,
    TrioComponentOverflow,
    MissingPreReleaseIdentifier,
    InvalidPreReleaseIdentifier,
    MissingMetadataItem,
    InvalidMetadataItem,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::NullOrEmptyInput => "empty version string",
            ParseErrorKind::InvalidCharacterBeforeTrio => "invalid character before the version number",
            ParseErrorKind::InvalidCharacterInTrio => "invalid character in the version number",
            ParseErrorKind::LeadingZeroInTrio => "leading zero in a version number component",
            ParseErrorKind::MissingTrioComponent => "missing version number component",
            ParseErrorKind::TrioComponentOverflow => "version number component too large",
            ParseErrorKind::MissingPreReleaseIdentifier => "missing pre-release identifier",
            ParseErrorKind::InvalidPreReleaseIdentifier => "invalid pre-release identifier",
            ParseErrorKind::MissingMetadataItem => "missing build metadata item",
            ParseErrorKind::InvalidMetadataItem => "invalid build metadata item",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error type for version parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid version string \"{input}\": {kind} at offset {offset}")]
pub struct ParseError {
    kind: ParseErrorKind,
    input: String,
    offset: usize,
}

impl ParseError {
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }

    /// The string that failed to parse
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Byte offset into [`ParseError::input`] where the problem was found
    pub fn offset(&self) -> usize {
        self.offset
    }
}

/// How a trio component appeared in the parsed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentState {
    /// Written out as a number
    Present,
    /// Left out and defaulted to 0
    Omitted,
    /// Written as `x`, `X` or `*` (range operands only)
    Wildcard,
}

/// Per-component [`ComponentState`] of a successful parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseState {
    pub major: ComponentState,
    pub minor: ComponentState,
    pub patch: ComponentState,
}

impl ParseState {
    fn components(&self) -> [ComponentState; 3] {
        [self.major, self.minor, self.patch]
    }

    /// Number of components written out as numbers
    pub fn specified(&self) -> usize {
        self.components()
            .iter()
            .filter(|state| **state == ComponentState::Present)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.specified() == 3
    }

    pub fn has_wildcard(&self) -> bool {
        self.components().contains(&ComponentState::Wildcard)
    }
}

/// A successful parse: the version, how its trio was written, and any input
/// left over by a greedy parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion<'a> {
    version: Version,
    state: ParseState,
    remainder: &'a str,
}

impl<'a> ParsedVersion<'a> {
    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Unconsumed input after a greedy parse, empty otherwise
    pub fn remainder(&self) -> &'a str {
        self.remainder
    }

    pub fn into_version(self) -> Version {
        self.version
    }
}

/// Entry stored in a parser cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedVersion {
    flags: ParseFlags,
    version: Version,
    state: ParseState,
    consumed: usize,
}

/// Version parser bound to one dialect, optionally backed by a cache
pub struct VersionParser<'c> {
    flags: ParseFlags,
    cache: Option<&'c dyn Memoizer<String, CachedVersion>>,
}

impl Default for VersionParser<'static> {
    fn default() -> Self {
        Self::new(ParseMode::STRICT)
    }
}

impl VersionParser<'static> {
    /// Create a parser for the given dialect
    pub fn new(mode: ParseMode) -> Self {
        Self::with_flags(mode.into())
    }

    pub(crate) fn with_flags(flags: ParseFlags) -> Self {
        VersionParser { flags, cache: None }
    }
}

impl<'c> VersionParser<'c> {
    /// Consult and fill `cache`, keyed by the exact input string
    pub fn with_cache<'d>(self, cache: &'d dyn Memoizer<String, CachedVersion>) -> VersionParser<'d> {
        VersionParser {
            flags: self.flags,
            cache: Some(cache),
        }
    }

    /// The public dialect of this parser
    pub fn mode(&self) -> ParseMode {
        ParseMode::from_bits_truncate(self.flags.bits())
    }

    /// Check if a version string is valid in this dialect
    pub fn is_valid(&self, input: &str) -> bool {
        self.parse_full(input).is_ok()
    }

    /// Parse a version, discarding any greedy remainder
    pub fn parse(&self, input: &str) -> Result<Version, ParseError> {
        self.parse_full(input).map(ParsedVersion::into_version)
    }

    /// Parse a version, returning `None` on failure
    pub fn try_parse(&self, input: &str) -> Option<Version> {
        self.parse(input).ok()
    }

    /// Parse a version and report component states and the greedy remainder
    pub fn parse_full<'a>(&self, input: &'a str) -> Result<ParsedVersion<'a>, ParseError> {
        let text = input.trim();

        if let Some(cache) = self.cache {
            if let Some(hit) = cache.get(&input.to_string()) {
                if hit.flags == self.flags && hit.consumed <= text.len() {
                    log::trace!("Version cache hit for \"{}\"", input);
                    return Ok(ParsedVersion {
                        version: hit.version,
                        state: hit.state,
                        remainder: &text[hit.consumed..],
                    });
                }
            }
        }

        let parsed = self.scan(input, text)?;

        if let Some(cache) = self.cache {
            cache.put(
                input.to_string(),
                CachedVersion {
                    flags: self.flags,
                    version: parsed.version.clone(),
                    state: parsed.state,
                    consumed: text.len() - parsed.remainder.len(),
                },
            );
        }

        Ok(parsed)
    }

    fn scan<'a>(&self, input: &str, text: &'a str) -> Result<ParsedVersion<'a>, ParseError> {
        let leading = input.len() - input.trim_start().len();
        let error = |kind: ParseErrorKind, pos: usize| ParseError {
            kind,
            input: input.to_string(),
            offset: leading + pos,
        };

        if text.is_empty() {
            return Err(error(ParseErrorKind::NullOrEmptyInput, 0));
        }

        let scanned = Scanner::new(text, self.flags)
            .scan()
            .map_err(|err| error(err.kind, err.pos))?;

        // Wildcards and omitted components read as 0
        let number = |item: Option<TrioItem>, state: ComponentState| match (item, state) {
            (Some(TrioItem::Number(value)), ComponentState::Present) => value,
            _ => 0,
        };

        let version = Version::from_validated(
            number(Some(scanned.major), scanned.state.major),
            number(scanned.minor, scanned.state.minor),
            number(scanned.patch, scanned.state.patch),
            scanned.pre_release,
            scanned.metadata,
        );

        Ok(ParsedVersion {
            version,
            state: scanned.state,
            remainder: &text[scanned.consumed..],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrioItem {
    Number(u64),
    Wildcard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    PreRelease,
    Metadata,
}

impl Section {
    fn missing(self) -> ParseErrorKind {
        match self {
            Section::PreRelease => ParseErrorKind::MissingPreReleaseIdentifier,
            Section::Metadata => ParseErrorKind::MissingMetadataItem,
        }
    }

    fn invalid(self) -> ParseErrorKind {
        match self {
            Section::PreRelease => ParseErrorKind::InvalidPreReleaseIdentifier,
            Section::Metadata => ParseErrorKind::InvalidMetadataItem,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ScanError {
    kind: ParseErrorKind,
    pos: usize,
}

#[derive(Debug)]
struct Scanned {
    major: TrioItem,
    minor: Option<TrioItem>,
    patch: Option<TrioItem>,
    state: ParseState,
    pre_release: Vec<String>,
    metadata: Vec<String>,
    consumed: usize,
}

/// Single pass over an already trimmed version string.
///
/// In greedy mode every failure after the major component rewinds to the
/// last position that ended a valid version and stops there.
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
    flags: ParseFlags,
    stopped: bool,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, flags: ParseFlags) -> Self {
        Scanner {
            text,
            pos: 0,
            flags,
            stopped: false,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn greedy(&self) -> bool {
        self.flags.contains(ParseFlags::GREEDY)
    }

    fn is_wildcard(&self, b: u8) -> bool {
        self.flags.contains(ParseFlags::ALLOW_WILDCARD) && matches!(b, b'x' | b'X' | b'*')
    }

    fn error(&self, kind: ParseErrorKind) -> ScanError {
        ScanError { kind, pos: self.pos }
    }

    /// Greedy mode rewinds to `checkpoint` and stops, otherwise the error propagates
    fn stop_or_fail(&mut self, checkpoint: usize, err: ScanError) -> Result<(), ScanError> {
        if !self.greedy() {
            return Err(err);
        }
        self.pos = checkpoint;
        self.stopped = true;
        Ok(())
    }

    fn recover<T>(&mut self, checkpoint: usize, result: Result<T, ScanError>) -> Result<Option<T>, ScanError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => self.stop_or_fail(checkpoint, err).map(|_| None),
        }
    }

    fn scan(mut self) -> Result<Scanned, ScanError> {
        self.prefix()?;
        let major = self.trio_item()?;

        let checkpoint = self.pos;
        let result = self.next_trio_item();
        let minor = self.recover(checkpoint, result)?.flatten();

        let mut patch = None;
        if !self.stopped && minor.is_some() {
            let checkpoint = self.pos;
            let result = self.next_trio_item();
            patch = self.recover(checkpoint, result)?.flatten();
        }

        if !self.stopped && patch.is_some() && !matches!(self.peek(), None | Some(b'-') | Some(b'+')) {
            let err = self.error(ParseErrorKind::InvalidCharacterInTrio);
            let checkpoint = self.pos;
            self.stop_or_fail(checkpoint, err)?;
        }

        let state = self.resolve_states(major, minor, patch)?;

        let mut pre_release = Vec::new();
        if !self.stopped && self.peek() == Some(b'-') {
            if state.has_wildcard() {
                let err = self.error(ParseErrorKind::InvalidPreReleaseIdentifier);
                let checkpoint = self.pos;
                self.stop_or_fail(checkpoint, err)?;
            } else {
                pre_release = self.identifiers(Section::PreRelease)?;
            }
        }

        let mut metadata = Vec::new();
        if !self.stopped && self.peek() == Some(b'+') {
            if state.has_wildcard() {
                let err = self.error(ParseErrorKind::InvalidMetadataItem);
                let checkpoint = self.pos;
                self.stop_or_fail(checkpoint, err)?;
            } else {
                metadata = self.identifiers(Section::Metadata)?;
            }
        }

        if !self.stopped && self.pos < self.text.len() {
            return Err(self.error(ParseErrorKind::InvalidCharacterInTrio));
        }

        Ok(Scanned {
            major,
            minor,
            patch,
            state,
            pre_release,
            metadata,
            consumed: self.pos,
        })
    }

    fn prefix(&mut self) -> Result<(), ScanError> {
        if self.flags.contains(ParseFlags::ALLOW_PREFIX) && matches!(self.peek(), Some(b'v' | b'V')) {
            self.pos += 1;
        }
        match self.peek() {
            None => Err(self.error(ParseErrorKind::MissingTrioComponent)),
            Some(b) if b.is_ascii_digit() || self.is_wildcard(b) => Ok(()),
            Some(_) => Err(self.error(ParseErrorKind::InvalidCharacterBeforeTrio)),
        }
    }

    fn trio_item(&mut self) -> Result<TrioItem, ScanError> {
        match self.peek() {
            None | Some(b'.' | b'-' | b'+') => return Err(self.error(ParseErrorKind::MissingTrioComponent)),
            Some(b) if self.is_wildcard(b) => {
                self.pos += 1;
                return Ok(TrioItem::Wildcard);
            }
            Some(b) if b.is_ascii_digit() => {}
            Some(_) => return Err(self.error(ParseErrorKind::InvalidCharacterInTrio)),
        }

        let start = self.pos;
        let end = self.text.as_bytes()[start..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(self.text.len(), |offset| start + offset);
        let digits = &self.text[start..end];

        if has_leading_zero(digits) {
            if self.greedy() {
                self.pos = start + 1;
                return Ok(TrioItem::Number(0));
            }
            return Err(self.error(ParseErrorKind::LeadingZeroInTrio));
        }

        let value = digits
            .parse::<u64>()
            .ok()
            .filter(|value| *value <= MAX_COMPONENT)
            .ok_or_else(|| self.error(ParseErrorKind::TrioComponentOverflow))?;

        self.pos = end;
        Ok(TrioItem::Number(value))
    }

    /// A `.` followed by a component, or `None` when the trio ends here
    fn next_trio_item(&mut self) -> Result<Option<TrioItem>, ScanError> {
        match self.peek() {
            Some(b'.') => {
                self.pos += 1;
                self.trio_item().map(Some)
            }
            None | Some(b'-') | Some(b'+') => Ok(None),
            Some(_) => Err(self.error(ParseErrorKind::InvalidCharacterInTrio)),
        }
    }

    fn resolve_states(
        &self,
        major: TrioItem,
        minor: Option<TrioItem>,
        patch: Option<TrioItem>,
    ) -> Result<ParseState, ScanError> {
        let major_state = match major {
            TrioItem::Number(_) => ComponentState::Present,
            TrioItem::Wildcard => ComponentState::Wildcard,
        };
        let minor_state = follow(major_state, minor);
        let patch_state = follow(minor_state, patch);

        let lenient = self.greedy();
        if minor_state == ComponentState::Omitted && !(lenient || self.flags.contains(ParseFlags::OPTIONAL_MINOR)) {
            return Err(self.error(ParseErrorKind::MissingTrioComponent));
        }
        if patch_state == ComponentState::Omitted && !(lenient || self.flags.contains(ParseFlags::OPTIONAL_PATCH)) {
            return Err(self.error(ParseErrorKind::MissingTrioComponent));
        }

        Ok(ParseState {
            major: major_state,
            minor: minor_state,
            patch: patch_state,
        })
    }

    /// Dot-separated identifiers; the cursor sits on the leading `-` or `+`
    fn identifiers(&mut self, section: Section) -> Result<Vec<String>, ScanError> {
        let mut items = Vec::new();

        loop {
            let separator = self.pos;
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(is_identifier_byte) {
                self.pos += 1;
            }
            let item = &self.text[start..self.pos];
            let next = self.peek();

            if item.is_empty() {
                let kind = if matches!(next, None | Some(b'.') | Some(b'+')) {
                    section.missing()
                } else {
                    section.invalid()
                };
                let err = self.error(kind);
                self.stop_or_fail(separator, err)?;
                return Ok(items);
            }

            if section == Section::PreRelease && is_numeric(item) && has_leading_zero(item) {
                let err = ScanError {
                    kind: section.invalid(),
                    pos: start,
                };
                self.stop_or_fail(separator, err)?;
                return Ok(items);
            }

            items.push(item.to_string());

            match next {
                None => return Ok(items),
                Some(b'.') => continue,
                Some(b'+') if section == Section::PreRelease => return Ok(items),
                Some(_) => {
                    let err = self.error(section.invalid());
                    let checkpoint = self.pos;
                    self.stop_or_fail(checkpoint, err)?;
                    return Ok(items);
                }
            }
        }
    }
}

/// State of a component given the state of the one to its left
fn follow(left: ComponentState, item: Option<TrioItem>) -> ComponentState {
    match (left, item) {
        (ComponentState::Wildcard, _) => ComponentState::Wildcard,
        (_, Some(TrioItem::Wildcard)) => ComponentState::Wildcard,
        (_, Some(TrioItem::Number(_))) => ComponentState::Present,
        (_, None) => ComponentState::Omitted,
    }
}
