//! Character-class rules shared by the parser and the version constructors

/// Bytes allowed inside a pre-release identifier or a metadata item
#[inline]
pub(crate) fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

/// Check whether an identifier consists of ASCII digits only
#[inline]
pub(crate) fn is_numeric(identifier: &str) -> bool {
    !identifier.is_empty() && identifier.bytes().all(|b| b.is_ascii_digit())
}

/// A numeric identifier longer than one digit may not start with `0`
#[inline]
pub(crate) fn has_leading_zero(digits: &str) -> bool {
    digits.len() > 1 && digits.as_bytes()[0] == b'0'
}

/// Check a single build metadata item
pub(crate) fn is_valid_metadata_item(item: &str) -> bool {
    !item.is_empty() && item.bytes().all(is_identifier_byte)
}

/// Check a single pre-release identifier
pub(crate) fn is_valid_pre_release_identifier(identifier: &str) -> bool {
    if !is_valid_metadata_item(identifier) {
        return false;
    }
    !(is_numeric(identifier) && has_leading_zero(identifier))
}
