//! Error types shared by the encoder, decoder and search crates.

use crate::placeholder::Placeholder;

/// Errors from encoding a raw message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("message of {0} bytes exceeds the maximum encodable length of {max} bytes", max = u32::MAX)]
    MessageTooLong(usize),

    #[error(
        "variable schema returned invalid token bounds {begin}..{end} \
         (message length {len}, previous token end {previous})"
    )]
    InvalidVariableBounds {
        begin: usize,
        end: usize,
        previous: usize,
        len: usize,
    },
}

/// Errors from decoding or scanning an encoded message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("logtype has {placeholders} {kind} placeholders but {provided} {kind} variables were given")]
    VariableCountMismatch {
        kind: &'static str,
        placeholders: usize,
        provided: usize,
    },

    #[error("logtype references more encoded variables than the {0} provided")]
    TooFewEncodedVars(usize),

    #[error("logtype ends with a dangling escape byte")]
    TrailingEscape,

    #[error("corrupt encoded float {0:#018x}: decimal point lies beyond its digits")]
    CorruptFloat(u64),

    #[error("encoded variable {0} is out of range for four-byte encoding")]
    FourByteOutOfRange(i64),
}

/// Errors from caller-supplied query or batch input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("wildcard query cannot be empty")]
    EmptyQuery,

    #[error("{what}: expected {expected} entries, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("end offset {offset} at index {index} is less than the previous end offset {previous}")]
    NonMonotonicOffset {
        index: usize,
        offset: u32,
        previous: u32,
    },

    #[error("end offset {offset} at index {index} exceeds buffer length {len}")]
    OffsetOutOfBounds { index: usize, offset: u32, len: usize },

    #[error("invalid variable placeholder byte {0:#04x}")]
    InvalidPlaceholder(u8),

    #[error("{0} variables are not encoded variables")]
    NotEncodedPlaceholder(Placeholder),

    #[error("failed to compile wildcard pattern {pattern:?}: {message}")]
    PatternCompile { pattern: String, message: String },

    #[error("query expands to more than {limit} subqueries")]
    TooManySubqueries { limit: usize },
}
