//! Variable schemas: which tokens of a message are variables.

use std::ops::Range;

/// Classifies message tokens as static text or variables.
///
/// A token is a maximal run of non-delimiter bytes. Rules receive the whole
/// text so they may look at context around the token.
pub trait VariableSchema {
    fn is_delimiter(&self, b: u8) -> bool;

    /// Whether `text[token]` is a variable.
    fn is_variable(&self, text: &[u8], token: Range<usize>) -> bool;

    /// Whether a query token that still contains wildcards is a variable
    /// however its wildcards expand.
    fn is_definite_variable(&self, token: &WildcardToken<'_>) -> bool;

    /// Bounds of the first variable token at or after `from`.
    fn next_variable(&self, text: &[u8], from: usize) -> Option<Range<usize>> {
        let mut pos = from;
        loop {
            let rest = text.get(pos..)?;
            let begin = pos + rest.iter().position(|&b| !self.is_delimiter(b))?;
            let end = text[begin..]
                .iter()
                .position(|&b| self.is_delimiter(b))
                .map_or(text.len(), |n| begin + n);
            if self.is_variable(text, begin..end) {
                return Some(begin..end);
            }
            pos = end;
        }
    }
}

/// What a schema sees of a query token containing wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WildcardToken<'a> {
    /// Unescaped literal bytes of the token, wildcards removed.
    pub literal: &'a [u8],
    /// Unescaped literal bytes before the first wildcard.
    pub leading_literal: &'a [u8],
    /// Byte directly before the token, if any.
    pub preceded_by: Option<u8>,
}

/// CLP variables schema V2.
///
/// Delimiters are every byte except `+`, `-`..`9`, `A`..`Z`, `\`, `_` and
/// `a`..`z`. A token is a variable if it
/// - contains a decimal digit,
/// - directly follows `=` and contains a letter, or
/// - could be a multi-digit hex value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchemaV2;

impl VariableSchema for SchemaV2 {
    fn is_delimiter(&self, b: u8) -> bool {
        !(b == b'+'
            || (b'-'..=b'9').contains(&b)
            || b.is_ascii_uppercase()
            || b == b'\\'
            || b == b'_'
            || b.is_ascii_lowercase())
    }

    fn is_variable(&self, text: &[u8], token: Range<usize>) -> bool {
        let value = &text[token.clone()];
        let after_equals = token.start > 0 && text[token.start - 1] == b'=';
        value.iter().any(u8::is_ascii_digit)
            || (after_equals && value.iter().any(u8::is_ascii_alphabetic))
            || could_be_multi_digit_hex(value)
    }

    fn is_definite_variable(&self, token: &WildcardToken<'_>) -> bool {
        token.literal.iter().any(u8::is_ascii_digit)
            || (token.preceded_by == Some(b'=')
                && token.leading_literal.iter().any(u8::is_ascii_alphabetic))
    }
}

/// Whether `value` is at least two hex digits and nothing else.
pub fn could_be_multi_digit_hex(value: &[u8]) -> bool {
    value.len() >= 2 && value.iter().all(u8::is_ascii_hexdigit)
}
