//! Logtype wire format.
//!
//! A logtype is literal text interleaved with [`Placeholder`] bytes. Literal
//! bytes that collide with a placeholder or with [`ESCAPE`] are written as
//! `ESCAPE` followed by the byte, so every byte sequence survives a round trip.
//!
//! Readers never look at raw bytes directly: [`elements`] yields a tagged
//! sequence of literal runs and placeholders.

use std::fmt::Write as _;

use crate::error::DecodeError;
use crate::placeholder::{ESCAPE, Placeholder, needs_escape};

/// One element of a logtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogtypeElement<'a> {
    /// Unescaped literal bytes.
    Literal(&'a [u8]),
    Variable(Placeholder),
}

/// Iterate the elements of a logtype.
pub fn elements(logtype: &[u8]) -> LogtypeElements<'_> {
    LogtypeElements {
        bytes: logtype,
        pos: 0,
    }
}

/// Zero-copy iterator over [`LogtypeElement`]s.
///
/// An escaped byte starts a new literal run, so literal runs never contain
/// escape bytes. Yields [`DecodeError::TrailingEscape`] once and then stops if
/// the logtype ends inside an escape sequence.
#[derive(Clone, Debug)]
pub struct LogtypeElements<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for LogtypeElements<'a> {
    type Item = Result<LogtypeElement<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.bytes;
        let b = *bytes.get(self.pos)?;

        if let Some(placeholder) = Placeholder::from_byte(b) {
            self.pos += 1;
            return Some(Ok(LogtypeElement::Variable(placeholder)));
        }

        let start = if b == ESCAPE {
            if self.pos + 1 >= bytes.len() {
                self.pos = bytes.len();
                return Some(Err(DecodeError::TrailingEscape));
            }
            self.pos + 1
        } else {
            self.pos
        };

        self.pos = start + 1;
        while self.pos < bytes.len() && !needs_escape(bytes[self.pos]) {
            self.pos += 1;
        }
        Some(Ok(LogtypeElement::Literal(&bytes[start..self.pos])))
    }
}

/// Append `literal` to a logtype, escaping reserved bytes.
pub fn push_literal(logtype: &mut Vec<u8>, literal: &[u8]) {
    for &b in literal {
        if needs_escape(b) {
            logtype.push(ESCAPE);
        }
        logtype.push(b);
    }
}

/// Append a variable placeholder to a logtype.
pub fn push_placeholder(logtype: &mut Vec<u8>, placeholder: Placeholder) {
    logtype.push(placeholder.to_byte());
}

/// Placeholder counts of a logtype, by storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaceholderCounts {
    pub dictionary: usize,
    pub encoded: usize,
}

pub fn count_placeholders(logtype: &[u8]) -> Result<PlaceholderCounts, DecodeError> {
    let mut counts = PlaceholderCounts::default();
    for element in elements(logtype) {
        match element? {
            LogtypeElement::Literal(_) => {}
            LogtypeElement::Variable(Placeholder::Dictionary) => counts.dictionary += 1,
            LogtypeElement::Variable(_) => counts.encoded += 1,
        }
    }
    Ok(counts)
}

/// Pair each encoded placeholder of `logtype` with its value, in order.
///
/// Values past the last encoded placeholder are ignored.
pub fn typed_encoded_vars<'a>(logtype: &'a [u8], encoded_vars: &'a [i64]) -> TypedEncodedVars<'a> {
    TypedEncodedVars {
        elements: elements(logtype),
        encoded_vars,
        next: 0,
    }
}

/// Iterator returned by [`typed_encoded_vars`].
#[derive(Clone, Debug)]
pub struct TypedEncodedVars<'a> {
    elements: LogtypeElements<'a>,
    encoded_vars: &'a [i64],
    next: usize,
}

impl Iterator for TypedEncodedVars<'_> {
    type Item = Result<(Placeholder, i64), DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let placeholder = match self.elements.next()? {
                Err(e) => return Some(Err(e)),
                Ok(LogtypeElement::Variable(p)) if p.is_encoded() => p,
                Ok(_) => continue,
            };
            let Some(&value) = self.encoded_vars.get(self.next) else {
                self.elements = elements(&[]);
                return Some(Err(DecodeError::TooFewEncodedVars(self.encoded_vars.len())));
            };
            self.next += 1;
            return Some(Ok((placeholder, value)));
        }
    }
}

/// Render a logtype for humans: placeholders become `<int>`, `<dict>` and
/// `<float>`, literal text is unescaped and non-printable bytes are escaped.
pub fn dump_logtype(logtype: &[u8]) -> Result<String, DecodeError> {
    let mut out = String::new();
    for element in elements(logtype) {
        match element? {
            LogtypeElement::Literal(text) => {
                let _ = write!(out, "{}", text.escape_ascii());
            }
            LogtypeElement::Variable(p) => {
                let _ = write!(out, "<{p}>");
            }
        }
    }
    Ok(out)
}
