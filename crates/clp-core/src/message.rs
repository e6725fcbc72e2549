//! Encoded form of one log message.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::flattened::FlattenedBytes;
use crate::logtype::{self, PlaceholderCounts};
use crate::placeholder::Placeholder;

/// A message split into its logtype and variables.
///
/// The `i`-th dictionary placeholder of the logtype refers to
/// `dictionary_vars[i]` and the `i`-th integer or float placeholder to
/// `encoded_vars[i]`. The append methods keep the two in step; values built
/// from raw parts are checked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEncodedMessage", into = "RawEncodedMessage")]
pub struct EncodedMessage {
    logtype: Vec<u8>,
    dictionary_vars: FlattenedBytes,
    encoded_vars: Vec<i64>,
}

#[derive(Serialize, Deserialize)]
struct RawEncodedMessage {
    logtype: Vec<u8>,
    dictionary_vars: FlattenedBytes,
    encoded_vars: Vec<i64>,
}

impl EncodedMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw parts, checking placeholder counts against the variables.
    pub fn from_parts(
        logtype: Vec<u8>,
        dictionary_vars: FlattenedBytes,
        encoded_vars: Vec<i64>,
    ) -> Result<Self, DecodeError> {
        check_counts(
            logtype::count_placeholders(&logtype)?,
            dictionary_vars.len(),
            encoded_vars.len(),
        )?;
        Ok(Self {
            logtype,
            dictionary_vars,
            encoded_vars,
        })
    }

    pub fn logtype(&self) -> &[u8] {
        &self.logtype
    }

    pub fn dictionary_vars(&self) -> &FlattenedBytes {
        &self.dictionary_vars
    }

    pub fn encoded_vars(&self) -> &[i64] {
        &self.encoded_vars
    }

    pub fn into_parts(self) -> (Vec<u8>, FlattenedBytes, Vec<i64>) {
        (self.logtype, self.dictionary_vars, self.encoded_vars)
    }

    /// Reset all three fields, keeping their allocations.
    pub fn clear(&mut self) {
        self.logtype.clear();
        self.dictionary_vars.clear();
        self.encoded_vars.clear();
    }

    /// Append static text to the logtype.
    pub fn append_literal(&mut self, text: &[u8]) {
        logtype::push_literal(&mut self.logtype, text);
    }

    pub fn append_dictionary_var(&mut self, value: &[u8]) {
        logtype::push_placeholder(&mut self.logtype, Placeholder::Dictionary);
        self.dictionary_vars.push(value);
    }

    /// Append an integer or float variable.
    ///
    /// # Panics
    /// Panics if `placeholder` is [`Placeholder::Dictionary`].
    pub fn append_encoded_var(&mut self, placeholder: Placeholder, value: i64) {
        assert!(
            placeholder.is_encoded(),
            "dictionary placeholder given an encoded value"
        );
        logtype::push_placeholder(&mut self.logtype, placeholder);
        self.encoded_vars.push(value);
    }
}

pub(crate) fn check_counts(
    counts: PlaceholderCounts,
    dictionary_vars: usize,
    encoded_vars: usize,
) -> Result<(), DecodeError> {
    if counts.dictionary != dictionary_vars {
        return Err(DecodeError::VariableCountMismatch {
            kind: "dictionary",
            placeholders: counts.dictionary,
            provided: dictionary_vars,
        });
    }
    if counts.encoded != encoded_vars {
        return Err(DecodeError::VariableCountMismatch {
            kind: "encoded",
            placeholders: counts.encoded,
            provided: encoded_vars,
        });
    }
    Ok(())
}

impl TryFrom<RawEncodedMessage> for EncodedMessage {
    type Error = DecodeError;

    fn try_from(raw: RawEncodedMessage) -> Result<Self, Self::Error> {
        Self::from_parts(raw.logtype, raw.dictionary_vars, raw.encoded_vars)
    }
}

impl From<EncodedMessage> for RawEncodedMessage {
    fn from(message: EncodedMessage) -> Self {
        Self {
            logtype: message.logtype,
            dictionary_vars: message.dictionary_vars,
            encoded_vars: message.encoded_vars,
        }
    }
}
