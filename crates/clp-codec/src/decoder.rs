//! Message decoder and encoded-variable search.

use tracing::debug;

use clp_core::logtype::{self, LogtypeElement};
use clp_core::{
    CodecConfig, DecodeError, EncodedMessage, Placeholder, RuleVersions, VarWidth, VersionError,
    WildcardPattern,
};

use crate::encoding::VariableEncoding;

/// Rebuilds messages from their encoded form.
#[derive(Debug, Clone, Copy)]
pub struct MessageDecoder {
    versions: RuleVersions,
    encoding: VariableEncoding,
}

impl MessageDecoder {
    /// Eight-byte decoder for the given version strings.
    pub fn new(schema_version: &str, encoding_version: &str) -> Result<Self, VersionError> {
        let versions = RuleVersions::resolve(schema_version, encoding_version)?;
        Ok(Self::with_versions(versions, VarWidth::Eight))
    }

    pub fn from_config(config: &CodecConfig) -> Result<Self, VersionError> {
        Ok(Self::with_versions(config.resolve()?, config.width))
    }

    pub fn with_versions(versions: RuleVersions, width: VarWidth) -> Self {
        Self {
            versions,
            encoding: VariableEncoding::new(width),
        }
    }

    pub fn versions(&self) -> RuleVersions {
        self.versions
    }

    pub fn encoding(&self) -> VariableEncoding {
        self.encoding
    }

    /// Decode a message from its parts.
    ///
    /// `dictionary_vars` may be a [`FlattenedBytes`](clp_core::FlattenedBytes)
    /// or any exact-size sequence of byte strings.
    pub fn decode<'d, D>(
        &self,
        logtype: &[u8],
        dictionary_vars: D,
        encoded_vars: &[i64],
    ) -> Result<Vec<u8>, DecodeError>
    where
        D: IntoIterator<Item = &'d [u8]>,
        D::IntoIter: ExactSizeIterator,
    {
        let mut out = Vec::with_capacity(logtype.len());
        self.decode_into(logtype, dictionary_vars, encoded_vars, &mut out)?;
        Ok(out)
    }

    /// Append the decoded message to `out`; on error `out` is unchanged.
    pub fn decode_into<'d, D>(
        &self,
        logtype: &[u8],
        dictionary_vars: D,
        encoded_vars: &[i64],
        out: &mut Vec<u8>,
    ) -> Result<(), DecodeError>
    where
        D: IntoIterator<Item = &'d [u8]>,
        D::IntoIter: ExactSizeIterator,
    {
        let start = out.len();
        let result = self.decode_elements(logtype, dictionary_vars.into_iter(), encoded_vars, out);
        if let Err(e) = &result {
            out.truncate(start);
            debug!(error = %e, "failed to decode message");
        }
        result
    }

    pub fn decode_message(&self, message: &EncodedMessage) -> Result<Vec<u8>, DecodeError> {
        self.decode(
            message.logtype(),
            message.dictionary_vars(),
            message.encoded_vars(),
        )
    }

    fn decode_elements<'d>(
        &self,
        logtype: &[u8],
        mut dictionary_vars: impl ExactSizeIterator<Item = &'d [u8]>,
        encoded_vars: &[i64],
        out: &mut Vec<u8>,
    ) -> Result<(), DecodeError> {
        let counts = logtype::count_placeholders(logtype)?;
        let provided = dictionary_vars.len();
        let dictionary_mismatch = || DecodeError::VariableCountMismatch {
            kind: "dictionary",
            placeholders: counts.dictionary,
            provided,
        };
        if counts.dictionary != provided {
            return Err(dictionary_mismatch());
        }
        if counts.encoded != encoded_vars.len() {
            return Err(DecodeError::VariableCountMismatch {
                kind: "encoded",
                placeholders: counts.encoded,
                provided: encoded_vars.len(),
            });
        }

        let mut encoded = encoded_vars.iter();
        for element in logtype::elements(logtype) {
            match element? {
                LogtypeElement::Literal(text) => out.extend_from_slice(text),
                LogtypeElement::Variable(Placeholder::Dictionary) => {
                    let value = dictionary_vars.next().ok_or_else(dictionary_mismatch)?;
                    out.extend_from_slice(value);
                }
                LogtypeElement::Variable(placeholder) => {
                    let &value = encoded
                        .next()
                        .ok_or(DecodeError::TooFewEncodedVars(encoded_vars.len()))?;
                    self.encoding.render(placeholder, value, out)?;
                }
            }
        }
        Ok(())
    }

    /// Check whether any encoded variable of kind `placeholder` matches
    /// `pattern` once rendered as text.
    ///
    /// Dictionary placeholders never match here.
    pub fn matches_any_encoded_var(
        &self,
        placeholder: Placeholder,
        pattern: &WildcardPattern,
        logtype: &[u8],
        encoded_vars: &[i64],
    ) -> Result<bool, DecodeError> {
        let mut text = Vec::new();
        for var in logtype::typed_encoded_vars(logtype, encoded_vars) {
            let (kind, value) = var?;
            if kind != placeholder {
                continue;
            }
            text.clear();
            self.encoding.render(kind, value, &mut text)?;
            if pattern.is_match(&text) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn matches_any_int(
        &self,
        pattern: &WildcardPattern,
        logtype: &[u8],
        encoded_vars: &[i64],
    ) -> Result<bool, DecodeError> {
        self.matches_any_encoded_var(Placeholder::Integer, pattern, logtype, encoded_vars)
    }

    pub fn matches_any_float(
        &self,
        pattern: &WildcardPattern,
        logtype: &[u8],
        encoded_vars: &[i64],
    ) -> Result<bool, DecodeError> {
        self.matches_any_encoded_var(Placeholder::Float, pattern, logtype, encoded_vars)
    }
}
