//! Message encoder.

use tracing::debug;

use clp_core::{CodecConfig, EncodeError, EncodedMessage, RuleVersions, VarWidth, VersionError};

use crate::encoding::VariableEncoding;
use crate::schema::{SchemaV2, VariableSchema};

/// Splits messages into a logtype, dictionary variables and encoded variables.
///
/// Immutable after construction; one encoder can serve many threads, each
/// encoding into its own [`EncodedMessage`].
#[derive(Debug, Clone)]
pub struct MessageEncoder<S = SchemaV2> {
    versions: RuleVersions,
    encoding: VariableEncoding,
    schema: S,
}

impl MessageEncoder {
    /// Eight-byte encoder for the given version strings.
    pub fn new(schema_version: &str, encoding_version: &str) -> Result<Self, VersionError> {
        let versions = RuleVersions::resolve(schema_version, encoding_version)?;
        Ok(Self::with_versions(versions, VarWidth::Eight))
    }

    pub fn from_config(config: &CodecConfig) -> Result<Self, VersionError> {
        Ok(Self::with_versions(config.resolve()?, config.width))
    }

    pub fn with_versions(versions: RuleVersions, width: VarWidth) -> Self {
        let schema = match versions {
            RuleVersions::SchemaV2EncodingV1 => SchemaV2,
        };
        Self::with_schema(versions, width, schema)
    }
}

impl<S: VariableSchema> MessageEncoder<S> {
    /// Encoder with a custom variable schema.
    pub fn with_schema(versions: RuleVersions, width: VarWidth, schema: S) -> Self {
        Self {
            versions,
            encoding: VariableEncoding::new(width),
            schema,
        }
    }

    pub fn versions(&self) -> RuleVersions {
        self.versions
    }

    pub fn encoding(&self) -> VariableEncoding {
        self.encoding
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    /// Encode `message` into `out`, overwriting its previous contents.
    ///
    /// Each variable is encoded as a float, else an integer, else stored as a
    /// dictionary variable. On error `out` is left cleared.
    pub fn encode(&self, message: &[u8], out: &mut EncodedMessage) -> Result<(), EncodeError> {
        out.clear();
        if u32::try_from(message.len()).is_err() {
            debug!(len = message.len(), "message too long to encode");
            return Err(EncodeError::MessageTooLong(message.len()));
        }

        let mut constant_begin = 0;
        while let Some(token) = self.schema.next_variable(message, constant_begin) {
            if token.start < constant_begin || token.end <= token.start || token.end > message.len() {
                out.clear();
                debug!(?token, constant_begin, "variable schema returned invalid bounds");
                return Err(EncodeError::InvalidVariableBounds {
                    begin: token.start,
                    end: token.end,
                    previous: constant_begin,
                    len: message.len(),
                });
            }

            out.append_literal(&message[constant_begin..token.start]);
            let value = &message[token.clone()];
            match self.encoding.encode(value) {
                Some((placeholder, encoded)) => out.append_encoded_var(placeholder, encoded),
                None => out.append_dictionary_var(value),
            }
            constant_begin = token.end;
        }
        out.append_literal(&message[constant_begin..]);
        Ok(())
    }

    pub fn encode_to_owned(&self, message: &[u8]) -> Result<EncodedMessage, EncodeError> {
        let mut out = EncodedMessage::new();
        self.encode(message, &mut out)?;
        Ok(out)
    }
}
