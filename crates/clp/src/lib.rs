//! CLP: log messages compressed into logtypes and variables, searchable
//! without decompression.
//!
//! # Example
//!
//! ```
//! use clp::{MessageDecoder, MessageEncoder, VARIABLE_ENCODING_METHODS_V1, VARIABLES_SCHEMA_V2};
//!
//! let encoder = MessageEncoder::new(VARIABLES_SCHEMA_V2, VARIABLE_ENCODING_METHODS_V1)?;
//! let message = encoder.encode_to_owned(b"took 12 ms")?;
//! assert_eq!(message.encoded_vars(), &[12]);
//!
//! let decoder = MessageDecoder::new(VARIABLES_SCHEMA_V2, VARIABLE_ENCODING_METHODS_V1)?;
//! assert_eq!(decoder.decode_message(&message)?, b"took 12 ms");
//! # Ok::<(), clp::Error>(())
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub use clp_codec::{
    MessageDecoder, MessageEncoder, SchemaV2, VariableEncoding, VariableSchema, WildcardToken,
};
pub use clp_core::version::{VARIABLE_ENCODING_METHODS_V1, VARIABLES_SCHEMA_V2};
pub use clp_core::{
    ByteView, CodecConfig, DecodeError, EncodeError, EncodedMessage, EncodedRecord,
    FlattenedBytes, InputError, Placeholder, RecordError, RuleVersions, VarWidth, VersionError,
    WildcardPattern, dump_logtype, wildcard_match,
};
pub use clp_search::{
    EncodedVarsMatcher, MatchError, QueryVar, Subquery, VariableWildcardQuery,
    WildcardQueryEncoder,
};

/// Any error raised by the codec or the search engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Version(#[from] VersionError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Match(#[from] MatchError),
}

pub type Result<T> = std::result::Result<T, Error>;
