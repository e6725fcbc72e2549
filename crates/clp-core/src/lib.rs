//! Data model and wire formats for CLP-encoded log messages.
//!
//! This crate contains:
//! - Logtype wire format (placeholders, escaping, element iteration)
//! - Encoded messages and their versioned binary record
//! - Byte views and flattened byte sequences
//! - Version tags, codec configuration and wildcard patterns

pub mod byte_view;
pub mod config;
pub mod error;
pub mod flattened;
pub mod logtype;
pub mod message;
pub mod placeholder;
pub mod record;
pub mod version;
pub mod wildcard;

#[cfg(test)]
mod logtype_tests;
#[cfg(test)]
mod wildcard_tests;

// Re-export commonly used items at crate root
pub use byte_view::ByteView;
pub use config::{CodecConfig, DEFAULT_MAX_SUBQUERIES};
pub use error::{DecodeError, EncodeError, InputError};
pub use flattened::FlattenedBytes;
pub use logtype::{LogtypeElement, LogtypeElements, dump_logtype};
pub use message::EncodedMessage;
pub use placeholder::{ESCAPE, Placeholder};
pub use record::{EncodedRecord, RecordError, RecordHeader};
pub use version::{EncodingVersion, RuleVersions, SchemaVersion, VarWidth, VersionError};
pub use wildcard::{WildcardPattern, normalize_wildcard_query, wildcard_match};
