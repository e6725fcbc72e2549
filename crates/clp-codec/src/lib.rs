//! Log message encoder and decoder.
//!
//! This crate contains:
//! - Variable schemas deciding which tokens are variables ([`VariableSchema`])
//! - Encoding methods packing numeric variables ([`VariableEncoding`])
//! - [`MessageEncoder`] and [`MessageDecoder`], including encoded-variable search

pub mod decoder;
pub mod encoder;
pub mod encoding;
pub mod schema;

#[cfg(test)]
mod encoding_tests;

// Re-export commonly used items at crate root
pub use decoder::MessageDecoder;
pub use encoder::MessageEncoder;
pub use encoding::VariableEncoding;
pub use schema::{SchemaV2, VariableSchema, WildcardToken, could_be_multi_digit_hex};
