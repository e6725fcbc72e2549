//! Wildcard search over CLP-encoded messages.
//!
//! This crate contains:
//! - [`WildcardQueryEncoder`], splitting a wildcard query into OR-ed [`Subquery`]s
//! - [`EncodedVarsMatcher`], matching a subquery's encoded-variable wildcard
//!   queries against batches of messages without decoding them

pub mod matcher;
pub mod query_encoder;
pub mod subquery;
mod tokenize;


// Re-export commonly used items at crate root
pub use matcher::{EncodedVarsMatcher, MatchError};
pub use query_encoder::WildcardQueryEncoder;
pub use subquery::{QueryVar, Subquery, VariableWildcardQuery};
