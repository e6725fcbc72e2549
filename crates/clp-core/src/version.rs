//! Version tags for variable schemas and encoding methods.
//!
//! Version strings are resolved once, when an encoder, decoder or query
//! encoder is built. Everything downstream dispatches on [`RuleVersions`].

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const VARIABLES_SCHEMA_V2: &str = "com.yscope.clp.VariablesSchemaV2";
pub const VARIABLE_ENCODING_METHODS_V1: &str = "com.yscope.clp.VariableEncodingMethodsV1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("unsupported variables schema version: {0:?}")]
    UnsupportedSchema(String),

    #[error("unsupported variable encoding methods version: {0:?}")]
    UnsupportedEncoding(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaVersion {
    V2,
}

impl SchemaVersion {
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        match version {
            VARIABLES_SCHEMA_V2 => Ok(Self::V2),
            _ => Err(VersionError::UnsupportedSchema(version.to_owned())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V2 => VARIABLES_SCHEMA_V2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingVersion {
    V1,
}

impl EncodingVersion {
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        match version {
            VARIABLE_ENCODING_METHODS_V1 => Ok(Self::V1),
            _ => Err(VersionError::UnsupportedEncoding(version.to_owned())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => VARIABLE_ENCODING_METHODS_V1,
        }
    }
}

/// A supported (schema, encoding) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuleVersions {
    #[default]
    SchemaV2EncodingV1,
}

impl RuleVersions {
    pub fn resolve(schema: &str, encoding: &str) -> Result<Self, VersionError> {
        let resolved = match (SchemaVersion::parse(schema)?, EncodingVersion::parse(encoding)?) {
            (SchemaVersion::V2, EncodingVersion::V1) => Self::SchemaV2EncodingV1,
        };
        debug!(schema, encoding, "resolved rule versions");
        Ok(resolved)
    }

    pub fn schema(self) -> SchemaVersion {
        match self {
            Self::SchemaV2EncodingV1 => SchemaVersion::V2,
        }
    }

    pub fn encoding(self) -> EncodingVersion {
        match self {
            Self::SchemaV2EncodingV1 => EncodingVersion::V1,
        }
    }
}

/// Width of packed encoded variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarWidth {
    #[default]
    Eight,
    Four,
}

impl VarWidth {
    pub fn bytes(self) -> usize {
        match self {
            Self::Eight => 8,
            Self::Four => 4,
        }
    }
}
