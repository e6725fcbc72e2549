//! Codec configuration.

use serde::{Deserialize, Serialize};

use crate::version::{
    RuleVersions, VARIABLE_ENCODING_METHODS_V1, VARIABLES_SCHEMA_V2, VarWidth, VersionError,
};

/// Default cap on subqueries generated from one wildcard query.
pub const DEFAULT_MAX_SUBQUERIES: usize = 4096;

/// Settings shared by encoders, decoders and query encoders.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodecConfig {
    pub variables_schema_version: String,
    pub variable_encoding_methods_version: String,
    pub width: VarWidth,
    pub max_subqueries: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            variables_schema_version: VARIABLES_SCHEMA_V2.to_owned(),
            variable_encoding_methods_version: VARIABLE_ENCODING_METHODS_V1.to_owned(),
            width: VarWidth::Eight,
            max_subqueries: DEFAULT_MAX_SUBQUERIES,
        }
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn width(mut self, width: VarWidth) -> Self {
        self.width = width;
        self
    }

    pub fn max_subqueries(mut self, limit: usize) -> Self {
        self.max_subqueries = limit;
        self
    }

    /// Validate the version strings.
    pub fn resolve(&self) -> Result<RuleVersions, VersionError> {
        RuleVersions::resolve(
            &self.variables_schema_version,
            &self.variable_encoding_methods_version,
        )
    }
}
