//! Wildcard query decomposition.

use std::sync::Arc;

use tracing::debug;

use clp_codec::{SchemaV2, VariableEncoding, VariableSchema};
use clp_core::placeholder::is_placeholder;
use clp_core::{
    ByteView, CodecConfig, DEFAULT_MAX_SUBQUERIES, ESCAPE, InputError, Placeholder, RuleVersions,
    VarWidth, VersionError, normalize_wildcard_query,
};

use crate::subquery::{QueryVar, Subquery, VariableWildcardQuery};
use crate::tokenize::{ExactVar, QueryToken, Segment, UnitKind, tokenize, units};

/// Decomposes wildcard queries into subqueries over encoded messages.
///
/// Every token that may be read several ways (static text, integer, float,
/// dictionary variable, or several of those when a wildcard stands for
/// delimiters) multiplies the number of subqueries; the result is capped by
/// [`max_subqueries`](Self::max_subqueries).
#[derive(Debug, Clone)]
pub struct WildcardQueryEncoder<S = SchemaV2> {
    versions: RuleVersions,
    encoding: VariableEncoding,
    schema: S,
    max_subqueries: usize,
}

impl WildcardQueryEncoder {
    /// Eight-byte query encoder for the given version strings.
    pub fn new(schema_version: &str, encoding_version: &str) -> Result<Self, VersionError> {
        let versions = RuleVersions::resolve(schema_version, encoding_version)?;
        Ok(Self::with_versions(versions, VarWidth::Eight))
    }

    pub fn from_config(config: &CodecConfig) -> Result<Self, VersionError> {
        Ok(Self::with_versions(config.resolve()?, config.width).max_subqueries(config.max_subqueries))
    }

    pub fn with_versions(versions: RuleVersions, width: VarWidth) -> Self {
        let schema = match versions {
            RuleVersions::SchemaV2EncodingV1 => SchemaV2,
        };
        Self::with_schema(versions, width, schema)
    }
}

impl<S: VariableSchema> WildcardQueryEncoder<S> {
    pub fn with_schema(versions: RuleVersions, width: VarWidth, schema: S) -> Self {
        Self {
            versions,
            encoding: VariableEncoding::new(width),
            schema,
            max_subqueries: DEFAULT_MAX_SUBQUERIES,
        }
    }

    pub fn max_subqueries(mut self, limit: usize) -> Self {
        self.max_subqueries = limit;
        self
    }

    pub fn versions(&self) -> RuleVersions {
        self.versions
    }

    pub fn encoding(&self) -> VariableEncoding {
        self.encoding
    }

    /// Decompose `query` into subqueries that together match exactly the
    /// messages matching the query.
    ///
    /// `*` matches any run of bytes, `?` one byte, and `\` escapes the next
    /// byte.
    pub fn encode(&self, query: &[u8]) -> Result<Vec<Subquery>, InputError> {
        let normalized = normalize_wildcard_query(query);
        if normalized.is_empty() {
            return Err(InputError::EmptyQuery);
        }

        let tokenized = tokenize(&self.schema, self.encoding, &normalized, self.max_subqueries)?;
        let tokens = tokenized.tokens;
        let total = tokens
            .iter()
            .try_fold(1usize, |total, token| total.checked_mul(token.choices.len()))
            .filter(|&total| total <= self.max_subqueries);
        let Some(total) = total else {
            debug!(
                query_len = query.len(),
                limit = self.max_subqueries,
                "wildcard query expands to too many subqueries"
            );
            return Err(InputError::TooManySubqueries {
                limit: self.max_subqueries,
            });
        };

        let buffer: Arc<[u8]> = tokenized.buffer.into();
        let query_text = &buffer[..tokenized.query_len];
        let mut choices = vec![0usize; tokens.len()];
        let mut subqueries = Vec::with_capacity(total);
        loop {
            subqueries.push(build_subquery(&buffer, query_text, &tokens, &choices));
            if !advance(&tokens, &mut choices) {
                break;
            }
        }

        debug!(
            query_len = query.len(),
            subqueries = subqueries.len(),
            "encoded wildcard query"
        );
        Ok(subqueries)
    }
}

/// Step to the next combination, first token fastest; false once exhausted.
fn advance(tokens: &[QueryToken], choices: &mut [usize]) -> bool {
    for (token, choice) in tokens.iter().zip(choices.iter_mut()) {
        *choice += 1;
        if *choice < token.choices.len() {
            return true;
        }
        *choice = 0;
    }
    false
}

fn build_subquery(
    buffer: &Arc<[u8]>,
    query: &[u8],
    tokens: &[QueryToken],
    choices: &[usize],
) -> Subquery {
    let view = |range| ByteView::new(Arc::clone(buffer), range);
    let mut logtype = LogtypeQuery::default();
    let mut vars = Vec::new();
    let mut constant_begin = 0;

    for (token, &choice) in tokens.iter().zip(choices) {
        logtype.constant(&query[constant_begin..token.range.start]);
        for segment in &token.choices[choice] {
            match segment {
                Segment::Constant(range) => logtype.constant(&query[range.clone()]),
                Segment::Exact { value: value_range, var } => match *var {
                    ExactVar::Dictionary => {
                        logtype.variable(Placeholder::Dictionary);
                        vars.push(QueryVar::ExactDictionary(view(value_range.clone())));
                    }
                    ExactVar::Encoded(placeholder, value) => {
                        logtype.variable(placeholder);
                        vars.push(QueryVar::ExactEncoded { placeholder, value });
                    }
                },
                Segment::Wildcard {
                    range,
                    placeholder,
                    prefix_star,
                    suffix_star,
                } => {
                    if *prefix_star {
                        logtype.star();
                    }
                    logtype.variable(*placeholder);
                    if *suffix_star {
                        logtype.star();
                    }
                    let pattern = view(range.clone());
                    vars.push(QueryVar::Wildcard(VariableWildcardQuery::new(*placeholder, pattern)));
                }
            }
        }
        constant_begin = token.range.end;
    }
    logtype.constant(&query[constant_begin..]);

    Subquery::new(logtype.bytes, logtype.contains_wildcards, vars)
}

/// Wildcard pattern over logtype wire bytes.
#[derive(Debug, Default)]
struct LogtypeQuery {
    bytes: Vec<u8>,
    contains_wildcards: bool,
    /// Last byte written is an unescaped `*`.
    after_star: bool,
}

impl LogtypeQuery {
    /// Append query text that must match static logtype text.
    fn constant(&mut self, text: &[u8]) {
        for unit in units(text) {
            match unit.kind {
                UnitKind::Star => self.star(),
                UnitKind::Any => {
                    self.bytes.push(b'?');
                    self.contains_wildcards = true;
                    self.after_star = false;
                }
                UnitKind::Literal(b) => self.literal(b),
            }
        }
    }

    /// Append a byte as it appears in logtypes, escaped for the pattern.
    fn literal(&mut self, b: u8) {
        self.after_star = false;
        match b {
            b'*' | b'?' => self.bytes.extend_from_slice(&[ESCAPE, b]),
            ESCAPE => self.bytes.extend_from_slice(&[ESCAPE; 4]),
            b if is_placeholder(b) => self.bytes.extend_from_slice(&[ESCAPE, ESCAPE, b]),
            b => self.bytes.push(b),
        }
    }

    /// Append `*`; pieces split at a `*` both carry it, so runs collapse.
    fn star(&mut self) {
        if !self.after_star {
            self.bytes.push(b'*');
        }
        self.contains_wildcards = true;
        self.after_star = true;
    }

    fn variable(&mut self, placeholder: Placeholder) {
        self.bytes.push(placeholder.to_byte());
        self.after_star = false;
    }
}
