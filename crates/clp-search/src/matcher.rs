//! Order-preserving match of encoded-variable wildcard queries.

use tracing::{debug, trace};

use clp_codec::VariableEncoding;
use clp_core::flattened::validate_end_offsets;
use clp_core::logtype::typed_encoded_vars;
use clp_core::{DecodeError, InputError, Placeholder, WildcardPattern};

use crate::subquery::Subquery;

/// Batch match error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("row {row}: {source}")]
    Decode {
        row: usize,
        #[source]
        source: DecodeError,
    },
}

/// `k` typed wildcard patterns compiled once and matched against many
/// messages.
///
/// A message matches when its encoded variables contain a subsequence
/// `v1, ..., vk` (in logtype order) where each `vj` has the kind of pattern
/// `j` and its text matches pattern `j`.
#[derive(Debug, Clone)]
pub struct EncodedVarsMatcher {
    encoding: VariableEncoding,
    patterns: Vec<(Placeholder, WildcardPattern)>,
}

impl EncodedVarsMatcher {
    pub fn new<'a, I>(encoding: VariableEncoding, queries: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = (Placeholder, &'a [u8])>,
    {
        let patterns = queries
            .into_iter()
            .map(|(placeholder, pattern)| {
                if !placeholder.is_encoded() {
                    return Err(InputError::NotEncodedPlaceholder(placeholder));
                }
                Ok((placeholder, WildcardPattern::compile(pattern)?))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { encoding, patterns })
    }

    /// Matcher for the encoded wildcard queries of `subquery`.
    pub fn for_subquery(encoding: VariableEncoding, subquery: &Subquery) -> Result<Self, InputError> {
        Self::new(
            encoding,
            subquery
                .encoded_wildcard_queries()
                .map(|query| (query.placeholder(), query.pattern().as_bytes())),
        )
    }

    /// Matcher from serialized parts: one placeholder byte per query and the
    /// patterns stored back to back with their end offsets.
    pub fn from_serialized(
        encoding: VariableEncoding,
        placeholders: &[u8],
        patterns: &[u8],
        end_offsets: &[u32],
    ) -> Result<Self, InputError> {
        if placeholders.len() != end_offsets.len() {
            return Err(InputError::LengthMismatch {
                what: "wildcard query end offsets",
                expected: placeholders.len(),
                actual: end_offsets.len(),
            });
        }
        validate_end_offsets(end_offsets, patterns.len())?;

        let mut begin = 0;
        let mut queries = Vec::with_capacity(placeholders.len());
        for (&b, &end) in placeholders.iter().zip(end_offsets) {
            let end = end as usize;
            queries.push((Placeholder::try_from(b)?, &patterns[begin..end]));
            begin = end;
        }
        Self::new(encoding, queries)
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Match one message. No patterns always matches.
    pub fn matches(&self, logtype: &[u8], encoded_vars: &[i64]) -> Result<bool, DecodeError> {
        let k = self.patterns.len();
        if k == 0 {
            return Ok(true);
        }

        let vars = typed_encoded_vars(logtype, encoded_vars).collect::<Result<Vec<_>, _>>()?;
        if vars.len() < k {
            return Ok(false);
        }

        // matched[j]: the first j patterns match within the variables seen so far
        let mut matched = vec![false; k + 1];
        matched[0] = true;
        let mut text = Vec::new();
        for &(placeholder, value) in &vars {
            let mut rendered = false;
            for j in (1..=k).rev() {
                if matched[j] || !matched[j - 1] {
                    continue;
                }
                let (kind, pattern) = &self.patterns[j - 1];
                if *kind != placeholder {
                    continue;
                }
                if !rendered {
                    text.clear();
                    self.encoding.render(placeholder, value, &mut text)?;
                    rendered = true;
                }
                if pattern.is_match(&text) {
                    matched[j] = true;
                }
            }
            if matched[k] {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Match a batch of messages, writing one result per row.
    ///
    /// Lengths are checked before any row is matched. On error the contents
    /// of `results` are unspecified.
    pub fn match_batch<L, V>(
        &self,
        logtypes: &[L],
        encoded_var_rows: &[V],
        results: &mut [bool],
    ) -> Result<(), MatchError>
    where
        L: AsRef<[u8]>,
        V: AsRef<[i64]>,
    {
        check_batch(logtypes.len(), encoded_var_rows.len(), results.len())?;
        for (row, result) in results.iter_mut().enumerate() {
            *result = self.match_row(row, logtypes[row].as_ref(), encoded_var_rows[row].as_ref())?;
        }
        Ok(())
    }

    /// Like [`match_batch`](Self::match_batch) but adds 1 to `counts[row]`
    /// for every matching row.
    pub fn match_batch_counts<L, V>(
        &self,
        logtypes: &[L],
        encoded_var_rows: &[V],
        counts: &mut [u32],
    ) -> Result<(), MatchError>
    where
        L: AsRef<[u8]>,
        V: AsRef<[i64]>,
    {
        check_batch(logtypes.len(), encoded_var_rows.len(), counts.len())?;
        for (row, count) in counts.iter_mut().enumerate() {
            if self.match_row(row, logtypes[row].as_ref(), encoded_var_rows[row].as_ref())? {
                *count += 1;
            }
        }
        Ok(())
    }

    fn match_row(&self, row: usize, logtype: &[u8], encoded_vars: &[i64]) -> Result<bool, MatchError> {
        let matched = self
            .matches(logtype, encoded_vars)
            .map_err(|source| MatchError::Decode { row, source })?;
        trace!(row, matched, "matched encoded variables");
        Ok(matched)
    }
}

fn check_batch(logtypes: usize, rows: usize, results: usize) -> Result<(), InputError> {
    let mismatch = if rows != logtypes {
        Some(("encoded variable rows", rows))
    } else if results != logtypes {
        Some(("batch results", results))
    } else {
        None
    };
    match mismatch {
        Some((what, actual)) => {
            debug!(what, expected = logtypes, actual, "rejected batch input");
            Err(InputError::LengthMismatch {
                what,
                expected: logtypes,
                actual,
            })
        }
        None => Ok(()),
    }
}
