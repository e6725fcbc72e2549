//! Subqueries produced by decomposing a wildcard query.

use std::fmt::Write as _;

use clp_core::{ByteView, FlattenedBytes, Placeholder};

/// Wildcard pattern scoped to one variable position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableWildcardQuery {
    placeholder: Placeholder,
    pattern: ByteView,
}

impl VariableWildcardQuery {
    pub fn new(placeholder: Placeholder, pattern: ByteView) -> Self {
        Self {
            placeholder,
            pattern,
        }
    }

    /// Kind of variable the pattern targets.
    pub fn placeholder(&self) -> Placeholder {
        self.placeholder
    }

    /// Normalized wildcard pattern (no `**`, no unneeded escapes).
    pub fn pattern(&self) -> &ByteView {
        &self.pattern
    }

    pub fn is_encoded(&self) -> bool {
        self.placeholder.is_encoded()
    }
}

/// One variable position of a subquery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryVar {
    /// Exact dictionary variable value (unescaped).
    ExactDictionary(ByteView),
    ExactEncoded { placeholder: Placeholder, value: i64 },
    Wildcard(VariableWildcardQuery),
}

impl QueryVar {
    pub fn placeholder(&self) -> Placeholder {
        match self {
            Self::ExactDictionary(_) => Placeholder::Dictionary,
            Self::ExactEncoded { placeholder, .. } => *placeholder,
            Self::Wildcard(query) => query.placeholder(),
        }
    }
}

/// One disjunct of a decomposed wildcard query.
///
/// A message matches the subquery when its logtype matches
/// [`logtype_query`](Self::logtype_query) and its variables match
/// [`vars`](Self::vars) in order. Subqueries of one query are OR-ed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subquery {
    logtype_query: Vec<u8>,
    logtype_query_contains_wildcards: bool,
    vars: Vec<QueryVar>,
}

impl Subquery {
    pub fn new(
        logtype_query: Vec<u8>,
        logtype_query_contains_wildcards: bool,
        vars: Vec<QueryVar>,
    ) -> Self {
        Self {
            logtype_query,
            logtype_query_contains_wildcards,
            vars,
        }
    }

    /// Wildcard pattern over logtype wire bytes.
    pub fn logtype_query(&self) -> &[u8] {
        &self.logtype_query
    }

    pub fn logtype_query_contains_wildcards(&self) -> bool {
        self.logtype_query_contains_wildcards
    }

    /// Variable positions in query order.
    pub fn vars(&self) -> &[QueryVar] {
        &self.vars
    }

    /// Exact dictionary variable values.
    pub fn dictionary_vars(&self) -> impl Iterator<Item = &ByteView> {
        self.vars.iter().filter_map(|var| match var {
            QueryVar::ExactDictionary(value) => Some(value),
            _ => None,
        })
    }

    /// Exact encoded variable values.
    pub fn encoded_vars(&self) -> impl Iterator<Item = i64> {
        self.vars.iter().filter_map(|var| match var {
            QueryVar::ExactEncoded { value, .. } => Some(*value),
            _ => None,
        })
    }

    pub fn wildcard_vars(&self) -> impl Iterator<Item = &VariableWildcardQuery> {
        self.vars.iter().filter_map(|var| match var {
            QueryVar::Wildcard(query) => Some(query),
            _ => None,
        })
    }

    pub fn dictionary_wildcard_queries(&self) -> impl Iterator<Item = &VariableWildcardQuery> {
        self.wildcard_vars().filter(|query| !query.is_encoded())
    }

    pub fn encoded_wildcard_queries(&self) -> impl Iterator<Item = &VariableWildcardQuery> {
        self.wildcard_vars().filter(|query| query.is_encoded())
    }

    pub fn contains_variables(&self) -> bool {
        !self.vars.is_empty()
    }

    /// Encoded wildcard queries as `(placeholder bytes, patterns)`, the shape
    /// accepted by
    /// [`EncodedVarsMatcher::from_serialized`](crate::EncodedVarsMatcher::from_serialized).
    pub fn serialize_encoded_wildcard_queries(&self) -> (Vec<u8>, FlattenedBytes) {
        let mut placeholders = Vec::new();
        let mut patterns = FlattenedBytes::new();
        for query in self.encoded_wildcard_queries() {
            placeholders.push(query.placeholder().to_byte());
            patterns.push(query.pattern());
        }
        (placeholders, patterns)
    }

    /// Human-readable form for tests and debugging.
    pub fn dump(&self) -> String {
        let mut out = String::from("logtype_query: ");
        for &b in &self.logtype_query {
            match Placeholder::from_byte(b) {
                Some(p) => {
                    let _ = write!(out, "<{p}>");
                }
                None if b == b' ' || b.is_ascii_graphic() => out.push(b as char),
                None => {
                    let _ = write!(out, "\\x{b:02x}");
                }
            }
        }
        if self.logtype_query_contains_wildcards {
            out.push_str(" [wildcards]");
        }
        for var in &self.vars {
            out.push_str("\n  ");
            match var {
                QueryVar::ExactDictionary(value) => {
                    let _ = write!(out, "dict \"{}\"", value.escape_ascii());
                }
                QueryVar::ExactEncoded { placeholder, value } => {
                    let _ = write!(out, "{placeholder} {value}");
                }
                QueryVar::Wildcard(query) => {
                    let _ = write!(
                        out,
                        "wildcard {} \"{}\"",
                        query.placeholder(),
                        query.pattern().escape_ascii()
                    );
                }
            }
        }
        out
    }
}
