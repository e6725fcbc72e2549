//! Tokenization of normalized wildcard queries.
//!
//! A query token is a maximal run of unescaped wildcards and (possibly
//! escaped) non-delimiter bytes. Escaped `*` and `?` are literal delimiters.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use tracing::debug;

use clp_codec::{VariableEncoding, VariableSchema, WildcardToken};
use clp_core::{ESCAPE, InputError, Placeholder};

/// One logical byte of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unit {
    pub begin: usize,
    pub end: usize,
    pub kind: UnitKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnitKind {
    /// Unescaped `*`.
    Star,
    /// Unescaped `?`.
    Any,
    Literal(u8),
}

impl Unit {
    fn literal(&self) -> Option<u8> {
        match self.kind {
            UnitKind::Literal(b) => Some(b),
            _ => None,
        }
    }

    fn is_escaped(&self) -> bool {
        self.end - self.begin == 2
    }
}

pub(crate) fn units(query: &[u8]) -> Vec<Unit> {
    let mut out = Vec::with_capacity(query.len());
    let mut i = 0;
    while i < query.len() {
        let (kind, len) = match query[i] {
            b'*' => (UnitKind::Star, 1),
            b'?' => (UnitKind::Any, 1),
            ESCAPE if i + 1 < query.len() => (UnitKind::Literal(query[i + 1]), 2),
            b => (UnitKind::Literal(b), 1),
        };
        out.push(Unit {
            begin: i,
            end: i + len,
            kind,
        });
        i += len;
    }
    out
}

/// How a wildcard piece may be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Interpretation {
    StaticText,
    Variable(Placeholder),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ExactVar {
    Dictionary,
    Encoded(Placeholder, i64),
}

/// One part of a token's reading, in query order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Segment {
    /// Query text matched against static logtype text.
    Constant(Range<usize>),
    /// Variable without wildcards; `value` indexes the unescaped value in
    /// [`TokenizedQuery::buffer`].
    Exact { value: Range<usize>, var: ExactVar },
    Wildcard {
        range: Range<usize>,
        placeholder: Placeholder,
        prefix_star: bool,
        suffix_star: bool,
    },
}

/// A maximal run of wildcards and non-delimiters with every distinct way it
/// can be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QueryToken {
    pub range: Range<usize>,
    pub choices: Vec<Vec<Segment>>,
}

/// Tokens of a query that hold a variable in some reading; tokens that are
/// always static text are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenizedQuery {
    /// The query followed by unescaped values of escaped exact pieces.
    pub buffer: Vec<u8>,
    pub query_len: usize,
    pub tokens: Vec<QueryToken>,
}

/// What precedes a piece of a token in a matching message.
#[derive(Debug, Clone, Copy)]
enum Context {
    /// The query byte before the token, or `None` at the start of the query.
    Known(Option<u8>),
    /// A delimiter matched by a wildcard.
    AnyDelimiter,
}

/// Splits `query` into tokens and lists the readings of each.
///
/// Inside a token, every `?` and every `*` between two other units may also
/// stand for delimiters. Each such choice splits the token into pieces that
/// are read one by one, and the token's readings are the distinct
/// combinations. More than `limit` readings for one token is an error.
pub(crate) fn tokenize<S: VariableSchema>(
    schema: &S,
    encoding: VariableEncoding,
    query: &[u8],
    limit: usize,
) -> Result<TokenizedQuery, InputError> {
    let units = units(query);
    let is_member = |unit: &Unit| match unit.kind {
        UnitKind::Star | UnitKind::Any => true,
        UnitKind::Literal(b) => !schema.is_delimiter(b),
    };

    let mut tokenizer = Tokenizer {
        schema,
        encoding,
        limit,
        buffer: query.to_vec(),
        escaped_values: HashMap::new(),
    };
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < units.len() {
        if !is_member(&units[i]) {
            i += 1;
            continue;
        }
        let first = i;
        while i < units.len() && is_member(&units[i]) {
            i += 1;
        }

        let run = &units[first..i];
        let range = run[0].begin..run[run.len() - 1].end;
        let preceded_by = first.checked_sub(1).and_then(|p| units[p].literal());
        let choices = tokenizer.choices(run, preceded_by)?;
        if matches!(choices.as_slice(), [only] if matches!(only.as_slice(), [Segment::Constant(_)])) {
            continue;
        }
        tokens.push(QueryToken { range, choices });
    }

    Ok(TokenizedQuery {
        buffer: tokenizer.buffer,
        query_len: query.len(),
        tokens,
    })
}

struct Tokenizer<'s, S> {
    schema: &'s S,
    encoding: VariableEncoding,
    limit: usize,
    buffer: Vec<u8>,
    /// Query range of an escaped exact piece to its value in `buffer`.
    escaped_values: HashMap<Range<usize>, Range<usize>>,
}

impl<S: VariableSchema> Tokenizer<'_, S> {
    fn choices(&mut self, run: &[Unit], preceded_by: Option<u8>) -> Result<Vec<Vec<Segment>>, InputError> {
        let splits: Vec<usize> = run
            .iter()
            .enumerate()
            .filter(|&(i, unit)| match unit.kind {
                UnitKind::Any => true,
                UnitKind::Star => i > 0 && i + 1 < run.len(),
                UnitKind::Literal(_) => false,
            })
            .map(|(i, _)| i)
            .collect();
        if splits.len() >= usize::BITS as usize || 1usize << splits.len() > self.limit {
            return Err(self.too_many());
        }

        let mut seen = HashSet::new();
        let mut choices = Vec::new();
        for mask in 0..1usize << splits.len() {
            let mut partial: Vec<Vec<Segment>> = vec![Vec::new()];
            for slot in self.pieces(run, &splits, mask, preceded_by) {
                if partial.len().checked_mul(slot.len()).is_none_or(|n| n > self.limit) {
                    return Err(self.too_many());
                }
                partial = partial
                    .iter()
                    .flat_map(|prefix| {
                        slot.iter().map(move |segment| {
                            let mut choice = prefix.clone();
                            push_segment(&mut choice, segment.clone());
                            choice
                        })
                    })
                    .collect();
            }
            for choice in partial {
                if seen.insert(choice.clone()) {
                    choices.push(choice);
                }
            }
            if choices.len() > self.limit {
                return Err(self.too_many());
            }
        }
        Ok(choices)
    }

    /// Alternatives for each piece of `run` when the splits selected by
    /// `mask` stand for delimiters.
    fn pieces(
        &mut self,
        run: &[Unit],
        splits: &[usize],
        mask: usize,
        preceded_by: Option<u8>,
    ) -> Vec<Vec<Segment>> {
        let mut slots = Vec::new();
        let mut begin = 0;
        let mut context = Context::Known(preceded_by);
        for (bit, &at) in splits.iter().enumerate() {
            if mask & (1 << bit) == 0 {
                continue;
            }
            // A split `*` ends one piece and starts the next; a split `?` is
            // the delimiter itself.
            let (end, next) = match run[at].kind {
                UnitKind::Star => (at + 1, at),
                _ => (at, at + 1),
            };
            if begin < end {
                slots.push(self.piece(&run[begin..end], context));
            }
            if run[at].kind == UnitKind::Any {
                slots.push(vec![Segment::Constant(run[at].begin..run[at].end)]);
            }
            begin = next;
            context = Context::AnyDelimiter;
        }
        if begin < run.len() {
            slots.push(self.piece(&run[begin..], context));
        }
        slots
    }

    fn piece(&mut self, piece: &[Unit], context: Context) -> Vec<Segment> {
        let range = piece[0].begin..piece[piece.len() - 1].end;
        let literal: Vec<u8> = piece.iter().filter_map(Unit::literal).collect();

        if literal.len() == piece.len() {
            let mut out = Vec::with_capacity(2);
            for is_variable in self.variable_outcomes(context, &literal) {
                out.push(if is_variable {
                    self.exact(piece, range.clone(), &literal)
                } else {
                    Segment::Constant(range.clone())
                });
            }
            return out;
        }

        let preceded_by = match context {
            Context::Known(preceded_by) => preceded_by,
            Context::AnyDelimiter => None,
        };
        interpretations(self.schema, piece, preceded_by, &literal)
            .into_iter()
            .map(|interpretation| match interpretation {
                Interpretation::StaticText => Segment::Constant(range.clone()),
                Interpretation::Variable(placeholder) => Segment::Wildcard {
                    range: range.clone(),
                    placeholder,
                    prefix_star: piece[0].kind == UnitKind::Star,
                    suffix_star: piece[piece.len() - 1].kind == UnitKind::Star,
                },
            })
            .collect()
    }

    /// Distinct answers to "is this literal a variable", static first.
    fn variable_outcomes(&self, context: Context, literal: &[u8]) -> Vec<bool> {
        match context {
            Context::Known(preceded_by) => vec![is_exact_variable(self.schema, preceded_by, literal)],
            Context::AnyDelimiter => {
                let mut outcomes = Vec::with_capacity(2);
                for b in (0..=u8::MAX).filter(|&b| self.schema.is_delimiter(b)) {
                    let outcome = is_exact_variable(self.schema, Some(b), literal);
                    if !outcomes.contains(&outcome) {
                        outcomes.push(outcome);
                    }
                    if outcomes.len() == 2 {
                        break;
                    }
                }
                outcomes.sort_unstable();
                outcomes
            }
        }
    }

    fn exact(&mut self, piece: &[Unit], range: Range<usize>, literal: &[u8]) -> Segment {
        let value = if piece.iter().any(Unit::is_escaped) {
            match self.escaped_values.get(&range) {
                Some(value) => value.clone(),
                None => {
                    let begin = self.buffer.len();
                    self.buffer.extend_from_slice(literal);
                    self.escaped_values.insert(range, begin..self.buffer.len());
                    begin..self.buffer.len()
                }
            }
        } else {
            range
        };
        let var = match self.encoding.encode(literal) {
            Some((placeholder, encoded)) => ExactVar::Encoded(placeholder, encoded),
            None => ExactVar::Dictionary,
        };
        Segment::Exact { value, var }
    }

    fn too_many(&self) -> InputError {
        debug!(limit = self.limit, "wildcard query expands to too many subqueries");
        InputError::TooManySubqueries { limit: self.limit }
    }
}

/// Append a segment, merging constant text that touches or overlaps the
/// previous constant.
fn push_segment(choice: &mut Vec<Segment>, segment: Segment) {
    if let (Some(Segment::Constant(last)), Segment::Constant(next)) = (choice.last_mut(), &segment) {
        if next.start <= last.end {
            last.end = last.end.max(next.end);
            return;
        }
    }
    choice.push(segment);
}

fn is_exact_variable<S: VariableSchema>(schema: &S, preceded_by: Option<u8>, literal: &[u8]) -> bool {
    // Rebuild the unescaped token with its preceding byte for context rules.
    let mut text = Vec::with_capacity(literal.len() + 1);
    text.extend(preceded_by);
    let begin = text.len();
    text.extend_from_slice(literal);
    schema.is_variable(&text, begin..text.len())
}

fn interpretations<S: VariableSchema>(
    schema: &S,
    piece: &[Unit],
    preceded_by: Option<u8>,
    literal: &[u8],
) -> Vec<Interpretation> {
    if piece.iter().all(|unit| unit.kind == UnitKind::Star) {
        return vec![Interpretation::StaticText];
    }

    let leading: Vec<u8> = piece.iter().map_while(Unit::literal).collect();
    let token = WildcardToken {
        literal,
        leading_literal: &leading,
        preceded_by,
    };

    let mut out = Vec::with_capacity(4);
    if !schema.is_definite_variable(&token) {
        out.push(Interpretation::StaticText);
    }
    if could_be_number(piece, false) {
        out.push(Interpretation::Variable(Placeholder::Integer));
    }
    if could_be_number(piece, true) {
        out.push(Interpretation::Variable(Placeholder::Float));
    }
    out.push(Interpretation::Variable(Placeholder::Dictionary));
    out
}

/// Whether some expansion of the piece could be an integer (or a float).
///
/// Literal bytes must be digits, a `-` preceded only by `*`, and for floats
/// at most one `.`.
fn could_be_number(piece: &[Unit], float: bool) -> bool {
    let mut points = 0;
    for (i, unit) in piece.iter().enumerate() {
        match unit.kind {
            UnitKind::Star | UnitKind::Any | UnitKind::Literal(b'0'..=b'9') => {}
            UnitKind::Literal(b'-') if piece[..i].iter().all(|u| u.kind == UnitKind::Star) => {}
            UnitKind::Literal(b'.') if float && points == 0 => points += 1,
            UnitKind::Literal(_) => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use clp_codec::SchemaV2;
    use clp_core::VarWidth;

    use super::*;

    const EIGHT: VariableEncoding = VariableEncoding::new(VarWidth::Eight);

    fn tokens(query: &str) -> Vec<QueryToken> {
        tokenize(&SchemaV2, EIGHT, query.as_bytes(), 64).unwrap().tokens
    }

    /// Readings of a one-token query: `{kind:pattern}` for wildcard
    /// variables, `<kind=value>` for exact ones, static text as is.
    fn readings(query: &str) -> Vec<String> {
        let tokenized = tokenize(&SchemaV2, EIGHT, query.as_bytes(), 64).unwrap();
        let [token] = tokenized.tokens.as_slice() else {
            panic!("expected one token, got {:?}", tokenized.tokens);
        };
        let text = |range: &Range<usize>| String::from_utf8_lossy(&tokenized.buffer[range.clone()]).into_owned();
        token
            .choices
            .iter()
            .map(|choice| {
                choice
                    .iter()
                    .map(|segment| match segment {
                        Segment::Constant(range) => text(range),
                        Segment::Exact {
                            value,
                            var: ExactVar::Dictionary,
                        } => format!("<dict={}>", text(value)),
                        Segment::Exact {
                            var: ExactVar::Encoded(placeholder, value),
                            ..
                        } => format!("<{placeholder}={value}>"),
                        Segment::Wildcard {
                            range, placeholder, ..
                        } => format!("{{{placeholder}:{}}}", text(range)),
                    })
                    .collect()
            })
            .collect()
    }

    use Placeholder::{Float, Integer};

    #[test]
    fn units_pair_escapes() {
        let kinds: Vec<_> = units(br"a\*?*\\").into_iter().map(|u| u.kind).collect();
        assert_eq!(
            kinds,
            [
                UnitKind::Literal(b'a'),
                UnitKind::Literal(b'*'),
                UnitKind::Any,
                UnitKind::Star,
                UnitKind::Literal(b'\\'),
            ]
        );
    }

    #[test]
    fn static_tokens_are_dropped() {
        assert!(tokens("Message with only static text.").is_empty());
        assert!(tokens("* static *").is_empty());
    }

    #[test]
    fn exact_tokens_are_encoded_like_messages() {
        let exact = |range: Range<usize>, var| QueryToken {
            range: range.clone(),
            choices: vec![vec![Segment::Exact { value: range, var }]],
        };
        assert_eq!(
            tokens("x 123 456.7 dictVar1"),
            [
                exact(2..5, ExactVar::Encoded(Integer, 123)),
                exact(6..11, ExactVar::Encoded(Float, EIGHT.encode_float(b"456.7").unwrap())),
                exact(12..20, ExactVar::Dictionary),
            ]
        );
    }

    #[test]
    fn escaped_exact_values_are_appended() {
        let tokenized = tokenize(&SchemaV2, EIGHT, br"a\\1 ", 64).unwrap();
        assert_eq!(
            tokenized.tokens,
            [QueryToken {
                range: 0..4,
                choices: vec![vec![Segment::Exact {
                    value: 5..8,
                    var: ExactVar::Dictionary,
                }]],
            }]
        );
        assert_eq!(&tokenized.buffer[5..], br"a\1");
    }

    #[test]
    fn escaped_wildcards_split_tokens() {
        assert_eq!(tokens(r"12\*34").len(), 2);
    }

    #[test]
    fn numeric_wildcard_token() {
        assert_eq!(readings("*123*"), ["{int:*123*}", "{float:*123*}", "{dict:*123*}"]);
        assert_eq!(readings("*-1*"), ["{int:*-1*}", "{float:*-1*}", "{dict:*-1*}"]);
    }

    #[test]
    fn word_wildcard_token() {
        assert_eq!(readings("abc*"), ["abc*", "{dict:abc*}"]);
        assert_eq!(readings("?"), ["?", "{int:?}", "{float:?}", "{dict:?}"]);
    }

    #[test]
    fn interior_star_may_span_delimiters() {
        assert_eq!(
            readings("a*3"),
            [
                "{dict:a*3}",
                "a*{int:*3}",
                "a*{float:*3}",
                "a*{dict:*3}",
                "{dict:a*}{int:*3}",
                "{dict:a*}{float:*3}",
                "{dict:a*}{dict:*3}",
            ]
        );
        assert_eq!(
            readings("4.*7"),
            [
                "{float:4.*7}",
                "{dict:4.*7}",
                "{float:4.*}{int:*7}",
                "{float:4.*}{float:*7}",
                "{float:4.*}{dict:*7}",
                "{dict:4.*}{int:*7}",
                "{dict:4.*}{float:*7}",
                "{dict:4.*}{dict:*7}",
            ]
        );
    }

    #[test]
    fn question_mark_may_be_a_delimiter() {
        assert_eq!(readings("id?42"), ["{dict:id?42}", "id?<int=42>"]);
        assert_eq!(readings("?-1"), ["{dict:?-1}", "?<int=-1>"]);
        assert_eq!(readings("?abc"), ["?abc", "{dict:?abc}", "?<dict=abc>"]);
    }

    #[test]
    fn question_mark_may_be_an_assignment() {
        // Only a preceding `=` makes a plain word a variable.
        assert_eq!(readings("?xyz"), ["?xyz", "{dict:?xyz}", "?<dict=xyz>"]);
        assert_eq!(readings("x?y"), ["x?y", "{dict:x?y}", "x?<dict=y>"]);
    }

    #[test]
    fn assignment_wildcard_token() {
        let tokens = tokens("key=val*");
        let [QueryToken { range, choices }] = tokens.as_slice() else {
            panic!("expected one token, got {tokens:?}");
        };
        assert_eq!(*range, 4..8);
        assert_eq!(
            choices,
            &[vec![Segment::Wildcard {
                range: 4..8,
                placeholder: Placeholder::Dictionary,
                prefix_star: false,
                suffix_star: true,
            }]]
        );
    }

    #[test]
    fn readings_are_capped() {
        assert_eq!(
            tokenize(&SchemaV2, EIGHT, b"*123*", 2),
            Err(InputError::TooManySubqueries { limit: 2 })
        );
        assert!(tokenize(&SchemaV2, EIGHT, b"a?b?c?d?e?f?", 32).is_err());
        assert!(tokenize(&SchemaV2, EIGHT, b"a*3", 7).is_ok());
    }
}
