//! Wildcard patterns compiled to DFAs.
//!
//! Syntax: `*` matches zero or more bytes, `?` matches exactly one byte and `\`
//! makes the next byte literal. A trailing lone `\` is a literal backslash.
//! Matching is byte-oriented and anchored at both ends.

use std::fmt;

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::nfa::thompson;
use regex_automata::{Anchored, Input};
use regex_syntax::hir::{Dot, Hir, Look, Repetition};

use crate::error::InputError;
use crate::placeholder::ESCAPE;

/// A wildcard pattern compiled once and matched many times.
#[derive(Clone)]
pub struct WildcardPattern {
    pattern: Vec<u8>,
    dfa: dense::DFA<Vec<u32>>,
}

impl WildcardPattern {
    pub fn compile(pattern: &[u8]) -> Result<Self, InputError> {
        let compile_error = |message: String| InputError::PatternCompile {
            pattern: pattern.escape_ascii().to_string(),
            message,
        };

        let nfa = thompson::Compiler::new()
            .configure(thompson::Config::new().utf8(false))
            .build_from_hir(&to_hir(pattern))
            .map_err(|e| compile_error(e.to_string()))?;
        let dfa = dense::DFA::builder()
            .configure(dense::DFA::config().start_kind(StartKind::Anchored))
            .build_from_nfa(&nfa)
            .map_err(|e| compile_error(e.to_string()))?;

        Ok(Self {
            pattern: pattern.to_vec(),
            dfa,
        })
    }

    /// Check whether the whole of `text` matches.
    pub fn is_match(&self, text: &[u8]) -> bool {
        let input = Input::new(text).anchored(Anchored::Yes);
        // The DFA has no quit bytes, so the search cannot fail.
        matches!(self.dfa.try_search_fwd(&input), Ok(Some(_)))
    }

    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }
}

impl fmt::Debug for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WildcardPattern")
            .field(&self.pattern.escape_ascii().to_string())
            .finish()
    }
}

/// One-shot match; compile a [`WildcardPattern`] when matching repeatedly.
pub fn wildcard_match(pattern: &[u8], text: &[u8]) -> Result<bool, InputError> {
    Ok(WildcardPattern::compile(pattern)?.is_match(text))
}

fn to_hir(pattern: &[u8]) -> Hir {
    let mut parts = Vec::new();
    let mut literal = Vec::new();
    let mut bytes = pattern.iter().copied();

    while let Some(b) = bytes.next() {
        match b {
            b'*' | b'?' => {
                if !literal.is_empty() {
                    parts.push(Hir::literal(std::mem::take(&mut literal)));
                }
                let any = Hir::dot(Dot::AnyByte);
                parts.push(match b {
                    b'*' => Hir::repetition(Repetition {
                        min: 0,
                        max: None,
                        greedy: true,
                        sub: Box::new(any),
                    }),
                    _ => any,
                });
            }
            ESCAPE => literal.push(bytes.next().unwrap_or(ESCAPE)),
            _ => literal.push(b),
        }
    }

    if !literal.is_empty() {
        parts.push(Hir::literal(literal));
    }
    parts.push(Hir::look(Look::End));
    Hir::concat(parts)
}

/// Canonical form of a wildcard query.
///
/// Runs of `*` collapse to one, escapes are kept only before `*`, `?` and `\`,
/// and a trailing lone `\` is dropped.
pub fn normalize_wildcard_query(query: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(query.len());
    let mut after_star = false;
    let mut i = 0;

    while i < query.len() {
        let b = query[i];
        match b {
            b'*' => {
                if !after_star {
                    out.push(b);
                }
                after_star = true;
                i += 1;
                continue;
            }
            ESCAPE => {
                match query.get(i + 1) {
                    Some(&next @ (b'*' | b'?' | ESCAPE)) => out.extend_from_slice(&[ESCAPE, next]),
                    Some(&next) => out.push(next),
                    None => {}
                }
                i += 2;
            }
            _ => {
                out.push(b);
                i += 1;
            }
        }
        after_star = false;
    }
    out
}
