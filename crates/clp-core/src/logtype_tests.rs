use super::error::DecodeError;
use super::logtype::{
    LogtypeElement, PlaceholderCounts, count_placeholders, dump_logtype, elements, push_literal,
    push_placeholder, typed_encoded_vars,
};
use super::placeholder::Placeholder;

enum Part {
    Text(&'static [u8]),
    Var(Placeholder),
}

use Part::{Text, Var};

fn build(parts: &[Part]) -> Vec<u8> {
    let mut logtype = Vec::new();
    for part in parts {
        match part {
            Text(text) => push_literal(&mut logtype, text),
            Var(p) => push_placeholder(&mut logtype, *p),
        }
    }
    logtype
}

#[test]
fn reserved_bytes_are_escaped() {
    let logtype = build(&[Text(b"a\\b\x11c"), Var(Placeholder::Float)]);
    assert_eq!(logtype, b"a\\\\b\\\x11c\x13");
}

#[test]
fn elements_unescape_literals() {
    let logtype = build(&[
        Text(b"x="),
        Var(Placeholder::Integer),
        Text(b" \\ "),
        Var(Placeholder::Dictionary),
    ]);
    let parsed: Vec<_> = elements(&logtype).collect::<Result<_, _>>().unwrap();
    assert_eq!(
        parsed,
        [
            LogtypeElement::Literal(b"x="),
            LogtypeElement::Variable(Placeholder::Integer),
            LogtypeElement::Literal(b" "),
            LogtypeElement::Literal(b"\\ "),
            LogtypeElement::Variable(Placeholder::Dictionary),
        ]
    );
}

#[test]
fn trailing_escape_is_an_error() {
    let mut iter = elements(b"abc\\");
    assert_eq!(iter.next(), Some(Ok(LogtypeElement::Literal(b"abc"))));
    assert_eq!(iter.next(), Some(Err(DecodeError::TrailingEscape)));
    assert_eq!(iter.next(), None);
}

#[test]
fn counts() {
    let logtype = build(&[
        Var(Placeholder::Dictionary),
        Text(b"\x12"),
        Var(Placeholder::Integer),
        Var(Placeholder::Float),
    ]);
    assert_eq!(
        count_placeholders(&logtype).unwrap(),
        PlaceholderCounts {
            dictionary: 1,
            encoded: 2
        }
    );
}

#[test]
fn typed_vars_follow_placeholders() {
    let logtype = build(&[
        Var(Placeholder::Integer),
        Var(Placeholder::Dictionary),
        Var(Placeholder::Float),
    ]);
    let typed: Vec<_> = typed_encoded_vars(&logtype, &[7, 9, 11])
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(typed, [(Placeholder::Integer, 7), (Placeholder::Float, 9)]);
}

#[test]
fn typed_vars_starved() {
    let logtype = build(&[Var(Placeholder::Integer), Var(Placeholder::Integer)]);
    let mut iter = typed_encoded_vars(&logtype, &[1]);
    assert_eq!(iter.next(), Some(Ok((Placeholder::Integer, 1))));
    assert_eq!(iter.next(), Some(Err(DecodeError::TooFewEncodedVars(1))));
    assert_eq!(iter.next(), None);
}

#[test]
fn dump() {
    let logtype = build(&[
        Text(b"Static text, "),
        Var(Placeholder::Dictionary),
        Text(b", "),
        Var(Placeholder::Integer),
        Text(b", "),
        Var(Placeholder::Float),
        Text(b"\t\\"),
    ]);
    insta::assert_snapshot!(dump_logtype(&logtype).unwrap(), @r"Static text, <dict>, <int>, <float>\t\\");
}
