use super::error::InputError;
use super::wildcard::{WildcardPattern, normalize_wildcard_query, wildcard_match};

fn matches(pattern: &str, text: &str) -> bool {
    wildcard_match(pattern.as_bytes(), text.as_bytes()).unwrap()
}

#[test]
fn literal_patterns_match_whole_text() {
    assert!(matches("123", "123"));
    assert!(!matches("123", "1234"));
    assert!(!matches("123", "0123"));
    assert!(matches("", ""));
    assert!(!matches("", "a"));
}

#[test]
fn star_matches_any_run() {
    assert!(matches("1*3", "123"));
    assert!(matches("1*3", "13"));
    assert!(matches("1*3", "1000003"));
    assert!(!matches("1*3", "1234"));
    assert!(matches("*", ""));
    assert!(matches("*123*", "x123y"));
    assert!(matches("4*7", "456.7"));
    assert!(!matches("4*7", "456"));
}

#[test]
fn question_mark_matches_one_byte() {
    assert!(matches("1?3", "123"));
    assert!(!matches("1?3", "13"));
    assert!(!matches("1?3", "1223"));
}

#[test]
fn escapes_make_wildcards_literal() {
    assert!(matches(r"a\*b", "a*b"));
    assert!(!matches(r"a\*b", "axb"));
    assert!(matches(r"a\?", "a?"));
    assert!(matches(r"a\\b", r"a\b"));
    assert!(matches(r"a\", r"a\"));
}

#[test]
fn matching_is_byte_oriented() {
    let pattern = WildcardPattern::compile(b"\x11?\xff*").unwrap();
    assert!(pattern.is_match(b"\x11\x80\xff"));
    assert!(pattern.is_match(b"\x11a\xff\x00\x01"));
    assert!(!pattern.is_match(b"\x12a\xff"));
    assert_eq!(pattern.pattern(), b"\x11?\xff*");
}

#[test]
fn compiled_pattern_debug() {
    let pattern = WildcardPattern::compile(b"1*3").unwrap();
    insta::assert_snapshot!(format!("{pattern:?}"), @r#"WildcardPattern("1*3")"#);
}

#[test]
fn normalize_collapses_stars() {
    assert_eq!(normalize_wildcard_query(b"a**b***"), b"a*b*");
    assert_eq!(normalize_wildcard_query(br"\**"), br"\**");
    assert_eq!(normalize_wildcard_query(br"*\**"), br"*\**");
}

#[test]
fn normalize_drops_unneeded_escapes() {
    assert_eq!(normalize_wildcard_query(br"\a\*\?\\"), br"a\*\?\\");
    assert_eq!(normalize_wildcard_query(br"abc\"), b"abc");
    assert_eq!(normalize_wildcard_query(br"\\\"), br"\\");
}

#[test]
fn normalize_empty() {
    assert!(normalize_wildcard_query(b"").is_empty());
    assert!(normalize_wildcard_query(br"\").is_empty());
}

#[test]
fn compile_error_shape() {
    let err = InputError::PatternCompile {
        pattern: "x".to_owned(),
        message: "too big".to_owned(),
    };
    insta::assert_snapshot!(err, @r#"failed to compile wildcard pattern "x": too big"#);
}
