use clp_core::{DecodeError, Placeholder, VarWidth};

use super::encoding::VariableEncoding;

const EIGHT: VariableEncoding = VariableEncoding::new(VarWidth::Eight);
const FOUR: VariableEncoding = VariableEncoding::new(VarWidth::Four);

fn render(encoding: VariableEncoding, placeholder: Placeholder, value: i64) -> String {
    let mut out = Vec::new();
    encoding.render(placeholder, value, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn integers() {
    assert_eq!(EIGHT.encode_integer(b"0"), Some(0));
    assert_eq!(EIGHT.encode_integer(b"123"), Some(123));
    assert_eq!(EIGHT.encode_integer(b"-987"), Some(-987));
    assert_eq!(
        EIGHT.encode_integer(b"9223372036854775807"),
        Some(i64::MAX)
    );
    assert_eq!(
        EIGHT.encode_integer(b"-9223372036854775808"),
        Some(i64::MIN)
    );
}

#[test]
fn non_canonical_integers_rejected() {
    for token in [&b"-0"[..], b"007", b"", b"-", b"+1", b"1a", b"1.0"] {
        assert_eq!(EIGHT.encode_integer(token), None, "{}", token.escape_ascii());
    }
}

#[test]
fn integer_overflow_rejected() {
    assert_eq!(EIGHT.encode_integer(b"9223372036854775808"), None);
    assert_eq!(FOUR.encode_integer(b"2147483648"), None);
    assert_eq!(FOUR.encode_integer(b"-2147483648"), Some(-2147483648));
}

#[test]
fn eight_byte_float_layout() {
    // 4567 digits, 4 digits, point 1 from the right
    assert_eq!(EIGHT.encode_float(b"456.7"), Some((4567 << 8) | (3 << 4)));
    assert_eq!(
        EIGHT.encode_float(b"-1.5"),
        Some(i64::MIN | (15 << 8) | (1 << 4))
    );
}

#[test]
fn four_byte_float_layout() {
    assert_eq!(FOUR.encode_float(b"456.7"), Some((4567 << 6) | (3 << 3)));
    assert_eq!(
        FOUR.encode_float(b"-1.5"),
        Some(i64::from(i32::MIN | (15 << 6) | (1 << 3)))
    );
}

#[test]
fn float_shapes() {
    for token in [&b"1."[..], b"1.2.3", b"123", b".", b"-", b"1e5", b"", b"1,5"] {
        assert_eq!(EIGHT.encode_float(token), None, "{}", token.escape_ascii());
    }
    assert!(EIGHT.encode_float(b".5").is_some());
    assert!(EIGHT.encode_float(b"-0.0").is_some());
}

#[test]
fn float_digit_limits() {
    assert!(EIGHT.encode_float(b"123456789012345.6").is_some());
    assert_eq!(EIGHT.encode_float(b"1234567890123456.7"), None);
    assert!(FOUR.encode_float(b"3355443.1").is_some());
    assert_eq!(FOUR.encode_float(b"3355443.2"), None);
    assert_eq!(FOUR.encode_float(b"123456789.0"), None);
}

#[test]
fn encode_prefers_float() {
    assert_eq!(EIGHT.encode(b"987"), Some((Placeholder::Integer, 987)));
    assert_eq!(
        EIGHT.encode(b"654.3"),
        Some((Placeholder::Float, EIGHT.encode_float(b"654.3").unwrap()))
    );
    assert_eq!(EIGHT.encode(b"dictVar1"), None);
}

#[test]
fn render_restores_original_text() {
    let floats = ["456.7", "-1.5", ".5", "0.50", "-0.0", "00.001", "123456789012345.6"];
    for encoding in [EIGHT, FOUR] {
        for text in floats {
            let Some(value) = encoding.encode_float(text.as_bytes()) else {
                continue;
            };
            assert_eq!(render(encoding, Placeholder::Float, value), text);
        }
        for text in ["0", "-1", "2147483647", "-2147483648"] {
            let value = encoding.encode_integer(text.as_bytes()).unwrap();
            assert_eq!(render(encoding, Placeholder::Integer, value), text);
        }
    }
}

#[test]
fn corrupt_float_rejected() {
    let mut out = b"prefix".to_vec();
    // one digit, decimal point two from the right
    assert_eq!(
        EIGHT.render_float(1, &mut out),
        Err(DecodeError::CorruptFloat(1))
    );
    // digits wider than the digit count
    assert_eq!(
        EIGHT.render_float(100 << 8, &mut out),
        Err(DecodeError::CorruptFloat(100 << 8))
    );
    assert_eq!(out, b"prefix");
}

#[test]
fn four_byte_range_checked_on_render() {
    let mut out = Vec::new();
    assert_eq!(
        FOUR.render_integer(1 << 40, &mut out),
        Err(DecodeError::FourByteOutOfRange(1 << 40))
    );
    assert_eq!(
        FOUR.render_float(1 << 40, &mut out),
        Err(DecodeError::FourByteOutOfRange(1 << 40))
    );
    assert!(out.is_empty());
}
