//! Variable encoding methods V1.
//!
//! Integers are stored as their value. Floats are packed as
//! `sign | digits | digit count - 1 | decimal point offset from the right - 1`
//! (MSB to LSB):
//!
//! | width | digits  | count  | offset | max digits |
//! |-------|---------|--------|--------|------------|
//! | eight | 54 bits | 4 bits | 4 bits | 16         |
//! | four  | 25 bits | 3 bits | 3 bits | 8          |
//!
//! The sign is the top bit of the width. Four-byte values are kept
//! sign-extended in `i64`.

use clp_core::{DecodeError, Placeholder, VarWidth};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FloatLayout {
    max_digits: usize,
    digit_bits: u32,
    field_bits: u32,
    sign_bit: u32,
}

const EIGHT_BYTE_FLOAT: FloatLayout = FloatLayout {
    max_digits: 16,
    digit_bits: 54,
    field_bits: 4,
    sign_bit: 63,
};

const FOUR_BYTE_FLOAT: FloatLayout = FloatLayout {
    max_digits: 8,
    digit_bits: 25,
    field_bits: 3,
    sign_bit: 31,
};

/// Encoding methods for one variable width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariableEncoding {
    width: VarWidth,
}

impl VariableEncoding {
    pub const fn new(width: VarWidth) -> Self {
        Self { width }
    }

    pub fn width(self) -> VarWidth {
        self.width
    }

    fn float_layout(self) -> FloatLayout {
        match self.width {
            VarWidth::Eight => EIGHT_BYTE_FLOAT,
            VarWidth::Four => FOUR_BYTE_FLOAT,
        }
    }

    /// Encode a variable token, trying float before integer.
    ///
    /// `None` means the token must be stored as a dictionary variable.
    pub fn encode(self, token: &[u8]) -> Option<(Placeholder, i64)> {
        if let Some(value) = self.encode_float(token) {
            return Some((Placeholder::Float, value));
        }
        self.encode_integer(token)
            .map(|value| (Placeholder::Integer, value))
    }

    /// Encode `-?[1-9][0-9]*` or `0` if it fits the width.
    pub fn encode_integer(self, token: &[u8]) -> Option<i64> {
        let (negative, body) = split_sign(token);
        if body.is_empty() || !body.iter().all(u8::is_ascii_digit) {
            return None;
        }
        if body[0] == b'0' && (negative || body.len() > 1) {
            return None;
        }

        let value: i64 = std::str::from_utf8(token).ok()?.parse().ok()?;
        match self.width {
            VarWidth::Eight => Some(value),
            VarWidth::Four => i32::try_from(value).ok().map(i64::from),
        }
    }

    /// Encode a decimal with exactly one `.` that is not last.
    pub fn encode_float(self, token: &[u8]) -> Option<i64> {
        let layout = self.float_layout();
        let (negative, body) = split_sign(token);
        if body.len() > layout.max_digits + 1 {
            return None;
        }

        let mut digits: u64 = 0;
        let mut num_digits = 0usize;
        let mut point_from_right = None;
        for (i, &b) in body.iter().enumerate() {
            match b {
                b'0'..=b'9' => {
                    digits = digits * 10 + u64::from(b - b'0');
                    num_digits += 1;
                }
                b'.' if point_from_right.is_none() => point_from_right = Some(body.len() - 1 - i),
                _ => return None,
            }
        }

        let point = point_from_right.filter(|&p| p > 0)?;
        if num_digits == 0 || digits >= 1 << layout.digit_bits {
            return None;
        }

        let mut packed = u64::from(negative) << layout.sign_bit;
        packed |= digits << (2 * layout.field_bits);
        packed |= ((num_digits - 1) as u64) << layout.field_bits;
        packed |= (point - 1) as u64;

        Some(match self.width {
            VarWidth::Eight => packed as i64,
            VarWidth::Four => i64::from(packed as u32 as i32),
        })
    }

    /// Render an encoded variable as its original text.
    ///
    /// # Panics
    /// Panics if `placeholder` is [`Placeholder::Dictionary`].
    pub fn render(self, placeholder: Placeholder, value: i64, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        match placeholder {
            Placeholder::Integer => self.render_integer(value, out),
            Placeholder::Float => self.render_float(value, out),
            Placeholder::Dictionary => panic!("dictionary variables are not encoded"),
        }
    }

    pub fn render_integer(self, value: i64, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        let value = self.check_width(value)?;
        out.extend_from_slice(value.to_string().as_bytes());
        Ok(())
    }

    /// Render a packed float; nothing is written on error.
    pub fn render_float(self, value: i64, out: &mut Vec<u8>) -> Result<(), DecodeError> {
        let layout = self.float_layout();
        let raw = match self.width {
            VarWidth::Eight => value as u64,
            VarWidth::Four => u64::from(self.check_width(value)? as u32),
        };

        let field_mask = (1u64 << layout.field_bits) - 1;
        let point = (raw & field_mask) as usize + 1;
        let num_digits = ((raw >> layout.field_bits) & field_mask) as usize + 1;
        let mut digits = (raw >> (2 * layout.field_bits)) & ((1u64 << layout.digit_bits) - 1);
        let negative = (raw >> layout.sign_bit) & 1 == 1;

        if num_digits < point {
            return Err(DecodeError::CorruptFloat(raw));
        }

        let start = out.len();
        if negative {
            out.push(b'-');
        }
        let body = out.len();
        out.resize(body + num_digits + 1, b'0');
        let point_at = body + num_digits - point;
        out[point_at] = b'.';

        let mut pos = out.len();
        while digits > 0 && pos > body {
            pos -= 1;
            if pos == point_at {
                continue;
            }
            out[pos] = b'0' + (digits % 10) as u8;
            digits /= 10;
        }
        if digits > 0 {
            out.truncate(start);
            return Err(DecodeError::CorruptFloat(raw));
        }
        Ok(())
    }

    fn check_width(self, value: i64) -> Result<i64, DecodeError> {
        match self.width {
            VarWidth::Eight => Ok(value),
            VarWidth::Four => i32::try_from(value)
                .map(i64::from)
                .map_err(|_| DecodeError::FourByteOutOfRange(value)),
        }
    }
}

fn split_sign(token: &[u8]) -> (bool, &[u8]) {
    match token.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, token),
    }
}
