//! Variable placeholders of the logtype wire format.
//!
//! These byte values belong to variables schema V2. Code outside this module
//! goes through [`Placeholder`] instead of hard-coding them.

use crate::error::InputError;

/// Escape byte used in logtypes and wildcard queries.
pub const ESCAPE: u8 = b'\\';

/// Marker for one variable position inside a logtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Placeholder {
    /// Integer packed into an encoded variable.
    Integer,
    /// Variable stored verbatim in the dictionary variables.
    Dictionary,
    /// Float packed into an encoded variable.
    Float,
}

impl Placeholder {
    /// Decode from the logtype representation.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x11 => Some(Self::Integer),
            0x12 => Some(Self::Dictionary),
            0x13 => Some(Self::Float),
            _ => None,
        }
    }

    /// Encode for the logtype.
    pub fn to_byte(self) -> u8 {
        match self {
            Self::Integer => 0x11,
            Self::Dictionary => 0x12,
            Self::Float => 0x13,
        }
    }

    /// Short name used in dumps.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "int",
            Self::Dictionary => "dict",
            Self::Float => "float",
        }
    }

    /// Whether variables of this kind live in the encoded variables.
    pub fn is_encoded(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl TryFrom<u8> for Placeholder {
    type Error = InputError;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        Self::from_byte(b).ok_or(InputError::InvalidPlaceholder(b))
    }
}

impl std::fmt::Display for Placeholder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if `b` is any placeholder byte.
pub fn is_placeholder(b: u8) -> bool {
    Placeholder::from_byte(b).is_some()
}

/// Check if a literal byte must be escaped when written into a logtype.
pub fn needs_escape(b: u8) -> bool {
    b == ESCAPE || is_placeholder(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_roundtrip() {
        for p in [
            Placeholder::Integer,
            Placeholder::Dictionary,
            Placeholder::Float,
        ] {
            assert_eq!(Placeholder::from_byte(p.to_byte()), Some(p));
        }
    }

    #[test]
    fn unknown_byte() {
        assert_eq!(Placeholder::from_byte(b'a'), None);
        assert_eq!(
            Placeholder::try_from(0x14),
            Err(InputError::InvalidPlaceholder(0x14))
        );
    }

    #[test]
    fn is_encoded() {
        assert!(Placeholder::Integer.is_encoded());
        assert!(Placeholder::Float.is_encoded());
        assert!(!Placeholder::Dictionary.is_encoded());
    }

    #[test]
    fn escaping() {
        assert!(needs_escape(b'\\'));
        assert!(needs_escape(0x12));
        assert!(!needs_escape(b'*'));
        assert!(!needs_escape(b'a'));
    }
}
