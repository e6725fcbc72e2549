//! A sequence of byte strings stored back to back.
//!
//! `N` strings live in one contiguous buffer plus `N` end offsets; string `i`
//! spans `end_offsets[i - 1]..end_offsets[i]` (the first starts at 0).

use serde::{Deserialize, Serialize};

use crate::error::InputError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFlattenedBytes", into = "RawFlattenedBytes")]
pub struct FlattenedBytes {
    bytes: Vec<u8>,
    end_offsets: Vec<u32>,
}

#[derive(Serialize, Deserialize)]
struct RawFlattenedBytes {
    bytes: Vec<u8>,
    end_offsets: Vec<u32>,
}

impl FlattenedBytes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw parts, validating the end offsets.
    pub fn from_parts(bytes: Vec<u8>, end_offsets: Vec<u32>) -> Result<Self, InputError> {
        validate_end_offsets(&end_offsets, bytes.len())?;
        Ok(Self { bytes, end_offsets })
    }

    /// Append one string.
    ///
    /// # Panics
    /// Panics if the buffer would exceed the u32 offset space.
    pub fn push(&mut self, segment: &[u8]) {
        self.bytes.extend_from_slice(segment);
        let Ok(end) = u32::try_from(self.bytes.len()) else {
            panic!("flattened bytes overflow u32 offsets");
        };
        self.end_offsets.push(end);
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.end_offsets.clear();
    }

    /// Number of strings.
    pub fn len(&self) -> usize {
        self.end_offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.end_offsets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        let end = *self.end_offsets.get(index)? as usize;
        let begin = match index {
            0 => 0,
            _ => self.end_offsets[index - 1] as usize,
        };
        Some(&self.bytes[begin..end])
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            bytes: &self.bytes,
            end_offsets: self.end_offsets.iter(),
            begin: 0,
        }
    }

    /// Concatenated bytes of all strings.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn end_offsets(&self) -> &[u32] {
        &self.end_offsets
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<u32>) {
        (self.bytes, self.end_offsets)
    }
}

/// Check that `end_offsets` are non-decreasing and within `len`.
pub fn validate_end_offsets(end_offsets: &[u32], len: usize) -> Result<(), InputError> {
    let mut previous = 0u32;
    for (index, &offset) in end_offsets.iter().enumerate() {
        if offset < previous {
            return Err(InputError::NonMonotonicOffset {
                index,
                offset,
                previous,
            });
        }
        if offset as usize > len {
            return Err(InputError::OffsetOutOfBounds { index, offset, len });
        }
        previous = offset;
    }
    Ok(())
}

impl TryFrom<RawFlattenedBytes> for FlattenedBytes {
    type Error = InputError;

    fn try_from(raw: RawFlattenedBytes) -> Result<Self, Self::Error> {
        Self::from_parts(raw.bytes, raw.end_offsets)
    }
}

impl From<FlattenedBytes> for RawFlattenedBytes {
    fn from(flat: FlattenedBytes) -> Self {
        Self {
            bytes: flat.bytes,
            end_offsets: flat.end_offsets,
        }
    }
}

impl<'a> FromIterator<&'a [u8]> for FlattenedBytes {
    fn from_iter<I: IntoIterator<Item = &'a [u8]>>(iter: I) -> Self {
        let mut flat = Self::new();
        for segment in iter {
            flat.push(segment);
        }
        flat
    }
}

impl<'a> IntoIterator for &'a FlattenedBytes {
    type Item = &'a [u8];
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Iterator over the strings of a [`FlattenedBytes`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    bytes: &'a [u8],
    end_offsets: std::slice::Iter<'a, u32>,
    begin: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let end = *self.end_offsets.next()? as usize;
        let segment = &self.bytes[self.begin..end];
        self.begin = end;
        Some(segment)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.end_offsets.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}
