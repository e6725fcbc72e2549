//! Binary container for one encoded message (32-byte header + payload).
//!
//! Payload order: logtype → dictionary bytes → dictionary end offsets (u32) →
//! encoded variables (i64). All integers are little-endian. Any change to this
//! layout bumps [`RECORD_VERSION`].

use crate::error::{DecodeError, InputError};
use crate::flattened::FlattenedBytes;
use crate::message::EncodedMessage;
use crate::version::VarWidth;

pub const RECORD_MAGIC: [u8; 4] = *b"CLPM";
pub const RECORD_VERSION: u16 = 1;
pub const RECORD_HEADER_SIZE: usize = 32;

/// Header flag: encoded variables use the four-byte methods.
pub const FLAG_FOUR_BYTE: u16 = 1 << 0;

/// Record load error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("invalid magic: expected CLPM")]
    InvalidMagic,
    #[error("unsupported record version: {0} (expected {RECORD_VERSION})")]
    UnsupportedVersion(u16),
    #[error("record too small: {0} bytes (minimum {RECORD_HEADER_SIZE})")]
    TooSmall(usize),
    #[error("size mismatch: header implies {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("checksum mismatch: header says {expected:#010x}, payload hashes to {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("dictionary offsets end at {end} but the section holds {len} bytes")]
    TrailingDictBytes { end: usize, len: usize },
    #[error("invalid dictionary offsets: {0}")]
    InvalidOffsets(#[from] InputError),
    #[error("inconsistent variables: {0}")]
    Inconsistent(#[from] DecodeError),
}

/// Record header - first 32 bytes of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct RecordHeader {
    /// Magic bytes: b"CLPM"
    pub magic: [u8; 4],
    pub version: u16,
    pub flags: u16,
    pub logtype_len: u32,
    pub dict_bytes_len: u32,
    pub dict_count: u32,
    pub encoded_count: u32,
    /// CRC32 checksum of the payload
    pub checksum: u32,
    pub _reserved: [u8; 4],
}

const _: () = assert!(std::mem::size_of::<RecordHeader>() == RECORD_HEADER_SIZE);

impl RecordHeader {
    /// Decode header from 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= RECORD_HEADER_SIZE, "header too short");

        let u32_at = |at: usize| u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u16::from_le_bytes([bytes[4], bytes[5]]),
            flags: u16::from_le_bytes([bytes[6], bytes[7]]),
            logtype_len: u32_at(8),
            dict_bytes_len: u32_at(12),
            dict_count: u32_at(16),
            encoded_count: u32_at(20),
            checksum: u32_at(24),
            _reserved: [bytes[28], bytes[29], bytes[30], bytes[31]],
        }
    }

    /// Encode header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; RECORD_HEADER_SIZE] {
        let mut bytes = [0u8; RECORD_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.logtype_len.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.dict_bytes_len.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.dict_count.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.encoded_count.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[28..32].copy_from_slice(&self._reserved);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == RECORD_MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == RECORD_VERSION
    }

    /// Payload size implied by the lengths and counts.
    pub fn payload_size(&self) -> usize {
        self.logtype_len as usize
            + self.dict_bytes_len as usize
            + self.dict_count as usize * 4
            + self.encoded_count as usize * 8
    }

    pub fn width(&self) -> VarWidth {
        if self.flags & FLAG_FOUR_BYTE != 0 {
            VarWidth::Four
        } else {
            VarWidth::Eight
        }
    }
}

/// An encoded message tagged with the width of its encoded variables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EncodedRecord {
    pub width: VarWidth,
    pub message: EncodedMessage,
}

impl EncodedRecord {
    pub fn new(width: VarWidth, message: EncodedMessage) -> Self {
        Self { width, message }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let message = &self.message;
        let dict = message.dictionary_vars();

        let mut payload = Vec::with_capacity(
            message.logtype().len()
                + dict.bytes().len()
                + dict.len() * 4
                + message.encoded_vars().len() * 8,
        );
        payload.extend_from_slice(message.logtype());
        payload.extend_from_slice(dict.bytes());
        for offset in dict.end_offsets() {
            payload.extend_from_slice(&offset.to_le_bytes());
        }
        for value in message.encoded_vars() {
            payload.extend_from_slice(&value.to_le_bytes());
        }

        // Lengths fit u32: messages longer than u32::MAX are rejected by the encoder.
        let header = RecordHeader {
            magic: RECORD_MAGIC,
            version: RECORD_VERSION,
            flags: match self.width {
                VarWidth::Eight => 0,
                VarWidth::Four => FLAG_FOUR_BYTE,
            },
            logtype_len: message.logtype().len() as u32,
            dict_bytes_len: dict.bytes().len() as u32,
            dict_count: dict.len() as u32,
            encoded_count: message.encoded_vars().len() as u32,
            checksum: crc32fast::hash(&payload),
            _reserved: [0; 4],
        };

        let mut out = Vec::with_capacity(RECORD_HEADER_SIZE + payload.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&payload);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        if bytes.len() < RECORD_HEADER_SIZE {
            return Err(RecordError::TooSmall(bytes.len()));
        }

        let header = RecordHeader::from_bytes(&bytes[..RECORD_HEADER_SIZE]);
        if !header.validate_magic() {
            return Err(RecordError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(RecordError::UnsupportedVersion(header.version));
        }

        let payload = &bytes[RECORD_HEADER_SIZE..];
        if header.payload_size() != payload.len() {
            return Err(RecordError::SizeMismatch {
                expected: RECORD_HEADER_SIZE + header.payload_size(),
                actual: bytes.len(),
            });
        }
        let checksum = crc32fast::hash(payload);
        if checksum != header.checksum {
            return Err(RecordError::ChecksumMismatch {
                expected: header.checksum,
                actual: checksum,
            });
        }

        let (logtype, rest) = payload.split_at(header.logtype_len as usize);
        let (dict_bytes, rest) = rest.split_at(header.dict_bytes_len as usize);
        let (offsets, encoded) = rest.split_at(header.dict_count as usize * 4);

        let end_offsets = offsets
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let encoded_vars = encoded
            .chunks_exact(8)
            .map(|c| i64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
            .collect();

        let dictionary_vars = FlattenedBytes::from_parts(dict_bytes.to_vec(), end_offsets)?;
        let end = dictionary_vars.end_offsets().last().map_or(0, |&end| end as usize);
        if end != dict_bytes.len() {
            return Err(RecordError::TrailingDictBytes {
                end,
                len: dict_bytes.len(),
            });
        }
        let message = EncodedMessage::from_parts(logtype.to_vec(), dictionary_vars, encoded_vars)?;
        Ok(Self {
            width: header.width(),
            message,
        })
    }
}
