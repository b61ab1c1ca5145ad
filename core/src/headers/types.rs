//! headers/types.rs
//! Metadata header struct and its errors.

use thiserror::Error;

use crate::constants::MAX_FILE_NAME_LEN;
use crate::packet::CorrectionLevel;

/// Decoded metadata header.
///
/// Layout:
///
/// ```text
/// [ name_len (1) ][ name (name_len, UTF-8) ][ content_len (2) ]
/// [ chunk_size (1) ][ correction_level (1, ASCII) ][ file_crc32 (4) ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataHeader {
    pub file_name: String,
    pub content_len: u16,
    pub chunk_size: u8,
    pub correction_level: CorrectionLevel,
    pub file_crc32: u32,
}

impl MetadataHeader {
    /// Bytes used by everything except the name.
    pub const FIXED_LEN: usize = 1  // name_len
        + 2                        // content_len
        + 1                        // chunk_size
        + 1                        // correction_level
        + 4;                       // file_crc32

    /// Encoded length of this header.
    pub fn encoded_len(&self) -> usize {
        Self::FIXED_LEN + self.file_name.len()
    }

    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.file_name.is_empty() {
            return Err(HeaderError::EmptyFileName);
        }
        if self.file_name.len() > MAX_FILE_NAME_LEN {
            return Err(HeaderError::FileNameTooLong {
                have: self.file_name.len(),
                max: MAX_FILE_NAME_LEN,
            });
        }
        if self.chunk_size == 0 {
            return Err(HeaderError::InvalidChunkSizeZero);
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum HeaderError {
    /// Buffer too short to contain the declared header.
    #[error("metadata header too short: {have} < {need}")]
    BufferTooShort { have: usize, need: usize },

    /// Bytes left over after the last field.
    #[error("metadata header length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("metadata header has an empty file name")]
    EmptyFileName,

    #[error("file name too long: {have} > {max} bytes")]
    FileNameTooLong { have: usize, max: usize },

    #[error("file name is not valid UTF-8")]
    InvalidFileName,

    #[error("invalid chunk_size: zero")]
    InvalidChunkSizeZero,

    #[error("unknown correction level byte: {raw:#04x}")]
    UnknownCorrectionLevel { raw: u8 },
}
