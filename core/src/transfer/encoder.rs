//! transfer/encoder.rs
//! Deterministic partitioning of a named blob into transfer packets.
//!
//! Output order is metadata first, then data packets by ascending offset.
//! The assembler does not depend on that order.

use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::config::EncoderConfig;
use crate::constants::{FILE_ID_BYTES, MAX_CONTENT_LEN, MAX_FILE_ID_LEN, MAX_FILE_NAME_LEN};
use crate::headers::{encode_metadata, HeaderError, MetadataHeader};
use crate::packet::{CorrectionLevel, Packet};
use crate::utils::crc32;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("invalid chunk_size: zero")]
    InvalidChunkSizeZero,

    #[error("file name is empty")]
    EmptyFileName,

    #[error("file name too long: {have} > {max} bytes")]
    FileNameTooLong { have: usize, max: usize },

    #[error("content too large: {have} > {max} bytes")]
    ContentTooLarge { have: usize, max: usize },

    #[error("file id must be 1..={max} bytes, got {have}")]
    InvalidFileId { have: usize, max: usize },

    #[error("metadata header: {0}")]
    Header(#[from] HeaderError),
}

/// Fresh transfer identifier: random bytes, hex-encoded.
pub fn new_file_id() -> String {
    let bytes: [u8; FILE_ID_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Packet producer bound to one `EncoderConfig`.
#[derive(Debug, Clone)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Default for Encoder {
    fn default() -> Self {
        Self { config: EncoderConfig::default() }
    }
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Result<Self, EncodeError> {
        if config.chunk_size == 0 {
            return Err(EncodeError::InvalidChunkSizeZero);
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode `content` under a freshly generated file id.
    pub fn encode(
        &self,
        file_index: u16,
        file_name: &str,
        content: &[u8],
    ) -> Result<Vec<Packet>, EncodeError> {
        self.encode_with_id(&new_file_id(), file_index, file_name, content)
    }

    /// Encode `content` under a caller-chosen file id.
    ///
    /// The id must not be reused for a different blob: the assembler keys
    /// sessions by it.
    pub fn encode_with_id(
        &self,
        file_id: &str,
        file_index: u16,
        file_name: &str,
        content: &[u8],
    ) -> Result<Vec<Packet>, EncodeError> {
        if file_id.is_empty() || file_id.len() > MAX_FILE_ID_LEN {
            return Err(EncodeError::InvalidFileId { have: file_id.len(), max: MAX_FILE_ID_LEN });
        }
        if file_name.is_empty() {
            return Err(EncodeError::EmptyFileName);
        }
        if file_name.len() > MAX_FILE_NAME_LEN {
            return Err(EncodeError::FileNameTooLong { have: file_name.len(), max: MAX_FILE_NAME_LEN });
        }
        if content.len() > MAX_CONTENT_LEN {
            return Err(EncodeError::ContentTooLarge { have: content.len(), max: MAX_CONTENT_LEN });
        }

        let EncoderConfig { chunk_size, correction_level } = self.config;
        let file_crc32 = crc32(content);
        let total_length = content.len() as u16;

        let header = MetadataHeader {
            file_name: file_name.to_owned(),
            content_len: total_length,
            chunk_size,
            correction_level,
            file_crc32,
        };
        let header_bytes = Bytes::from(encode_metadata(&header)?);

        let step = chunk_size as usize;
        let data_count = content.len().div_ceil(step).max(1);
        let mut packets = Vec::with_capacity(1 + data_count);

        packets.push(Packet::metadata(
            file_id,
            file_index,
            header_bytes,
            file_crc32,
            chunk_size,
            correction_level,
        ));

        let blob = Bytes::copy_from_slice(content);
        for n in 0..data_count {
            let start = n * step;
            let end = (start + step).min(blob.len());
            packets.push(Packet::data(
                file_id,
                file_index,
                start as u16,
                total_length,
                blob.slice(start..end),
                file_crc32,
                chunk_size,
                correction_level,
            ));
        }

        info!(
            file_id,
            file_name,
            bytes = content.len(),
            packets = packets.len(),
            chunk_size,
            level = %correction_level,
            "encoded transfer"
        );

        Ok(packets)
    }
}

/// One-shot encode: metadata packet followed by data packets.
///
/// # Errors
/// - `InvalidChunkSizeZero` if `chunk_size == 0`
/// - `EmptyFileName` / `FileNameTooLong` if the name does not fit the 1-byte length field
/// - `ContentTooLarge` if `content` does not fit the 2-byte length field
pub fn build_packets(
    file_index: u16,
    file_name: &str,
    content: &[u8],
    chunk_size: u8,
    correction_level: CorrectionLevel,
) -> Result<Vec<Packet>, EncodeError> {
    Encoder::new(EncoderConfig::new(chunk_size, correction_level))?.encode(file_index, file_name, content)
}
