//! src/headers/decode.rs
//!
//! Header decoding utilities.
//!
//! Design notes:
//! - Field order must match `encode.rs` exactly.
//! - Trailing bytes are rejected: the payload is the header and nothing else.

use byteorder::{ByteOrder, LittleEndian};

use crate::headers::types::{HeaderError, MetadataHeader};
use crate::packet::CorrectionLevel;

/// Deserialize a metadata payload into `MetadataHeader`.
pub fn decode_metadata(buf: &[u8]) -> Result<MetadataHeader, HeaderError> {
    if buf.is_empty() {
        return Err(HeaderError::BufferTooShort { have: 0, need: MetadataHeader::FIXED_LEN });
    }

    let name_len = buf[0] as usize;
    let need = MetadataHeader::FIXED_LEN + name_len;
    if buf.len() < need {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need });
    }
    if buf.len() != need {
        return Err(HeaderError::LengthMismatch { expected: need, actual: buf.len() });
    }

    let mut i = 1usize;
    let file_name = std::str::from_utf8(&buf[i..i + name_len])
        .map_err(|_| HeaderError::InvalidFileName)?
        .to_owned();
    i += name_len;

    let content_len = LittleEndian::read_u16(&buf[i..i + 2]);
    i += 2;

    let chunk_size = buf[i];
    i += 1;

    let raw_level = buf[i];
    let correction_level = CorrectionLevel::from_code(raw_level)
        .map_err(|_| HeaderError::UnknownCorrectionLevel { raw: raw_level })?;
    i += 1;

    let file_crc32 = LittleEndian::read_u32(&buf[i..i + 4]);

    let h = MetadataHeader {
        file_name,
        content_len,
        chunk_size,
        correction_level,
        file_crc32,
    };
    h.validate()?;

    Ok(h)
}
