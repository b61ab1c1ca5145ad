//! src/headers/encode.rs
//!
//! Header encoding utilities.
//!
//! Design notes:
//! - Field order must match `decode.rs` exactly.
//! - Validation is performed before encoding to fail fast on invalid headers.

use byteorder::{ByteOrder, LittleEndian};

use crate::headers::types::{HeaderError, MetadataHeader};

/// Serialize a `MetadataHeader` into its linear little-endian layout.
///
/// # Returns
/// - `Ok(Vec<u8>)` of exactly `h.encoded_len()` bytes.
/// - `Err(HeaderError)` if the name is empty or longer than 255 bytes, or chunk_size is zero.
pub fn encode_metadata(h: &MetadataHeader) -> Result<Vec<u8>, HeaderError> {
    h.validate()?;

    let name = h.file_name.as_bytes();
    let mut out = vec![0u8; h.encoded_len()];
    let mut i = 0usize;

    out[i] = name.len() as u8;                                  // name_len
    i += 1;
    out[i..i + name.len()].copy_from_slice(name);               // name
    i += name.len();
    LittleEndian::write_u16(&mut out[i..i + 2], h.content_len); // content_len
    i += 2;
    out[i] = h.chunk_size;                                      // chunk_size
    i += 1;
    out[i] = h.correction_level.code();                         // correction_level
    i += 1;
    LittleEndian::write_u32(&mut out[i..i + 4], h.file_crc32);  // file_crc32
    i += 4;

    debug_assert_eq!(i, out.len(), "encoding wrote incorrect length");

    Ok(out)
}
