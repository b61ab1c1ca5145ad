use base64::{engine::general_purpose::STANDARD, Engine};
use byteorder::{ByteOrder, LittleEndian};

use crate::constants::{MAX_FILE_ID_LEN, PACKET_MAGIC, PACKET_VERSION};
use crate::packet::types::{Packet, PacketError};

/// Fixed bytes before the file id: magic, version, flags, file_index, file_id_len.
pub const PREFIX_LEN: usize = 2 + 1 + 1 + 2 + 1;

/// Fixed bytes after the file id and before the payload.
pub const SUFFIX_LEN: usize = 2  // offset
    + 2                          // total_length
    + 1                          // chunk_size
    + 1                          // correction_level
    + 4                          // payload_crc32
    + 4                          // file_crc32
    + 2;                         // payload_len

/// Encode a packet into canonical wire format.
///
/// Layout (little-endian):
///
/// ```text
/// [ magic "OQ" (2) ]
/// [ version (1) ]
/// [ flags (1) ]
/// [ file_index (2) ]
/// [ file_id_len (1) ]
/// [ file_id (N) ]
/// [ offset (2) ]
/// [ total_length (2) ]
/// [ chunk_size (1) ]
/// [ correction_level (1) ]
/// [ payload_crc32 (4) ]
/// [ file_crc32 (4) ]
/// [ payload_len (2) ]
/// [ payload (M) ]
/// ```
///
/// Declared checksums are written as-is, so corrupted packets survive a
/// round trip and are rejected by the assembler, not the codec.
pub fn encode_packet(packet: &Packet) -> Result<Vec<u8>, PacketError> {
    let id = packet.file_id().as_bytes();
    if id.len() > MAX_FILE_ID_LEN {
        return Err(PacketError::FileIdTooLong { have: id.len(), max: MAX_FILE_ID_LEN });
    }
    let payload = packet.payload();
    if payload.len() > u16::MAX as usize {
        return Err(PacketError::PayloadTooLong { have: payload.len(), max: u16::MAX as usize });
    }

    let expected = PREFIX_LEN + id.len() + SUFFIX_LEN + payload.len();
    let mut out = vec![0u8; expected];
    let mut i = 0usize;

    fn put_u8(out: &mut [u8], i: &mut usize, v: u8) {
        out[*i] = v;
        *i += 1;
    }
    fn put_u16(out: &mut [u8], i: &mut usize, v: u16) {
        LittleEndian::write_u16(&mut out[*i..*i + 2], v);
        *i += 2;
    }
    fn put_u32(out: &mut [u8], i: &mut usize, v: u32) {
        LittleEndian::write_u32(&mut out[*i..*i + 4], v);
        *i += 4;
    }
    fn put_bytes(out: &mut [u8], i: &mut usize, b: &[u8]) {
        out[*i..*i + b.len()].copy_from_slice(b);
        *i += b.len();
    }

    // --- Header ---
    put_bytes(&mut out, &mut i, &PACKET_MAGIC);
    put_u8(&mut out, &mut i, PACKET_VERSION);
    put_u8(&mut out, &mut i, packet.flags().bits());
    put_u16(&mut out, &mut i, packet.file_index());
    put_u8(&mut out, &mut i, id.len() as u8);
    put_bytes(&mut out, &mut i, id);
    put_u16(&mut out, &mut i, packet.offset());
    put_u16(&mut out, &mut i, packet.total_length());
    put_u8(&mut out, &mut i, packet.chunk_size());
    put_u8(&mut out, &mut i, packet.correction_level().code());
    put_u32(&mut out, &mut i, packet.payload_crc32());
    put_u32(&mut out, &mut i, packet.file_crc32());
    put_u16(&mut out, &mut i, payload.len() as u16);

    // --- Body ---
    put_bytes(&mut out, &mut i, payload);

    // --- Validation ---
    if i != expected {
        return Err(PacketError::LengthMismatch { expected, actual: i });
    }

    Ok(out)
}

/// Encode a packet as standard base64 text, for symbols that carry text only.
pub fn encode_packet_text(packet: &Packet) -> Result<String, PacketError> {
    Ok(STANDARD.encode(encode_packet(packet)?))
}
