use base64::{engine::general_purpose::STANDARD, Engine};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

use crate::constants::{PACKET_MAGIC, PACKET_VERSION};
use crate::packet::encode::{PREFIX_LEN, SUFFIX_LEN};
use crate::packet::types::{CorrectionLevel, Packet, PacketError, PacketFlags};

/// Decode a single packet from captured bytes.
///
/// Structural validation only: declared checksums are carried through
/// untouched so the assembler can count corrupted packets.
pub fn decode_packet(wire: &[u8]) -> Result<Packet, PacketError> {
    if wire.len() < PREFIX_LEN {
        return Err(PacketError::Truncated { have: wire.len(), need: PREFIX_LEN });
    }

    // --- fixed prefix ---
    let mut off = 0;

    let magic = [wire[0], wire[1]];
    off += 2;
    if magic != PACKET_MAGIC {
        return Err(PacketError::InvalidMagic(magic));
    }

    let version = wire[off];
    off += 1;
    if version != PACKET_VERSION {
        return Err(PacketError::UnsupportedVersion(version));
    }

    let flags_raw = wire[off];
    off += 1;
    let flags = PacketFlags::from_bits(flags_raw).ok_or(PacketError::InvalidFlags(flags_raw))?;

    let file_index = LittleEndian::read_u16(&wire[off..off + 2]);
    off += 2;

    let id_len = wire[off] as usize;
    off += 1;

    // --- variable file id + fixed suffix ---
    let need = PREFIX_LEN + id_len + SUFFIX_LEN;
    if wire.len() < need {
        return Err(PacketError::Truncated { have: wire.len(), need });
    }

    let file_id = std::str::from_utf8(&wire[off..off + id_len])
        .map_err(|_| PacketError::InvalidFileId)?
        .to_owned();
    off += id_len;

    let offset = LittleEndian::read_u16(&wire[off..off + 2]);
    off += 2;

    let total_length = LittleEndian::read_u16(&wire[off..off + 2]);
    off += 2;

    let chunk_size = wire[off];
    off += 1;

    let correction_level = CorrectionLevel::from_code(wire[off])?;
    off += 1;

    let payload_crc32 = LittleEndian::read_u32(&wire[off..off + 4]);
    off += 4;

    let file_crc32 = LittleEndian::read_u32(&wire[off..off + 4]);
    off += 4;

    let payload_len = LittleEndian::read_u16(&wire[off..off + 2]) as usize;
    off += 2;

    let expected_len = off + payload_len;
    if wire.len() != expected_len {
        return Err(PacketError::LengthMismatch { expected: expected_len, actual: wire.len() });
    }

    let payload = Bytes::copy_from_slice(&wire[off..expected_len]);

    Ok(Packet::data(
        file_id,
        file_index,
        offset,
        total_length,
        payload,
        file_crc32,
        chunk_size,
        correction_level,
    )
    .to_builder()
    .is_metadata(flags.contains(PacketFlags::METADATA))
    .payload_crc32(payload_crc32)
    .build())
}

/// Decode a packet from its base64 text form.
pub fn decode_packet_text(text: &str) -> Result<Packet, PacketError> {
    let wire = STANDARD.decode(text.trim())?;
    decode_packet(&wire)
}
