//! packet/types.rs
//! The self-describing transfer unit and its typed fields.
//!
//! Design notes:
//! - `Packet` is an immutable value: fields are private and only reachable
//!   through accessors. Variants with one field changed are produced through
//!   `PacketBuilder`, never by mutating a packet in place.
//! - `CorrectionLevel` is carried opaquely; its wire/header byte is the ASCII
//!   letter (`b'L'`, `b'M'`, `b'Q'`, `b'H'`).

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::flags;
use crate::utils::{crc32, fmt_bytes};

/// Optical error-correction strength requested for the rendered symbol.
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash,
    TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
pub enum CorrectionLevel {
    L = 0x4C,
    #[default]
    M = 0x4D,
    Q = 0x51,
    H = 0x48,
}

impl CorrectionLevel {
    pub const ALL: [CorrectionLevel; 4] = [
        CorrectionLevel::L,
        CorrectionLevel::M,
        CorrectionLevel::Q,
        CorrectionLevel::H,
    ];

    /// Header/wire byte (ASCII letter).
    #[inline(always)]
    pub fn code(self) -> u8 {
        self.into()
    }

    pub fn from_code(code: u8) -> Result<Self, PacketError> {
        Self::try_from_primitive(code).map_err(|_| PacketError::InvalidCorrectionLevel(code))
    }

    pub fn as_char(self) -> char {
        self.code() as char
    }
}

impl fmt::Display for CorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for CorrectionLevel {
    type Err = PacketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().as_bytes() {
            [c] => Self::from_code(c.to_ascii_uppercase()),
            _ => Err(PacketError::Malformed(format!("unknown correction level {:?}", s))),
        }
    }
}

bitflags::bitflags! {
    /// Packet flags byte on the wire.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PacketFlags: u8 {
        /// Payload is the encoded metadata header, not file bytes
        const METADATA = flags::METADATA;
    }
}

/// One metadata or data unit of a transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    file_id: String,
    file_index: u16,
    is_metadata: bool,
    offset: u16,
    total_length: u16,
    payload: Bytes,
    payload_crc32: u32,
    file_crc32: u32,
    chunk_size: u8,
    correction_level: CorrectionLevel,
}

impl Packet {
    /// Metadata packet: offset 0, total_length = payload length, payload CRC computed.
    pub fn metadata(
        file_id: impl Into<String>,
        file_index: u16,
        header_bytes: Bytes,
        file_crc32: u32,
        chunk_size: u8,
        correction_level: CorrectionLevel,
    ) -> Self {
        let payload_crc32 = crc32(&header_bytes);
        Self {
            file_id: file_id.into(),
            file_index,
            is_metadata: true,
            offset: 0,
            total_length: header_bytes.len() as u16,
            payload: header_bytes,
            payload_crc32,
            file_crc32,
            chunk_size,
            correction_level,
        }
    }

    /// Data packet carrying `chunk` at `offset` of a blob of `total_length` bytes.
    #[allow(clippy::too_many_arguments)]
    pub fn data(
        file_id: impl Into<String>,
        file_index: u16,
        offset: u16,
        total_length: u16,
        chunk: Bytes,
        file_crc32: u32,
        chunk_size: u8,
        correction_level: CorrectionLevel,
    ) -> Self {
        let payload_crc32 = crc32(&chunk);
        Self {
            file_id: file_id.into(),
            file_index,
            is_metadata: false,
            offset,
            total_length,
            payload: chunk,
            payload_crc32,
            file_crc32,
            chunk_size,
            correction_level,
        }
    }

    /// Start a builder with every field copied from this packet.
    pub fn to_builder(&self) -> PacketBuilder {
        PacketBuilder { inner: self.clone() }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn file_index(&self) -> u16 {
        self.file_index
    }

    pub fn is_metadata(&self) -> bool {
        self.is_metadata
    }

    pub fn flags(&self) -> PacketFlags {
        if self.is_metadata {
            PacketFlags::METADATA
        } else {
            PacketFlags::empty()
        }
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn total_length(&self) -> u16 {
        self.total_length
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn payload_crc32(&self) -> u32 {
        self.payload_crc32
    }

    pub fn file_crc32(&self) -> u32 {
        self.file_crc32
    }

    pub fn chunk_size(&self) -> u8 {
        self.chunk_size
    }

    pub fn correction_level(&self) -> CorrectionLevel {
        self.correction_level
    }

    /// Recompute the payload CRC and compare it with the declared one.
    pub fn payload_crc_matches(&self) -> bool {
        crc32(&self.payload) == self.payload_crc32
    }

    /// Produce a concise debug summary of the packet
    pub fn summary(&self) -> String {
        format!(
            "Packet {{ file_id: {}, index: {}, kind: {}, offset: {}, total_length: {}, \
             payload_len: {}, payload_crc32: {:#010x}, file_crc32: {:#010x}, chunk_size: {}, level: {} }}",
            fmt_bytes(self.file_id.as_bytes()),
            self.file_index,
            if self.is_metadata { "metadata" } else { "data" },
            self.offset,
            self.total_length,
            self.payload.len(),
            self.payload_crc32,
            self.file_crc32,
            self.chunk_size,
            self.correction_level,
        )
    }
}

/// Copy-with-overrides constructor for `Packet`.
///
/// Nothing is recomputed: overriding `payload` keeps the old `payload_crc32`
/// unless `payload_crc32` (or `reseal`) is also applied.
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    inner: Packet,
}

impl PacketBuilder {
    pub fn file_id(mut self, file_id: impl Into<String>) -> Self {
        self.inner.file_id = file_id.into();
        self
    }

    pub fn file_index(mut self, file_index: u16) -> Self {
        self.inner.file_index = file_index;
        self
    }

    pub fn is_metadata(mut self, is_metadata: bool) -> Self {
        self.inner.is_metadata = is_metadata;
        self
    }

    pub fn offset(mut self, offset: u16) -> Self {
        self.inner.offset = offset;
        self
    }

    pub fn total_length(mut self, total_length: u16) -> Self {
        self.inner.total_length = total_length;
        self
    }

    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.inner.payload = payload.into();
        self
    }

    pub fn payload_crc32(mut self, payload_crc32: u32) -> Self {
        self.inner.payload_crc32 = payload_crc32;
        self
    }

    pub fn file_crc32(mut self, file_crc32: u32) -> Self {
        self.inner.file_crc32 = file_crc32;
        self
    }

    pub fn chunk_size(mut self, chunk_size: u8) -> Self {
        self.inner.chunk_size = chunk_size;
        self
    }

    pub fn correction_level(mut self, correction_level: CorrectionLevel) -> Self {
        self.inner.correction_level = correction_level;
        self
    }

    /// Recompute `payload_crc32` from the current payload.
    pub fn reseal(mut self) -> Self {
        self.inner.payload_crc32 = crc32(&self.inner.payload);
        self
    }

    pub fn build(self) -> Packet {
        self.inner
    }
}

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("truncated packet: need at least {need} bytes, got {have}")]
    Truncated { have: usize, need: usize },

    #[error("invalid packet magic: {}", fmt_bytes(.0))]
    InvalidMagic([u8; 2]),

    #[error("unsupported packet version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid packet flags: {0:#04x}")]
    InvalidFlags(u8),

    #[error("invalid correction level byte: {0:#04x}")]
    InvalidCorrectionLevel(u8),

    #[error("file id is not valid UTF-8")]
    InvalidFileId,

    #[error("file id too long: {have} > {max}")]
    FileIdTooLong { have: usize, max: usize },

    #[error("payload too long: {have} > {max}")]
    PayloadTooLong { have: usize, max: usize },

    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid packet text: {0}")]
    InvalidText(#[from] base64::DecodeError),

    #[error("malformed packet: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Packet {
        Packet::data("abc", 0, 4, 10, Bytes::from_static(b"wxyz"), 0xDEAD_BEEF, 4, CorrectionLevel::M)
    }

    #[test]
    fn correction_level_codes_are_ascii_letters() {
        for level in CorrectionLevel::ALL {
            assert_eq!(CorrectionLevel::from_code(level.code()).unwrap(), level);
            assert_eq!(level.to_string().as_bytes(), &[level.code()]);
        }
        assert_eq!(CorrectionLevel::Q.code(), b'Q');
        assert!(CorrectionLevel::from_code(b'X').is_err());
    }

    #[test]
    fn correction_level_parses_case_insensitive() {
        assert_eq!("h".parse::<CorrectionLevel>().unwrap(), CorrectionLevel::H);
        assert_eq!(" L ".parse::<CorrectionLevel>().unwrap(), CorrectionLevel::L);
        assert!("HM".parse::<CorrectionLevel>().is_err());
    }

    #[test]
    fn data_constructor_seals_payload() {
        let p = sample();
        assert!(p.payload_crc_matches());
        assert_eq!(p.payload_crc32(), crc32(b"wxyz"));
        assert!(!p.is_metadata());
        assert_eq!(p.flags(), PacketFlags::empty());
    }

    #[test]
    fn builder_overrides_single_field() {
        let original = sample();
        let copy = original.to_builder().correction_level(CorrectionLevel::H).build();

        assert_eq!(copy.correction_level(), CorrectionLevel::H);
        assert_eq!(original.correction_level(), CorrectionLevel::M);
        assert_eq!(copy.payload(), original.payload());
        assert_eq!(copy.offset(), original.offset());
    }

    #[test]
    fn builder_payload_override_breaks_crc_until_resealed() {
        let original = sample();
        let tampered = original.to_builder().payload(&b"WXYZ"[..]).build();
        assert!(!tampered.payload_crc_matches());

        let resealed = tampered.to_builder().reseal().build();
        assert!(resealed.payload_crc_matches());
    }
}
