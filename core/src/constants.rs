
/// Magic marker for the packet wire format.
/// "OQ" = Optical Queue packet
pub const PACKET_MAGIC: [u8; 2] = *b"OQ";
pub const PACKET_VERSION: u8 = 1;

/// Defaults when an `EncoderConfig` is not supplied.
/// 128 bytes of payload keeps a level-M code comfortably scannable.
pub const DEFAULT_CHUNK_SIZE: u8 = 128;

/// Largest blob a single transfer can describe (2-byte length field).
pub const MAX_CONTENT_LEN: usize = u16::MAX as usize;

/// Largest file name the metadata header can describe (1-byte length field).
pub const MAX_FILE_NAME_LEN: usize = u8::MAX as usize;

/// Random bytes drawn per file id (hex-encoded on the wire).
pub const FILE_ID_BYTES: usize = 8;

/// Upper bound on file id length accepted from the wire (1-byte length field).
pub const MAX_FILE_ID_LEN: usize = u8::MAX as usize;

/// Packet flag bitmask.
pub mod flags {
    pub const METADATA: u8 = 0x01;
}
