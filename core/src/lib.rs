//! optic-core
//!
//! Pure Rust optical file-transfer engine.
//! No rendering, no camera, no I/O: bytes in, packets out, and back.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;
pub mod config;

// Wire layers
pub mod headers;
pub mod packet;
pub mod telemetry;

// Encoder + reassembly
pub mod transfer;

pub use types::{Result, TransferError};

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::EncoderConfig;
    pub use crate::packet::{
        decode_packet, decode_packet_text, encode_packet, encode_packet_text, CorrectionLevel, Packet,
    };
    pub use crate::telemetry::{ProgressSnapshot, TelemetrySnapshot};
    pub use crate::transfer::{
        build_packets, AssembledFile, Assembler, DecodeResult, Encoder, PacketStatus,
    };
    pub use crate::utils::crc32;
}
