use thiserror::Error;

use crate::{
    config::ConfigError,
    headers::HeaderError,
    packet::PacketError,
    transfer::EncodeError,
};

/// Unified transfer error covering encoding, wire parsing, metadata headers and configuration.
/// - `From<T>` impls enable `?` across layers.
/// - Per-packet decode outcomes are NOT errors; they are reported as `PacketStatus`.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Encoder precondition violated.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Metadata header failed to encode or decode.
    #[error("header error: {0}")]
    Header(#[from] HeaderError),

    /// Packet wire bytes or text failed validation.
    #[error("packet error: {0}")]
    Packet(#[from] PacketError),

    /// Configuration failed to parse or validate.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, TransferError>;
