use std::fmt;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::telemetry::ProgressSnapshot;

/// Outcome of feeding one packet to the assembler.
///
/// Every variant is terminal for that packet; none of them is an error the
/// caller must propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PacketStatus {
    /// Packet stored (and possibly completed the file).
    Accepted,
    /// Chunk already stored for this generation; nothing changed.
    Duplicate,
    /// Payload checksum failed, or the packet was malformed / out of bounds.
    InvalidCrc,
    /// Packet completed byte coverage but the whole-file checksum failed;
    /// the generation restarted from empty.
    InvalidFileChecksum,
}

impl PacketStatus {
    pub fn is_rejection(self) -> bool {
        matches!(self, PacketStatus::InvalidCrc | PacketStatus::InvalidFileChecksum)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PacketStatus::Accepted => "accepted",
            PacketStatus::Duplicate => "duplicate",
            PacketStatus::InvalidCrc => "invalid_crc",
            PacketStatus::InvalidFileChecksum => "invalid_file_checksum",
        }
    }
}

impl fmt::Display for PacketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a session's current generation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Metadata packet not (or no longer) accepted for this generation.
    NoMetadata,
    /// Metadata seen, bytes still missing.
    Accumulating,
    /// File assembled and verified.
    Complete,
}

/// A verified, reassembled file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledFile {
    pub file_id: String,
    pub file_name: String,
    pub data: Bytes,
    pub file_checksum: u32,
    pub completed_at: DateTime<Utc>,
}

impl AssembledFile {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Result of `Assembler::process`.
#[derive(Debug, Clone)]
pub struct DecodeResult {
    pub status: PacketStatus,
    /// Session state after this packet.
    pub snapshot: ProgressSnapshot,
    /// Set only on the call that completed the file.
    pub completed: Option<AssembledFile>,
}

impl DecodeResult {
    pub fn is_complete(&self) -> bool {
        self.completed.is_some()
    }
}
