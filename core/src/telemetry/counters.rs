//! telemetry/counters.rs
//! Mutable counters collected by the assembler.
//!
//! Summary: one increment per processed packet, keyed by its status.
//! Converted into an immutable `TelemetrySnapshot` on demand.
use bincode::{Decode, Encode};
use std::ops::AddAssign;

use crate::packet::Packet;
use crate::transfer::PacketStatus;

/// Deterministic counters collected across all sessions of one assembler
#[derive(Default, Clone, Debug, Encode, Decode, PartialEq, Eq)]
pub struct AssemblerCounters {
    pub packets_seen: u64,
    pub metadata_accepted: u64,
    pub data_accepted: u64,
    pub duplicates: u64,
    pub invalid_packets: u64,
    pub checksum_failures: u64,
    pub generation_resets: u64,
    pub files_completed: u64,
    pub bytes_accepted: u64,
}

impl AssemblerCounters {
    /// Record the outcome of one `process` call.
    ///
    /// A packet that completes byte coverage but fails the whole-file check
    /// was still stored before the reset, so it also counts as accepted.
    pub fn record(&mut self, status: PacketStatus, packet: &Packet) {
        self.packets_seen += 1;
        match status {
            PacketStatus::Accepted => self.add_accepted(packet),
            PacketStatus::Duplicate => self.duplicates += 1,
            PacketStatus::InvalidCrc => self.invalid_packets += 1,
            PacketStatus::InvalidFileChecksum => {
                self.add_accepted(packet);
                self.checksum_failures += 1;
            }
        }
    }

    fn add_accepted(&mut self, packet: &Packet) {
        if packet.is_metadata() {
            self.metadata_accepted += 1;
        } else {
            self.data_accepted += 1;
            self.bytes_accepted += packet.payload().len() as u64;
        }
    }

    pub fn accepted(&self) -> u64 {
        self.metadata_accepted + self.data_accepted
    }

    // Workers can keep private counters and fold them in at the end.
    pub fn merge(&mut self, other: &AssemblerCounters) {
        *self += other.clone();
    }

    /// Stable binary form, e.g. for persisting counters between runs.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        bincode::encode_to_vec(self, bincode::config::standard())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::error::DecodeError> {
        let (counters, _) = bincode::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(counters)
    }
}

impl AddAssign for AssemblerCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.packets_seen      += rhs.packets_seen;
        self.metadata_accepted += rhs.metadata_accepted;
        self.data_accepted     += rhs.data_accepted;
        self.duplicates        += rhs.duplicates;
        self.invalid_packets   += rhs.invalid_packets;
        self.checksum_failures += rhs.checksum_failures;
        self.generation_resets += rhs.generation_resets;
        self.files_completed   += rhs.files_completed;
        self.bytes_accepted    += rhs.bytes_accepted;
    }
}
