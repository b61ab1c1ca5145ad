//! telemetry/snapshot.rs
//!
//! Snapshot structures returned to hosts.
//!
//! Design notes:
//! - `ProgressSnapshot` is the per-session view returned by every `process` call.
//! - `TelemetrySnapshot` is the process-wide view of an assembler.
//! - Both are plain data with `serde` derives so a UI bridge can ship them as JSON.

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::packet::CorrectionLevel;
use crate::telemetry::counters::AssemblerCounters;
use crate::transfer::SessionState;

/// Session state after one `process` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub file_id: String,
    pub file_name: Option<String>,
    pub state: SessionState,
    pub received_chunks: u32,
    pub received_bytes: u32,
    /// Buffer length for the current generation, once known.
    pub expected_total_length: Option<u16>,
    /// Cumulative over the lifetime of the file id.
    pub invalid_chunks: u64,
    /// Cumulative over the lifetime of the file id.
    pub checksum_failures: u64,
    pub chunk_size: u8,
    pub correction_level: CorrectionLevel,
    pub has_metadata: bool,
}

impl ProgressSnapshot {
    /// Fraction of bytes received in `[0, 1]`, or `None` while the length is unknown.
    pub fn progress(&self) -> Option<f64> {
        let total = self.expected_total_length?;
        if self.state == SessionState::Complete {
            return Some(1.0);
        }
        if total == 0 {
            return Some(0.0);
        }
        Some((self.received_bytes as f64 / total as f64).min(1.0))
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Immutable assembler-wide telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub packets_seen: u64,
    pub packets_accepted: u64,
    pub duplicates: u64,
    pub invalid_packets: u64,
    pub checksum_failures: u64,
    pub generation_resets: u64,
    pub files_completed: u64,
    pub bytes_accepted: u64,
    pub live_sessions: usize,
    pub stored_files: usize,
    /// Accepted / seen; 0.0 before the first packet.
    pub acceptance_ratio: f64,
    /// Duplicates / seen; high values mean the sender loops faster than needed.
    pub duplicate_ratio: f64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
}

impl TelemetrySnapshot {
    pub fn from(
        counters: &AssemblerCounters,
        live_sessions: usize,
        stored_files: usize,
        elapsed: Duration,
    ) -> Self {
        let ratio = |n: u64| {
            if counters.packets_seen > 0 {
                n as f64 / counters.packets_seen as f64
            } else {
                0.0
            }
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_accepted as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            packets_seen: counters.packets_seen,
            packets_accepted: counters.accepted(),
            duplicates: counters.duplicates,
            invalid_packets: counters.invalid_packets,
            checksum_failures: counters.checksum_failures,
            generation_resets: counters.generation_resets,
            files_completed: counters.files_completed,
            bytes_accepted: counters.bytes_accepted,
            live_sessions,
            stored_files,
            acceptance_ratio: ratio(counters.accepted()),
            duplicate_ratio: ratio(counters.duplicates),
            throughput_bytes_per_sec: throughput,
            elapsed,
        }
    }

    /// Every packet falls in exactly one bucket.
    pub fn sanity_check(&self) -> bool {
        self.packets_accepted + self.duplicates + self.invalid_packets == self.packets_seen
            && self.acceptance_ratio <= 1.0
            && self.files_completed <= self.packets_accepted
    }
}
