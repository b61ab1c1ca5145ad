//! transfer/session.rs
//! Mutable reconstruction state for one file id.
//!
//! A session outlives its generations: a (chunk_size, correction_level)
//! change or a whole-file checksum failure clears the buffer and the
//! per-generation counters in place, while `invalid_chunks` and
//! `checksum_failures` keep counting for the lifetime of the file id.
//!
//! Thread safety: none. The assembler owns sessions exclusively and
//! `process` takes `&mut self`.

use std::collections::HashSet;

use bytes::Bytes;
use chrono::Utc;

use crate::headers::MetadataHeader;
use crate::packet::CorrectionLevel;
use crate::telemetry::ProgressSnapshot;
use crate::transfer::types::{AssembledFile, SessionState};
use crate::utils::crc32;

/// Identity of an accepted chunk for duplicate detection.
///
/// The metadata packet always sits at offset 0 of its own lane so it never
/// collides with the data chunk at offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ChunkKey {
    Metadata,
    Data(u16),
}

/// Why a packet was refused. All of these surface as `PacketStatus::InvalidCrc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rejection {
    PayloadCrc { declared: u32, actual: u32 },
    BadHeader(String),
    LengthConflict { established: u16, declared: u16 },
    OutOfBounds { offset: u16, len: usize, total: u16 },
    Overflow { received: u32, len: usize, total: u16 },
}

#[derive(Debug)]
pub struct Session {
    file_id: String,

    // --- generation identity ---
    chunk_size: u8,
    correction_level: CorrectionLevel,

    // --- metadata (survives resets for reporting) ---
    file_name: Option<String>,
    expected_file_crc32: Option<u32>,

    // --- per-generation state ---
    expected_total_length: Option<u16>,
    buffer: Vec<u8>,
    accepted: HashSet<ChunkKey>,
    received_chunks: u32,
    received_bytes: u32,
    data_chunks: u32,
    has_metadata: bool,
    completed: bool,

    // --- cumulative, never reset ---
    invalid_chunks: u64,
    checksum_failures: u64,
    generations: u32,
}

impl Session {
    /// New session whose first generation is defined by the first packet seen.
    pub fn new(file_id: impl Into<String>, chunk_size: u8, correction_level: CorrectionLevel) -> Self {
        Self {
            file_id: file_id.into(),
            chunk_size,
            correction_level,
            file_name: None,
            expected_file_crc32: None,
            expected_total_length: None,
            buffer: Vec::new(),
            accepted: HashSet::new(),
            received_chunks: 0,
            received_bytes: 0,
            data_chunks: 0,
            has_metadata: false,
            completed: false,
            invalid_chunks: 0,
            checksum_failures: 0,
            generations: 1,
        }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn chunk_size(&self) -> u8 {
        self.chunk_size
    }

    pub fn correction_level(&self) -> CorrectionLevel {
        self.correction_level
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn expected_total_length(&self) -> Option<u16> {
        self.expected_total_length
    }

    pub fn received_chunks(&self) -> u32 {
        self.received_chunks
    }

    pub fn received_bytes(&self) -> u32 {
        self.received_bytes
    }

    pub fn invalid_chunks(&self) -> u64 {
        self.invalid_chunks
    }

    pub fn checksum_failures(&self) -> u64 {
        self.checksum_failures
    }

    pub fn has_metadata(&self) -> bool {
        self.has_metadata
    }

    /// Number of generations this file id has gone through (starts at 1).
    pub fn generations(&self) -> u32 {
        self.generations
    }

    pub fn state(&self) -> SessionState {
        if self.completed {
            SessionState::Complete
        } else if self.has_metadata {
            SessionState::Accumulating
        } else {
            SessionState::NoMetadata
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            file_id: self.file_id.clone(),
            file_name: self.file_name.clone(),
            state: self.state(),
            received_chunks: self.received_chunks,
            received_bytes: self.received_bytes,
            expected_total_length: self.expected_total_length,
            invalid_chunks: self.invalid_chunks,
            checksum_failures: self.checksum_failures,
            chunk_size: self.chunk_size,
            correction_level: self.correction_level,
            has_metadata: self.has_metadata,
        }
    }

    // -------------------------------------------------------------------------
    // Generation bookkeeping
    // -------------------------------------------------------------------------

    /// Start a new generation if `(chunk_size, correction_level)` differ from the current one.
    ///
    /// Returns `true` when a reset happened.
    pub(crate) fn check_generation(&mut self, chunk_size: u8, correction_level: CorrectionLevel) -> bool {
        if self.chunk_size == chunk_size && self.correction_level == correction_level {
            return false;
        }
        self.chunk_size = chunk_size;
        self.correction_level = correction_level;
        self.expected_total_length = None;
        self.buffer = Vec::new();
        self.has_metadata = false;
        self.clear_progress();
        self.generations += 1;
        true
    }

    /// Whole-file checksum failed: same generation, empty progress, buffer length kept.
    ///
    /// The decoded metadata stays, so resending only the data can complete the
    /// file. The metadata lane is reopened so a corrected header is accepted.
    pub(crate) fn fail_checksum(&mut self) {
        self.checksum_failures += 1;
        self.buffer.fill(0);
        self.clear_progress();
    }

    fn clear_progress(&mut self) {
        self.accepted.clear();
        self.received_chunks = 0;
        self.received_bytes = 0;
        self.data_chunks = 0;
        self.completed = false;
    }

    pub(crate) fn record_invalid(&mut self) {
        self.invalid_chunks += 1;
    }

    pub(crate) fn is_accepted(&self, key: ChunkKey) -> bool {
        self.accepted.contains(&key)
    }

    /// Size the buffer on first use; afterwards the length is fixed for the generation.
    fn establish_length(&mut self, total: u16) -> Result<u16, Rejection> {
        match self.expected_total_length {
            Some(established) if established != total => Err(Rejection::LengthConflict {
                established,
                declared: total,
            }),
            Some(established) => Ok(established),
            None => {
                self.expected_total_length = Some(total);
                self.buffer = vec![0u8; total as usize];
                Ok(total)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Acceptance
    // -------------------------------------------------------------------------

    pub(crate) fn accept_metadata(&mut self, header: MetadataHeader) -> Result<(), Rejection> {
        self.establish_length(header.content_len)?;

        // chunk_size / correction_level stay as the generation key set by the packet.
        self.file_name = Some(header.file_name);
        self.expected_file_crc32 = Some(header.file_crc32);
        self.has_metadata = true;

        self.accepted.insert(ChunkKey::Metadata);
        self.received_chunks += 1;
        Ok(())
    }

    pub(crate) fn accept_data(&mut self, offset: u16, total_length: u16, payload: &Bytes) -> Result<(), Rejection> {
        let total = match self.expected_total_length {
            Some(total) => total,
            None => self.establish_length(total_length)?,
        };

        let start = offset as usize;
        let end = start + payload.len();
        if end > total as usize {
            return Err(Rejection::OutOfBounds { offset, len: payload.len(), total });
        }
        if self.received_bytes as usize + payload.len() > total as usize {
            return Err(Rejection::Overflow {
                received: self.received_bytes,
                len: payload.len(),
                total,
            });
        }

        self.buffer[start..end].copy_from_slice(payload);
        self.accepted.insert(ChunkKey::Data(offset));
        self.received_chunks += 1;
        self.received_bytes += payload.len() as u32;
        self.data_chunks += 1;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Completion
    // -------------------------------------------------------------------------

    /// Metadata seen, at least one data chunk stored, every byte covered, not yet finished.
    pub(crate) fn ready_to_complete(&self) -> bool {
        !self.completed
            && self.has_metadata
            && self.data_chunks > 0
            && self.expected_total_length.map(u32::from) == Some(self.received_bytes)
    }

    /// `Some(file)` if the buffer matches the declared checksum, `None` otherwise.
    ///
    /// Does not mutate on mismatch; the caller decides to `fail_checksum`.
    pub(crate) fn try_finish(&mut self) -> Option<AssembledFile> {
        let actual = crc32(&self.buffer);
        if Some(actual) != self.expected_file_crc32 {
            return None;
        }
        self.completed = true;
        Some(AssembledFile {
            file_id: self.file_id.clone(),
            file_name: self.file_name.clone().unwrap_or_default(),
            data: Bytes::copy_from_slice(&self.buffer),
            file_checksum: actual,
            completed_at: Utc::now(),
        })
    }

    pub(crate) fn buffer_crc32(&self) -> u32 {
        crc32(&self.buffer)
    }

    pub(crate) fn expected_file_crc32(&self) -> Option<u32> {
        self.expected_file_crc32
    }
}
