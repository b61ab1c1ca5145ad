//! transfer/assembler.rs
//! Packet-at-a-time reassembly.
//!
//! Per call:
//! 1. Locate or create the session for `file_id`.
//! 2. Start a new generation if chunk_size / correction_level changed.
//! 3. Verify and store the packet (metadata or data).
//! 4. After an accepted packet, check for completion and verify the whole file.
//! 5. Report status + snapshot (+ the file, on the completing call).
//!
//! Rejections are statuses, never errors. Sessions are never evicted
//! automatically; hosts call `remove_session` when they want memory back.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::headers::decode_metadata;
use crate::packet::Packet;
use crate::telemetry::{AssemblerCounters, ProgressSnapshot, TelemetrySnapshot};
use crate::transfer::session::{ChunkKey, Rejection, Session};
use crate::transfer::store::{CompletedFileStore, MemoryStore};
use crate::transfer::types::{AssembledFile, DecodeResult, PacketStatus};

/// Reassembly engine: live sessions plus the completed-file store.
#[derive(Debug)]
pub struct Assembler<S: CompletedFileStore = MemoryStore> {
    sessions: HashMap<String, Session>,
    store: S,
    counters: AssemblerCounters,
    started: Instant,
}

impl Assembler<MemoryStore> {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for Assembler<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CompletedFileStore> Assembler<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            sessions: HashMap::new(),
            store,
            counters: AssemblerCounters::default(),
            started: Instant::now(),
        }
    }

    /// Feed one captured packet.
    pub fn process(&mut self, packet: &Packet) -> DecodeResult {
        let file_id = packet.file_id();
        let session = self
            .sessions
            .entry(file_id.to_owned())
            .or_insert_with(|| Session::new(file_id, packet.chunk_size(), packet.correction_level()));

        if session.check_generation(packet.chunk_size(), packet.correction_level()) {
            self.counters.generation_resets += 1;
            debug!(
                file_id,
                chunk_size = packet.chunk_size(),
                level = %packet.correction_level(),
                generation = session.generations(),
                "generation reset"
            );
        }

        let mut status = if packet.is_metadata() {
            apply_metadata(session, packet)
        } else {
            apply_data(session, packet)
        };

        let mut completed = None;
        if status == PacketStatus::Accepted && session.ready_to_complete() {
            match session.try_finish() {
                Some(file) => {
                    info!(
                        file_id,
                        file_name = %file.file_name,
                        bytes = file.len(),
                        crc32 = file.file_checksum,
                        "transfer complete"
                    );
                    self.counters.files_completed += 1;
                    self.store.put(file.clone());
                    completed = Some(file);
                }
                None => {
                    warn!(
                        file_id,
                        expected = ?session.expected_file_crc32(),
                        actual = session.buffer_crc32(),
                        "whole-file checksum mismatch, clearing progress"
                    );
                    session.fail_checksum();
                    status = PacketStatus::InvalidFileChecksum;
                }
            }
        }

        self.counters.record(status, packet);

        DecodeResult {
            status,
            snapshot: session.snapshot(),
            completed,
        }
    }

    /// Completed file for `file_id`, independent of live session state.
    pub fn try_get_file(&self, file_id: &str) -> Option<&AssembledFile> {
        self.store.get(file_id)
    }

    /// Current progress for `file_id`, if a session exists.
    pub fn snapshot(&self, file_id: &str) -> Option<ProgressSnapshot> {
        self.sessions.get(file_id).map(Session::snapshot)
    }

    pub fn session(&self, file_id: &str) -> Option<&Session> {
        self.sessions.get(file_id)
    }

    /// Drop a live session. Completed files stay in the store.
    pub fn remove_session(&mut self, file_id: &str) -> Option<Session> {
        self.sessions.remove(file_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn counters(&self) -> &AssemblerCounters {
        &self.counters
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(
            &self.counters,
            self.sessions.len(),
            self.store.len(),
            self.started.elapsed(),
        )
    }
}

fn reject(session: &mut Session, packet: &Packet, why: Rejection) -> PacketStatus {
    session.record_invalid();
    warn!(
        file_id = packet.file_id(),
        metadata = packet.is_metadata(),
        offset = packet.offset(),
        reason = ?why,
        "packet rejected"
    );
    PacketStatus::InvalidCrc
}

fn verify_payload(packet: &Packet) -> Result<(), Rejection> {
    if packet.payload_crc_matches() {
        return Ok(());
    }
    Err(Rejection::PayloadCrc {
        declared: packet.payload_crc32(),
        actual: crate::utils::crc32(packet.payload()),
    })
}

fn apply_metadata(session: &mut Session, packet: &Packet) -> PacketStatus {
    if let Err(why) = verify_payload(packet) {
        return reject(session, packet, why);
    }
    if session.is_accepted(ChunkKey::Metadata) {
        return PacketStatus::Duplicate;
    }
    let header = match decode_metadata(packet.payload()) {
        Ok(header) => header,
        Err(e) => return reject(session, packet, Rejection::BadHeader(e.to_string())),
    };
    if header.chunk_size != packet.chunk_size() || header.correction_level != packet.correction_level() {
        debug!(
            file_id = packet.file_id(),
            header_chunk_size = header.chunk_size,
            header_level = %header.correction_level,
            "metadata header differs from packet generation fields"
        );
    }
    match session.accept_metadata(header) {
        Ok(()) => {
            debug!(file_id = packet.file_id(), file_name = ?session.file_name(), "metadata accepted");
            PacketStatus::Accepted
        }
        Err(why) => reject(session, packet, why),
    }
}

fn apply_data(session: &mut Session, packet: &Packet) -> PacketStatus {
    if let Err(why) = verify_payload(packet) {
        return reject(session, packet, why);
    }
    if session.is_accepted(ChunkKey::Data(packet.offset())) {
        return PacketStatus::Duplicate;
    }
    match session.accept_data(packet.offset(), packet.total_length(), packet.payload()) {
        Ok(()) => {
            debug!(
                file_id = packet.file_id(),
                offset = packet.offset(),
                len = packet.payload().len(),
                received_bytes = session.received_bytes(),
                "data accepted"
            );
            PacketStatus::Accepted
        }
        Err(why) => reject(session, packet, why),
    }
}
