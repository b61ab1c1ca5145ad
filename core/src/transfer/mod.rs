//! Transfer layer: encoder and reassembly state machine.
//!
//! Responsibilities:
//! - Partition a named blob into one metadata packet and N data packets
//! - Reassemble packets arriving in any order, duplicated or corrupted
//! - Keep completed files queryable after their session moves on
//!
//! Non-responsibilities:
//! - Wire bytes (see `packet`)
//! - Rendering, scanning, retransmission requests

pub mod types;
pub mod encoder;
pub mod session;
pub mod store;
pub mod assembler;

pub use types::{AssembledFile, DecodeResult, PacketStatus, SessionState};
pub use encoder::{build_packets, new_file_id, EncodeError, Encoder};
pub use session::Session;
pub use store::{CompletedFileStore, MemoryStore};
pub use assembler::Assembler;
