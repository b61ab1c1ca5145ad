//! headers/mod.rs
//! Metadata header carried in the payload of a transfer's metadata packet.
//!
//! Industry notes:
//! - Linear, fixed-order layout with length-prefixed name; no padding.
//! - Little-endian for multi-byte integers, matching the packet wire format.
//! - The header is protected by the metadata packet's payload CRC; decoding
//!   assumes that check already passed and only validates structure.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
