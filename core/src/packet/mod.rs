//! Packet value type and wire codec.
//!
//! Responsibilities:
//! - Define the packet value and its copy-with-override builder
//! - Encode packets into a canonical byte layout for optical symbols
//! - Decode captured bytes with strict validation
//!
//! Non-responsibilities:
//! - Rendering or scanning images
//! - Reassembly (see `transfer`)

pub mod types;
pub mod encode;
pub mod decode;

pub use types::{
    CorrectionLevel,
    Packet,
    PacketBuilder,
    PacketError,
    PacketFlags,
};
pub use encode::{encode_packet, encode_packet_text};
pub use decode::{decode_packet, decode_packet_text};
