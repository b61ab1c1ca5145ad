//! utils.rs
//! Checksum primitive and small formatting helpers shared across layers.
//!
//! Industry notes:
//! - CRC-32 here is the reflected IEEE 802.3 variant (poly 0xEDB88320, init
//!   0xFFFFFFFF, final xor 0xFFFFFFFF), the same one used by zip/PNG/Ethernet.
//! - `crc32fast` keeps its lookup tables in immutable statics, so calls are
//!   safe from any thread without synchronization.

use num_enum::TryFromPrimitive;

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
pub enum ChecksumAlg {
    Crc32 = 0x0001,
}

/// Compute the checksum of `data` with the chosen algorithm (CRC-32 when `None`).
pub fn compute_checksum(data: &[u8], alg: Option<ChecksumAlg>) -> u32 {
    match alg {
        Some(ChecksumAlg::Crc32) | None => compute_crc32(data),
    }
}

/// Shorthand for `compute_checksum(data, Some(ChecksumAlg::Crc32))`.
#[inline]
pub fn crc32(data: &[u8]) -> u32 {
    compute_crc32(data)
}

fn compute_crc32(data: &[u8]) -> u32 {
    use crc32fast::Hasher;
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        format!("0x{}", hex::encode(b))
    }
}
