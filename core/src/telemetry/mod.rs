//! telemetry/mod.rs
//! Counters and immutable snapshots for the transfer layer.
//!
//! Industry notes:
//! - Per-session `ProgressSnapshot` drives live UI progress (received /
//!   invalid / failed counts) without the core knowing about any UI.
//! - Process-wide `AssemblerCounters` aggregate every packet the host fed in;
//!   `TelemetrySnapshot` freezes them with derived ratios and throughput.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
