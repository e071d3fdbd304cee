#![allow(missing_docs)]
//! Load scenarios driven against any [`ByteStream`](byte_queue::ByteStream).
//!
//! Each scenario pushes numbered frames through the stream and drains them
//! again, recording backpressure and empty reads in a [`StatsSink`]. The
//! `verify_*` helpers turn the drained frame ids and stats into pass/fail
//! results.

mod checks;
mod engine;
mod kind;
mod stats;

pub use checks::{verify_backpressure, verify_burst, verify_flood, CheckResult, DrainReport};
pub use engine::ScenarioEngine;
pub use kind::ScenarioKind;
pub use stats::{ScenarioStats, SharedStats, StatsSink};

/// Size in bytes of one encoded frame.
pub const FRAME_LEN: usize = 8;

/// Encodes `frame_id` followed by its bitwise complement.
#[inline]
pub fn frame_payload(frame_id: u32) -> [u8; FRAME_LEN] {
    let mut payload = [0u8; FRAME_LEN];
    payload[..4].copy_from_slice(&frame_id.to_le_bytes());
    payload[4..].copy_from_slice(&(!frame_id).to_le_bytes());
    payload
}

/// Decodes a frame written by [`frame_payload`]; `None` if the bytes are
/// truncated or corrupted.
pub fn parse_frame(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != FRAME_LEN {
        return None;
    }
    let mut id = [0u8; 4];
    let mut check = [0u8; 4];
    id.copy_from_slice(&bytes[..4]);
    check.copy_from_slice(&bytes[4..]);
    let id = u32::from_le_bytes(id);
    (u32::from_le_bytes(check) == !id).then_some(id)
}
