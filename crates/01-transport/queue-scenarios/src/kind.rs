/// Which load pattern a [`ScenarioEngine`](crate::ScenarioEngine) drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioKind {
    /// Write one frame, read it back, repeat. Never fills the queue.
    Flood { frame_count: u32 },
    /// Write `burst_size` frames, then drain them all; `bursts` times.
    Burst { bursts: u32, burst_size: u32 },
    /// Write until the queue reports full, then drain it; repeat until
    /// `frames` frames were delivered.
    Backpressure { frames: u32 },
}

impl ScenarioKind {
    /// Number of frames a complete run delivers.
    pub fn expected_frames(&self) -> u32 {
        match *self {
            ScenarioKind::Flood { frame_count } => frame_count,
            ScenarioKind::Burst { bursts, burst_size } => bursts.saturating_mul(burst_size),
            ScenarioKind::Backpressure { frames } => frames,
        }
    }
}

/// Id of the `offset`-th frame in burst number `burst`. Frame ids are a
/// `u32` sequence, so very long runs wrap around to zero.
#[inline]
pub(crate) fn burst_frame_id(burst: u32, burst_size: u32, offset: u32) -> u32 {
    burst.wrapping_mul(burst_size).wrapping_add(offset)
}
