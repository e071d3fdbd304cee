//! One-shot gate deciding which reader may block.
//!
//! The first caller to flip the flag wins the single blocking dequeue of the
//! queue's lifetime; every other caller, concurrent or later, loses and takes
//! the non-blocking path. Builds with `RUSTFLAGS="--cfg loom"` swap in loom's
//! atomics so the exactly-one-winner property can be model-checked.

#[cfg(loom)]
use loom::sync::atomic::{AtomicBool, Ordering};
#[cfg(not(loom))]
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
pub struct FirstReadGate {
    claimed: AtomicBool,
}

impl Default for FirstReadGate {
    fn default() -> Self {
        Self::new()
    }
}

impl FirstReadGate {
    pub fn new() -> Self {
        Self {
            claimed: AtomicBool::new(false),
        }
    }

    /// Returns `true` for exactly one caller over the gate's lifetime.
    #[inline]
    pub fn try_claim(&self) -> bool {
        // Cheap load first so the steady state never contends on the CAS.
        if self.claimed.load(Ordering::Acquire) {
            return false;
        }
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether the gate has been claimed.
    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }
}
