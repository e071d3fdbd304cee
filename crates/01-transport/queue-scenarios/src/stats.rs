use std::sync::Arc;

use parking_lot::Mutex;

/// Counters one scenario run accumulates. All counters wrap on overflow.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ScenarioStats {
    pub produced: u32,
    pub consumed: u32,
    pub full_rejections: u32,
    pub empty_reads: u32,
    /// Largest number of frames in flight at any point.
    pub max_depth: u32,
}

impl ScenarioStats {
    pub(crate) fn record_write(&mut self, depth: u32) {
        self.produced = self.produced.wrapping_add(1);
        self.max_depth = self.max_depth.max(depth);
    }

    pub(crate) fn record_full(&mut self) {
        self.full_rejections = self.full_rejections.wrapping_add(1);
    }

    pub(crate) fn record_read(&mut self) {
        self.consumed = self.consumed.wrapping_add(1);
    }

    pub(crate) fn record_empty(&mut self) {
        self.empty_reads = self.empty_reads.wrapping_add(1);
    }
}

/// Where an engine records its [`ScenarioStats`].
pub trait StatsSink: Clone + Send + 'static {
    fn with_stats<R>(&self, f: impl FnOnce(&mut ScenarioStats) -> R) -> R;

    fn snapshot(&self) -> ScenarioStats {
        self.with_stats(|stats| *stats)
    }
}

/// Stats shared between the engine and whoever inspects the run.
#[derive(Clone, Default)]
pub struct SharedStats(Arc<Mutex<ScenarioStats>>);

impl StatsSink for SharedStats {
    fn with_stats<R>(&self, f: impl FnOnce(&mut ScenarioStats) -> R) -> R {
        f(&mut self.0.lock())
    }
}
