use byte_queue::{ByteStream, QueueError};
use log::{debug, warn};

use crate::kind::{burst_frame_id, ScenarioKind};
use crate::stats::{ScenarioStats, StatsSink};
use crate::{frame_payload, parse_frame, FRAME_LEN};

/// Drives one [`ScenarioKind`] against a stream in bounded steps.
///
/// The engine assumes it is the only reader of the stream: it reads only
/// while frames it wrote are still in flight, so the queue's blocking first
/// read always finds data.
pub struct ScenarioEngine<Q, S> {
    io: FrameIo<Q, S>,
    state: ScenarioState,
}

enum ScenarioState {
    Flood {
        frame_count: u32,
        current: u32,
    },
    Burst {
        bursts: u32,
        burst_size: u32,
        current_burst: u32,
    },
    Backpressure {
        frames: u32,
        next: u32,
    },
}

enum Produce {
    Sent,
    Full,
    Failed,
}

struct FrameIo<Q, S> {
    stream: Q,
    stats: S,
    in_flight: u32,
    drained: Vec<u32>,
    failed: bool,
}

impl<Q, S> FrameIo<Q, S>
where
    Q: ByteStream,
    S: StatsSink,
{
    fn produce(&mut self, frame_id: u32) -> Produce {
        match self.stream.write(&frame_payload(frame_id)) {
            Ok(_) => {
                self.in_flight += 1;
                let depth = self.in_flight;
                self.stats.with_stats(|stats| stats.record_write(depth));
                Produce::Sent
            }
            Err(QueueError::Full { .. }) => {
                self.stats.with_stats(ScenarioStats::record_full);
                Produce::Full
            }
            Err(err) => {
                warn!("ScenarioEngine: write of frame {frame_id} failed: {err}");
                self.failed = true;
                Produce::Failed
            }
        }
    }

    fn consume(&mut self) -> bool {
        let mut dest = [0u8; FRAME_LEN];
        match self.stream.read(&mut dest) {
            Ok(n) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match parse_frame(&dest[..n]) {
                    Some(frame_id) => self.drained.push(frame_id),
                    None => warn!("ScenarioEngine: dropped malformed frame ({n} bytes)"),
                }
                self.stats.with_stats(ScenarioStats::record_read);
                true
            }
            Err(QueueError::Empty) => {
                self.stats.with_stats(ScenarioStats::record_empty);
                false
            }
            Err(err) => {
                warn!("ScenarioEngine: read failed: {err}");
                self.failed = true;
                false
            }
        }
    }

    fn drain_in_flight(&mut self) -> usize {
        let mut drained = 0;
        while self.in_flight > 0 && self.consume() {
            drained += 1;
        }
        drained
    }
}

impl<Q, S> ScenarioEngine<Q, S>
where
    Q: ByteStream,
    S: StatsSink,
{
    pub fn new(stream: Q, stats: S, kind: ScenarioKind) -> Self {
        let state = match kind {
            ScenarioKind::Flood { frame_count } => ScenarioState::Flood {
                frame_count,
                current: 0,
            },
            ScenarioKind::Burst { bursts, burst_size } => ScenarioState::Burst {
                bursts,
                burst_size,
                current_burst: 0,
            },
            ScenarioKind::Backpressure { frames } => ScenarioState::Backpressure { frames, next: 0 },
        };

        Self {
            io: FrameIo {
                stream,
                stats,
                in_flight: 0,
                drained: Vec::new(),
                failed: false,
            },
            state,
        }
    }

    /// Runs one bounded step. Returns the amount of work done; zero once the
    /// scenario has finished or a stream operation failed.
    pub fn poll(&mut self) -> usize {
        if self.io.failed {
            return 0;
        }
        let io = &mut self.io;
        match &mut self.state {
            ScenarioState::Flood {
                frame_count,
                current,
            } => {
                let mut work = 0usize;
                while *current < *frame_count && work < 100 {
                    match io.produce(*current) {
                        Produce::Sent => {
                            io.consume();
                            *current += 1;
                            work += 1;
                        }
                        Produce::Full => {
                            if io.drain_in_flight() == 0 {
                                break;
                            }
                        }
                        Produce::Failed => break,
                    }
                }
                work
            }
            ScenarioState::Burst {
                bursts,
                burst_size,
                current_burst,
            } => {
                if *current_burst >= *bursts {
                    return 0;
                }

                let mut work = 0usize;
                let mut offset = 0u32;
                while offset < *burst_size {
                    let frame_id = burst_frame_id(*current_burst, *burst_size, offset);
                    match io.produce(frame_id) {
                        Produce::Sent => {
                            offset += 1;
                            work += 1;
                        }
                        // Oversized burst: make room for one frame and retry.
                        Produce::Full => {
                            if !io.consume() {
                                return work;
                            }
                        }
                        Produce::Failed => return work,
                    }
                }
                io.drain_in_flight();
                *current_burst += 1;
                work
            }
            ScenarioState::Backpressure { frames, next } => {
                if *next >= *frames && io.in_flight == 0 {
                    return 0;
                }

                let mut work = 0usize;
                while *next < *frames {
                    match io.produce(*next) {
                        Produce::Sent => *next += 1,
                        Produce::Full => break,
                        Produce::Failed => return work,
                    }
                }
                work += io.drain_in_flight();
                work
            }
        }
    }

    /// Polls until the scenario reports no more work.
    pub fn run(&mut self) -> usize {
        let mut total = 0;
        loop {
            let work = self.poll();
            if work == 0 {
                break;
            }
            total += work;
        }
        debug!(
            "ScenarioEngine: {} finished after {} units of work ({} frames drained)",
            self.name(),
            total,
            self.io.drained.len()
        );
        total
    }

    pub fn name(&self) -> &'static str {
        match self.state {
            ScenarioState::Flood { .. } => "flood",
            ScenarioState::Burst { .. } => "burst",
            ScenarioState::Backpressure { .. } => "backpressure",
        }
    }

    /// Frame ids read back so far, in delivery order.
    pub fn drained(&self) -> &[u32] {
        &self.io.drained
    }

    /// Whether a stream operation failed with something other than
    /// `Full`/`Empty`.
    pub fn failed(&self) -> bool {
        self.io.failed
    }

    pub fn stats(&self) -> &S {
        &self.io.stats
    }
}
