//! Fixed-capacity FIFO of buffers between writers and readers.
//!
//! The channel owns both ends of a bounded crossbeam channel, so it can never
//! observe a disconnect. Enqueue is always non-blocking; a full channel hands
//! the buffer back to the caller. Dequeue comes in a non-blocking flavour
//! and a blocking one that parks until a buffer arrives.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::PooledBuf;

/// Result of pushing a buffer into the channel.
#[derive(Debug)]
pub enum SlotPush {
    /// The buffer was enqueued.
    Ok,
    /// The channel is at capacity; ownership of the buffer returns to the caller.
    Full(PooledBuf),
}

/// Result of popping a buffer from the channel.
#[derive(Debug)]
pub enum SlotPop {
    /// The oldest queued buffer.
    Ok(PooledBuf),
    /// Nothing is queued at the moment.
    Empty,
}

/// Bounded FIFO of [`PooledBuf`]s.
pub struct SlotChannel {
    tx: Sender<PooledBuf>,
    rx: Receiver<PooledBuf>,
    capacity: usize,
}

impl SlotChannel {
    /// Creates a channel holding at most `capacity` buffers.
    ///
    /// A zero capacity yields a rendezvous channel on which non-blocking
    /// enqueues always fail; [`QueueConfig::validate`](crate::QueueConfig::validate)
    /// rejects it before a queue is built.
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of buffers currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Enqueues `buf` if there is room, without blocking.
    pub fn try_enqueue(&self, buf: PooledBuf) -> SlotPush {
        match self.tx.try_send(buf) {
            Ok(()) => SlotPush::Ok,
            Err(TrySendError::Full(buf)) | Err(TrySendError::Disconnected(buf)) => {
                SlotPush::Full(buf)
            }
        }
    }

    /// Dequeues the oldest buffer if one is queued, without blocking.
    pub fn try_dequeue(&self) -> SlotPop {
        match self.rx.try_recv() {
            Ok(buf) => SlotPop::Ok(buf),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => SlotPop::Empty,
        }
    }

    /// Parks the calling thread until a buffer is available.
    ///
    /// Returns `None` only if every sender is gone, which cannot happen while
    /// `self` holds one.
    pub fn blocking_dequeue(&self) -> Option<PooledBuf> {
        self.rx.recv().ok()
    }
}
