//! Recycling store of fixed-size buffers.
//!
//! Writers acquire a buffer per write and readers release it after copying
//! the payload out. The free list only reduces allocation churn; it does not
//! bound how many buffers may be outstanding. That bound belongs to the slot
//! channel.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace};
use parking_lot::Mutex;

use crate::PooledBuf;

/// Point-in-time view of pool activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Capacity of every buffer produced by this pool.
    pub buffer_size: usize,
    /// Buffers constructed because the free list was empty.
    pub allocated: usize,
    /// Acquisitions served from the free list.
    pub reused: usize,
    /// Buffers handed back through [`BufferPool::release`].
    pub released: usize,
    /// Buffers reported lost through [`BufferPool::discard`].
    pub discarded: usize,
    /// Buffers currently waiting on the free list.
    pub idle: usize,
}

impl PoolStats {
    /// Buffers acquired and not yet released or discarded.
    pub fn outstanding(&self) -> usize {
        (self.allocated + self.reused).saturating_sub(self.released + self.discarded)
    }
}

#[derive(Default)]
struct PoolMetrics {
    allocated: AtomicUsize,
    reused: AtomicUsize,
    released: AtomicUsize,
    discarded: AtomicUsize,
}

/// Thread-safe pool of [`PooledBuf`]s sharing one capacity.
pub struct BufferPool {
    buffer_size: usize,
    free_list: Mutex<Vec<PooledBuf>>,
    metrics: PoolMetrics,
}

impl BufferPool {
    /// Creates an empty pool producing buffers of `buffer_size` bytes.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            free_list: Mutex::new(Vec::new()),
            metrics: PoolMetrics::default(),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Returns a recycled buffer, or a freshly allocated one when the free
    /// list is empty. Never fails.
    pub fn acquire(&self) -> PooledBuf {
        let recycled = self.free_list.lock().pop();
        match recycled {
            Some(buf) => {
                self.metrics.reused.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                let total = self.metrics.allocated.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(
                    "BufferPool::acquire: free list empty, allocating {} bytes (total={})",
                    self.buffer_size,
                    total
                );
                PooledBuf::with_capacity(self.buffer_size)
            }
        }
    }

    /// Restores the buffer's length to its capacity and makes it available to
    /// later [`acquire`](Self::acquire) calls.
    pub fn release(&self, mut buf: PooledBuf) {
        debug_assert_eq!(
            buf.capacity(),
            self.buffer_size,
            "buffer returned to a pool of a different size"
        );
        buf.reset();
        self.metrics.released.fetch_add(1, Ordering::Relaxed);
        self.free_list.lock().push(buf);
    }

    /// Drops a buffer that will never come back, keeping the counters honest.
    pub fn discard(&self, buf: PooledBuf) {
        self.metrics.discarded.fetch_add(1, Ordering::Relaxed);
        drop(buf);
    }

    /// Frees every idle buffer. Returns how many were dropped.
    pub fn shrink(&self) -> usize {
        let dropped = {
            let mut list = self.free_list.lock();
            let count = list.len();
            list.clear();
            list.shrink_to_fit();
            count
        };
        debug!(
            "BufferPool::shrink: dropped {} idle buffers ({} bytes)",
            dropped,
            dropped * self.buffer_size
        );
        dropped
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            buffer_size: self.buffer_size,
            allocated: self.metrics.allocated.load(Ordering::Relaxed),
            reused: self.metrics.reused.load(Ordering::Relaxed),
            released: self.metrics.released.load(Ordering::Relaxed),
            discarded: self.metrics.discarded.load(Ordering::Relaxed),
            idle: self.free_list.lock().len(),
        }
    }
}
