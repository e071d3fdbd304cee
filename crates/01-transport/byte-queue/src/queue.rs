//! The pooled byte queue.
//!
//! Writes copy caller data into a pooled buffer and try to enqueue it; reads
//! dequeue a buffer, copy it out and hand it back to the pool. Every path is
//! non-blocking except one: the first reader to claim the [`FirstReadGate`]
//! parks until a buffer is available. Readers that lose that race, or arrive
//! after it, get [`QueueError::Empty`] straight away when nothing is queued.

use std::io;
use std::mem;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, trace};

use crate::{
    BufferPool, ByteStream, FirstReadGate, FullPolicy, PoolStats, PooledBuf, QueueConfig,
    QueueError, QueueResult, SlotChannel, SlotPop, SlotPush, DEFAULT_QUEUE_CAPACITY,
};

/// Point-in-time view of queue activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Successful writes.
    pub writes: usize,
    /// Successful reads.
    pub reads: usize,
    /// Writes rejected because the slot channel was full.
    pub full_rejections: usize,
    /// Reads that found nothing queued.
    pub empty_reads: usize,
    /// Buffers queued right now.
    pub depth: usize,
    /// Slot channel capacity.
    pub capacity: usize,
    pub pool: PoolStats,
}

#[derive(Default)]
struct QueueMetrics {
    writes: AtomicUsize,
    reads: AtomicUsize,
    full_rejections: AtomicUsize,
    empty_reads: AtomicUsize,
}

/// Bounded FIFO of pooled byte buffers, readable and writable from any
/// number of threads.
pub struct ByteQueue {
    channel: SlotChannel,
    pool: BufferPool,
    gate: FirstReadGate,
    full_policy: FullPolicy,
    metrics: QueueMetrics,
}

impl Default for ByteQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteQueue {
    /// Creates a queue with 4096-byte buffers and room for 1024 of them.
    pub fn new() -> Self {
        Self::build(QueueConfig::default())
    }

    /// Creates a queue with default-sized buffers and `queue_capacity` slots.
    pub fn with_capacity(queue_capacity: usize) -> QueueResult<Self> {
        Self::from_config(QueueConfig::default().with_queue_capacity(queue_capacity))
    }

    /// Creates a queue with `buffer_size`-byte buffers and the given (or
    /// default) number of slots.
    pub fn with_buffer_size(
        buffer_size: usize,
        queue_capacity: Option<usize>,
    ) -> QueueResult<Self> {
        Self::from_config(
            QueueConfig::default()
                .with_buffer_size(buffer_size)
                .with_queue_capacity(queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)),
        )
    }

    pub fn from_config(config: QueueConfig) -> QueueResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: QueueConfig) -> Self {
        debug!(
            "ByteQueue: buffer_size={} queue_capacity={} full_policy={:?}",
            config.buffer_size, config.queue_capacity, config.full_policy
        );
        Self {
            channel: SlotChannel::new(config.queue_capacity),
            pool: BufferPool::new(config.buffer_size),
            gate: FirstReadGate::new(),
            full_policy: config.full_policy,
            metrics: QueueMetrics::default(),
        }
    }

    /// Capacity in bytes of each buffer; longer writes are truncated to it.
    pub fn buffer_size(&self) -> usize {
        self.pool.buffer_size()
    }

    /// Maximum number of buffers in flight.
    pub fn capacity(&self) -> usize {
        self.channel.capacity()
    }

    /// Number of buffers waiting for a reader.
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn full_policy(&self) -> FullPolicy {
        self.full_policy
    }

    /// Whether some reader has already taken the one blocking dequeue.
    pub fn is_primed(&self) -> bool {
        self.gate.is_claimed()
    }

    /// Copies `data` into a pooled buffer and enqueues it.
    ///
    /// At most [`buffer_size`](Self::buffer_size) bytes are taken; the rest is
    /// silently cut off. When the channel is full the copied byte count is
    /// reported through [`QueueError::Full`] and the buffer is dropped or
    /// recycled according to the [`FullPolicy`].
    pub fn write(&self, data: &[u8]) -> QueueResult<usize> {
        let mut buf = self.pool.acquire();
        let written = buf.fill_from(data);

        match self.channel.try_enqueue(buf) {
            SlotPush::Ok => {
                self.metrics.writes.fetch_add(1, Ordering::Relaxed);
                Ok(written)
            }
            SlotPush::Full(buf) => {
                self.metrics.full_rejections.fetch_add(1, Ordering::Relaxed);
                match self.full_policy {
                    FullPolicy::Drop => {
                        trace!(
                            "ByteQueue::write: queue full (capacity={}), dropping {} bytes",
                            self.channel.capacity(),
                            written
                        );
                        self.pool.discard(buf);
                    }
                    FullPolicy::Recycle => {
                        trace!(
                            "ByteQueue::write: queue full (capacity={}), recycling buffer of {} bytes",
                            self.channel.capacity(),
                            written
                        );
                        self.pool.release(buf);
                    }
                }
                Err(QueueError::Full { written })
            }
        }
    }

    /// Copies the oldest queued chunk into `dest`.
    ///
    /// Bytes of the chunk that do not fit in `dest` are discarded; a read
    /// never spans two chunks. The very first caller to get here blocks until
    /// a chunk is available; everyone else gets [`QueueError::Empty`] when
    /// the queue is empty.
    pub fn read(&self, dest: &mut [u8]) -> QueueResult<usize> {
        let buf = if self.gate.try_claim() {
            debug!("ByteQueue::read: first-read gate claimed, waiting for a buffer");
            self.channel.blocking_dequeue()
        } else {
            match self.channel.try_dequeue() {
                SlotPop::Ok(buf) => Some(buf),
                SlotPop::Empty => None,
            }
        };

        let Some(buf) = buf else {
            self.metrics.empty_reads.fetch_add(1, Ordering::Relaxed);
            return Err(QueueError::Empty);
        };

        let buf = ReleaseOnDrop::new(&self.pool, buf);
        let n = buf.copy_to(dest);
        self.metrics.reads.fetch_add(1, Ordering::Relaxed);
        Ok(n)
    }

    /// Frees idle pooled buffers. Returns how many were dropped.
    pub fn shrink_pool(&self) -> usize {
        self.pool.shrink()
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            writes: self.metrics.writes.load(Ordering::Relaxed),
            reads: self.metrics.reads.load(Ordering::Relaxed),
            full_rejections: self.metrics.full_rejections.load(Ordering::Relaxed),
            empty_reads: self.metrics.empty_reads.load(Ordering::Relaxed),
            depth: self.channel.len(),
            capacity: self.channel.capacity(),
            pool: self.pool.stats(),
        }
    }
}

/// Returns a dequeued buffer to its pool on every exit path of a read.
struct ReleaseOnDrop<'a> {
    pool: &'a BufferPool,
    buf: PooledBuf,
}

impl<'a> ReleaseOnDrop<'a> {
    fn new(pool: &'a BufferPool, buf: PooledBuf) -> Self {
        Self { pool, buf }
    }
}

impl Deref for ReleaseOnDrop<'_> {
    type Target = PooledBuf;

    fn deref(&self) -> &PooledBuf {
        &self.buf
    }
}

impl Drop for ReleaseOnDrop<'_> {
    fn drop(&mut self) {
        self.pool.release(mem::take(&mut self.buf));
    }
}

impl ByteStream for ByteQueue {
    fn read(&self, dest: &mut [u8]) -> QueueResult<usize> {
        ByteQueue::read(self, dest)
    }

    fn write(&self, data: &[u8]) -> QueueResult<usize> {
        ByteQueue::write(self, data)
    }
}

/// A zero-length chunk reads back as `Ok(0)`. Generic consumers such as
/// [`io::Read::read_to_end`] take that as end of stream and stop there.
impl io::Read for &ByteQueue {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        ByteQueue::read(*self, buf).map_err(io::Error::from)
    }
}

impl io::Write for &ByteQueue {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ByteQueue::write(*self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// See the `&ByteQueue` impl: a zero-length chunk reads back as `Ok(0)`.
impl io::Read for ByteQueue {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(&mut &*self, buf)
    }
}

impl io::Write for ByteQueue {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::Write::write(&mut &*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
