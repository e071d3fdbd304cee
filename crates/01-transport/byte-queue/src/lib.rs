//! Bounded, in-process byte queue with recycled buffer storage.
//!
//! The crate exposes the pieces that make up the queue:
//! * [`PooledBuf`] – fixed-capacity byte buffer with a variable logical length.
//! * [`BufferPool`] – recycling store handing buffers to writers and taking them back from readers.
//! * [`SlotChannel`] – fixed-capacity FIFO of buffers with non-blocking enqueue/dequeue.
//! * [`ByteQueue`] – the queue itself, exposed through the [`ByteStream`] capability
//!   and `std::io::{Read, Write}`.
//! * [`QueueError`] – the small error surface (`Full`, `Empty`, invalid configuration).

mod buffer;
mod config;
mod error;
mod gate;
mod pool;
mod queue;
mod slot_channel;
mod stream;

pub use buffer::PooledBuf;
pub use config::{FullPolicy, QueueConfig, DEFAULT_BUFFER_SIZE, DEFAULT_QUEUE_CAPACITY};
pub use error::{QueueError, QueueResult};
pub use gate::FirstReadGate;
pub use pool::{BufferPool, PoolStats};
pub use queue::{ByteQueue, QueueStats};
pub use slot_channel::{SlotChannel, SlotPop, SlotPush};
pub use stream::ByteStream;

/// Creates a queue with the default buffer size and the given (or default)
/// slot capacity, returned as a type-erased [`ByteStream`].
pub fn new(queue_capacity: Option<usize>) -> QueueResult<Box<dyn ByteStream>> {
    let config = QueueConfig::default()
        .with_queue_capacity(queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY));
    Ok(Box::new(ByteQueue::from_config(config)?))
}

/// Like [`new`] but with an explicit per-buffer size.
pub fn new_with_buffer_size(
    buffer_size: usize,
    queue_capacity: Option<usize>,
) -> QueueResult<Box<dyn ByteStream>> {
    Ok(Box::new(ByteQueue::with_buffer_size(
        buffer_size,
        queue_capacity,
    )?))
}
