//! Error surface for the byte queue.
//!
//! Runtime failures are limited to the two non-blocking outcomes (`Full` on
//! write, `Empty` on read). Neither one disturbs the queue; callers retry at
//! their own boundary. Construction adds configuration validation.

use std::io;

use thiserror::Error;

/// Convenience result alias for queue operations.
pub type QueueResult<T, E = QueueError> = Result<T, E>;

/// Errors surfaced by [`ByteQueue`](crate::ByteQueue) and its constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The slot channel was at capacity; `written` bytes were copied into a
    /// buffer that never became visible to readers.
    #[error("queue is full ({written} bytes not enqueued)")]
    Full { written: usize },

    /// No buffer was available for a non-blocking read.
    #[error("queue is empty")]
    Empty,

    /// A configuration value was below its minimum.
    #[error("invalid {field}: {value} (minimum {minimum})")]
    InvalidConfig {
        field: &'static str,
        value: usize,
        minimum: usize,
    },
}

impl QueueError {
    pub fn is_full(&self) -> bool {
        matches!(self, QueueError::Full { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, QueueError::Empty)
    }
}

impl From<QueueError> for io::Error {
    fn from(err: QueueError) -> Self {
        let kind = match err {
            QueueError::Full { .. } | QueueError::Empty => io::ErrorKind::WouldBlock,
            QueueError::InvalidConfig { .. } => io::ErrorKind::InvalidInput,
        };
        io::Error::new(kind, err)
    }
}
