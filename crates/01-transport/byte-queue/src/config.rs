use crate::{QueueError, QueueResult};

/// Default capacity of each pooled buffer, in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;
/// Default number of buffers the slot channel can hold.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// What a write does with its filled buffer when the slot channel is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FullPolicy {
    /// Drop the buffer. Its bytes are lost and the pool allocates a
    /// replacement on a later acquire.
    #[default]
    Drop,
    /// Hand the buffer back to the pool for reuse.
    Recycle,
}

/// Configuration describing the shape of a [`ByteQueue`](crate::ByteQueue).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueueConfig {
    /// Capacity in bytes of every pooled buffer; longer writes are truncated.
    pub buffer_size: usize,
    /// Maximum number of buffers in flight between writers and readers.
    pub queue_capacity: usize,
    pub full_policy: FullPolicy,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            full_policy: FullPolicy::Drop,
        }
    }
}

impl QueueConfig {
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_full_policy(mut self, full_policy: FullPolicy) -> Self {
        self.full_policy = full_policy;
        self
    }

    /// Checks that both sizes are non-zero.
    ///
    /// A zero-capacity channel could never accept a non-blocking enqueue, and
    /// a zero-sized buffer could never carry a byte.
    pub fn validate(&self) -> QueueResult<()> {
        if self.queue_capacity == 0 {
            return Err(QueueError::InvalidConfig {
                field: "queue_capacity",
                value: 0,
                minimum: 1,
            });
        }
        if self.buffer_size == 0 {
            return Err(QueueError::InvalidConfig {
                field: "buffer_size",
                value: 0,
                minimum: 1,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = QueueConfig::default();
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.full_policy, FullPolicy::Drop);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn rejects_zero_sizes() {
        let err = QueueConfig::default()
            .with_queue_capacity(0)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            QueueError::InvalidConfig {
                field: "queue_capacity",
                value: 0,
                minimum: 1
            }
        );

        let err = QueueConfig::default()
            .with_buffer_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            QueueError::InvalidConfig {
                field: "buffer_size",
                ..
            }
        ));
    }

    #[test]
    fn builder_overrides_fields() {
        let config = QueueConfig::default()
            .with_buffer_size(16)
            .with_queue_capacity(2)
            .with_full_policy(FullPolicy::Recycle);
        assert_eq!(
            config,
            QueueConfig {
                buffer_size: 16,
                queue_capacity: 2,
                full_policy: FullPolicy::Recycle,
            }
        );
    }
}
