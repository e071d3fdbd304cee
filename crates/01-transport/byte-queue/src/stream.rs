use crate::QueueResult;

/// Duplex byte-stream capability: a readable side and a writable side living
/// next to each other.
///
/// Both operations take `&self` so a single stream can be shared by any
/// number of reader and writer threads.
pub trait ByteStream: Send + Sync {
    /// Copies the next available chunk into `dest`, returning the byte count.
    fn read(&self, dest: &mut [u8]) -> QueueResult<usize>;

    /// Submits `data` as one chunk, returning the number of bytes accepted.
    fn write(&self, data: &[u8]) -> QueueResult<usize>;
}

impl<T: ByteStream + ?Sized> ByteStream for std::sync::Arc<T> {
    fn read(&self, dest: &mut [u8]) -> QueueResult<usize> {
        (**self).read(dest)
    }

    fn write(&self, data: &[u8]) -> QueueResult<usize> {
        (**self).write(data)
    }
}

impl<T: ByteStream + ?Sized> ByteStream for Box<T> {
    fn read(&self, dest: &mut [u8]) -> QueueResult<usize> {
        (**self).read(dest)
    }

    fn write(&self, data: &[u8]) -> QueueResult<usize> {
        (**self).write(data)
    }
}
