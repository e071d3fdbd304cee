//! Fixed-capacity byte buffers handed between writers and readers.
//!
//! A buffer owns one heap allocation whose size never changes after
//! construction. Only the logical length moves: writers trim it to the bytes
//! they copied in, and the pool restores it to the full capacity on release.
//! Restoring the length does not zero the storage.

/// Byte buffer with a fixed allocated capacity and a variable logical length.
#[derive(Debug, Default)]
pub struct PooledBuf {
    data: Box<[u8]>,
    len: usize,
}

impl PooledBuf {
    /// Allocates a buffer of `capacity` bytes whose logical length spans the
    /// whole allocation.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: capacity,
        }
    }

    /// Size of the underlying allocation.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of valid bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Valid bytes, `[0, len)`.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Copies as much of `src` as fits and trims the logical length to the
    /// copied count. Returns the number of bytes copied.
    pub fn fill_from(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.data.len());
        self.data[..n].copy_from_slice(&src[..n]);
        self.len = n;
        n
    }

    /// Copies the valid bytes into `dest`, stopping at whichever side is
    /// shorter. Returns the number of bytes copied.
    pub fn copy_to(&self, dest: &mut [u8]) -> usize {
        let n = dest.len().min(self.len);
        dest[..n].copy_from_slice(&self.data[..n]);
        n
    }

    /// Restores the logical length to the full capacity.
    pub fn reset(&mut self) {
        self.len = self.data.len();
    }
}
