//! Recycling of block buffers.
//!
//! A pager serving a forward scan checks out and releases blocks of the
//! same size over and over. [`BlockPool`] keeps a few released buffers so
//! that steady-state scanning does not allocate.

use smallvec::SmallVec;

/// A bounded free list of byte buffers.
#[derive(Debug)]
pub struct BlockPool {
    free: SmallVec<[Vec<u8>; 4]>,
    capacity: usize,
}

impl BlockPool {
    /// A pool that retains at most `capacity` buffers.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: SmallVec::new(),
            capacity,
        }
    }

    /// A buffer holding a copy of `src`, reusing a pooled allocation when
    /// one is large enough.
    pub fn take_filled(&mut self, src: &[u8]) -> Vec<u8> {
        let mut buf = match self.free.iter().position(|b| b.capacity() >= src.len()) {
            Some(i) => self.free.swap_remove(i),
            None => self.free.pop().unwrap_or_default(),
        };
        buf.clear();
        buf.extend_from_slice(src);
        buf
    }

    /// Return a buffer to the pool. Dropped if the pool is full.
    pub fn give(&mut self, buf: Vec<u8>) {
        if self.free.len() < self.capacity {
            self.free.push(buf);
        }
    }

    /// Number of buffers currently pooled.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Whether no buffers are pooled.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }
}
