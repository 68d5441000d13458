//! Pager backends for the cloudpage point-cloud paging layer.
//!
//! Two interchangeable implementations of [`cloudpage_core::Pager`]:
//!
//! ```text
//! InMemoryPager        MemoryMappedPager
//! ├── Vec<u8> records  ├── Mmap / MmapMut over a record file
//! ├── BlockPool        ├── BlockPool
//! └── BlockLedger      └── BlockLedger
//! ```
//!
//! Both copy the requested record range into a pooled buffer when a block
//! is checked out and copy it back on release if the block was requested
//! writable. Neither assumes anything about the access pattern of the
//! accessor driving it.
//!
//! # Safety
//!
//! The only `unsafe` in this crate is the two map calls in [`mmap`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod in_memory;
pub mod ledger;
pub mod mmap;
pub mod pool;

pub use config::PagerConfig;
pub use in_memory::InMemoryPager;
pub use ledger::{BlockLease, BlockLedger};
pub use mmap::MemoryMappedPager;
pub use pool::BlockPool;

/// Number of points a block starting at `start` can hold when
/// `num_points` are requested from an array of `capacity` records.
///
/// Returns `None` when the block would be empty.
pub(crate) fn clamp_block(start: u32, num_points: u32, capacity: u32) -> Option<u32> {
    if num_points == 0 || start >= capacity {
        return None;
    }
    Some(num_points.min(capacity - start))
}

/// Byte range of `count` records starting at record `start`.
pub(crate) fn byte_range(start: u32, count: u32, point_size: usize) -> std::ops::Range<usize> {
    let begin = start as usize * point_size;
    begin..begin + count as usize * point_size
}
