//! Test utilities and mock types for cloudpage development.
//!
//! Provides [`MockPager`], a [`Pager`] that counts its traffic through
//! shared [`PagerCounters`], and fixtures for building and filling
//! elements.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::Cell;
use std::rc::Rc;

use cloudpage_core::{BlockId, Pager, PointCloudDataRequest, PointDataBlock};

pub use fixtures::*;

/// Call counters shared between a [`MockPager`] and the test holding it.
///
/// Cloning shares the counts, so a test can keep a copy after moving the
/// pager into an element.
#[derive(Clone, Debug, Default)]
pub struct PagerCounters {
    gets: Rc<Cell<u32>>,
    failed_gets: Rc<Cell<u32>>,
    releases: Rc<Cell<u32>>,
}

impl PagerCounters {
    /// Every `get_point_block` call, including ones that returned nothing.
    pub fn gets(&self) -> u32 {
        self.gets.get()
    }

    /// `get_point_block` calls that returned nothing.
    pub fn failed_gets(&self) -> u32 {
        self.failed_gets.get()
    }

    /// Blocks handed out.
    pub fn served(&self) -> u32 {
        self.gets() - self.failed_gets()
    }

    /// `release_point_block` calls.
    pub fn releases(&self) -> u32 {
        self.releases.get()
    }

    /// Blocks handed out and not yet released.
    pub fn outstanding(&self) -> u32 {
        self.served() - self.releases()
    }

    /// Zero every counter.
    pub fn reset(&self) {
        self.gets.set(0);
        self.failed_gets.set(0);
        self.releases.set(0);
    }

    fn bump(cell: &Cell<u32>) {
        cell.set(cell.get() + 1);
    }
}

/// In-memory [`Pager`] with call counting and failure injection.
///
/// Writable blocks are copied back on release.
pub struct MockPager {
    data: Vec<u8>,
    point_size: usize,
    capacity: u32,
    counters: PagerCounters,
    fail_after: Option<u32>,
    blocks_served: u32,
    next_id: u64,
}

impl MockPager {
    /// Zeroed storage for `capacity` records of `point_size` bytes.
    pub fn new(point_size: usize, capacity: u32) -> Self {
        Self {
            data: vec![0; point_size * capacity as usize],
            point_size,
            capacity,
            counters: PagerCounters::default(),
            fail_after: None,
            blocks_served: 0,
            next_id: 0,
        }
    }

    /// Refuse every request after `blocks` blocks have been served.
    pub fn fail_after(mut self, blocks: u32) -> Self {
        self.fail_after = Some(blocks);
        self
    }

    /// A handle on this pager's counters.
    pub fn counters(&self) -> PagerCounters {
        self.counters.clone()
    }
}

impl Pager for MockPager {
    fn get_point_block(
        &mut self,
        start_index: u32,
        num_points: u32,
        request: &PointCloudDataRequest,
    ) -> Option<PointDataBlock> {
        PagerCounters::bump(&self.counters.gets);
        let exhausted = self
            .fail_after
            .is_some_and(|limit| self.blocks_served >= limit);
        if exhausted || num_points == 0 || start_index >= self.capacity {
            PagerCounters::bump(&self.counters.failed_gets);
            return None;
        }
        let count = num_points.min(self.capacity - start_index);
        let begin = start_index as usize * self.point_size;
        let end = begin + count as usize * self.point_size;
        self.blocks_served += 1;
        self.next_id += 1;
        Some(PointDataBlock::new(
            BlockId(self.next_id),
            start_index,
            count,
            self.point_size,
            request.writable(),
            self.data[begin..end].to_vec(),
        ))
    }

    fn release_point_block(&mut self, block: PointDataBlock) {
        PagerCounters::bump(&self.counters.releases);
        if block.is_writable() {
            let begin = block.start_index() as usize * self.point_size;
            let end = begin + block.raw_data().len();
            self.data[begin..end].copy_from_slice(block.raw_data());
        }
    }
}
