//! Pager over a record array held entirely in memory.

use cloudpage_core::{
    Pager, PagerError, PointCloudDataDescriptor, PointCloudDataRequest, PointDataBlock,
};
use log::{debug, warn};

use crate::config::PagerConfig;
use crate::ledger::{BlockLease, BlockLedger};
use crate::pool::BlockPool;
use crate::{byte_range, clamp_block};

/// Pager backed by a zero-initialised `Vec<u8>` of packed records.
///
/// Zero-initialised storage means every point starts out invalid (valid
/// flag 0) with id 0 and all fields 0.
#[derive(Debug)]
pub struct InMemoryPager {
    data: Vec<u8>,
    point_size: usize,
    capacity: u32,
    pool: BlockPool,
    ledger: BlockLedger,
}

impl InMemoryPager {
    /// Allocate storage for `array_count` records laid out per `descriptor`.
    pub fn initialize(
        descriptor: &PointCloudDataDescriptor,
        array_count: u32,
        config: &PagerConfig,
    ) -> Result<Self, PagerError> {
        Self::with_point_size(descriptor.point_size_in_bytes(), array_count, config)
    }

    /// Allocate storage for `capacity` records of `point_size` bytes.
    pub fn with_point_size(
        point_size: usize,
        capacity: u32,
        config: &PagerConfig,
    ) -> Result<Self, PagerError> {
        if point_size == 0 {
            return Err(PagerError::ZeroPointSize);
        }
        let len = point_size
            .checked_mul(capacity as usize)
            .ok_or(PagerError::CapacityOverflow {
                point_size,
                points: capacity as u64,
            })?;
        debug!("in-memory pager: {capacity} records of {point_size} bytes ({len} bytes)");
        Ok(Self {
            data: vec![0; len],
            point_size,
            capacity,
            pool: BlockPool::new(config.pool_capacity),
            ledger: BlockLedger::new(),
        })
    }

    /// Size of one record in bytes.
    pub fn point_size(&self) -> usize {
        self.point_size
    }

    /// Number of record slots.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The backing records.
    ///
    /// Changes held in outstanding writable blocks are not visible here
    /// until those blocks are released.
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// The backing records, mutably.
    pub fn raw_data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Checkout bookkeeping.
    pub fn ledger(&self) -> &BlockLedger {
        &self.ledger
    }
}

impl Pager for InMemoryPager {
    fn get_point_block(
        &mut self,
        start_index: u32,
        num_points: u32,
        request: &PointCloudDataRequest,
    ) -> Option<PointDataBlock> {
        let count = clamp_block(start_index, num_points, self.capacity)?;
        let range = byte_range(start_index, count, self.point_size);
        let buf = self.pool.take_filled(&self.data[range]);
        let writable = request.writable();
        let id = self.ledger.issue(BlockLease {
            start_index,
            num_points: count,
            writable,
        });
        Some(PointDataBlock::new(
            id,
            start_index,
            count,
            self.point_size,
            writable,
            buf,
        ))
    }

    fn release_point_block(&mut self, block: PointDataBlock) {
        let Some(lease) = self.ledger.settle(&block) else {
            warn!(
                "in-memory pager: ignoring release of unknown block {} at {}",
                block.id(),
                block.start_index()
            );
            return;
        };
        if lease.writable {
            let range = byte_range(lease.start_index, lease.num_points, self.point_size);
            self.data[range].copy_from_slice(block.raw_data());
        }
        self.pool.give(block.into_raw_data());
    }
}
