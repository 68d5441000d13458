//! Bookkeeping of checked-out blocks.
//!
//! The [`BlockLedger`] is how a pager recognises its own blocks on release
//! and decides whether to write them back. It uses `IndexMap` so that
//! iteration over outstanding leases follows checkout order.

use cloudpage_core::{BlockId, PointDataBlock};
use indexmap::IndexMap;

/// What a pager remembers about one checked-out block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockLease {
    /// Global index of the first record.
    pub start_index: u32,
    /// Records in the block.
    pub num_points: u32,
    /// Whether the block is written back on release.
    pub writable: bool,
}

/// Outstanding leases plus lifetime checkout statistics.
#[derive(Debug, Default)]
pub struct BlockLedger {
    next_id: u64,
    outstanding: IndexMap<BlockId, BlockLease>,
    served: u64,
    released: u64,
}

impl BlockLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a checkout and assign the block its id.
    pub fn issue(&mut self, lease: BlockLease) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        self.outstanding.insert(id, lease);
        self.served += 1;
        id
    }

    /// Close the lease for a returned block.
    ///
    /// Returns `None` if the block was not issued by this ledger, was
    /// already settled, or no longer matches its lease.
    pub fn settle(&mut self, block: &PointDataBlock) -> Option<BlockLease> {
        let lease = *self.outstanding.get(&block.id())?;
        if lease.start_index != block.start_index() || lease.num_points != block.num_points() {
            return None;
        }
        self.outstanding.shift_remove(&block.id());
        self.released += 1;
        Some(lease)
    }

    /// Number of blocks currently checked out.
    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }

    /// Outstanding leases in checkout order.
    pub fn leases(&self) -> impl Iterator<Item = (BlockId, &BlockLease)> {
        self.outstanding.iter().map(|(id, lease)| (*id, lease))
    }

    /// Total blocks ever served.
    pub fn served(&self) -> u64 {
        self.served
    }

    /// Total blocks ever released back.
    pub fn released(&self) -> u64 {
        self.released
    }
}
