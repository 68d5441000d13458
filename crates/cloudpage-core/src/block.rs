//! Data blocks: contiguous runs of packed point records handed out by a
//! pager.

use std::fmt;

/// Pager-assigned identity of an outstanding block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A buffer holding `num_points` consecutive records starting at global
/// index `start_index`.
///
/// The block owns its buffer for as long as it is checked out; it must be
/// handed back through [`Pager::release_point_block`](crate::Pager) so
/// the pager can write it back (for writable blocks) and recycle the
/// buffer. A block may hold fewer points than were requested.
#[derive(Debug)]
pub struct PointDataBlock {
    id: BlockId,
    start_index: u32,
    num_points: u32,
    point_size: usize,
    writable: bool,
    data: Vec<u8>,
}

impl PointDataBlock {
    /// Wrap a record buffer.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != num_points * point_size`.
    pub fn new(
        id: BlockId,
        start_index: u32,
        num_points: u32,
        point_size: usize,
        writable: bool,
        data: Vec<u8>,
    ) -> Self {
        assert_eq!(
            data.len(),
            num_points as usize * point_size,
            "block buffer does not hold {num_points} records of {point_size} bytes",
        );
        Self {
            id,
            start_index,
            num_points,
            point_size,
            writable,
            data,
        }
    }

    /// Identity assigned by the issuing pager.
    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Global index of the first record.
    pub fn start_index(&self) -> u32 {
        self.start_index
    }

    /// Number of records actually held.
    pub fn num_points(&self) -> u32 {
        self.num_points
    }

    /// Size of one record in bytes.
    pub fn point_size(&self) -> usize {
        self.point_size
    }

    /// Whether modifications will be written back on release.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Whether the block carries any record bytes.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// The packed records.
    pub fn raw_data(&self) -> &[u8] {
        &self.data
    }

    /// The packed records, mutably.
    pub fn raw_data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Take the buffer back out of the block.
    pub fn into_raw_data(self) -> Vec<u8> {
        self.data
    }
}
