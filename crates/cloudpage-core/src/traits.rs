//! The pluggable paging backend.

use crate::block::PointDataBlock;
use crate::request::PointCloudDataRequest;

/// Supplies and reclaims blocks of point records for a global index range.
///
/// Implementations choose their own caching, prefetch, and write-back
/// policy; accessors treat the pager as opaque. Pagers are driven from a
/// single thread through `&mut self`.
pub trait Pager {
    /// Check out up to `num_points` records starting at `start_index`.
    ///
    /// May return fewer points than requested (for example at the tail of
    /// the dataset). Returns `None` when no block can be supplied, which
    /// includes `start_index` at or past the end and `num_points == 0`.
    fn get_point_block(
        &mut self,
        start_index: u32,
        num_points: u32,
        request: &PointCloudDataRequest,
    ) -> Option<PointDataBlock>;

    /// Return a block obtained from [`get_point_block`](Self::get_point_block).
    ///
    /// Writable blocks may be written back to the backing store here.
    fn release_point_block(&mut self, block: PointDataBlock);
}
