//! The point cursor behind every accessor.
//!
//! A cursor is either **Attached** (it holds a block and a local index
//! inside it) or **Invalid** (no block). Every navigation call moves the
//! local index and then rebalances: once the index leaves the held block
//! the block goes back to the pager and the block that starts at the new
//! global position is checked out in its place.
//!
//! ```text
//!   block_start          block_start + current
//!        │                      │
//!        ▼                      ▼
//!   ┌────────┬────────┬────────┬────────┬────────┐
//!   │ rec 0  │ rec 1  │  ...   │ rec i  │  ...   │  points_in_block records
//!   └────────┴────────┴────────┴────────┴────────┘
//!                               ◄─ byte_offset ─►
//! ```
//!
//! Local indices are `u32` and move with wrapping arithmetic, so stepping
//! or jumping before the block start also lands outside `0..points_in_block`
//! and triggers a reload.

use std::cell::Cell;
use std::rc::Rc;

use log::debug;

use cloudpage_core::{Axis, Pager, PointCloudDataRequest, PointDataBlock, PointId};

use crate::convert::ConversionTable;
use crate::element::PointCloudElement;
use crate::layout::RecordLayout;
use crate::raw;

/// Navigation state and field access over one element's records.
///
/// Obtained through a [`PointCloudAccessor`](crate::PointCloudAccessor).
/// Field getters read the current record; on an Invalid cursor they panic
/// on an empty slice, so check [`is_valid`](Self::is_valid) first.
pub struct AccessorCursor<'a> {
    element: &'a PointCloudElement,
    request: PointCloudDataRequest,
    block: Option<PointDataBlock>,
    attached: Rc<Cell<bool>>,
    block_start: u32,
    current: u32,
    points_in_block: u32,
    byte_offset: usize,
    layout: RecordLayout,
    conversions: ConversionTable,
    scale: [f64; 3],
    offset: [f64; 3],
    block_points: u32,
    array_count: u32,
}

impl<'a> AccessorCursor<'a> {
    /// Build a cursor and check out the first block of the element.
    ///
    /// The cursor is Invalid if the element has no pager or the pager
    /// supplies no block.
    pub(crate) fn new(
        element: &'a PointCloudElement,
        request: PointCloudDataRequest,
        conversions: ConversionTable,
    ) -> Self {
        let descriptor = element.descriptor();
        let mut cursor = Self {
            element,
            request,
            block: None,
            attached: Rc::new(Cell::new(false)),
            block_start: 0,
            current: 0,
            points_in_block: 0,
            byte_offset: 0,
            layout: RecordLayout::from_descriptor(descriptor),
            conversions,
            scale: descriptor.scale,
            offset: descriptor.offset,
            block_points: element.config().accessor.block_points,
            array_count: element.array_count(),
        };
        let count = cursor.block_points.min(cursor.array_count);
        cursor.swap_block(0, count);
        cursor
    }

    /// Whether a block is attached.
    pub fn is_valid(&self) -> bool {
        self.block.is_some()
    }

    /// Shared copy of the Attached state, updated on every block swap.
    pub(crate) fn attached_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.attached)
    }

    /// Global index of the current point.
    pub fn current_index(&self) -> u32 {
        self.block_start.wrapping_add(self.current)
    }

    /// Global index of the first point of the attached block.
    pub fn block_start(&self) -> u32 {
        self.block_start
    }

    /// Number of points in the attached block (zero when Invalid).
    pub fn points_in_block(&self) -> u32 {
        self.points_in_block
    }

    /// The record layout this cursor reads with.
    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// The request this cursor passes to the pager.
    pub fn request(&self) -> &PointCloudDataRequest {
        &self.request
    }

    // ── navigation ──────────────────────────────────────────────

    /// Advance one point.
    ///
    /// Navigation on an Invalid cursor does nothing.
    pub fn next_point(&mut self) {
        if self.block.is_none() {
            return;
        }
        self.current = self.current.wrapping_add(1);
        self.byte_offset = self.byte_offset.wrapping_add(self.layout.point_size);
        self.rebalance();
    }

    /// Step back one point.
    ///
    /// At the start of a block this reloads a block starting one point
    /// earlier. At global index 0 the cursor becomes Invalid.
    ///
    /// Every step back across a block start is a full reload of up to
    /// [`AccessorConfig::block_points`](crate::AccessorConfig::block_points)
    /// records, so a long backward scan costs one block copy per point.
    /// Jump back with [`to_index`](Self::to_index) in block-sized strides
    /// and step forward within each block instead.
    pub fn previous_point(&mut self) {
        if self.block.is_none() {
            return;
        }
        self.current = self.current.wrapping_sub(1);
        self.byte_offset = self.byte_offset.wrapping_sub(self.layout.point_size);
        self.rebalance();
    }

    /// Jump to global index `index`.
    ///
    /// Indices outside the attached block, before or after it, reload the
    /// block that starts at `index`. Indices at or past the element's
    /// array count make the cursor Invalid.
    pub fn to_index(&mut self, index: u32) {
        if self.block.is_none() {
            return;
        }
        self.current = index.wrapping_sub(self.block_start);
        self.byte_offset = (self.current as usize).wrapping_mul(self.layout.point_size);
        self.rebalance();
    }

    /// Advance to the next point whose valid flag is set.
    ///
    /// Stops Invalid when the data runs out.
    pub fn next_valid_point(&mut self) {
        self.next_point();
        while self.is_valid() && !self.is_point_valid() {
            self.next_point();
        }
    }

    /// Step back to the previous point whose valid flag is set.
    pub fn previous_valid_point(&mut self) {
        self.previous_point();
        while self.is_valid() && !self.is_point_valid() {
            self.previous_point();
        }
    }

    fn rebalance(&mut self) {
        if self.current < self.points_in_block {
            return;
        }
        let start = self.block_start.wrapping_add(self.current);
        let count = self
            .block_points
            .min(self.array_count.saturating_sub(start));
        self.swap_block(start, count);
    }

    /// Release the held block, if any, and check out `count` points at
    /// `start`.
    fn swap_block(&mut self, start: u32, count: u32) {
        let element = self.element;
        let mut slot = element.pager_slot();
        let next = match slot.as_deref_mut() {
            Some(pager) => {
                if let Some(old) = self.block.take() {
                    debug!(
                        "releasing block {} ({} points at {})",
                        old.id(),
                        old.num_points(),
                        old.start_index()
                    );
                    pager.release_point_block(old);
                }
                checkout(pager, start, count, &self.request)
            }
            // Only reachable from `new`: the pager cannot be removed while
            // an accessor borrows the element, so a held block implies one.
            None => match self.block.take() {
                Some(block) => unreachable!(
                    "pager missing while block {} is checked out",
                    block.id()
                ),
                None => None,
            },
        };
        drop(slot);

        match &next {
            Some(block) => {
                debug!(
                    "attached block {} ({} points at {start})",
                    block.id(),
                    block.num_points()
                );
                self.block_start = start;
                self.points_in_block = block.num_points();
            }
            None => {
                debug!("no block at {start}, accessor is now invalid");
                self.block_start = 0;
                self.points_in_block = 0;
            }
        }
        self.attached.set(next.is_some());
        self.block = next;
        self.current = 0;
        self.byte_offset = 0;
    }

    // ── record access ───────────────────────────────────────────

    fn data(&self) -> &[u8] {
        match &self.block {
            Some(block) => block.raw_data(),
            None => &[],
        }
    }

    fn data_mut(&mut self) -> &mut [u8] {
        match &mut self.block {
            Some(block) => block.raw_data_mut(),
            None => &mut [],
        }
    }

    fn field(&self, at: usize, len: usize) -> &[u8] {
        raw::field(self.data(), self.byte_offset + at, len)
    }

    fn field_mut(&mut self, at: usize, len: usize) -> &mut [u8] {
        let offset = self.byte_offset + at;
        raw::field_mut(self.data_mut(), offset, len)
    }

    /// Whether the current point's valid flag is set. `false` when Invalid.
    pub fn is_point_valid(&self) -> bool {
        if self.block.is_none() {
            return false;
        }
        raw::read::<u8>(self.field(self.layout.valid, 1)) != 0
    }

    /// Set or clear the current point's valid flag.
    pub fn set_point_valid(&mut self, valid: bool) {
        let at = self.layout.valid;
        raw::write(self.field_mut(at, 1), u8::from(valid));
    }

    /// The current point's id.
    pub fn point_id(&self) -> PointId {
        raw::read(self.field(self.layout.id, std::mem::size_of::<PointId>()))
    }

    /// Overwrite the current point's id.
    pub fn set_point_id(&mut self, id: PointId) {
        let at = self.layout.id;
        raw::write(self.field_mut(at, std::mem::size_of::<PointId>()), id);
    }

    /// Raw bytes of the spatial field for `axis`.
    pub fn raw_axis(&self, axis: Axis) -> &[u8] {
        self.field(self.layout.axis_offset(axis), self.layout.spatial_size)
    }

    /// Raw bytes of the spatial field for `axis`, mutably.
    pub fn raw_axis_mut(&mut self, axis: Axis) -> &mut [u8] {
        let (at, len) = (self.layout.axis_offset(axis), self.layout.spatial_size);
        self.field_mut(at, len)
    }

    /// Raw bytes of X.
    pub fn raw_x(&self) -> &[u8] {
        self.raw_axis(Axis::X)
    }

    /// Raw bytes of Y.
    pub fn raw_y(&self) -> &[u8] {
        self.raw_axis(Axis::Y)
    }

    /// Raw bytes of Z.
    pub fn raw_z(&self) -> &[u8] {
        self.raw_axis(Axis::Z)
    }

    /// Raw bytes of X, mutably.
    pub fn raw_x_mut(&mut self) -> &mut [u8] {
        self.raw_axis_mut(Axis::X)
    }

    /// Raw bytes of Y, mutably.
    pub fn raw_y_mut(&mut self) -> &mut [u8] {
        self.raw_axis_mut(Axis::Y)
    }

    /// Raw bytes of Z, mutably.
    pub fn raw_z_mut(&mut self) -> &mut [u8] {
        self.raw_axis_mut(Axis::Z)
    }

    /// Raw bytes of intensity, if the record has it.
    pub fn raw_intensity(&self) -> Option<&[u8]> {
        let at = self.layout.intensity?;
        Some(self.field(at, self.layout.intensity_size))
    }

    /// Raw bytes of intensity, mutably.
    pub fn raw_intensity_mut(&mut self) -> Option<&mut [u8]> {
        let at = self.layout.intensity?;
        let len = self.layout.intensity_size;
        Some(self.field_mut(at, len))
    }

    /// Raw bytes of classification, if the record has it.
    pub fn raw_classification(&self) -> Option<&[u8]> {
        let at = self.layout.classification?;
        Some(self.field(at, self.layout.classification_size))
    }

    /// Raw bytes of classification, mutably.
    pub fn raw_classification_mut(&mut self) -> Option<&mut [u8]> {
        let at = self.layout.classification?;
        let len = self.layout.classification_size;
        Some(self.field_mut(at, len))
    }

    fn scale_offset(&self, axis: Axis, apply: bool) -> (f64, f64) {
        if apply {
            (self.scale[axis.index()], self.offset[axis.index()])
        } else {
            (1.0, 0.0)
        }
    }

    /// `axis` as a double, with the descriptor's scale and offset applied
    /// when `apply_scale_offset` is set.
    pub fn axis_as_double(&self, axis: Axis, apply_scale_offset: bool) -> f64 {
        let (scale, offset) = self.scale_offset(axis, apply_scale_offset);
        self.conversions
            .spatial
            .to_double(self.raw_axis(axis), scale, offset)
    }

    /// `axis` as a truncated integer.
    pub fn axis_as_integer(&self, axis: Axis, apply_scale_offset: bool) -> i64 {
        let (scale, offset) = self.scale_offset(axis, apply_scale_offset);
        self.conversions
            .spatial
            .to_integer(self.raw_axis(axis), scale, offset)
    }

    /// X as a double.
    pub fn x_as_double(&self, apply_scale_offset: bool) -> f64 {
        self.axis_as_double(Axis::X, apply_scale_offset)
    }

    /// Y as a double.
    pub fn y_as_double(&self, apply_scale_offset: bool) -> f64 {
        self.axis_as_double(Axis::Y, apply_scale_offset)
    }

    /// Z as a double.
    pub fn z_as_double(&self, apply_scale_offset: bool) -> f64 {
        self.axis_as_double(Axis::Z, apply_scale_offset)
    }

    /// X as a truncated integer.
    pub fn x_as_integer(&self, apply_scale_offset: bool) -> i64 {
        self.axis_as_integer(Axis::X, apply_scale_offset)
    }

    /// Y as a truncated integer.
    pub fn y_as_integer(&self, apply_scale_offset: bool) -> i64 {
        self.axis_as_integer(Axis::Y, apply_scale_offset)
    }

    /// Z as a truncated integer.
    pub fn z_as_integer(&self, apply_scale_offset: bool) -> i64 {
        self.axis_as_integer(Axis::Z, apply_scale_offset)
    }

    /// Intensity, unscaled.
    pub fn intensity_as_double(&self) -> Option<f64> {
        let bytes = self.raw_intensity()?;
        Some(self.conversions.intensity.to_double(bytes, 1.0, 0.0))
    }

    /// Intensity, unscaled and truncated.
    pub fn intensity_as_integer(&self) -> Option<i64> {
        let bytes = self.raw_intensity()?;
        Some(self.conversions.intensity.to_integer(bytes, 1.0, 0.0))
    }

    /// Classification, unscaled.
    pub fn classification_as_double(&self) -> Option<f64> {
        let bytes = self.raw_classification()?;
        Some(self.conversions.classification.to_double(bytes, 1.0, 0.0))
    }

    /// Classification, unscaled and truncated.
    pub fn classification_as_integer(&self) -> Option<i64> {
        let bytes = self.raw_classification()?;
        Some(self.conversions.classification.to_integer(bytes, 1.0, 0.0))
    }
}

/// Get a block, handing back any block that arrives without records.
fn checkout(
    pager: &mut dyn Pager,
    start: u32,
    count: u32,
    request: &PointCloudDataRequest,
) -> Option<PointDataBlock> {
    match pager.get_point_block(start, count, request) {
        Some(block) if block.has_data() => Some(block),
        Some(empty) => {
            pager.release_point_block(empty);
            None
        }
        None => None,
    }
}

impl Drop for AccessorCursor<'_> {
    fn drop(&mut self) {
        let Some(block) = self.block.take() else {
            return;
        };
        match self.element.pager_slot().as_deref_mut() {
            Some(pager) => {
                debug!("releasing block {} on accessor drop", block.id());
                pager.release_point_block(block);
            }
            None => debug!("dropping block {} with no pager", block.id()),
        }
    }
}

impl std::fmt::Debug for AccessorCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessorCursor")
            .field("element", &self.element.name())
            .field("valid", &self.is_valid())
            .field("block_start", &self.block_start)
            .field("current", &self.current)
            .field("points_in_block", &self.points_in_block)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use cloudpage_core::{EncodingType, PointCloudDataDescriptor, PointCloudDataRequest};

    use crate::config::ElementConfig;
    use crate::element::PointCloudElement;

    fn element(n: u32, block_points: u32) -> PointCloudElement {
        let desc = PointCloudDataDescriptor::new(n).with_spatial_type(EncodingType::Int2UBytes);
        let config = ElementConfig::new().with_block_points(block_points);
        let mut elem = PointCloudElement::new("cursor", desc, config).unwrap();
        elem.create_in_memory_pager().unwrap();
        let acc =
            elem.get_point_cloud_accessor(Some(PointCloudDataRequest::new().with_writable(true)));
        let mut cursor = acc.cursor();
        for id in 0..n {
            cursor.set_point_id(id);
            cursor.next_point();
        }
        drop(cursor);
        drop(acc);
        elem
    }

    #[test]
    fn first_block_is_capped() {
        let elem = element(10, 4);
        let acc = elem.get_point_cloud_accessor(None);
        let cursor = acc.cursor();
        assert_eq!(cursor.block_start(), 0);
        assert_eq!(cursor.points_in_block(), 4);
    }

    #[test]
    fn tail_block_is_short() {
        let elem = element(10, 4);
        let acc = elem.get_point_cloud_accessor(None);
        let mut cursor = acc.cursor();
        cursor.to_index(9);
        assert_eq!(cursor.block_start(), 9);
        assert_eq!(cursor.points_in_block(), 1);
        assert_eq!(cursor.point_id(), 9);
    }

    #[test]
    fn jumping_backward_reloads_at_target() {
        let elem = element(10, 4);
        let acc = elem.get_point_cloud_accessor(None);
        let mut cursor = acc.cursor();
        cursor.to_index(8);
        cursor.to_index(2);
        assert!(cursor.is_valid());
        assert_eq!(cursor.block_start(), 2);
        assert_eq!(cursor.current_index(), 2);
        assert_eq!(cursor.point_id(), 2);
    }

    #[test]
    fn stepping_back_across_block_start() {
        let elem = element(10, 4);
        let acc = elem.get_point_cloud_accessor(None);
        let mut cursor = acc.cursor();
        cursor.to_index(5);
        cursor.previous_point();
        assert_eq!(cursor.block_start(), 4);
        cursor.previous_point();
        assert_eq!(cursor.point_id(), 3);
        assert_eq!(cursor.block_start(), 3);
    }

    #[test]
    fn previous_from_zero_invalidates() {
        let elem = element(3, 4);
        let acc = elem.get_point_cloud_accessor(None);
        let mut cursor = acc.cursor();
        cursor.previous_point();
        assert!(!cursor.is_valid());
        assert!(!cursor.is_point_valid());
        cursor.next_point();
        assert!(!cursor.is_valid());
    }

    #[test]
    fn past_end_invalidates() {
        let elem = element(3, 4);
        let acc = elem.get_point_cloud_accessor(None);
        let mut cursor = acc.cursor();
        cursor.to_index(3);
        assert!(!cursor.is_valid());
    }

    #[test]
    #[should_panic]
    fn field_read_on_invalid_cursor_panics() {
        let elem = element(1, 4);
        let acc = elem.get_point_cloud_accessor(None);
        let mut cursor = acc.cursor();
        cursor.next_point();
        let _ = cursor.point_id();
    }

    #[test]
    fn absent_optional_fields_read_as_none() {
        let elem = element(2, 4);
        let acc = elem.get_point_cloud_accessor(None);
        let cursor = acc.cursor();
        assert!(cursor.raw_intensity().is_none());
        assert!(cursor.intensity_as_double().is_none());
        assert!(cursor.classification_as_integer().is_none());
    }
}
