//! Descriptor and element fixtures.

use cloudpage_access::{AccessorCursor, ElementConfig, PointCloudElement};
use cloudpage_core::{Axis, EncodingType, PointCloudDataDescriptor, PointCloudDataRequest};

use crate::{MockPager, PagerCounters};

/// `n` points with signed 4-byte X/Y/Z and nothing else.
pub fn descriptor_i32_xyz(n: u32) -> PointCloudDataDescriptor {
    PointCloudDataDescriptor::new(n).with_spatial_type(EncodingType::Int4SBytes)
}

/// An element over a fresh [`MockPager`], with the pager's counters.
pub fn element_with_mock(
    descriptor: PointCloudDataDescriptor,
    config: ElementConfig,
) -> (PointCloudElement, PagerCounters) {
    let pager = MockPager::new(descriptor.point_size_in_bytes(), descriptor.array_count());
    let counters = pager.counters();
    let mut element = PointCloudElement::new("fixture", descriptor, config).unwrap();
    assert!(element.set_pager(Box::new(pager)));
    (element, counters)
}

/// Visit every record slot through a writable accessor, in index order.
pub fn populate(element: &PointCloudElement, mut fill: impl FnMut(u32, &mut AccessorCursor<'_>)) {
    let accessor =
        element.get_point_cloud_accessor(Some(PointCloudDataRequest::new().with_writable(true)));
    assert!(accessor.is_valid(), "fixture element has no data");
    let mut cursor = accessor.cursor();
    let mut index = 0;
    while cursor.is_valid() {
        fill(index, &mut *cursor);
        cursor.next_point();
        index += 1;
    }
}

/// Store `xyz` in the current record of an `Int4SBytes` element.
pub fn set_xyz_i32(cursor: &mut AccessorCursor<'_>, xyz: [i32; 3]) {
    for axis in Axis::ALL {
        cursor
            .raw_axis_mut(axis)
            .copy_from_slice(&xyz[axis.index()].to_ne_bytes());
    }
}

/// An `n`-point element whose point `i` has id `i`, X/Y/Z `(i, 2i, 3i)`,
/// and is valid, backed by a [`MockPager`] with counters reset.
pub fn populated_i32_element(n: u32, config: ElementConfig) -> (PointCloudElement, PagerCounters) {
    let (element, counters) = element_with_mock(descriptor_i32_xyz(n), config);
    populate(&element, |i, cursor| {
        let v = i as i32;
        set_xyz_i32(cursor, [v, 2 * v, 3 * v]);
        cursor.set_point_id(i);
        cursor.set_point_valid(true);
    });
    counters.reset();
    (element, counters)
}
