//! Point cloud descriptor: point count, arrangement, encodings, and the
//! per-axis scale/offset/extent metadata that every pager and accessor
//! reads.

use std::fmt;

use crate::encoding::EncodingType;
use crate::error::DescriptorError;

/// Bytes occupied by the point id field of every record.
pub const POINT_ID_BYTES: usize = std::mem::size_of::<crate::PointId>();

/// Bytes occupied by the valid flag of every record.
pub const VALID_FLAG_BYTES: usize = 1;

/// A spatial axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Easting / X.
    X,
    /// Northing / Y.
    Y,
    /// Elevation / Z.
    Z,
}

impl Axis {
    /// All three axes in record order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in per-axis arrays and in the record.
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
            Self::Z => f.write_str("z"),
        }
    }
}

/// How points are globally ordered and how many record slots exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointCloudArrangement {
    /// Flat array; capacity equals the point count.
    PointArray,
    /// K-d tree over X/Y; capacity rounded up to a power of two.
    KdTreeXyArray,
    /// K-d tree over X/Y/Z; capacity rounded up to a power of two.
    KdTreeXyzArray,
}

impl PointCloudArrangement {
    /// Number of record slots needed to hold `point_count` points.
    ///
    /// Tree arrangements round up to the next power of two using 32-bit
    /// bit smearing, so 0 stays 0 and anything above 2^31 wraps to 0.
    pub fn array_count(self, point_count: u32) -> u32 {
        match self {
            Self::PointArray => point_count,
            Self::KdTreeXyArray | Self::KdTreeXyzArray => {
                let mut n = point_count.wrapping_sub(1);
                n |= n >> 1;
                n |= n >> 2;
                n |= n >> 4;
                n |= n >> 8;
                n |= n >> 16;
                n.wrapping_add(1)
            }
        }
    }
}

/// Where the element keeps its records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessingLocation {
    /// Whole array held in process memory.
    InMemory,
    /// Backed by a writable memory-mapped file.
    OnDisk,
    /// Backed by an existing file that must not be modified.
    OnDiskReadOnly,
}

impl fmt::Display for ProcessingLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InMemory => f.write_str("in-memory"),
            Self::OnDisk => f.write_str("on-disk"),
            Self::OnDiskReadOnly => f.write_str("on-disk read-only"),
        }
    }
}

/// Read-only description of a point cloud dataset.
///
/// Scale and offset are applied as `raw * scale + offset` to obtain world
/// coordinates. Extents are in world coordinates; a freshly constructed
/// descriptor has inverted extents (`min = f64::MAX`, `max = -f64::MAX`)
/// so that the first [`expand_extents`](Self::expand_extents) call sets
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloudDataDescriptor {
    /// Number of points actually present.
    pub point_count: u32,
    /// Global ordering of the records.
    pub arrangement: PointCloudArrangement,
    /// Storage strategy used when the element creates its default pager.
    pub processing_location: ProcessingLocation,
    /// Encoding shared by X, Y, and Z.
    pub spatial_type: EncodingType,
    /// Whether records carry an intensity field.
    pub has_intensity: bool,
    /// Encoding of the intensity field.
    pub intensity_type: EncodingType,
    /// Whether records carry a classification field.
    pub has_classification: bool,
    /// Encoding of the classification field.
    pub classification_type: EncodingType,
    /// Per-axis scale, indexed by [`Axis::index`].
    pub scale: [f64; 3],
    /// Per-axis offset, indexed by [`Axis::index`].
    pub offset: [f64; 3],
    /// Per-axis minimum extent.
    pub min: [f64; 3],
    /// Per-axis maximum extent.
    pub max: [f64; 3],
}

impl PointCloudDataDescriptor {
    /// A descriptor for `point_count` points with default metadata.
    pub fn new(point_count: u32) -> Self {
        Self {
            point_count,
            arrangement: PointCloudArrangement::PointArray,
            processing_location: ProcessingLocation::InMemory,
            spatial_type: EncodingType::Int1UByte,
            has_intensity: false,
            intensity_type: EncodingType::Int1UByte,
            has_classification: false,
            classification_type: EncodingType::Int1UByte,
            scale: [1.0; 3],
            offset: [0.0; 3],
            min: [f64::MAX; 3],
            max: [-f64::MAX; 3],
        }
    }

    /// Set the spatial encoding.
    pub fn with_spatial_type(mut self, encoding: EncodingType) -> Self {
        self.spatial_type = encoding;
        self
    }

    /// Enable the intensity field with the given encoding.
    pub fn with_intensity(mut self, encoding: EncodingType) -> Self {
        self.has_intensity = true;
        self.intensity_type = encoding;
        self
    }

    /// Enable the classification field with the given encoding.
    pub fn with_classification(mut self, encoding: EncodingType) -> Self {
        self.has_classification = true;
        self.classification_type = encoding;
        self
    }

    /// Set the arrangement.
    pub fn with_arrangement(mut self, arrangement: PointCloudArrangement) -> Self {
        self.arrangement = arrangement;
        self
    }

    /// Set the processing location.
    pub fn with_processing_location(mut self, location: ProcessingLocation) -> Self {
        self.processing_location = location;
        self
    }

    /// Set scale and offset for one axis.
    pub fn with_scale_offset(mut self, axis: Axis, scale: f64, offset: f64) -> Self {
        self.scale[axis.index()] = scale;
        self.offset[axis.index()] = offset;
        self
    }

    /// Scale for `axis`.
    pub fn scale(&self, axis: Axis) -> f64 {
        self.scale[axis.index()]
    }

    /// Offset for `axis`.
    pub fn offset(&self, axis: Axis) -> f64 {
        self.offset[axis.index()]
    }

    /// Whether the extents describe a non-empty box on every axis.
    pub fn has_extents(&self) -> bool {
        Axis::ALL
            .iter()
            .all(|a| self.min[a.index()] <= self.max[a.index()])
    }

    /// Grow the extents to include a world-coordinate point.
    pub fn expand_extents(&mut self, point: [f64; 3]) {
        for (i, v) in point.iter().enumerate() {
            self.min[i] = self.min[i].min(*v);
            self.max[i] = self.max[i].max(*v);
        }
    }

    /// Size of one packed record in bytes.
    pub fn point_size_in_bytes(&self) -> usize {
        let mut size = self.spatial_type.bytes() * 3 + POINT_ID_BYTES + VALID_FLAG_BYTES;
        if self.has_intensity {
            size += self.intensity_type.bytes();
        }
        if self.has_classification {
            size += self.classification_type.bytes();
        }
        size
    }

    /// Number of record slots the arrangement requires.
    pub fn array_count(&self) -> u32 {
        self.arrangement.array_count(self.point_count)
    }

    /// Check the scale/offset metadata.
    ///
    /// Encodings are not checked here: an unsupported encoding is reported
    /// by the accessor as an invalid accessor, not as a descriptor error.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        for axis in Axis::ALL {
            let scale = self.scale(axis);
            if !scale.is_finite() || scale == 0.0 {
                return Err(DescriptorError::InvalidScale { axis, value: scale });
            }
            let offset = self.offset(axis);
            if !offset.is_finite() {
                return Err(DescriptorError::InvalidOffset {
                    axis,
                    value: offset,
                });
            }
        }
        Ok(())
    }
}

impl Default for PointCloudDataDescriptor {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_point_size_is_eight_bytes() {
        // 3 x u8 + u32 id + valid byte.
        assert_eq!(PointCloudDataDescriptor::new(1).point_size_in_bytes(), 8);
    }

    #[test]
    fn optional_fields_add_their_width() {
        let desc = PointCloudDataDescriptor::new(1)
            .with_spatial_type(EncodingType::Flt8Bytes)
            .with_intensity(EncodingType::Flt8Bytes)
            .with_classification(EncodingType::Int2UBytes);
        assert_eq!(desc.point_size_in_bytes(), 24 + 4 + 1 + 8 + 2);
    }

    #[test]
    fn tree_arrangement_rounds_to_power_of_two() {
        let tree = PointCloudArrangement::KdTreeXyArray;
        assert_eq!(tree.array_count(0), 0);
        assert_eq!(tree.array_count(1), 1);
        assert_eq!(tree.array_count(5), 8);
        assert_eq!(tree.array_count(8), 8);
        assert_eq!(tree.array_count(1 << 31), 1 << 31);
        assert_eq!(tree.array_count((1 << 31) + 1), 0);
        assert_eq!(PointCloudArrangement::PointArray.array_count(5), 5);
    }

    #[test]
    fn fresh_extents_are_empty_until_expanded() {
        let mut desc = PointCloudDataDescriptor::new(2);
        assert!(!desc.has_extents());
        desc.expand_extents([1.0, 2.0, 3.0]);
        desc.expand_extents([-1.0, 5.0, 0.0]);
        assert!(desc.has_extents());
        assert_eq!(desc.min, [-1.0, 2.0, 0.0]);
        assert_eq!(desc.max, [1.0, 5.0, 3.0]);
    }

    #[test]
    fn zero_scale_rejected() {
        let desc = PointCloudDataDescriptor::new(1).with_scale_offset(Axis::Y, 0.0, 0.0);
        assert_eq!(
            desc.validate(),
            Err(DescriptorError::InvalidScale {
                axis: Axis::Y,
                value: 0.0
            })
        );
    }

    #[test]
    fn nan_offset_rejected() {
        let desc = PointCloudDataDescriptor::new(1).with_scale_offset(Axis::Z, 1.0, f64::NAN);
        assert!(matches!(
            desc.validate(),
            Err(DescriptorError::InvalidOffset { axis: Axis::Z, .. })
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn tree_capacity_is_smallest_covering_power_of_two(count in 1u32..=(1 << 31)) {
                let cap = PointCloudArrangement::KdTreeXyzArray.array_count(count);
                prop_assert!(cap.is_power_of_two());
                prop_assert!(cap >= count);
                prop_assert!(cap / 2 < count);
            }
        }
    }
}
