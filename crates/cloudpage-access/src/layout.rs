//! Byte offsets of the fields inside one packed record.

use cloudpage_core::{Axis, PointCloudDataDescriptor, POINT_ID_BYTES, VALID_FLAG_BYTES};

/// Field offsets and widths derived once from a descriptor.
///
/// ```text
/// 0      s      2s     3s     3s+4    3s+5
/// [ X ]  [ Y ]  [ Z ]  [ id ] [valid] {[intensity]} {[classification]}
/// ```
///
/// `s` is the width of the spatial encoding. Classification directly
/// follows intensity when both are present and otherwise sits where
/// intensity would have been.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordLayout {
    /// Size of a whole record.
    pub point_size: usize,
    /// Width of each spatial field.
    pub spatial_size: usize,
    /// Offset of X.
    pub x: usize,
    /// Offset of Y.
    pub y: usize,
    /// Offset of Z.
    pub z: usize,
    /// Offset of the point id.
    pub id: usize,
    /// Offset of the valid flag.
    pub valid: usize,
    /// Offset of intensity, when the record carries it.
    pub intensity: Option<usize>,
    /// Width of the intensity field (zero when absent).
    pub intensity_size: usize,
    /// Offset of classification, when the record carries it.
    pub classification: Option<usize>,
    /// Width of the classification field (zero when absent).
    pub classification_size: usize,
}

impl RecordLayout {
    /// Compute the layout `descriptor` prescribes.
    pub fn from_descriptor(descriptor: &PointCloudDataDescriptor) -> Self {
        let spatial_size = descriptor.spatial_type.bytes();
        let id = spatial_size * 3;
        let valid = id + POINT_ID_BYTES;
        let mut next = valid + VALID_FLAG_BYTES;

        let (intensity, intensity_size) = if descriptor.has_intensity {
            let at = next;
            next += descriptor.intensity_type.bytes();
            (Some(at), descriptor.intensity_type.bytes())
        } else {
            (None, 0)
        };
        let (classification, classification_size) = if descriptor.has_classification {
            let at = next;
            next += descriptor.classification_type.bytes();
            (Some(at), descriptor.classification_type.bytes())
        } else {
            (None, 0)
        };

        Self {
            point_size: next,
            spatial_size,
            x: 0,
            y: spatial_size,
            z: spatial_size * 2,
            id,
            valid,
            intensity,
            intensity_size,
            classification,
            classification_size,
        }
    }

    /// Offset of the spatial field for `axis`.
    pub fn axis_offset(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudpage_core::EncodingType;
    use proptest::prelude::*;

    #[test]
    fn float_xyz_with_both_optionals() {
        let desc = PointCloudDataDescriptor::new(1)
            .with_spatial_type(EncodingType::Flt8Bytes)
            .with_intensity(EncodingType::Flt8Bytes)
            .with_classification(EncodingType::Int2UBytes);
        let layout = RecordLayout::from_descriptor(&desc);
        assert_eq!(layout.id, 24);
        assert_eq!(layout.valid, 28);
        assert_eq!(layout.intensity, Some(29));
        assert_eq!(layout.classification, Some(37));
        assert_eq!(layout.point_size, 39);
    }

    #[test]
    fn classification_takes_intensity_slot_when_alone() {
        let desc = PointCloudDataDescriptor::new(1)
            .with_spatial_type(EncodingType::Int2SBytes)
            .with_classification(EncodingType::Int1UByte);
        let layout = RecordLayout::from_descriptor(&desc);
        assert_eq!(layout.intensity, None);
        assert_eq!(layout.intensity_size, 0);
        assert_eq!(layout.classification, Some(6 + 4 + 1));
        assert_eq!(layout.point_size, 12);
    }

    #[test]
    fn axis_offsets_follow_record_order() {
        let desc = PointCloudDataDescriptor::new(1).with_spatial_type(EncodingType::Flt4Bytes);
        let layout = RecordLayout::from_descriptor(&desc);
        assert_eq!(layout.axis_offset(Axis::X), 0);
        assert_eq!(layout.axis_offset(Axis::Y), 4);
        assert_eq!(layout.axis_offset(Axis::Z), 8);
    }

    fn encoding() -> impl Strategy<Value = EncodingType> {
        prop::sample::select(EncodingType::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn layout_size_matches_descriptor(
            spatial in encoding(),
            intensity in prop::option::of(encoding()),
            classification in prop::option::of(encoding()),
        ) {
            let mut desc = PointCloudDataDescriptor::new(1).with_spatial_type(spatial);
            if let Some(enc) = intensity {
                desc = desc.with_intensity(enc);
            }
            if let Some(enc) = classification {
                desc = desc.with_classification(enc);
            }
            let layout = RecordLayout::from_descriptor(&desc);
            prop_assert_eq!(layout.point_size, desc.point_size_in_bytes());
            let last_end = match (layout.intensity, layout.classification) {
                (_, Some(at)) => at + layout.classification_size,
                (Some(at), None) => at + layout.intensity_size,
                (None, None) => layout.valid + VALID_FLAG_BYTES,
            };
            prop_assert_eq!(last_end, layout.point_size);
        }
    }
}
