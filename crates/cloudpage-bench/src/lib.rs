//! Benchmark profiles for the cloudpage paging layer.
//!
//! - [`survey_descriptor`]: double X/Y/Z, float intensity, byte
//!   classification, centimetre scale
//! - [`build_element`]: an element over the chosen pager, filled with a
//!   deterministic survey pattern
//! - [`scan_valid`]: the reference traversal every benchmark measures

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use cloudpage_access::{ElementConfig, ElementError, PointCloudElement};
use cloudpage_core::{
    Axis, EncodingType, PointCloudDataDescriptor, PointCloudDataRequest, ProcessingLocation,
};

/// Every `INVALID_STRIDE`th point is marked invalid.
pub const INVALID_STRIDE: u32 = 7;

/// Descriptor of a LIDAR-like survey of `point_count` points.
pub fn survey_descriptor(
    point_count: u32,
    location: ProcessingLocation,
) -> PointCloudDataDescriptor {
    let mut descriptor = PointCloudDataDescriptor::new(point_count)
        .with_spatial_type(EncodingType::Int4SBytes)
        .with_intensity(EncodingType::Flt4Bytes)
        .with_classification(EncodingType::Int1UByte)
        .with_processing_location(location);
    for axis in Axis::ALL {
        descriptor = descriptor.with_scale_offset(axis, 0.01, 1000.0 * axis.index() as f64);
    }
    descriptor
}

/// Build and fill a survey element.
///
/// Point `i` sits at raw `(i, i / 2, i % 1000)`, has intensity `i % 256`,
/// classification `i % 32`, and is valid unless `i` is a multiple of
/// [`INVALID_STRIDE`].
pub fn build_element(
    point_count: u32,
    location: ProcessingLocation,
    config: ElementConfig,
) -> Result<PointCloudElement, ElementError> {
    let mut element =
        PointCloudElement::new("survey", survey_descriptor(point_count, location), config)?;
    element.create_default_pager()?;
    {
        let writer = element
            .get_point_cloud_accessor(Some(PointCloudDataRequest::new().with_writable(true)));
        let mut cursor = writer.cursor();
        let mut i = 0u32;
        while cursor.is_valid() {
            let raw = [i as i32, (i / 2) as i32, (i % 1000) as i32];
            for axis in Axis::ALL {
                cursor
                    .raw_axis_mut(axis)
                    .copy_from_slice(&raw[axis.index()].to_ne_bytes());
            }
            if let Some(bytes) = cursor.raw_intensity_mut() {
                bytes.copy_from_slice(&((i % 256) as f32).to_ne_bytes());
            }
            if let Some(bytes) = cursor.raw_classification_mut() {
                bytes[0] = (i % 32) as u8;
            }
            cursor.set_point_id(i);
            cursor.set_point_valid(i % INVALID_STRIDE != 0);
            cursor.next_point();
            i += 1;
        }
    }
    element.update_data();
    Ok(element)
}

/// Walk every valid point, summing scaled Z and intensity.
///
/// Returns the number of valid points visited and the sum.
pub fn scan_valid(element: &PointCloudElement) -> (u32, f64) {
    let accessor = element.get_point_cloud_accessor(None);
    if !accessor.is_valid() {
        return (0, 0.0);
    }
    let mut cursor = accessor.cursor();
    let (mut count, mut sum) = (0, 0.0);
    if !cursor.is_point_valid() {
        cursor.next_valid_point();
    }
    while cursor.is_valid() {
        count += 1;
        sum += cursor.z_as_double(true) + cursor.intensity_as_double().unwrap_or(0.0);
        cursor.next_valid_point();
    }
    (count, sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_counts_only_valid_points() {
        let element = build_element(
            100,
            ProcessingLocation::InMemory,
            ElementConfig::new().with_block_points(16),
        )
        .unwrap();
        let (count, _) = scan_valid(&element);
        assert_eq!(count, 100 - 100u32.div_ceil(INVALID_STRIDE));
    }

    #[test]
    fn on_disk_and_in_memory_scans_agree() {
        let config = ElementConfig::new().with_block_points(32);
        let mem = build_element(500, ProcessingLocation::InMemory, config.clone()).unwrap();
        let disk = build_element(500, ProcessingLocation::OnDisk, config).unwrap();
        assert_eq!(scan_valid(&mem), scan_valid(&disk));
    }
}
