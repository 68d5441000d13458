//! cloudpage: out-of-core point cloud paging with point-at-a-time accessors.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all cloudpage sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use cloudpage::prelude::*;
//!
//! let descriptor = PointCloudDataDescriptor::new(3)
//!     .with_spatial_type(EncodingType::Int4SBytes)
//!     .with_scale_offset(Axis::X, 0.01, 500.0);
//! let mut element = PointCloudElement::new("tile", descriptor, ElementConfig::new()).unwrap();
//! element.create_default_pager().unwrap();
//!
//! // Fill through a writable accessor.
//! {
//!     let writer = element
//!         .get_point_cloud_accessor(Some(PointCloudDataRequest::new().with_writable(true)));
//!     let mut cursor = writer.cursor();
//!     for id in 0..3u32 {
//!         cursor.raw_x_mut().copy_from_slice(&(100 * id as i32).to_ne_bytes());
//!         cursor.set_point_id(id);
//!         cursor.set_point_valid(id != 1);
//!         cursor.next_point();
//!     }
//! }
//!
//! // Read back the valid points.
//! let reader = element.get_point_cloud_accessor(None);
//! let mut xs = Vec::new();
//! while reader.is_valid() {
//!     xs.push(reader.cursor().x_as_double(true));
//!     reader.cursor().next_valid_point();
//! }
//! assert_eq!(xs, vec![500.0, 502.0]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cloudpage-core` | Descriptor, encodings, requests, blocks, the `Pager` trait |
//! | [`pager`] | `cloudpage-pager` | In-memory and memory-mapped pagers |
//! | [`access`] | `cloudpage-access` | Elements, accessors, record layout, conversions |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and the pager trait (`cloudpage-core`).
pub use cloudpage_core as types;

/// Pager backends (`cloudpage-pager`).
///
/// [`pager::InMemoryPager`] keeps every record in one buffer;
/// [`pager::MemoryMappedPager`] maps a record file.
pub use cloudpage_pager as pager;

/// Elements and accessors (`cloudpage-access`).
pub use cloudpage_access as access;

/// Common imports for typical cloudpage usage.
pub mod prelude {
    // Core types
    pub use cloudpage_core::{
        Axis, EncodingType, Pager, PointCloudArrangement, PointCloudDataDescriptor,
        PointCloudDataRequest, PointDataBlock, PointId, ProcessingLocation,
    };

    // Errors
    pub use cloudpage_access::ElementError;
    pub use cloudpage_core::{DescriptorError, PagerError, RequestError};

    // Pagers
    pub use cloudpage_pager::{InMemoryPager, MemoryMappedPager, PagerConfig};

    // Access
    pub use cloudpage_access::{
        AccessorConfig, AccessorCursor, ElementConfig, PointCloudAccessor, PointCloudElement,
    };
}
