//! Core types and traits for the cloudpage point-cloud paging layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by pagers and accessors: numeric encodings, the point
//! cloud descriptor, data requests, data blocks, the [`Pager`] trait, and
//! error types.
//!
//! # Record format
//!
//! Every point is stored as one fixed-size packed record:
//!
//! ```text
//! [X][Y][Z][id: u32][valid: u8]{[intensity]}{[classification]}
//! ```
//!
//! X/Y/Z share the spatial encoding. Intensity and classification carry
//! their own encodings and are present only when the descriptor says so.
//! Pagers must read and write records in exactly this order.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod block;
pub mod descriptor;
pub mod encoding;
pub mod error;
pub mod request;
pub mod traits;

pub use block::{BlockId, PointDataBlock};
pub use descriptor::{
    Axis, PointCloudArrangement, PointCloudDataDescriptor, ProcessingLocation, POINT_ID_BYTES,
    VALID_FLAG_BYTES,
};
pub use encoding::EncodingType;
pub use error::{DescriptorError, PagerError, RequestError};
pub use request::PointCloudDataRequest;
pub use traits::Pager;

/// Identifier stored in the id field of every point record.
pub type PointId = u32;
