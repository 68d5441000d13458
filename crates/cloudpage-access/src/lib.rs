//! Point-at-a-time access to paged point cloud records.
//!
//! A [`PointCloudElement`] owns a descriptor and a [`Pager`]. Each call to
//! [`PointCloudElement::get_point_cloud_accessor`] builds a cursor that
//! checks blocks of records out of the pager as it moves:
//!
//! ```text
//! PointCloudAccessor ──Rc──► AccessorCursor ──&──► PointCloudElement
//!        (clone)                 │ holds                 │ owns
//! PointCloudAccessor ──Rc──┘     ▼                       ▼
//!                          PointDataBlock ◄─get/release─ dyn Pager
//! ```
//!
//! Field getters read through offsets computed once by [`RecordLayout`]
//! and conversions resolved once by [`ConversionTable`].
//!
//! [`Pager`]: cloudpage_core::Pager

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod convert;
pub mod cursor;
pub mod element;
pub mod error;
pub mod handle;
pub mod layout;
mod raw;

pub use config::{AccessorConfig, ElementConfig};
pub use convert::{Conversion, ConversionTable, FieldRole, UnsupportedEncoding};
pub use cursor::AccessorCursor;
pub use element::PointCloudElement;
pub use error::ElementError;
pub use handle::PointCloudAccessor;
pub use layout::RecordLayout;
