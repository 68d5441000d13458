//! Data requests: the advisory bounding box and the writable flag an
//! accessor hands to its pager.

use crate::descriptor::{Axis, PointCloudDataDescriptor, ProcessingLocation};
use crate::error::RequestError;

/// Parameters of an accessor's traffic with its pager.
///
/// The bounding box is advisory: accessors do not restrict traversal to
/// it, but pagers may use it to pick what to cache or prefetch. Unset
/// bounds are filled from the descriptor by [`polish`](Self::polish).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointCloudDataRequest {
    start: [Option<f64>; 3],
    stop: [Option<f64>; 3],
    writable: bool,
}

impl PointCloudDataRequest {
    /// A read-only request with no explicit bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set_writable`](Self::set_writable).
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Builder form of [`set_bounds`](Self::set_bounds).
    pub fn with_bounds(mut self, axis: Axis, start: f64, stop: f64) -> Self {
        self.set_bounds(axis, start, stop);
        self
    }

    /// Whether blocks obtained with this request may be modified and
    /// written back.
    pub fn writable(&self) -> bool {
        self.writable
    }

    /// Set the writable flag.
    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    /// Lower bound on `axis`, if any.
    pub fn start(&self, axis: Axis) -> Option<f64> {
        self.start[axis.index()]
    }

    /// Upper bound on `axis`, if any.
    pub fn stop(&self, axis: Axis) -> Option<f64> {
        self.stop[axis.index()]
    }

    /// Set both bounds on `axis`.
    pub fn set_bounds(&mut self, axis: Axis, start: f64, stop: f64) {
        self.start[axis.index()] = Some(start);
        self.stop[axis.index()] = Some(stop);
    }

    /// Fill unset bounds from the descriptor's extents.
    ///
    /// Axes on which the descriptor has no extents yet (`min > max`) are
    /// left unbounded.
    pub fn polish(&mut self, descriptor: &PointCloudDataDescriptor) {
        for axis in Axis::ALL {
            let i = axis.index();
            if descriptor.min[i] > descriptor.max[i] {
                continue;
            }
            self.start[i].get_or_insert(descriptor.min[i]);
            self.stop[i].get_or_insert(descriptor.max[i]);
        }
    }

    /// Check the request for consistency with the descriptor.
    pub fn validate(&self, descriptor: &PointCloudDataDescriptor) -> Result<(), RequestError> {
        for axis in Axis::ALL {
            if let (Some(start), Some(stop)) = (self.start(axis), self.stop(axis)) {
                if start > stop {
                    return Err(RequestError::InvertedBounds { axis, start, stop });
                }
            }
        }
        if self.writable && descriptor.processing_location == ProcessingLocation::OnDiskReadOnly {
            return Err(RequestError::ReadOnly);
        }
        Ok(())
    }
}
