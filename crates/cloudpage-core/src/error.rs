//! Error types shared by descriptors, requests, and pagers.

use std::error::Error;
use std::fmt;
use std::io;

use crate::descriptor::Axis;

/// Inconsistent descriptor metadata.
#[derive(Clone, Debug, PartialEq)]
pub enum DescriptorError {
    /// An axis scale is zero or not finite.
    InvalidScale {
        /// The offending axis.
        axis: Axis,
        /// The rejected scale.
        value: f64,
    },
    /// An axis offset is not finite.
    InvalidOffset {
        /// The offending axis.
        axis: Axis,
        /// The rejected offset.
        value: f64,
    },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScale { axis, value } => {
                write!(f, "invalid {axis} scale {value}: must be finite and non-zero")
            }
            Self::InvalidOffset { axis, value } => {
                write!(f, "invalid {axis} offset {value}: must be finite")
            }
        }
    }
}

impl Error for DescriptorError {}

/// A data request that cannot be satisfied against a descriptor.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestError {
    /// A start bound lies above its stop bound.
    InvertedBounds {
        /// The offending axis.
        axis: Axis,
        /// Requested start.
        start: f64,
        /// Requested stop.
        stop: f64,
    },
    /// A writable request against read-only storage.
    ReadOnly,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedBounds { axis, start, stop } => {
                write!(f, "{axis} bounds inverted: start {start} > stop {stop}")
            }
            Self::ReadOnly => write!(f, "writable request against read-only data"),
        }
    }
}

impl Error for RequestError {}

/// Errors raised while setting up a pager backend.
///
/// Block requests never fail with an error: a pager that cannot supply a
/// block returns `None`.
#[derive(Debug)]
pub enum PagerError {
    /// An I/O error while creating, sizing, or mapping backing storage.
    Io(io::Error),
    /// Record size of zero bytes.
    ZeroPointSize,
    /// `point_size * point_count` does not fit in the address space.
    CapacityOverflow {
        /// Record size in bytes.
        point_size: usize,
        /// Requested number of records.
        points: u64,
    },
    /// Backing file length is not a whole number of records.
    TruncatedBacking {
        /// File length in bytes.
        len: u64,
        /// Record size in bytes.
        point_size: usize,
    },
}

impl fmt::Display for PagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ZeroPointSize => write!(f, "point size must be non-zero"),
            Self::CapacityOverflow { point_size, points } => {
                write!(
                    f,
                    "capacity overflow: {points} points of {point_size} bytes"
                )
            }
            Self::TruncatedBacking { len, point_size } => {
                write!(
                    f,
                    "backing length {len} is not a multiple of the {point_size}-byte record"
                )
            }
        }
    }
}

impl Error for PagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PagerError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_is_exposed_as_source() {
        let err = PagerError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn inverted_bounds_message_names_axis() {
        let err = RequestError::InvertedBounds {
            axis: Axis::X,
            start: 2.0,
            stop: 1.0,
        };
        assert_eq!(err.to_string(), "x bounds inverted: start 2 > stop 1");
    }
}
