//! Element setup errors.
//!
//! Accessor construction never returns these: a failed accessor is an
//! invalid accessor. They cover element creation and pager installation.

use std::error::Error;
use std::fmt;
use std::io;

use cloudpage_core::{DescriptorError, PagerError, ProcessingLocation};

/// Errors from creating an element or installing its pager.
#[derive(Debug)]
pub enum ElementError {
    /// The element already has a pager.
    PagerAlreadySet,
    /// No default pager exists for this processing location.
    UnsupportedLocation {
        /// The descriptor's processing location.
        location: ProcessingLocation,
    },
    /// The descriptor failed validation.
    Descriptor(DescriptorError),
    /// The element configuration failed validation.
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
    /// The pager backend could not be created.
    Pager(PagerError),
    /// Creating the temporary backing file failed.
    Io(io::Error),
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PagerAlreadySet => write!(f, "element already has a pager"),
            Self::UnsupportedLocation { location } => {
                write!(f, "no default pager for {location} data")
            }
            Self::Descriptor(e) => write!(f, "invalid descriptor: {e}"),
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
            Self::Pager(e) => write!(f, "pager creation failed: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl Error for ElementError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Descriptor(e) => Some(e),
            Self::Pager(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DescriptorError> for ElementError {
    fn from(e: DescriptorError) -> Self {
        Self::Descriptor(e)
    }
}

impl From<PagerError> for ElementError {
    fn from(e: PagerError) -> Self {
        Self::Pager(e)
    }
}

impl From<io::Error> for ElementError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
