//! Accessor and element configuration parameters.

use std::path::PathBuf;

use cloudpage_pager::PagerConfig;

use crate::error::ElementError;

/// Configuration for accessors created by an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessorConfig {
    /// Maximum number of points requested per block.
    ///
    /// Default: 300_000, on the order of 10MB per block for double X/Y/Z,
    /// double intensity, and 2-byte classification records. Must be at
    /// least 1.
    pub block_points: u32,
}

impl AccessorConfig {
    /// Default block size cap in points.
    pub const DEFAULT_BLOCK_POINTS: u32 = 300_000;

    /// Configuration with the default block size.
    pub fn new() -> Self {
        Self {
            block_points: Self::DEFAULT_BLOCK_POINTS,
        }
    }

    /// Configuration with an explicit block size cap.
    pub fn with_block_points(block_points: u32) -> Self {
        Self { block_points }
    }

    /// Reject unusable values.
    pub fn validate(&self) -> Result<(), ElementError> {
        if self.block_points == 0 {
            return Err(ElementError::InvalidConfig {
                reason: "block_points must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for AccessorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for a [`PointCloudElement`](crate::PointCloudElement).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementConfig {
    /// Settings applied to every accessor of the element.
    pub accessor: AccessorConfig,
    /// Settings for pagers the element creates itself.
    pub pager: PagerConfig,
    /// Directory for temporary backing files of on-disk elements.
    ///
    /// Default: [`std::env::temp_dir`].
    pub temp_dir: PathBuf,
}

impl ElementConfig {
    /// Configuration with default values.
    pub fn new() -> Self {
        Self {
            accessor: AccessorConfig::new(),
            pager: PagerConfig::new(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Builder form for the accessor block size.
    pub fn with_block_points(mut self, block_points: u32) -> Self {
        self.accessor.block_points = block_points;
        self
    }

    /// Builder form for the temporary file directory.
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Reject unusable values.
    pub fn validate(&self) -> Result<(), ElementError> {
        self.accessor.validate()
    }
}

impl Default for ElementConfig {
    fn default() -> Self {
        Self::new()
    }
}
