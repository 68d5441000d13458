//! The point cloud element: descriptor, pager, and accessor factory.

use std::cell::{Cell, RefCell, RefMut};
use std::fmt;
use std::path::Path;

use log::{info, warn};
use tempfile::TempPath;

use cloudpage_core::{
    Pager, PagerError, PointCloudDataDescriptor, PointCloudDataRequest, ProcessingLocation,
};
use cloudpage_pager::{InMemoryPager, MemoryMappedPager};

use crate::config::ElementConfig;
use crate::convert::ConversionTable;
use crate::cursor::AccessorCursor;
use crate::error::ElementError;
use crate::handle::PointCloudAccessor;

/// Prefix of temporary backing files created for on-disk elements.
const TEMP_FILE_PREFIX: &str = "PC";

/// A point cloud dataset: its descriptor plus the pager that stores its
/// records.
///
/// Accessors borrow the element, so the pager outlives every accessor.
/// The pager is installed once and kept until the element is dropped.
pub struct PointCloudElement {
    name: String,
    descriptor: PointCloudDataDescriptor,
    config: ElementConfig,
    array_count: u32,
    // Dropped before `temp_file` so the mapping is gone before the file.
    pager: RefCell<Option<Box<dyn Pager>>>,
    temp_file: Option<TempPath>,
    modified: Cell<bool>,
}

impl PointCloudElement {
    /// Create an element with no pager.
    ///
    /// Rejects descriptors with unusable scale/offset metadata and invalid
    /// configurations.
    pub fn new(
        name: impl Into<String>,
        descriptor: PointCloudDataDescriptor,
        config: ElementConfig,
    ) -> Result<Self, ElementError> {
        descriptor.validate()?;
        config.validate()?;
        let array_count = descriptor.array_count();
        Ok(Self {
            name: name.into(),
            descriptor,
            config,
            array_count,
            pager: RefCell::new(None),
            temp_file: None,
            modified: Cell::new(false),
        })
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The descriptor the element was created with.
    pub fn descriptor(&self) -> &PointCloudDataDescriptor {
        &self.descriptor
    }

    /// The element configuration.
    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    /// Number of record slots, which may exceed the point count for tree
    /// arrangements.
    pub fn array_count(&self) -> u32 {
        self.array_count
    }

    /// Install `pager`. Returns `false` and drops it if a pager is already
    /// installed.
    pub fn set_pager(&mut self, pager: Box<dyn Pager>) -> bool {
        let slot = self.pager.get_mut();
        if slot.is_some() {
            return false;
        }
        *slot = Some(pager);
        true
    }

    /// Whether a pager is installed.
    pub fn has_pager(&self) -> bool {
        self.pager.borrow().is_some()
    }

    /// Run `f` against the installed pager.
    ///
    /// # Panics
    ///
    /// The pager stays mutably borrowed while `f` runs. Creating, stepping,
    /// or dropping any accessor of this element inside `f` panics, as does
    /// calling `with_pager` from inside a pager method.
    pub fn with_pager<R>(&self, f: impl FnOnce(&mut dyn Pager) -> R) -> Option<R> {
        let mut slot = self.pager.borrow_mut();
        let result = match slot.as_deref_mut() {
            Some(pager) => Some(f(pager)),
            None => None,
        };
        result
    }

    pub(crate) fn pager_slot(&self) -> RefMut<'_, Option<Box<dyn Pager>>> {
        self.pager.borrow_mut()
    }

    /// Path of the temporary backing file, if the element created one.
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp_file.as_deref()
    }

    fn install(&mut self, pager: Box<dyn Pager>) -> Result<(), ElementError> {
        if self.set_pager(pager) {
            Ok(())
        } else {
            Err(ElementError::PagerAlreadySet)
        }
    }

    /// Install an [`InMemoryPager`] sized for the element.
    pub fn create_in_memory_pager(&mut self) -> Result<(), ElementError> {
        if self.has_pager() {
            return Err(ElementError::PagerAlreadySet);
        }
        let pager =
            InMemoryPager::initialize(&self.descriptor, self.array_count, &self.config.pager)?;
        info!("{}: in-memory pager for {} records", self.name, self.array_count);
        self.install(Box::new(pager))
    }

    /// Reserve a fresh temporary file for every record slot and install a
    /// writable [`MemoryMappedPager`] over it.
    ///
    /// The file lives in [`ElementConfig::temp_dir`] and is removed when
    /// the element is dropped.
    pub fn create_memory_mapped_pager_for_new_temp_file(&mut self) -> Result<(), ElementError> {
        if self.has_pager() {
            return Err(ElementError::PagerAlreadySet);
        }
        let point_size = self.descriptor.point_size_in_bytes();
        let len = (point_size as u64)
            .checked_mul(u64::from(self.array_count))
            .ok_or(PagerError::CapacityOverflow {
                point_size,
                points: u64::from(self.array_count),
            })?;

        let file = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .tempfile_in(&self.config.temp_dir)?;
        file.as_file().set_len(len)?;
        let path = file.into_temp_path();

        let pager = MemoryMappedPager::initialize(&path, point_size, true, &self.config.pager)?;
        info!(
            "{}: memory-mapped pager over {} ({len} bytes)",
            self.name,
            path.display()
        );
        self.install(Box::new(pager))?;
        self.temp_file = Some(path);
        Ok(())
    }

    /// Install the pager matching the descriptor's processing location.
    ///
    /// Does nothing if a pager is already installed. Read-only on-disk
    /// data has no default pager; install one with
    /// [`set_pager`](Self::set_pager).
    pub fn create_default_pager(&mut self) -> Result<(), ElementError> {
        if self.has_pager() {
            return Ok(());
        }
        match self.descriptor.processing_location {
            ProcessingLocation::InMemory => self.create_in_memory_pager(),
            ProcessingLocation::OnDisk => self.create_memory_mapped_pager_for_new_temp_file(),
            location @ ProcessingLocation::OnDiskReadOnly => {
                Err(ElementError::UnsupportedLocation { location })
            }
        }
    }

    /// Get an accessor positioned at global index 0.
    ///
    /// `None` means a default read-only request. The request is polished
    /// against the descriptor and validated; a rejected request, an
    /// encoding without a conversion, a missing pager, or an empty first
    /// block all yield an accessor that is not valid.
    pub fn get_point_cloud_accessor(
        &self,
        request: Option<PointCloudDataRequest>,
    ) -> PointCloudAccessor<'_> {
        let mut request = request.unwrap_or_default();
        request.polish(&self.descriptor);
        if let Err(e) = request.validate(&self.descriptor) {
            warn!("{}: rejected data request: {e}", self.name);
            return PointCloudAccessor::invalid();
        }
        let conversions = match ConversionTable::resolve(&self.descriptor) {
            Ok(table) => table,
            Err(e) => {
                warn!("{}: {e}", self.name);
                return PointCloudAccessor::invalid();
            }
        };
        let cursor = AccessorCursor::new(self, request, conversions);
        if !cursor.is_valid() {
            warn!("{}: accessor has no initial block", self.name);
        }
        PointCloudAccessor::new(cursor)
    }

    /// Record that the element's data changed.
    pub fn update_data(&self) {
        self.modified.set(true);
    }

    /// Whether [`update_data`](Self::update_data) has been called.
    pub fn is_modified(&self) -> bool {
        self.modified.get()
    }
}

impl fmt::Debug for PointCloudElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointCloudElement")
            .field("name", &self.name)
            .field("point_count", &self.descriptor.point_count)
            .field("array_count", &self.array_count)
            .field("has_pager", &self.pager.try_borrow().map_or(true, |p| p.is_some()))
            .field("temp_file", &self.temp_path())
            .finish()
    }
}
