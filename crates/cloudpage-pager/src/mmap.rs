//! Pager over a memory-mapped record file.
//!
//! The file must contain a whole number of packed records. Read-only
//! pagers refuse writable requests; writable pagers copy modified blocks
//! back into the map on release and flush them according to
//! [`PagerConfig::flush_on_release`].

#![allow(unsafe_code)]

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use cloudpage_core::{Pager, PagerError, PointCloudDataRequest, PointDataBlock};
use log::{debug, info, warn};
use memmap2::{Mmap, MmapMut};

use crate::config::PagerConfig;
use crate::ledger::{BlockLease, BlockLedger};
use crate::pool::BlockPool;
use crate::{byte_range, clamp_block};

enum Mapping {
    /// Zero-length file; nothing to map.
    Empty,
    ReadOnly(Mmap),
    Writable(MmapMut),
}

impl Mapping {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::ReadOnly(m) => m,
            Self::Writable(m) => m,
        }
    }
}

/// Pager backed by a memory-mapped file of packed records.
pub struct MemoryMappedPager {
    path: PathBuf,
    mapping: Mapping,
    writable: bool,
    point_size: usize,
    capacity: u32,
    flush_on_release: bool,
    pool: BlockPool,
    ledger: BlockLedger,
}

impl MemoryMappedPager {
    /// Map an existing record file.
    ///
    /// The number of records is the file length divided by `point_size`.
    pub fn initialize(
        path: impl AsRef<Path>,
        point_size: usize,
        writable: bool,
        config: &PagerConfig,
    ) -> Result<Self, PagerError> {
        if point_size == 0 {
            return Err(PagerError::ZeroPointSize);
        }
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(writable).open(path)?;
        let len = file.metadata()?.len();
        if len % point_size as u64 != 0 {
            return Err(PagerError::TruncatedBacking { len, point_size });
        }
        let points = len / point_size as u64;
        let capacity = u32::try_from(points).map_err(|_| PagerError::CapacityOverflow {
            point_size,
            points,
        })?;
        let mapping = map_file(&file, len, writable)?;
        info!(
            "memory-mapped pager: {} ({capacity} records of {point_size} bytes, {})",
            path.display(),
            if writable { "writable" } else { "read-only" },
        );
        Ok(Self {
            path: path.to_path_buf(),
            mapping,
            writable,
            point_size,
            capacity,
            flush_on_release: config.flush_on_release,
            pool: BlockPool::new(config.pool_capacity),
            ledger: BlockLedger::new(),
        })
    }

    /// The mapped file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether writable requests are served.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Size of one record in bytes.
    pub fn point_size(&self) -> usize {
        self.point_size
    }

    /// Number of records in the file.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Checkout bookkeeping.
    pub fn ledger(&self) -> &BlockLedger {
        &self.ledger
    }

    /// Flush all written-back records to disk.
    pub fn flush(&self) -> Result<(), PagerError> {
        if let Mapping::Writable(m) = &self.mapping {
            m.flush()?;
        }
        Ok(())
    }
}

fn map_file(file: &File, len: u64, writable: bool) -> Result<Mapping, PagerError> {
    if len == 0 {
        return Ok(Mapping::Empty);
    }
    let mapping = if writable {
        // SAFETY: the pager owns the only handle it opened on the file and
        // never hands out references into the map; other processes
        // truncating the file underneath us is outside our contract.
        Mapping::Writable(unsafe { MmapMut::map_mut(file)? })
    } else {
        // SAFETY: as above; the map is only ever read through `bytes()`.
        Mapping::ReadOnly(unsafe { Mmap::map(file)? })
    };
    Ok(mapping)
}

impl Pager for MemoryMappedPager {
    fn get_point_block(
        &mut self,
        start_index: u32,
        num_points: u32,
        request: &PointCloudDataRequest,
    ) -> Option<PointDataBlock> {
        if request.writable() && !self.writable {
            debug!(
                "memory-mapped pager: refusing writable block on read-only {}",
                self.path.display()
            );
            return None;
        }
        let count = clamp_block(start_index, num_points, self.capacity)?;
        let range = byte_range(start_index, count, self.point_size);
        let buf = self.pool.take_filled(&self.mapping.bytes()[range]);
        let writable = request.writable();
        let id = self.ledger.issue(BlockLease {
            start_index,
            num_points: count,
            writable,
        });
        Some(PointDataBlock::new(
            id,
            start_index,
            count,
            self.point_size,
            writable,
            buf,
        ))
    }

    fn release_point_block(&mut self, block: PointDataBlock) {
        let Some(lease) = self.ledger.settle(&block) else {
            warn!(
                "memory-mapped pager: ignoring release of unknown block {} at {}",
                block.id(),
                block.start_index()
            );
            return;
        };
        if lease.writable {
            if let Mapping::Writable(m) = &mut self.mapping {
                let range = byte_range(lease.start_index, lease.num_points, self.point_size);
                let (offset, len) = (range.start, range.len());
                m[range].copy_from_slice(block.raw_data());
                if self.flush_on_release {
                    if let Err(e) = m.flush_range(offset, len) {
                        warn!(
                            "memory-mapped pager: flush of {len} bytes at {offset} in {} failed: {e}",
                            self.path.display()
                        );
                    }
                }
            }
        }
        self.pool.give(block.into_raw_data());
    }
}

impl Drop for MemoryMappedPager {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(
                "memory-mapped pager: final flush of {} failed: {e}",
                self.path.display()
            );
        }
    }
}
