//! Pager configuration parameters.

/// Configuration shared by the pager backends.
///
/// All values are immutable after the pager is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerConfig {
    /// How many released block buffers are kept for reuse.
    ///
    /// Default: 4. A single forward scan needs only one; the extra slots
    /// absorb several accessors sharing one pager. Zero disables reuse;
    /// every value is accepted.
    pub pool_capacity: usize,

    /// Whether a writable memory-mapped block is flushed to disk as soon
    /// as it is released, rather than when the pager is dropped.
    ///
    /// Default: true. Ignored by the in-memory pager.
    pub flush_on_release: bool,
}

impl PagerConfig {
    /// Default number of pooled buffers.
    pub const DEFAULT_POOL_CAPACITY: usize = 4;

    /// Default flush policy.
    pub const DEFAULT_FLUSH_ON_RELEASE: bool = true;

    /// Configuration with default values.
    pub fn new() -> Self {
        Self {
            pool_capacity: Self::DEFAULT_POOL_CAPACITY,
            flush_on_release: Self::DEFAULT_FLUSH_ON_RELEASE,
        }
    }
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self::new()
    }
}
