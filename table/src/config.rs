//! Construction parameters for the tables.

/// Parameters used when constructing a table.
///
/// Each table type has its own default, available as [`IntTable::DEFAULT_CONFIG`].
///
/// [`IntTable::DEFAULT_CONFIG`]: crate::IntTable::DEFAULT_CONFIG
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of buckets (or slots) allocated up front. Must be non-zero.
    ///
    /// [`OpenTable`](crate::OpenTable) rounds this up to a power of two.
    pub initial_size: usize,
}

impl TableConfig {
    /// Returns a configuration with the given initial size.
    pub const fn with_initial_size(initial_size: usize) -> Self {
        TableConfig { initial_size }
    }

    /// Default configuration of a [`ChainedTable`](crate::ChainedTable), 109 buckets.
    pub const fn chained() -> Self {
        Self::with_initial_size(109)
    }

    /// Default configuration of an [`OpenTable`](crate::OpenTable), 128 slots.
    pub const fn open() -> Self {
        Self::with_initial_size(128)
    }
}
