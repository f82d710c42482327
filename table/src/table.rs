//! The contract shared by [`ChainedTable`](crate::ChainedTable) and
//! [`OpenTable`](crate::OpenTable).
use std::fmt::Display;

use crate::{AllocError, Key, TableConfig, Value};

/// An associative map from [`Key`] to [`Value`] with unique keys and unordered iteration.
///
/// Tables grow automatically by doubling their size once their load crosses a threshold specific
/// to the implementation. Growing never changes which keys are present or their values.
///
/// Dropping a table releases all of its storage.
pub trait IntTable: Sized {
    /// Configuration used by [`IntTable::new`].
    const DEFAULT_CONFIG: TableConfig;

    /// Short human readable name of the implementation.
    const NAME: &'static str;

    /// Creates an empty table using the given configuration.
    ///
    /// # Panics
    /// Panics if `config.initial_size` is zero.
    fn with_config(config: TableConfig) -> Result<Self, AllocError>;

    /// Creates an empty table with [`IntTable::DEFAULT_CONFIG`].
    fn new() -> Result<Self, AllocError> {
        Self::with_config(Self::DEFAULT_CONFIG)
    }

    /// Creates an empty table with `initial_size` buckets or slots.
    fn with_size(initial_size: usize) -> Result<Self, AllocError> {
        Self::with_config(TableConfig::with_initial_size(initial_size))
    }

    /// Inserts `value` at `key`, replacing any previous value.
    ///
    /// An error means storage for the entry or for growing the table could not be obtained. In
    /// the latter case the entry itself was stored and only the growth is missing.
    fn insert(&mut self, key: Key, value: Value) -> Result<(), AllocError>;

    /// Returns the value stored at `key`, if present.
    fn find(&self, key: Key) -> Option<Value>;

    /// Removes `key` and returns its value. Removing an absent key does nothing.
    fn remove(&mut self, key: Key) -> Option<Value>;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the table has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current number of buckets or slots.
    fn size(&self) -> usize;

    /// Returns a human readable listing of every bucket or slot, for debugging.
    fn dump(&self) -> impl Display + '_;
}
