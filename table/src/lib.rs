//! Integer-keyed hash tables with two collision resolution strategies.
//!
//! [`ChainedTable`] resolves collisions by separate chaining: every bucket heads a singly linked
//! chain of nodes. The nodes live in an arena owned by the table and are linked by index, so
//! growing the table relinks nodes into the new buckets instead of copying them.
//!
//! [`OpenTable`] resolves collisions by open addressing with double hashing over a flat slot
//! array. Removed slots become tombstones that keep probe sequences intact until the next growth
//! drops them.
//!
//! Both implement [`IntTable`], which is the interface used by the benchmark driver. Keys and
//! values are plain [`i32`]s. All backing storage is obtained fallibly, so running out of memory
//! surfaces as an [`AllocError`] instead of aborting, and leaves the table in a valid state.
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod node_arena;

#[cfg(test)]
#[path = "tests/model.rs"]
mod model;

pub mod chained_table;
pub mod config;
pub mod open_table;
pub mod table;

pub use chained_table::ChainedTable;
pub use config::TableConfig;
pub use error::AllocError;
pub use node_arena::ArenaStats;
pub use open_table::OpenTable;
pub use table::IntTable;

/// Key type stored by the tables.
pub type Key = i32;
/// Value type stored by the tables.
pub type Value = i32;

/// Reinterprets a key as an unsigned 64-bit hash, sign-extending negative keys.
#[inline(always)]
pub(crate) fn key_hash(key: Key) -> u64 {
    key as i64 as u64
}
