//! Utilities for computing hashes.
use std::hash::BuildHasher;

use zwohash::ZwoHasher;

/// The workspace's default [`BuildHasher`].
pub type BuildHasherDefault = std::hash::BuildHasherDefault<ZwoHasher>;

/// Computes the hash of a value using the workspace's default hasher.
#[inline]
pub fn hash_value<T: std::hash::Hash>(value: T) -> u64 {
    BuildHasherDefault::default().hash_one(value)
}

/// Computes the hash of a reference using the workspace's default hasher.
///
/// This forwards to [`hash_value`]. Restricting the argument to be a reference is occasionally
/// useful for type inference, e.g. for unsized string keys.
#[inline]
pub fn hash_ref<T: std::hash::Hash + ?Sized>(value: &T) -> u64 {
    hash_value(value)
}
