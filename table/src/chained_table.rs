//! [ChainedTable] is a hash table that resolves collisions by separate chaining.
use std::{fmt, iter::FusedIterator};

use inttab_util::fmt::{fmt_closure, write_separated};

use crate::{
    error::{try_alloc_vec, AllocError},
    key_hash,
    node_arena::{ArenaStats, Link, NodeArena, NodeId},
    IntTable, Key, TableConfig, Value,
};

#[cfg(test)]
#[path = "tests/test_chained_table.rs"]
mod test_chained_table;

/// The table grows once it holds more than this many entries per bucket on average.
pub const MAX_LOAD: usize = 4;

/// A hash table where every bucket owns a singly linked chain of the entries hashing to it.
///
/// New entries are prepended to their chain. When the number of entries exceeds [`MAX_LOAD`]
/// times the number of buckets, the bucket count is doubled and every node is relinked into its
/// new bucket.
#[derive(Clone)]
pub struct ChainedTable {
    heads: Vec<Link>,
    arena: NodeArena,
}

#[inline(always)]
fn bucket_index(key: Key, size: usize) -> usize {
    (key_hash(key) % size as u64) as usize
}

impl ChainedTable {
    /// Returns an empty table with `config.initial_size` buckets.
    ///
    /// # Panics
    /// Panics if `config.initial_size` is zero.
    pub fn with_config(config: TableConfig) -> Result<Self, AllocError> {
        assert!(config.initial_size > 0, "a chained table needs at least one bucket");
        Ok(ChainedTable {
            heads: try_alloc_vec(config.initial_size, || None)?,
            arena: NodeArena::default(),
        })
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.arena.stats().live
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of buckets.
    pub fn size(&self) -> usize {
        self.heads.len()
    }

    /// Returns the node counts of the underlying node storage.
    pub fn node_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// Makes sure the next `additional` insertions of new keys won't need to allocate nodes.
    ///
    /// This does not pre-grow the bucket array.
    pub fn reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        self.arena.reserve(additional)
    }

    fn chain(&self, bucket: usize) -> Chain<'_> {
        Chain {
            arena: &self.arena,
            cur: self.heads[bucket],
        }
    }

    fn find_node(&self, key: Key) -> Option<NodeId> {
        self.chain(bucket_index(key, self.size()))
            .find(|&(_, node_key, _)| node_key == key)
            .map(|(id, _, _)| id)
    }

    /// Inserts `value` at `key`, replacing any previous value.
    ///
    /// Returns an error if no node could be allocated for a new key, in which case the table is
    /// unchanged, or if the table needed to grow but the larger bucket array could not be
    /// allocated. In the latter case the entry has been inserted and the table keeps its previous
    /// bucket count.
    pub fn insert(&mut self, key: Key, value: Value) -> Result<(), AllocError> {
        if let Some(id) = self.find_node(key) {
            self.arena[id].value = value;
            return Ok(());
        }
        let bucket = bucket_index(key, self.size());
        let id = self.arena.alloc(key, value, self.heads[bucket])?;
        self.heads[bucket] = Some(id);
        self.grow_if_needed()
    }

    /// Returns the value stored at `key`, if present.
    pub fn find(&self, key: Key) -> Option<Value> {
        self.find_node(key).map(|id| self.arena[id].value)
    }

    /// Returns `true` if the table contains `key`.
    pub fn contains_key(&self, key: Key) -> bool {
        self.find_node(key).is_some()
    }

    /// Removes `key` from the table and returns its value, if present.
    pub fn remove(&mut self, key: Key) -> Option<Value> {
        let bucket = bucket_index(key, self.size());
        let mut prev: Link = None;
        let mut cur = self.heads[bucket];
        while let Some(id) = cur {
            let node = &self.arena[id];
            if node.key == key {
                let next = node.next;
                match prev {
                    Some(prev) => self.arena[prev].next = next,
                    None => self.heads[bucket] = next,
                }
                return Some(self.arena.dealloc(id).value);
            }
            prev = cur;
            cur = node.next;
        }
        None
    }

    fn grow_if_needed(&mut self) -> Result<(), AllocError> {
        if self.len() <= self.size().saturating_mul(MAX_LOAD) {
            return Ok(());
        }
        let new_size = self
            .size()
            .checked_mul(2)
            .ok_or(AllocError::CapacityOverflow)?;
        self.rehash(new_size)
    }

    /// Moves every node into a fresh array of `new_size` buckets.
    ///
    /// Nodes are relinked in place. If the new bucket array can't be allocated the current one
    /// stays installed.
    fn rehash(&mut self, new_size: usize) -> Result<(), AllocError> {
        let old_size = self.size();
        let mut new_heads = match try_alloc_vec(new_size, || None) {
            Ok(heads) => heads,
            Err(err) => {
                log::warn!("chained table stays at {old_size} buckets: {err}");
                return Err(err);
            }
        };

        for &head in self.heads.iter() {
            let mut cur = head;
            while let Some(id) = cur {
                let node = &mut self.arena[id];
                cur = node.next;
                let bucket = bucket_index(node.key, new_size);
                node.next = new_heads[bucket];
                new_heads[bucket] = Some(id);
            }
        }
        self.heads = new_heads;

        log::debug!(
            "chained table grew from {old_size} to {new_size} buckets holding {} entries",
            self.len()
        );
        Ok(())
    }

    /// Returns an iterator over all key-value pairs, bucket by bucket.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            heads: self.heads.iter(),
            chain: Chain {
                arena: &self.arena,
                cur: None,
            },
        }
    }

    /// Returns a listing of every bucket and its chain.
    pub fn dump(&self) -> impl fmt::Display + '_ {
        fmt_closure(move |f| {
            writeln!(f, "Chained table")?;
            writeln!(f, "Entries: {}", self.len())?;
            writeln!(f, "Buckets: {}", self.size())?;
            for bucket in 0..self.size() {
                write!(f, "  {bucket:5}: ")?;
                write_separated(
                    f,
                    " -> ",
                    self.chain(bucket)
                        .map(|(_, key, value)| fmt_closure(move |f| write!(f, "({key}, {value})"))),
                )?;
                writeln!(f)?;
            }
            Ok(())
        })
    }

    #[cfg(test)]
    pub(crate) fn check(&self) {
        let mut reachable = 0;
        for bucket in 0..self.size() {
            let mut keys = std::collections::HashSet::new();
            for (_, key, _) in self.chain(bucket) {
                assert_eq!(bucket_index(key, self.size()), bucket);
                assert!(keys.insert(key), "duplicate key {key} in bucket {bucket}");
                reachable += 1;
            }
        }
        let stats = self.arena.stats();
        assert_eq!(reachable, stats.live);
        assert_eq!(stats.live + self.arena.free_list_len(), stats.reserved);
        assert!(self.len() <= self.size() * MAX_LOAD);
    }
}

impl fmt::Debug for ChainedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl IntTable for ChainedTable {
    const DEFAULT_CONFIG: TableConfig = TableConfig::chained();

    const NAME: &'static str = "chained";

    fn with_config(config: TableConfig) -> Result<Self, AllocError> {
        ChainedTable::with_config(config)
    }

    fn insert(&mut self, key: Key, value: Value) -> Result<(), AllocError> {
        ChainedTable::insert(self, key, value)
    }

    fn find(&self, key: Key) -> Option<Value> {
        ChainedTable::find(self, key)
    }

    fn remove(&mut self, key: Key) -> Option<Value> {
        ChainedTable::remove(self, key)
    }

    fn len(&self) -> usize {
        ChainedTable::len(self)
    }

    fn size(&self) -> usize {
        ChainedTable::size(self)
    }

    fn dump(&self) -> impl fmt::Display + '_ {
        ChainedTable::dump(self)
    }
}

/// Walks a single chain, yielding node ids with their key and value.
struct Chain<'a> {
    arena: &'a NodeArena,
    cur: Link,
}

impl Iterator for Chain<'_> {
    type Item = (NodeId, Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let node = &self.arena[id];
        self.cur = node.next;
        Some((id, node.key, node.value))
    }
}

/// Iterator over the entries of a [`ChainedTable`], see [`ChainedTable::iter`].
pub struct Iter<'a> {
    heads: std::slice::Iter<'a, Link>,
    chain: Chain<'a>,
}

impl Iterator for Iter<'_> {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((_, key, value)) = self.chain.next() {
                return Some((key, value));
            }
            self.chain.cur = *self.heads.next()?;
        }
    }
}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a ChainedTable {
    type Item = (Key, Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
