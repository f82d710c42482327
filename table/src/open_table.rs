//! [OpenTable] is a hash table that resolves collisions by open addressing with double hashing.
//!
//! The slot count is always a power of two and every probe step is odd, so the probe sequence of
//! any key visits each slot exactly once before repeating. Probes are additionally bounded by the
//! slot count, which keeps lookups terminating even when every non-occupied slot is a tombstone.
use std::{fmt, iter::FusedIterator};

use inttab_util::fmt::fmt_closure;

use crate::{
    error::{try_alloc_vec, AllocError},
    key_hash, IntTable, Key, TableConfig, Value,
};

#[cfg(test)]
#[path = "tests/test_open_table.rs"]
mod test_open_table;

/// State of a slot in an [`OpenTable`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum SlotStatus {
    /// Never used since the last growth. Terminates probe sequences.
    #[default]
    Empty,
    /// Holds a live entry.
    Occupied,
    /// Held an entry that was removed. Skipped by lookups, reusable by insertions.
    Deleted,
}

#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    key: Key,
    value: Value,
    status: SlotStatus,
}

/// The sequence of slot indices visited when looking for a key.
///
/// Starts at `hash mod size` and advances by an odd step derived from the hash bits above the
/// index bits.
#[derive(Clone, Debug)]
struct Probe {
    index: usize,
    step: usize,
    mask: usize,
    remaining: usize,
}

impl Probe {
    #[inline(always)]
    fn new(key: Key, size: usize) -> Self {
        debug_assert!(size.is_power_of_two() && size >= 2);
        let hash = key_hash(key);
        let mask = size - 1;
        let step = ((hash >> size.trailing_zeros()) as usize | 1) & mask;
        Probe {
            index: hash as usize & mask,
            step,
            mask,
            remaining: size,
        }
    }
}

impl Iterator for Probe {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<usize> {
        self.remaining = self.remaining.checked_sub(1)?;
        let index = self.index;
        self.index = (self.index + self.step) & self.mask;
        Some(index)
    }
}

enum Placement {
    Existing(usize),
    Vacant(usize),
    Full,
}

/// A hash table storing its entries directly in a flat slot array.
///
/// Once at least half of the slots are occupied, the slot count is doubled and all entries are
/// reinserted by value, dropping every tombstone.
#[derive(Clone)]
pub struct OpenTable {
    slots: Vec<Slot>,
    count: usize,
    tombstones: usize,
}

impl OpenTable {
    /// Returns an empty table with at least `config.initial_size` slots.
    ///
    /// The slot count is rounded up to a power of two, and to at least two.
    ///
    /// # Panics
    /// Panics if `config.initial_size` is zero.
    pub fn with_config(config: TableConfig) -> Result<Self, AllocError> {
        assert!(config.initial_size > 0, "an open table needs at least one slot");
        let size = config
            .initial_size
            .max(2)
            .checked_next_power_of_two()
            .ok_or(AllocError::CapacityOverflow)?;
        Ok(OpenTable {
            slots: try_alloc_vec(size, Slot::default)?,
            count: 0,
            tombstones: 0,
        })
    }

    /// Returns the number of entries in the table.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the number of slots.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of tombstones left behind by removals since the last growth.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    fn probe(&self, key: Key) -> Probe {
        Probe::new(key, self.size())
    }

    fn locate(&self, key: Key) -> Option<usize> {
        for index in self.probe(key) {
            let slot = &self.slots[index];
            match slot.status {
                SlotStatus::Empty => return None,
                SlotStatus::Occupied if slot.key == key => return Some(index),
                _ => {}
            }
        }
        None
    }

    /// Finds the slot holding `key`, or else the slot a new entry for `key` should go to.
    ///
    /// The whole probe sequence up to the first empty slot has to be scanned even after passing a
    /// tombstone, as the key may be stored further along.
    fn placement(&self, key: Key) -> Placement {
        let mut tombstone = None;
        for index in self.probe(key) {
            let slot = &self.slots[index];
            match slot.status {
                SlotStatus::Empty => return Placement::Vacant(tombstone.unwrap_or(index)),
                SlotStatus::Deleted => {
                    tombstone.get_or_insert(index);
                }
                SlotStatus::Occupied if slot.key == key => return Placement::Existing(index),
                SlotStatus::Occupied => {}
            }
        }
        tombstone.map_or(Placement::Full, Placement::Vacant)
    }

    /// Inserts `value` at `key`, replacing any previous value.
    ///
    /// Returns an error if the table needed to grow but the larger slot array could not be
    /// allocated. The entry is inserted regardless, unless every slot was already occupied, in
    /// which case the table is unchanged.
    pub fn insert(&mut self, key: Key, value: Value) -> Result<(), AllocError> {
        let index = match self.placement(key) {
            Placement::Existing(index) => {
                self.slots[index].value = value;
                return Ok(());
            }
            Placement::Vacant(index) => index,
            // Only reachable after earlier growth attempts failed.
            Placement::Full => {
                self.grow()?;
                match self.placement(key) {
                    Placement::Vacant(index) => index,
                    _ => unreachable!("freshly grown table has no room for a new key"),
                }
            }
        };

        let slot = &mut self.slots[index];
        if slot.status == SlotStatus::Deleted {
            self.tombstones -= 1;
        }
        *slot = Slot {
            key,
            value,
            status: SlotStatus::Occupied,
        };
        self.count += 1;

        if self.count.saturating_mul(2) >= self.size() {
            self.grow()?;
        }
        Ok(())
    }

    /// Returns the value stored at `key`, if present.
    pub fn find(&self, key: Key) -> Option<Value> {
        self.locate(key).map(|index| self.slots[index].value)
    }

    /// Returns `true` if the table contains `key`.
    pub fn contains_key(&self, key: Key) -> bool {
        self.locate(key).is_some()
    }

    /// Removes `key` from the table and returns its value, if present.
    ///
    /// The slot becomes a tombstone.
    pub fn remove(&mut self, key: Key) -> Option<Value> {
        let index = self.locate(key)?;
        let removed = std::mem::replace(
            &mut self.slots[index],
            Slot {
                key: 0,
                value: 0,
                status: SlotStatus::Deleted,
            },
        );
        self.count -= 1;
        self.tombstones += 1;
        Some(removed.value)
    }

    /// Doubles the slot count and reinserts every entry.
    ///
    /// If the new slot array can't be allocated the current one stays installed.
    fn grow(&mut self) -> Result<(), AllocError> {
        let old_size = self.size();
        let new_size = old_size
            .checked_mul(2)
            .ok_or(AllocError::CapacityOverflow)?;
        let new_slots = match try_alloc_vec(new_size, Slot::default) {
            Ok(slots) => slots,
            Err(err) => {
                log::warn!("open table stays at {old_size} slots: {err}");
                return Err(err);
            }
        };

        let old_slots = std::mem::replace(&mut self.slots, new_slots);
        let dropped_tombstones = std::mem::take(&mut self.tombstones);
        for slot in old_slots.iter() {
            if slot.status == SlotStatus::Occupied {
                self.place_unique(slot.key, slot.value);
            }
        }

        log::debug!(
            "open table grew from {old_size} to {new_size} slots holding {} entries, \
            dropped {dropped_tombstones} tombstones",
            self.count
        );
        Ok(())
    }

    /// Stores an entry for a key known to be absent, into a table without tombstones.
    ///
    /// Unlike [`OpenTable::insert`] this never grows the table, so growing can't recurse.
    fn place_unique(&mut self, key: Key, value: Value) {
        for index in self.probe(key) {
            let slot = &mut self.slots[index];
            if slot.status == SlotStatus::Empty {
                *slot = Slot {
                    key,
                    value,
                    status: SlotStatus::Occupied,
                };
                return;
            }
        }
        unreachable!("no empty slot while growing");
    }

    /// Returns an iterator over all key-value pairs, in slot order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    /// Returns the status of every slot, in slot order.
    pub fn slot_statuses(&self) -> impl Iterator<Item = SlotStatus> + '_ {
        self.slots.iter().map(|slot| slot.status)
    }

    /// Returns a listing of every slot.
    pub fn dump(&self) -> impl fmt::Display + '_ {
        fmt_closure(move |f| {
            writeln!(f, "Open table")?;
            writeln!(f, "Entries: {}", self.count)?;
            writeln!(f, "Tombstones: {}", self.tombstones)?;
            writeln!(f, "Slots: {}", self.size())?;
            for (index, slot) in self.slots.iter().enumerate() {
                match slot.status {
                    SlotStatus::Empty => writeln!(f, "  {index:5}: -")?,
                    SlotStatus::Deleted => writeln!(f, "  {index:5}: deleted")?,
                    SlotStatus::Occupied => {
                        writeln!(f, "  {index:5}: ({}, {})", slot.key, slot.value)?
                    }
                }
            }
            Ok(())
        })
    }

    #[cfg(test)]
    pub(crate) fn check(&self) {
        assert!(self.size().is_power_of_two());
        let occupied = self.slot_statuses().filter(|&s| s == SlotStatus::Occupied);
        assert_eq!(occupied.count(), self.count);
        let deleted = self.slot_statuses().filter(|&s| s == SlotStatus::Deleted);
        assert_eq!(deleted.count(), self.tombstones);
        assert!(self.count * 2 < self.size());
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.status == SlotStatus::Occupied {
                assert_eq!(self.locate(slot.key), Some(index));
            }
        }
    }
}

impl fmt::Debug for OpenTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl IntTable for OpenTable {
    const DEFAULT_CONFIG: TableConfig = TableConfig::open();

    const NAME: &'static str = "open";

    fn with_config(config: TableConfig) -> Result<Self, AllocError> {
        OpenTable::with_config(config)
    }

    fn insert(&mut self, key: Key, value: Value) -> Result<(), AllocError> {
        OpenTable::insert(self, key, value)
    }

    fn find(&self, key: Key) -> Option<Value> {
        OpenTable::find(self, key)
    }

    fn remove(&mut self, key: Key) -> Option<Value> {
        OpenTable::remove(self, key)
    }

    fn len(&self) -> usize {
        OpenTable::len(self)
    }

    fn size(&self) -> usize {
        OpenTable::size(self)
    }

    fn dump(&self) -> impl fmt::Display + '_ {
        OpenTable::dump(self)
    }
}

/// Iterator over the entries of an [`OpenTable`], see [`OpenTable::iter`].
pub struct Iter<'a> {
    inner: std::slice::Iter<'a, Slot>,
}

impl Iterator for Iter<'_> {
    type Item = (Key, Value);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .find(|slot| slot.status == SlotStatus::Occupied)
            .map(|slot| (slot.key, slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a OpenTable {
    type Item = (Key, Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
