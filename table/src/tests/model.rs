#![allow(missing_docs)]
use crate::{ChainedTable, IntTable, Key, OpenTable, Value};
use hashbrown::HashMap;
use rand::prelude::*;
use std::hash::BuildHasherDefault;
use zwohash::ZwoHasher;

type RefMap = HashMap<Key, Value, BuildHasherDefault<ZwoHasher>>;

/// Internal consistency checks of a table implementation.
pub trait CheckInvariants: IntTable {
    fn check_invariants(&self);
    fn entries(&self) -> Vec<(Key, Value)>;
}

impl CheckInvariants for ChainedTable {
    fn check_invariants(&self) {
        self.check()
    }
    fn entries(&self) -> Vec<(Key, Value)> {
        self.iter().collect()
    }
}

impl CheckInvariants for OpenTable {
    fn check_invariants(&self) {
        self.check()
    }
    fn entries(&self) -> Vec<(Key, Value)> {
        self.iter().collect()
    }
}

/// Runs every operation on both a table under test and a reference map, comparing the results.
pub struct CheckedTable<T> {
    pub dut: T,
    ref_map: RefMap,
}

impl<T: CheckInvariants> CheckedTable<T> {
    pub fn with_size(size: usize) -> Self {
        CheckedTable {
            dut: T::with_size(size).unwrap(),
            ref_map: RefMap::default(),
        }
    }
    pub fn len(&self) -> usize {
        assert_eq!(self.dut.len(), self.ref_map.len());
        self.ref_map.len()
    }
    pub fn insert(&mut self, key: Key, value: Value) {
        self.dut.insert(key, value).unwrap();
        self.ref_map.insert(key, value);
        assert_eq!(self.dut.len(), self.ref_map.len());
    }
    pub fn find(&self, key: Key) -> Option<Value> {
        let ref_result = self.ref_map.get(&key).copied();
        let dut_result = self.dut.find(key);
        assert_eq!(ref_result, dut_result, "find({key})");
        ref_result
    }
    pub fn remove(&mut self, key: Key) -> Option<Value> {
        let ref_result = self.ref_map.remove(&key);
        let dut_result = self.dut.remove(key);
        assert_eq!(ref_result, dut_result, "remove({key})");
        assert_eq!(self.dut.len(), self.ref_map.len());
        ref_result
    }
    pub fn check(&self) {
        self.dut.check_invariants();
        let mut entries = self.dut.entries();
        entries.sort_unstable();
        let mut expected: Vec<_> = self.ref_map.iter().map(|(&k, &v)| (k, v)).collect();
        expected.sort_unstable();
        assert_eq!(entries, expected);
    }
    /// NB: `random_likelihood` is **not** a probability, see `stable_set`'s test suite.
    pub fn present_or_random_key<R: Rng>(
        &self,
        random_likelihood: f64,
        rng: &mut R,
        mut rand_k: impl FnMut(&mut R) -> Key,
    ) -> Key {
        debug_assert!(random_likelihood >= 0.0);
        if self.ref_map.is_empty() || rng.gen_range(0.0..1.0 + random_likelihood) >= 1.0 {
            rand_k(rng)
        } else {
            *self.ref_map.keys().choose(rng).unwrap()
        }
    }
}

macro_rules! weighted_choose {
    ($rng:expr, $($name:ident: $weight:expr => $body:expr),+) => {
        {
            enum Branches { $( $name,  )* }
            let weights = [$((Branches::$name, $weight)),+];
            match weights.choose_weighted($rng, |x| x.1).unwrap().0 {
                $(Branches::$name => $body),*
            }
        }
    }
}

/// Drives a random mix of operations against a [`CheckedTable`].
///
/// `insert_weight` relative to the removal weight decides whether the table mostly grows or
/// hovers around a steady size.
pub fn test_suite<T: CheckInvariants>(
    seed: u64,
    initial_size: usize,
    insert_weight: f64,
    mut rand_k: impl FnMut(&mut rand_pcg::Pcg64) -> Key,
) -> CheckedTable<T> {
    let mut table: CheckedTable<T> = CheckedTable::with_size(initial_size);
    let mut rng = rand_pcg::Pcg64::seed_from_u64(seed);
    let mut max_size = 0;
    let verbosity = 0;
    for _ in 0..5000 {
        weighted_choose! {&mut rng,
            Insert: insert_weight => {
                let k = table.present_or_random_key(4.0, &mut rng, &mut rand_k);
                let v = rng.gen();
                table.insert(k, v);
                if verbosity > 0 {
                    println!("inserting {k:?}: {v:?}");
                }
            },
            Find: 1.0 => {
                let k = table.present_or_random_key(1.0, &mut rng, &mut rand_k);
                let result = table.find(k);
                if verbosity > 0 {
                    println!("finding {k:?} -> {result:?}");
                }
            },
            Remove: 1.0 => {
                let k = table.present_or_random_key(1.0, &mut rng, &mut rand_k);
                let result = table.remove(k);
                if verbosity > 0 {
                    println!("removing {k:?} -> {result:?}");
                }
            },
            Check: 0.05 => {
                table.check();
            }
        };
        max_size = std::cmp::max(max_size, table.len());
    }
    table.check();
    println!("{}: max len {max_size}, final size {}", T::NAME, table.dut.size());
    table
}

fn wide_key(rng: &mut rand_pcg::Pcg64) -> Key {
    rng.gen::<Key>() >> rng.gen_range(0..Key::BITS)
}

fn narrow_key(rng: &mut rand_pcg::Pcg64) -> Key {
    rng.gen_range(-64..64)
}

fn all_suites<T: CheckInvariants>() {
    test_suite::<T>(1, 1, 2.0, wide_key);
    test_suite::<T>(2, 16, 1.0, wide_key);
    test_suite::<T>(3, 4, 1.0, narrow_key);
    test_suite::<T>(4, 1000, 0.5, narrow_key);
    let grown = test_suite::<T>(5, 2, 3.0, |rng| rng.gen());
    assert!(grown.dut.size() > 2);
}

#[test]
fn test_suite_chained() {
    all_suites::<ChainedTable>();
}

#[test]
fn test_suite_open() {
    all_suites::<OpenTable>();
}

fn rehash_transparency<T: CheckInvariants>() {
    let mut table: CheckedTable<T> = CheckedTable::with_size(3);
    let mut rng = rand_pcg::Pcg64::seed_from_u64(7);
    let mut grew = 0;
    for i in 0..2000 {
        let size = table.dut.size();
        table.insert(wide_key(&mut rng), i);
        if table.dut.size() != size {
            grew += 1;
            // every key present before growing is still there with the same value
            table.check();
        }
    }
    assert!(grew >= 4);
}

#[test]
fn test_rehash_transparency() {
    rehash_transparency::<ChainedTable>();
    rehash_transparency::<OpenTable>();
}

fn overwrite_and_idempotent_remove<T: CheckInvariants>() {
    let mut table: CheckedTable<T> = CheckedTable::with_size(8);
    table.insert(42, 1);
    table.insert(42, 2);
    assert_eq!(table.len(), 1);
    assert_eq!(table.find(42), Some(2));
    assert_eq!(table.remove(7), None);
    assert_eq!(table.len(), 1);
    assert_eq!(table.remove(42), Some(2));
    assert_eq!(table.remove(42), None);
    assert_eq!(table.find(42), None);
    assert!(table.dut.is_empty());
    table.insert(42, 3);
    assert_eq!(table.find(42), Some(3));
    table.check();
}

#[test]
fn test_overwrite_and_idempotent_remove() {
    overwrite_and_idempotent_remove::<ChainedTable>();
    overwrite_and_idempotent_remove::<OpenTable>();
}

#[test]
fn test_negative_and_extreme_keys() {
    fn run<T: CheckInvariants>() {
        let mut table: CheckedTable<T> = CheckedTable::with_size(5);
        for key in [Key::MIN, -1, 0, 1, Key::MAX, Key::MIN + 1, Key::MAX - 1] {
            table.insert(key, key.wrapping_mul(3));
        }
        for key in [Key::MIN, -1, 0, 1, Key::MAX, 17] {
            table.find(key);
        }
        table.remove(-1);
        table.remove(Key::MIN);
        table.check();
    }
    run::<ChainedTable>();
    run::<OpenTable>();
}
