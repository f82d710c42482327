#![allow(missing_docs)]
use super::*;

fn slot_of(table: &OpenTable, key: Key) -> Option<usize> {
    table.locate(key)
}

#[test]
fn test_shared_initial_slot() {
    let mut table = OpenTable::with_size(8).unwrap();
    table.insert(3, 30).unwrap();
    table.insert(11, 110).unwrap();
    assert_eq!(slot_of(&table, 3), Some(3));
    assert_eq!(slot_of(&table, 11), Some(4));
    assert_eq!(table.find(3), Some(30));
    assert_eq!(table.find(11), Some(110));
    assert!(table.contains_key(11));
    assert!(!table.contains_key(19));
    assert_eq!(table.len(), 2);
    assert_eq!(table.size(), 8);
    table.check();
}

#[test]
fn test_probe_covers_every_slot() {
    for size in [2, 4, 8, 64, 1024] {
        for key in [0, 1, 3, 11, 12345, -1, -77, Key::MIN, Key::MAX] {
            let mut seen = vec![false; size];
            for index in Probe::new(key, size) {
                assert!(!seen[index], "slot {index} visited twice for key {key}");
                seen[index] = true;
            }
            assert!(seen.iter().all(|&s| s), "key {key} misses slots of {size}");
        }
    }
}

#[test]
fn test_size_rounding() {
    assert_eq!(OpenTable::with_size(1).unwrap().size(), 2);
    assert_eq!(OpenTable::with_size(100).unwrap().size(), 128);
    assert_eq!(OpenTable::with_size(128).unwrap().size(), 128);
    assert_eq!(
        OpenTable::with_size(usize::MAX).unwrap_err(),
        AllocError::CapacityOverflow
    );
}

#[test]
#[should_panic]
fn test_zero_size() {
    let _ = OpenTable::with_size(0);
}

#[test]
fn test_growth_trigger() {
    let mut table = OpenTable::with_size(8).unwrap();
    for key in 0..3 {
        table.insert(key, key).unwrap();
    }
    assert_eq!(table.size(), 8);
    table.insert(2, 22).unwrap();
    assert_eq!(table.size(), 8);
    table.insert(3, 3).unwrap();
    assert_eq!(table.size(), 16);
    assert_eq!(table.len(), 4);
    assert_eq!(table.find(2), Some(22));
    table.check();
}

#[test]
fn test_tombstones() {
    let mut table = OpenTable::with_size(8).unwrap();
    table.insert(3, 30).unwrap();
    table.insert(11, 110).unwrap();
    assert_eq!(table.remove(3), Some(30));
    assert_eq!(table.tombstones(), 1);
    assert_eq!(table.remove(3), None);
    assert_eq!(table.tombstones(), 1);

    // lookups continue past the tombstone
    assert_eq!(table.find(11), Some(110));

    // reinserting a key stored beyond a tombstone updates it in place
    table.insert(11, 111).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(slot_of(&table, 11), Some(4));
    assert_eq!(table.find(11), Some(111));

    // a new key claims the tombstone
    table.insert(19, 190).unwrap();
    assert_eq!(slot_of(&table, 19), Some(3));
    assert_eq!(table.tombstones(), 0);
    table.check();
}

#[test]
fn test_growth_drops_tombstones() {
    let mut table = OpenTable::with_size(16).unwrap();
    for key in 0..7 {
        table.insert(key, key).unwrap();
    }
    for key in 0..5 {
        table.remove(key);
    }
    assert_eq!(table.tombstones(), 5);
    for key in 100..106 {
        table.insert(key, key).unwrap();
    }
    assert_eq!(table.size(), 32);
    assert_eq!(table.tombstones(), 0);
    assert_eq!(table.len(), 8);
    table.check();
}

#[test]
fn test_misses_with_tombstones_everywhere() {
    let mut table = OpenTable::with_size(64).unwrap();
    // churn through distinct keys so that every free slot ends up a tombstone
    for key in 0..10_000 {
        table.insert(key, key).unwrap();
        table.remove(key);
    }
    assert_eq!(table.size(), 64);
    assert!(table.is_empty());
    assert_eq!(
        table.slot_statuses().filter(|&s| s == SlotStatus::Empty).count(),
        0
    );
    assert_eq!(table.find(-5), None);
    assert!(!table.contains_key(-5));
    assert!(!table.contains_key(9_999));
    assert_eq!(table.remove(-5), None);
    table.insert(-5, 5).unwrap();
    assert_eq!(table.find(-5), Some(5));
    table.check();
}

#[test]
fn test_dump() {
    let mut table = OpenTable::with_size(8).unwrap();
    table.insert(1, 10).unwrap();
    table.insert(2, 20).unwrap();
    table.remove(2);
    let dump = table.dump().to_string();
    let mut expected = String::from("Open table\nEntries: 1\nTombstones: 1\nSlots: 8\n");
    expected.push_str("      0: -\n      1: (1, 10)\n      2: deleted\n");
    for index in 3..8 {
        expected.push_str(&format!("      {index}: -\n"));
    }
    assert_eq!(dump, expected);
}

#[test]
fn test_iter() {
    let mut table = OpenTable::with_size(16).unwrap();
    for key in [5, -3, 40] {
        table.insert(key, key * 2).unwrap();
    }
    table.remove(40);
    let mut entries: Vec<_> = table.iter().collect();
    entries.sort_unstable();
    assert_eq!(entries, [(-3, -6), (5, 10)]);
    assert_eq!(format!("{:?}", OpenTable::with_size(4).unwrap()), "{}");
}
