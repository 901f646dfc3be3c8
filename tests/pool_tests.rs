//! Pool Tests
//!
//! Tests for:
//! - Pool: index stability across growth, LIFO reuse, clear, invariant checks
//! - PagedPool: address stability, slot reuse across pages
//! - IntMap: string-hash keyed lookup used by shader bindings

use stratum::stratum_core::collections::hash_str;
use stratum::{IntMap, PagedPool, Pool};

// ============================================================================
// Pool
// ============================================================================

#[test]
fn pool_capacity_two_grows_on_third_allocation() {
    let mut pool: Pool<i32> = Pool::with_capacity(2);
    let a = pool.allocate(10);
    let b = pool.allocate(20);
    assert_eq!((a, b), (0, 1));
    assert_eq!(pool.capacity(), 2);

    let c = pool.allocate(30);
    assert_eq!(c, 2);
    assert_eq!(pool.capacity(), 4);
    assert_eq!(*pool.get(a), 10);
    assert_eq!(*pool.get(b), 20);
    assert_eq!(*pool.get(c), 30);
}

#[test]
fn pool_indices_survive_repeated_growth() {
    let mut pool = Pool::new();
    let indices: Vec<usize> = (0..100).map(|value| pool.allocate(value)).collect();
    for (expected, &index) in indices.iter().enumerate() {
        assert_eq!(*pool.get(index), expected);
    }
    assert_eq!(pool.len(), 100);
    assert!(pool.capacity() >= 100);
}

#[test]
fn pool_reuses_most_recently_freed_slot_first() {
    let mut pool = Pool::with_capacity(8);
    let slots: Vec<usize> = (0..5).map(|value| pool.allocate(value)).collect();

    pool.deallocate(slots[1]);
    pool.deallocate(slots[3]);

    assert_eq!(pool.allocate(100), slots[3]);
    assert_eq!(pool.allocate(101), slots[1]);
    assert_eq!(pool.allocate(102), 5);
}

#[test]
fn pool_clear_frees_everything_and_keeps_capacity() {
    let mut pool = Pool::new();
    for value in 0..5 {
        pool.allocate(value);
    }
    let capacity = pool.capacity();
    pool.clear();

    assert!(pool.is_empty());
    assert_eq!(pool.capacity(), capacity);
    assert_eq!(pool.allocate(7), 0);
}

#[test]
fn pool_iter_visits_only_occupied_slots() {
    let mut pool = Pool::with_capacity(4);
    let a = pool.allocate('a');
    let b = pool.allocate('b');
    pool.allocate('c');
    pool.deallocate(b);

    let live: Vec<(usize, char)> = pool.iter().map(|(index, &value)| (index, value)).collect();
    assert_eq!(live, vec![(a, 'a'), (2, 'c')]);
    assert!(!pool.contains(b));
}

#[test]
#[should_panic(expected = "not occupied")]
fn pool_get_of_freed_slot_panics() {
    let mut pool = Pool::new();
    let index = pool.allocate(1);
    pool.deallocate(index);
    let _ = pool.get(index);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "out of range")]
fn pool_deallocate_out_of_range_trips_invariant() {
    let mut pool: Pool<u8> = Pool::new();
    pool.deallocate(42);
}

// ============================================================================
// PagedPool
// ============================================================================

#[test]
fn paged_pool_elements_never_move() {
    let mut pool = PagedPool::with_page_size(4);
    let first = pool.allocate(String::from("first"));
    let address = std::ptr::from_ref(pool.get(first));

    for i in 0..64 {
        pool.allocate(format!("filler {i}"));
    }

    assert!(pool.page_count() > 1);
    assert_eq!(std::ptr::from_ref(pool.get(first)), address);
    assert_eq!(pool.get(first), "first");
}

#[test]
fn paged_pool_fills_holes_before_adding_pages() {
    let mut pool = PagedPool::with_page_size(2);
    let keys: Vec<_> = (0..4).map(|value| pool.allocate(value)).collect();
    assert_eq!(pool.page_count(), 2);

    pool.deallocate(keys[0]);
    let reused = pool.allocate(99);
    assert_eq!(reused, keys[0]);
    assert_eq!(pool.page_count(), 2);
}

// ============================================================================
// IntMap
// ============================================================================

#[test]
fn int_map_resolves_hashed_names() {
    let mut map = IntMap::new();
    for (value, name) in ["albedo", "normal", "roughness", "transform"].iter().enumerate() {
        assert!(map.insert(hash_str(name), value as u64));
    }

    assert_eq!(map.get(hash_str("roughness")), Some(2));
    assert_eq!(map.get(hash_str("metallic")), None);
    assert!(!map.insert(hash_str("albedo"), 7));
    assert_eq!(map.remove(hash_str("albedo")), Some(0));
    assert_eq!(map.len(), 3);
}
