//! Arena Tests
//!
//! Tests for:
//! - PagedArena: address stability until reset, block placement, page reuse
//! - LinearArena: relocation on growth, reallocation count, reset
//! - StackArena: fixed capacity and the CapacityExceeded error
//! - RingBuffer: SPSC hand-off between threads

use stratum::{CoreError, LinearArena, PagedArena, RingBuffer, StackArena};

// ============================================================================
// PagedArena
// ============================================================================

#[test]
fn paged_arena_addresses_stable_until_reset() {
    let mut arena: PagedArena<u64> = PagedArena::with_page_size(8);
    let first = std::ptr::from_mut(arena.next(1));

    let mut addresses = vec![first];
    for value in 2..100 {
        addresses.push(std::ptr::from_mut(arena.next(value)));
    }

    assert!(arena.page_count() > 1);
    for (index, value) in arena.iter().enumerate() {
        assert_eq!(std::ptr::from_ref(value), addresses[index].cast_const());
        assert_eq!(*value, index as u64 + 1);
    }
}

#[test]
fn paged_arena_block_moves_to_next_page_instead_of_splitting() {
    let mut arena: PagedArena<u32> = PagedArena::with_page_size(4);
    arena.next(0);
    arena.next(1);
    arena.next(2);

    let block = arena.next_array_with(3, |i| 10 + i as u32);
    assert_eq!(block, &[10, 11, 12]);
    assert_eq!(arena.page_count(), 2);
    assert_eq!(arena.get(3), Some(&10));
    assert_eq!(arena.len(), 6);
}

#[test]
fn paged_arena_oversized_block_gets_its_own_page() {
    let mut arena: PagedArena<u8> = PagedArena::with_page_size(4);
    let block = arena.next_array(10);
    assert_eq!(block.len(), 10);
    assert_eq!(arena.len(), 10);
    assert!(arena.iter().all(|&value| value == 0));
}

#[test]
fn paged_arena_reset_keeps_pages() {
    let mut arena: PagedArena<u32> = PagedArena::with_page_size(4);
    for value in 0..20 {
        arena.next(value);
    }
    let pages = arena.page_count();

    arena.reset();
    assert!(arena.is_empty());
    assert_eq!(arena.page_count(), pages);

    for value in 0..20 {
        arena.next(value);
    }
    assert_eq!(arena.page_count(), pages);
}

// ============================================================================
// LinearArena
// ============================================================================

#[test]
fn linear_arena_relocates_on_growth() {
    let mut arena: LinearArena<u32> = LinearArena::new();
    assert_eq!(arena.capacity(), 2);

    arena.append(1);
    let before = arena.as_ptr();
    arena.append(2);
    assert_eq!(arena.as_ptr(), before);
    assert_eq!(arena.reallocations(), 0);

    arena.append(3);
    assert_ne!(arena.as_ptr(), before);
    assert_eq!(arena.reallocations(), 1);
    assert_eq!(arena.capacity(), 4);
    assert_eq!(arena.as_slice(), &[1, 2, 3]);
}

#[test]
fn linear_arena_reset_keeps_allocation() {
    let mut arena: LinearArena<u32> = LinearArena::with_capacity(4);
    for value in 0..4 {
        *arena.next() = value;
    }
    let ptr = arena.as_ptr();

    arena.reset();
    assert!(arena.is_empty());
    arena.append(9);
    assert_eq!(arena.as_ptr(), ptr);
    assert_eq!(arena.reallocations(), 0);
}

// ============================================================================
// StackArena
// ============================================================================

#[test]
fn stack_arena_reports_exhaustion() {
    let mut arena: StackArena<u16, 3> = StackArena::new();
    for value in 0..3 {
        arena.try_append(value).unwrap();
    }
    assert_eq!(arena.remaining(), 0);
    assert_eq!(
        arena.try_append(3).unwrap_err(),
        CoreError::CapacityExceeded {
            container: "StackArena",
            capacity: 3
        }
    );

    arena.reset();
    assert_eq!(arena.remaining(), 3);
}

#[test]
#[should_panic(expected = "capacity")]
fn stack_arena_append_panics_when_full() {
    let mut arena: StackArena<u8, 1> = StackArena::new();
    arena.append(1);
    arena.append(2);
}

// ============================================================================
// RingBuffer
// ============================================================================

#[test]
fn ring_buffer_hands_values_across_threads_in_order() {
    let (mut producer, consumer) = RingBuffer::with_capacity(8);

    let reader = std::thread::spawn(move || {
        let mut consumer = consumer;
        let mut received = Vec::new();
        while received.len() < 1000 {
            match consumer.try_pop() {
                Some(value) => received.push(value),
                None => std::thread::yield_now(),
            }
        }
        received
    });

    for value in 0..1000u32 {
        let mut pending = value;
        while let Err(rejected) = producer.try_push(pending) {
            pending = rejected;
            std::thread::yield_now();
        }
    }

    let received = reader.join().unwrap();
    assert_eq!(received, (0..1000).collect::<Vec<_>>());
}

#[test]
fn ring_buffer_returns_value_when_full() {
    let (mut producer, mut consumer) = RingBuffer::with_capacity(3);
    assert_eq!(producer.capacity(), 4);
    for value in 0..4 {
        producer.try_push(value).unwrap();
    }
    assert_eq!(producer.try_push(99), Err(99));
    assert_eq!(consumer.try_pop(), Some(0));
    assert_eq!(consumer.len(), 3);
}
