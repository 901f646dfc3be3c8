//! Index-based object pool with free-list recycling.
//!
//! # Design
//!
//! Slots live in one contiguous `Vec<Option<T>>`. Free slots are tracked by a
//! stack of indices, so the most recently freed slot is the next one handed
//! out. When the stack runs dry the pool doubles: every live element is moved
//! into a fresh allocation and the old one is released.
//!
//! ```text
//!  capacity 2          allocate x3            capacity 4
//!  ┌───┬───┐           ──────────▶           ┌───┬───┬───┬───┐
//!  │ _ │ _ │  free: [1, 0]                   │ a │ b │ c │ _ │  free: [3]
//!  └───┴───┘                                 └───┴───┴───┴───┘
//! ```
//!
//! Indices survive growth; references do not. Hold an index and resolve it
//! with [`Pool::get`] after any call that may allocate.

use crate::invariant;

const DEFAULT_CAPACITY: usize = 2;

/// Growable slot pool addressed by stable indices.
#[derive(Debug)]
pub struct Pool<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pool<T> {
    /// Creates a pool with room for two elements.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a pool with room for `capacity` elements before the first
    /// growth. A zero capacity is bumped to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots,
            free: (0..capacity).rev().collect(),
            len: 0,
        }
    }

    /// Stores `value` in a free slot and returns its index.
    pub fn allocate(&mut self, value: T) -> usize {
        let index = match self.free.pop() {
            Some(index) => index,
            None => self.grow(),
        };
        self.slots[index] = Some(value);
        self.len += 1;
        index
    }

    /// Drops the element at `index` and recycles the slot.
    ///
    /// Freeing an index that is already free, or out of range, is an
    /// invariant violation: debug builds panic, release builds log and
    /// return `None` without touching the free-list.
    pub fn deallocate(&mut self, index: usize) -> Option<T> {
        let capacity = self.slots.len();
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_some() => {
                let value = slot.take();
                self.free.push(index);
                self.len -= 1;
                value
            }
            Some(_) => {
                invariant!(false, "Pool: double free of slot {index}");
                None
            }
            None => {
                invariant!(false, "Pool: deallocate index {index} out of range (capacity {capacity})");
                None
            }
        }
    }

    /// Returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or refers to a free slot.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> &T {
        match self.slots.get(index) {
            Some(Some(value)) => value,
            Some(None) => panic!("Pool: slot {index} is not occupied"),
            None => panic!("Pool: index {index} out of range (capacity {})", self.slots.len()),
        }
    }

    /// Mutable counterpart of [`get`](Self::get).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range or refers to a free slot.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut T {
        let capacity = self.slots.len();
        match self.slots.get_mut(index) {
            Some(Some(value)) => value,
            Some(None) => panic!("Pool: slot {index} is not occupied"),
            None => panic!("Pool: index {index} out of range (capacity {capacity})"),
        }
    }

    #[inline]
    #[must_use]
    pub fn try_get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    #[inline]
    pub fn try_get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.try_get(index).is_some()
    }

    /// Drops every element. Capacity is kept and the free-list is rebuilt so
    /// that index 0 is handed out first again.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.free.clear();
        self.free.extend((0..self.slots.len()).rev());
        self.len = 0;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots. Never decreases.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterates occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (index, value)))
    }

    /// Doubles the slot count and returns the first new index, which the
    /// caller takes immediately. The remaining new indices go on the
    /// free-list lowest-first.
    fn grow(&mut self) -> usize {
        let old_capacity = self.slots.len();
        let new_capacity = old_capacity * 2;

        let mut slots = Vec::with_capacity(new_capacity);
        slots.append(&mut self.slots);
        slots.resize_with(new_capacity, || None);
        self.slots = slots;

        self.free.extend((old_capacity + 1..new_capacity).rev());
        log::debug!("Pool grown: {old_capacity} -> {new_capacity}");
        old_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_allocations_start_at_zero() {
        let mut pool = Pool::with_capacity(4);
        assert_eq!(pool.allocate('a'), 0);
        assert_eq!(pool.allocate('b'), 1);
        assert_eq!(pool.allocate('c'), 2);
    }

    #[test]
    fn test_growth_hands_out_old_capacity_first() {
        let mut pool = Pool::with_capacity(2);
        pool.allocate(1);
        pool.allocate(2);
        assert_eq!(pool.allocate(3), 2);
        assert_eq!(pool.allocate(4), 3);
        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn test_clear_keeps_capacity_and_restarts_at_zero() {
        let mut pool = Pool::with_capacity(2);
        for v in 0..5 {
            pool.allocate(v);
        }
        let capacity = pool.capacity();
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), capacity);
        assert_eq!(pool.allocate(9), 0);
    }

    #[test]
    fn test_deallocate_returns_value() {
        let mut pool = Pool::new();
        let idx = pool.allocate(String::from("tex"));
        assert_eq!(pool.deallocate(idx).as_deref(), Some("tex"));
        assert!(!pool.contains(idx));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "double free")]
    fn test_double_free_trips_debug_assertion() {
        let mut pool = Pool::new();
        let idx = pool.allocate(1);
        pool.deallocate(idx);
        pool.deallocate(idx);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        let pool: Pool<u8> = Pool::new();
        let _ = pool.get(7);
    }
}
