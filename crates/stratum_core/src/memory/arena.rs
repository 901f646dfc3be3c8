//! Contiguous bump arenas.
//!
//! Both arenas here keep their elements in one contiguous block and rewind in
//! bulk with `reset()`. They differ in what happens when the block is full:
//!
//! - [`StackArena`] has a compile-time capacity and refuses to grow.
//! - [`LinearArena`] doubles, moving every element into a new block.
//!
//! For [`LinearArena`], a reference returned by `append`/`next` is only valid
//! until the next call that exceeds capacity. The borrow checker enforces this
//! for safe code; code that keeps raw pointers (native handles, FFI) must
//! re-resolve through [`LinearArena::as_slice`] after growth.

use smallvec::SmallVec;

use crate::errors::{CoreError, Result};

const DEFAULT_LINEAR_CAPACITY: usize = 2;

// ─── StackArena ──────────────────────────────────────────────────────────────

/// Fixed-capacity arena stored inline.
#[derive(Debug)]
pub struct StackArena<T, const N: usize> {
    items: SmallVec<[T; N]>,
}

impl<T, const N: usize> Default for StackArena<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> StackArena<T, N> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: SmallVec::new(),
        }
    }

    /// Appends `value`.
    ///
    /// # Panics
    ///
    /// Panics when the arena already holds `N` elements.
    pub fn append(&mut self, value: T) -> &mut T {
        match self.try_append(value) {
            Ok(slot) => slot,
            Err(err) => panic!("{err}"),
        }
    }

    /// Appends `value`, or reports [`CoreError::CapacityExceeded`] when full.
    pub fn try_append(&mut self, value: T) -> Result<&mut T> {
        if self.items.len() == N {
            return Err(CoreError::CapacityExceeded {
                container: "StackArena",
                capacity: N,
            });
        }
        let index = self.items.len();
        self.items.push(value);
        Ok(&mut self.items[index])
    }

    /// Rewinds to empty.
    #[inline]
    pub fn reset(&mut self) {
        self.items.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        N - self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Clone, const N: usize> Clone for StackArena<T, N> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
        }
    }
}

// ─── LinearArena ─────────────────────────────────────────────────────────────

/// Growable contiguous arena for per-frame scratch data.
#[derive(Debug)]
pub struct LinearArena<T> {
    items: Vec<T>,
    reallocations: usize,
}

impl<T> Default for LinearArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LinearArena<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LINEAR_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.max(1)),
            reallocations: 0,
        }
    }

    /// Appends `value`, doubling the block first if it is full.
    ///
    /// Growth moves every element; earlier references are invalidated.
    pub fn append(&mut self, value: T) -> &mut T {
        if self.items.len() == self.items.capacity() {
            self.grow();
        }
        let index = self.items.len();
        self.items.push(value);
        &mut self.items[index]
    }

    /// Appends a default-constructed element.
    pub fn next(&mut self) -> &mut T
    where
        T: Default,
    {
        self.append(T::default())
    }

    /// Drops the contents and rewinds. The block is kept.
    #[inline]
    pub fn reset(&mut self) {
        self.items.clear();
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// How many times the block has been replaced by a larger one.
    #[inline]
    #[must_use]
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// Start of the current block.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.items.as_ptr()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    fn grow(&mut self) {
        let new_capacity = self.items.capacity().max(1) * 2;
        let mut items = Vec::with_capacity(new_capacity);
        items.append(&mut self.items);
        self.items = items;
        self.reallocations += 1;
    }
}

impl<'a, T> IntoIterator for &'a LinearArena<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
