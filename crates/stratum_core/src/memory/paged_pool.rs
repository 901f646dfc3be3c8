//! Pointer-stable object pool.
//!
//! [`PagedPool`] trades the contiguity of [`Pool`](super::Pool) for address
//! stability: storage is a list of fixed-size pages that are never moved or
//! resized, so a reference obtained from an occupied slot stays at the same
//! address until that slot is freed.
//!
//! Allocation looks in the most recently used page first, then scans every
//! page from the first, and only appends a page when all are full.

use crate::invariant;

const DEFAULT_ELEMENTS_PER_PAGE: usize = 128;

/// Address of an element inside a [`PagedPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PagedKey {
    page: u32,
    slot: u32,
}

impl PagedKey {
    #[inline]
    #[must_use]
    pub fn page(self) -> u32 {
        self.page
    }

    #[inline]
    #[must_use]
    pub fn slot(self) -> u32 {
        self.slot
    }

    /// Packs the key into a single integer (page in the high half).
    #[inline]
    #[must_use]
    pub fn to_bits(self) -> u64 {
        (u64::from(self.page) << 32) | u64::from(self.slot)
    }

    #[inline]
    #[must_use]
    pub fn from_bits(bits: u64) -> Self {
        Self {
            page: (bits >> 32) as u32,
            slot: bits as u32,
        }
    }
}

struct PoolPage<T> {
    slots: Box<[Option<T>]>,
    free: Vec<u32>,
}

impl<T> PoolPage<T> {
    fn new(size: usize) -> Self {
        let mut slots = Vec::with_capacity(size);
        slots.resize_with(size, || None);
        Self {
            slots: slots.into_boxed_slice(),
            free: (0..size as u32).rev().collect(),
        }
    }
}

/// Pool of `T` whose elements never move while occupied.
pub struct PagedPool<T> {
    pages: Vec<PoolPage<T>>,
    elements_per_page: usize,
    current: usize,
    len: usize,
}

impl<T> std::fmt::Debug for PagedPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedPool")
            .field("pages", &self.pages.len())
            .field("elements_per_page", &self.elements_per_page)
            .field("len", &self.len)
            .finish()
    }
}

impl<T> Default for PagedPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PagedPool<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_ELEMENTS_PER_PAGE)
    }

    /// Creates a pool with `elements_per_page` slots per page (at least one).
    #[must_use]
    pub fn with_page_size(elements_per_page: usize) -> Self {
        let elements_per_page = elements_per_page.max(1);
        Self {
            pages: vec![PoolPage::new(elements_per_page)],
            elements_per_page,
            current: 0,
            len: 0,
        }
    }

    pub fn allocate(&mut self, value: T) -> PagedKey {
        let page = self.page_with_room();
        let pool_page = &mut self.pages[page];
        let slot = match pool_page.free.pop() {
            Some(slot) => slot,
            None => unreachable!("page_with_room returned a full page"),
        };
        pool_page.slots[slot as usize] = Some(value);
        self.current = page;
        self.len += 1;
        PagedKey {
            page: page as u32,
            slot,
        }
    }

    /// Drops the element at `key`. Freeing a free or unknown key is an
    /// invariant violation.
    pub fn deallocate(&mut self, key: PagedKey) -> Option<T> {
        let Some(page) = self.pages.get_mut(key.page as usize) else {
            invariant!(false, "PagedPool: deallocate on unknown page {}", key.page);
            return None;
        };
        let value = page.slots.get_mut(key.slot as usize).and_then(Option::take);
        if value.is_some() {
            page.free.push(key.slot);
            self.len -= 1;
        } else {
            invariant!(false, "PagedPool: double free of {key:?}");
        }
        value
    }

    /// # Panics
    ///
    /// Panics if `key` does not refer to an occupied slot.
    #[inline]
    #[must_use]
    pub fn get(&self, key: PagedKey) -> &T {
        match self.try_get(key) {
            Some(value) => value,
            None => panic!("PagedPool: {key:?} is not occupied"),
        }
    }

    /// # Panics
    ///
    /// Panics if `key` does not refer to an occupied slot.
    #[inline]
    pub fn get_mut(&mut self, key: PagedKey) -> &mut T {
        match self.try_get_mut(key) {
            Some(value) => value,
            None => panic!("PagedPool: {key:?} is not occupied"),
        }
    }

    #[must_use]
    pub fn try_get(&self, key: PagedKey) -> Option<&T> {
        self.pages
            .get(key.page as usize)
            .and_then(|page| page.slots.get(key.slot as usize))
            .and_then(Option::as_ref)
    }

    pub fn try_get_mut(&mut self, key: PagedKey) -> Option<&mut T> {
        self.pages
            .get_mut(key.page as usize)
            .and_then(|page| page.slots.get_mut(key.slot as usize))
            .and_then(Option::as_mut)
    }

    /// Drops every element but keeps all pages.
    pub fn clear(&mut self) {
        let size = self.elements_per_page;
        for page in &mut self.pages {
            for slot in page.slots.iter_mut() {
                *slot = None;
            }
            page.free.clear();
            page.free.extend((0..size as u32).rev());
        }
        self.current = 0;
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

    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.pages.len() * self.elements_per_page
    }

    /// Iterates occupied slots, page by page.
    pub fn iter(&self) -> impl Iterator<Item = (PagedKey, &T)> {
        self.pages.iter().enumerate().flat_map(|(page, pool_page)| {
            pool_page.slots.iter().enumerate().filter_map(move |(slot, value)| {
                value.as_ref().map(|value| {
                    (
                        PagedKey {
                            page: page as u32,
                            slot: slot as u32,
                        },
                        value,
                    )
                })
            })
        })
    }

    fn page_with_room(&mut self) -> usize {
        if !self.pages[self.current].free.is_empty() {
            return self.current;
        }
        if let Some(page) = self.pages.iter().position(|page| !page.free.is_empty()) {
            return page;
        }
        self.pages.push(PoolPage::new(self.elements_per_page));
        log::debug!("PagedPool: new page #{}", self.pages.len() - 1);
        self.pages.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_survive_new_pages() {
        let mut pool = PagedPool::with_page_size(2);
        let first = pool.allocate(10u64);
        let address = std::ptr::from_ref(pool.get(first));

        for v in 0..16 {
            pool.allocate(v);
        }

        assert!(pool.page_count() > 1);
        assert_eq!(std::ptr::from_ref(pool.get(first)), address);
        assert_eq!(*pool.get(first), 10);
    }

    #[test]
    fn test_freed_slot_in_earlier_page_is_reused() {
        let mut pool = PagedPool::with_page_size(2);
        let a = pool.allocate(1);
        pool.allocate(2);
        pool.allocate(3);
        assert_eq!(pool.page_count(), 2);

        pool.deallocate(a);
        pool.allocate(4);
        let reused = pool.allocate(5);
        assert_eq!(reused, a);
        assert_eq!(pool.page_count(), 2);
    }

    #[test]
    fn test_key_bits_round_trip() {
        let mut pool = PagedPool::with_page_size(1);
        pool.allocate('x');
        let key = pool.allocate('y');
        assert_eq!(PagedKey::from_bits(key.to_bits()), key);
        assert_eq!(key.page(), 1);
    }
}
