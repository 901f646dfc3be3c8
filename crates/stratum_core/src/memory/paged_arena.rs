//! Paged bump arena with pointer stability.
//!
//! # Design
//!
//! ```text
//!  page 0 (cap 4)        page 1 (cap 4)        page 2 (cap 4)
//!  ┌───┬───┬───┬───┐     ┌───┬───┬───┬───┐     ┌───┬───┬───┬───┐
//!  │ a │ b │ c │ · │ ──▶ │ d │ d │ d │ e │ ──▶ │   │   │   │   │ (kept, unused)
//!  └───┴───┴───┴───┘     └───┴───┴───┴───┘     └───┴───┴───┴───┘
//!                  ▲ tail left unused: the 3-element block `d`
//!                    never straddles two pages
//! ```
//!
//! Each page is a `Vec` allocated once with a fixed capacity and only pushed
//! to within that capacity, so elements never move. `reset()` drops the
//! contents, keeps every page and rewinds to page 0; the following frame
//! reuses the same memory.

const DEFAULT_ELEMENTS_PER_PAGE: usize = 100;

/// Bump arena made of fixed-size pages.
#[derive(Debug)]
pub struct PagedArena<T> {
    pages: Vec<Vec<T>>,
    /// Global index of the first element of each page in `0..=current`.
    page_starts: Vec<usize>,
    current: usize,
    elements_per_page: usize,
    len: usize,
}

impl<T> Default for PagedArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PagedArena<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_ELEMENTS_PER_PAGE)
    }

    #[must_use]
    pub fn with_page_size(elements_per_page: usize) -> Self {
        let elements_per_page = elements_per_page.max(1);
        Self {
            pages: vec![Vec::with_capacity(elements_per_page)],
            page_starts: vec![0],
            current: 0,
            elements_per_page,
            len: 0,
        }
    }

    /// Places `value` at the cursor.
    pub fn next(&mut self, value: T) -> &mut T {
        self.reserve_block(1);
        self.len += 1;
        let page = &mut self.pages[self.current];
        let index = page.len();
        page.push(value);
        &mut page[index]
    }

    pub fn next_default(&mut self) -> &mut T
    where
        T: Default,
    {
        self.next(T::default())
    }

    /// Reserves `count` contiguous elements, filled by `fill(i)`.
    ///
    /// The block is placed entirely within one page. If the current page lacks
    /// room the cursor moves to the next page; a block longer than a page gets
    /// a page of its own.
    pub fn next_array_with(&mut self, count: usize, mut fill: impl FnMut(usize) -> T) -> &mut [T] {
        if count == 0 {
            return &mut [];
        }
        self.reserve_block(count);
        self.len += count;
        let page = &mut self.pages[self.current];
        let start = page.len();
        page.extend((0..count).map(&mut fill));
        &mut page[start..]
    }

    pub fn next_array(&mut self, count: usize) -> &mut [T]
    where
        T: Default,
    {
        self.next_array_with(count, |_| T::default())
    }

    /// Drops all elements and rewinds to the first page. Pages are kept.
    pub fn reset(&mut self) {
        for page in &mut self.pages[..=self.current] {
            page.clear();
        }
        self.current = 0;
        self.page_starts.clear();
        self.page_starts.push(0);
        self.len = 0;
    }

    /// Element at global allocation position `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        let (page, offset) = self.locate(index)?;
        self.pages[page].get(offset)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let (page, offset) = self.locate(index)?;
        self.pages[page].get_mut(offset)
    }

    /// Iterates in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.pages[..=self.current].iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.pages[..=self.current].iter_mut().flatten()
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

    /// Pages allocated so far, including ones idle since the last reset.
    #[inline]
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[inline]
    #[must_use]
    pub fn elements_per_page(&self) -> usize {
        self.elements_per_page
    }

    fn locate(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.len {
            return None;
        }
        let page = self.page_starts.partition_point(|&start| start <= index) - 1;
        Some((page, index - self.page_starts[page]))
    }

    fn reserve_block(&mut self, count: usize) {
        let page = &self.pages[self.current];
        if page.capacity() - page.len() >= count {
            return;
        }

        let next = self.current + 1;
        let size = self.elements_per_page.max(count);
        match self.pages.get(next) {
            Some(page) if page.capacity() >= count => {}
            Some(_) => self.pages.insert(next, Vec::with_capacity(size)),
            None => {
                self.pages.push(Vec::with_capacity(size));
                log::debug!("PagedArena: new page #{next} ({size} elements)");
            }
        }
        self.current = next;
        self.page_starts.push(self.len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_never_splits_across_pages() {
        let mut arena = PagedArena::with_page_size(4);
        arena.next(1u32);
        arena.next(2);
        arena.next(3);

        let block = arena.next_array_with(3, |i| 10 + i as u32);
        assert_eq!(block, &[10, 11, 12]);
        assert_eq!(arena.page_count(), 2);

        let collected: Vec<u32> = arena.iter().copied().collect();
        assert_eq!(collected, vec![1, 2, 3, 10, 11, 12]);
        assert_eq!(arena.get(3), Some(&10));
        assert_eq!(arena.get(6), None);
    }

    #[test]
    fn test_oversized_block_gets_dedicated_page() {
        let mut arena: PagedArena<u8> = PagedArena::with_page_size(2);
        let block = arena.next_array(5);
        assert_eq!(block.len(), 5);
        assert_eq!(arena.len(), 5);
        assert_eq!(arena.get(4), Some(&0));
    }

    #[test]
    fn test_reset_reuses_pages() {
        let mut arena = PagedArena::with_page_size(2);
        for v in 0..6 {
            arena.next(v);
        }
        let pages = arena.page_count();
        arena.reset();
        assert!(arena.is_empty());
        for v in 0..6 {
            arena.next(v);
        }
        assert_eq!(arena.page_count(), pages);
        assert_eq!(arena.get(5), Some(&5));
    }

    #[test]
    fn test_zero_length_block_is_empty() {
        let mut arena: PagedArena<u8> = PagedArena::new();
        assert!(arena.next_array(0).is_empty());
        assert!(arena.is_empty());
    }
}
