//! Per-frame item queues.
//!
//! A [`Queue`] collects the items of one frame slice, then freezes them
//! together with a shared [`ParameterBlock`] and the surfaces it depends on.
//!
//! ```text
//!            begin()            end(shared, deps)        tag_executed()
//!  Uninitialized ──▶ Queueing ─────────────────▶ Ready ─────────────▶ Executed
//!                       ▲                                                │
//!                       └──────────────────── begin() ───────────────────┘
//! ```
//!
//! Out-of-order calls log a warning and leave the state unchanged.
//!
//! Items live in a [`PagedArena`], so a reference handed out by
//! [`Queue::create_item`] stays put while more items are recorded. The
//! sorted index list survives across frames: a scene that changes little
//! between frames is already almost sorted, which is the best case for the
//! insertion sort used here.

use stratum_core::limits::MAX_DEPENDENCIES;
use stratum_core::memory::{LinearArena, PagedArena, StackArena};

use crate::items::{Dependency, ParameterBlock};

const DEFAULT_PAGE_SIZE: usize = 100;

/// An entry of a [`Queue`].
pub trait QueueItem: Default + Send + 'static {
    /// Key the queue sorts by.
    fn sort_key(&self) -> u64;
}

/// Lifecycle of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum QueueState {
    #[default]
    Uninitialized = 0,
    Queueing = 1,
    Ready = 2,
    Executed = 3,
}

impl QueueState {
    #[inline]
    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Queueing,
            2 => Self::Ready,
            3 => Self::Executed,
            _ => Self::Uninitialized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortMode {
    /// Submission order.
    #[default]
    None,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    pub sort_mode: SortMode,
    /// Items per arena page.
    pub page_size: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueueConfig {
    #[must_use]
    pub fn sorted(sort_mode: SortMode) -> Self {
        Self {
            sort_mode,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct Queue<I: QueueItem> {
    state: QueueState,
    sort_mode: SortMode,
    items: PagedArena<I>,
    sorted: Vec<u32>,
    keys: LinearArena<u64>,
    shared: ParameterBlock,
    dependencies: StackArena<Dependency, MAX_DEPENDENCIES>,
}

impl<I: QueueItem> Default for Queue<I> {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl<I: QueueItem> Queue<I> {
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        Self {
            state: QueueState::Uninitialized,
            sort_mode: config.sort_mode,
            items: PagedArena::with_page_size(config.page_size),
            sorted: Vec::new(),
            keys: LinearArena::new(),
            shared: ParameterBlock::default(),
            dependencies: StackArena::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> QueueState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == QueueState::Ready
    }

    #[inline]
    #[must_use]
    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// Items recorded since the last `begin()`, in any state.
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

    /// Starts a new frame: drops last frame's items and opens the queue.
    pub fn begin(&mut self) -> bool {
        match self.state {
            QueueState::Uninitialized | QueueState::Executed => {
                self.items.reset();
                self.shared.clear();
                self.dependencies.reset();
                self.state = QueueState::Queueing;
                true
            }
            state => {
                log::warn!("Queue::begin() called in state {state:?}");
                false
            }
        }
    }

    /// Appends a default item and returns it for filling in.
    pub fn create_item(&mut self) -> Option<&mut I> {
        if self.state != QueueState::Queueing {
            log::warn!("Queue::create_item() called in state {:?}", self.state);
            return None;
        }
        Some(self.items.next_default())
    }

    /// Appends `item` as is.
    pub fn push(&mut self, item: I) -> bool {
        if self.state != QueueState::Queueing {
            log::warn!("Queue::push() called in state {:?}", self.state);
            return false;
        }
        self.items.next(item);
        true
    }

    /// Freezes the queue. Dependencies beyond `MAX_DEPENDENCIES` are dropped.
    pub fn end(&mut self, shared: ParameterBlock, dependencies: &[Dependency]) -> bool {
        if self.state != QueueState::Queueing {
            log::warn!("Queue::end() called in state {:?}", self.state);
            return false;
        }

        self.shared = shared;
        for dependency in dependencies {
            if self.dependencies.try_append(*dependency).is_err() {
                log::warn!(
                    "Queue::end(): {} dependencies given, keeping the first {MAX_DEPENDENCIES}",
                    dependencies.len()
                );
                break;
            }
        }

        self.sort();
        self.state = QueueState::Ready;
        true
    }

    pub fn tag_executed(&mut self) -> bool {
        if self.state != QueueState::Ready {
            log::warn!("Queue::tag_executed() called in state {:?}", self.state);
            return false;
        }
        self.state = QueueState::Executed;
        true
    }

    // ========================================================================
    // Read access (Ready only)
    // ========================================================================

    /// Item indices in sort order.
    #[must_use]
    pub fn sorted_indices(&self) -> &[u32] {
        if !self.check_ready("sorted_indices") {
            return &[];
        }
        &self.sorted
    }

    /// Items in sort order.
    pub fn iter_sorted(&self) -> impl Iterator<Item = &I> {
        self.sorted_indices()
            .iter()
            .filter_map(|&index| self.items.get(index as usize))
    }

    /// Items in creation order.
    pub fn items(&self) -> impl Iterator<Item = &I> {
        let count = if self.check_ready("items") { self.items.len() } else { 0 };
        self.items.iter().take(count)
    }

    #[must_use]
    pub fn item(&self, index: usize) -> Option<&I> {
        if !self.check_ready("item") {
            return None;
        }
        self.items.get(index)
    }

    #[must_use]
    pub fn shared_parameters(&self) -> Option<&ParameterBlock> {
        self.check_ready("shared_parameters").then_some(&self.shared)
    }

    #[must_use]
    pub fn dependencies(&self) -> &[Dependency] {
        if !self.check_ready("dependencies") {
            return &[];
        }
        self.dependencies.as_slice()
    }

    fn check_ready(&self, what: &str) -> bool {
        if self.state != QueueState::Ready {
            log::error!("Queue::{what}() requires a ready queue (state {:?})", self.state);
            return false;
        }
        true
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    fn sort(&mut self) {
        let count = self.items.len() as u32;
        let kept = self.sorted.len() as u32;

        if self.sort_mode == SortMode::None || count < kept {
            self.sorted.clear();
            self.sorted.extend(0..count);
        } else if count > kept {
            self.sorted.extend(kept..count);
        }

        if self.sort_mode == SortMode::None {
            return;
        }

        self.keys.reset();
        for item in self.items.iter() {
            self.keys.append(item.sort_key());
        }

        let keys = self.keys.as_slice();
        let descending = self.sort_mode == SortMode::Descending;
        let goes_before = |a: u64, b: u64| if descending { a > b } else { a < b };

        for i in 1..self.sorted.len() {
            let current = self.sorted[i];
            let key = keys[current as usize];
            let mut j = i;
            while j > 0 && goes_before(key, keys[self.sorted[j - 1] as usize]) {
                self.sorted[j] = self.sorted[j - 1];
                j -= 1;
            }
            self.sorted[j] = current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ComputeItem;

    fn fill(queue: &mut Queue<ComputeItem>, keys: &[u64]) {
        assert!(queue.begin());
        for &key in keys {
            queue.create_item().unwrap().key = key;
        }
        assert!(queue.end(ParameterBlock::default(), &[]));
    }

    fn sorted_keys(queue: &Queue<ComputeItem>) -> Vec<u64> {
        queue.iter_sorted().map(|item| item.key).collect()
    }

    #[test]
    fn test_state_machine_rejects_out_of_order_calls() {
        let mut queue: Queue<ComputeItem> = Queue::default();
        assert_eq!(queue.state(), QueueState::Uninitialized);

        assert!(queue.create_item().is_none());
        assert!(!queue.end(ParameterBlock::default(), &[]));
        assert!(!queue.tag_executed());

        assert!(queue.begin());
        assert!(!queue.begin());
        assert_eq!(queue.state(), QueueState::Queueing);

        assert!(queue.end(ParameterBlock::default(), &[]));
        assert!(!queue.begin());
        assert!(queue.tag_executed());
        assert_eq!(queue.state(), QueueState::Executed);
        assert!(queue.begin());
    }

    #[test]
    fn test_unsorted_queue_keeps_submission_order() {
        let mut queue: Queue<ComputeItem> = Queue::default();
        fill(&mut queue, &[3, 1, 2]);
        assert_eq!(sorted_keys(&queue), vec![3, 1, 2]);
    }

    #[test]
    fn test_sort_modes() {
        let mut ascending = Queue::new(QueueConfig::sorted(SortMode::Ascending));
        fill(&mut ascending, &[5, 1, 4, 1, 3]);
        assert_eq!(sorted_keys(&ascending), vec![1, 1, 3, 4, 5]);
        assert_eq!(ascending.sorted_indices(), &[1, 3, 4, 2, 0]);

        let mut descending = Queue::new(QueueConfig::sorted(SortMode::Descending));
        fill(&mut descending, &[5, 1, 4, 1, 3]);
        assert_eq!(sorted_keys(&descending), vec![5, 4, 3, 1, 1]);
    }

    #[test]
    fn test_sorted_list_follows_item_count_across_frames() {
        let mut queue = Queue::new(QueueConfig::sorted(SortMode::Ascending));
        fill(&mut queue, &[2, 1]);
        queue.tag_executed();

        fill(&mut queue, &[9, 8, 7, 0]);
        assert_eq!(sorted_keys(&queue), vec![0, 7, 8, 9]);
        queue.tag_executed();

        fill(&mut queue, &[4]);
        assert_eq!(queue.sorted_indices(), &[0]);
    }

    #[test]
    fn test_reads_require_ready() {
        let mut queue: Queue<ComputeItem> = Queue::default();
        queue.begin();
        queue.create_item();
        assert!(queue.sorted_indices().is_empty());
        assert!(queue.shared_parameters().is_none());
        assert_eq!(queue.items().count(), 0);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_excess_dependencies_are_dropped() {
        let mut queue: Queue<ComputeItem> = Queue::default();
        let dependencies = vec![Dependency::default(); MAX_DEPENDENCIES + 3];
        queue.begin();
        assert!(queue.end(ParameterBlock::default(), &dependencies));
        assert_eq!(queue.dependencies().len(), MAX_DEPENDENCIES);
    }
}
