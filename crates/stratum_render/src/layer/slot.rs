//! Lockable queue with a lock-free state mirror.
//!
//! Producers take the lock for the whole time they record into a queue.
//! The dispatcher only needs to know whether the queue is ready, so the
//! state is mirrored into an atomic that is republished whenever a
//! [`QueueWriter`] is dropped.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::{Mutex, MutexGuard};

use crate::queue::{Queue, QueueConfig, QueueItem, QueueState};

#[derive(Debug)]
pub struct QueueSlot<I: QueueItem> {
    queue: Mutex<Queue<I>>,
    state: AtomicU8,
}

impl<I: QueueItem> QueueSlot<I> {
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        Self {
            queue: Mutex::new(Queue::new(config)),
            state: AtomicU8::new(QueueState::Uninitialized as u8),
        }
    }

    /// State as of the last released writer. Never blocks.
    #[inline]
    #[must_use]
    pub fn state(&self) -> QueueState {
        QueueState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Locks the queue, blocking while another thread holds it.
    pub fn lock(&self) -> QueueWriter<'_, I> {
        QueueWriter {
            guard: self.queue.lock(),
            state: &self.state,
        }
    }

    pub fn try_lock(&self) -> Option<QueueWriter<'_, I>> {
        self.queue.try_lock().map(|guard| QueueWriter {
            guard,
            state: &self.state,
        })
    }
}

/// Exclusive access to one queue. Publishes the queue state on drop.
pub struct QueueWriter<'a, I: QueueItem> {
    guard: MutexGuard<'a, Queue<I>>,
    state: &'a AtomicU8,
}

impl<I: QueueItem> Deref for QueueWriter<'_, I> {
    type Target = Queue<I>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<I: QueueItem> DerefMut for QueueWriter<'_, I> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl<I: QueueItem> Drop for QueueWriter<'_, I> {
    fn drop(&mut self) {
        self.state.store(self.guard.state() as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ComputeItem, ParameterBlock};

    #[test]
    fn test_state_published_when_writer_drops() {
        let slot: QueueSlot<ComputeItem> = QueueSlot::new(QueueConfig::default());
        {
            let mut queue = slot.lock();
            queue.begin();
            queue.end(ParameterBlock::default(), &[]);
            assert_eq!(slot.state(), QueueState::Uninitialized);
        }
        assert_eq!(slot.state(), QueueState::Ready);
    }

    #[test]
    fn test_try_lock_fails_while_held() {
        let slot: QueueSlot<ComputeItem> = QueueSlot::new(QueueConfig::default());
        let _held = slot.lock();
        assert!(slot.try_lock().is_none());
    }
}
