//! Single-producer / single-consumer ring buffer.
//!
//! [`RingBuffer::with_capacity`] returns a [`RingProducer`] and a
//! [`RingConsumer`]. Neither half is `Clone`, so there is exactly one writer
//! and one reader; each half can move to its own thread.
//!
//! # Design
//!
//! ```text
//!           read            write
//!            │                │
//!  ┌───┬───┬─▼─┬───┬───┬───┬──▼┬───┐
//!  │   │   │ a │ b │ c │ d │   │   │   len = write - read
//!  └───┴───┴───┴───┴───┴───┴───┴───┘
//! ```
//!
//! Both indices only increase and wrap through `& mask`. The producer owns
//! `write`, the consumer owns `read`; each publishes its index with a release
//! store and reads the other's with an acquire load.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared storage of a ring buffer. Obtain the two halves through
/// [`RingBuffer::with_capacity`].
pub struct RingBuffer<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    mask: usize,
    read: AtomicUsize,
    write: AtomicUsize,
}

// SAFETY: a slot is written only by the producer before `write` is published
// and read only by the consumer before `read` is published, so no slot is
// accessed from two threads at once.
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T> RingBuffer<T> {
    /// Creates a buffer holding `capacity` elements, rounded up to a power of
    /// two (at least 2).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> (RingProducer<T>, RingConsumer<T>) {
        let capacity = capacity.max(2).next_power_of_two();
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        let shared = Arc::new(Self {
            slots,
            mask: capacity - 1,
            read: AtomicUsize::new(0),
            write: AtomicUsize::new(0),
        });
        (
            RingProducer {
                shared: Arc::clone(&shared),
            },
            RingConsumer { shared },
        )
    }

    /// Creates a buffer holding `1 << pow2` elements.
    #[must_use]
    pub fn with_capacity_pow2(pow2: u32) -> (RingProducer<T>, RingConsumer<T>) {
        Self::with_capacity(1 << pow2)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn len(&self) -> usize {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<T> Drop for RingBuffer<T> {
    fn drop(&mut self) {
        let read = *self.read.get_mut();
        let write = *self.write.get_mut();
        let mut index = read;
        while index != write {
            // SAFETY: slots in [read, write) were written and not yet read.
            unsafe { self.slots[index & self.mask].get_mut().assume_init_drop() };
            index = index.wrapping_add(1);
        }
    }
}

/// Writing half of a [`RingBuffer`].
pub struct RingProducer<T> {
    shared: Arc<RingBuffer<T>>,
}

impl<T> RingProducer<T> {
    /// Pushes `value`, or hands it back when the buffer is full.
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        let shared = &*self.shared;
        let write = shared.write.load(Ordering::Relaxed);
        let read = shared.read.load(Ordering::Acquire);
        if write.wrapping_sub(read) == shared.capacity() {
            return Err(value);
        }
        // SAFETY: the slot is outside [read, write), so the consumer does not
        // touch it until `write` is published below.
        unsafe { (*shared.slots[write & shared.mask].get()).write(value) };
        shared.write.store(write.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len() == self.shared.capacity()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }
}

/// Reading half of a [`RingBuffer`].
pub struct RingConsumer<T> {
    shared: Arc<RingBuffer<T>>,
}

impl<T> RingConsumer<T> {
    /// Pops the oldest element, if any.
    pub fn try_pop(&mut self) -> Option<T> {
        let shared = &*self.shared;
        let read = shared.read.load(Ordering::Relaxed);
        let write = shared.write.load(Ordering::Acquire);
        if read == write {
            return None;
        }
        // SAFETY: the slot is inside [read, write), fully written by the
        // producer before its release store of `write`.
        let value = unsafe { (*shared.slots[read & shared.mask].get()).assume_init_read() };
        shared.read.store(read.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }
}

impl<T> Iterator for RingConsumer<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.try_pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_rounds_up() {
        let (producer, _consumer) = RingBuffer::<u8>::with_capacity(5);
        assert_eq!(producer.capacity(), 8);
    }

    #[test]
    fn test_full_buffer_hands_value_back() {
        let (mut producer, mut consumer) = RingBuffer::with_capacity_pow2(1);
        producer.try_push(1).unwrap();
        producer.try_push(2).unwrap();
        assert!(producer.is_full());
        assert_eq!(producer.try_push(3), Err(3));
        assert_eq!(consumer.try_pop(), Some(1));
        producer.try_push(3).unwrap();
        assert_eq!(consumer.by_ref().collect::<Vec<_>>(), vec![2, 3]);
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_unread_values_are_dropped() {
        let marker = Arc::new(());
        {
            let (mut producer, _consumer) = RingBuffer::with_capacity(4);
            producer.try_push(Arc::clone(&marker)).unwrap();
            producer.try_push(Arc::clone(&marker)).unwrap();
            assert_eq!(Arc::strong_count(&marker), 3);
        }
        assert_eq!(Arc::strong_count(&marker), 1);
    }

    #[test]
    fn test_cross_thread_order_is_preserved() {
        let (mut producer, mut consumer) = RingBuffer::with_capacity(16);
        let writer = std::thread::spawn(move || {
            for value in 0..10_000u32 {
                let mut pending = value;
                while let Err(back) = producer.try_push(pending) {
                    pending = back;
                    std::thread::yield_now();
                }
            }
        });

        let mut expected = 0u32;
        while expected < 10_000 {
            if let Some(value) = consumer.try_pop() {
                assert_eq!(value, expected);
                expected += 1;
            } else {
                std::thread::yield_now();
            }
        }
        writer.join().unwrap();
    }
}
