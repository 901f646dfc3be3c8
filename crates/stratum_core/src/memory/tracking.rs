//! Allocation tracking service.
//!
//! [`AllocationTracker`] keeps a live table of labelled allocations together
//! with their source location, so leaks can be listed by file and line at
//! shutdown. It is an ordinary value: create one, share it through an `Arc`
//! with whatever should report into it, and drop it when done.
//!
//! A tracker constructed with `enabled = false` accepts every call but never
//! records anything, which lets release configurations keep the same call
//! sites at the cost of one branch.
//!
//! ```rust,ignore
//! let tracker = Arc::new(AllocationTracker::new(cfg!(debug_assertions)));
//! tracker.start();
//! let id = tracker.record("shadow atlas", 4 << 20);
//! // ...
//! tracker.report_leaks();
//! ```

use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Identifier of a recorded allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AllocationId(u64);

/// One live allocation.
#[derive(Debug, Clone)]
pub struct AllocationRecord {
    pub id: AllocationId,
    pub label: String,
    pub file: &'static str,
    pub line: u32,
    pub bytes: usize,
    /// Time since the tracker was created.
    pub timestamp: Duration,
}

/// Counts and lists live allocations reported by its clients.
pub struct AllocationTracker {
    enabled: bool,
    active: AtomicBool,
    next_id: AtomicU64,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    records: Mutex<FxHashMap<AllocationId, AllocationRecord>>,
    epoch: Instant,
}

impl Default for AllocationTracker {
    fn default() -> Self {
        Self::new(cfg!(debug_assertions))
    }
}

impl std::fmt::Debug for AllocationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocationTracker")
            .field("enabled", &self.enabled)
            .field("active", &self.is_tracking())
            .field("live_bytes", &self.total_allocated_bytes())
            .finish_non_exhaustive()
    }
}

impl AllocationTracker {
    /// Creates an idle tracker. Nothing is recorded until [`start`](Self::start).
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            active: AtomicBool::new(false),
            next_id: AtomicU64::new(0),
            live_bytes: AtomicUsize::new(0),
            peak_bytes: AtomicUsize::new(0),
            records: Mutex::new(FxHashMap::default()),
            epoch: Instant::now(),
        }
    }

    /// A tracker that never records.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(false)
    }

    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start(&self) {
        if !self.enabled {
            log::warn!("AllocationTracker: start() on a disabled tracker is ignored");
            return;
        }
        self.active.store(true, Ordering::Release);
    }

    /// Stops recording. Existing records stay and can still be released.
    pub fn stop(&self) {
        self.active.store(false, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Records an allocation made at the caller's location.
    #[track_caller]
    pub fn record(&self, label: &str, bytes: usize) -> Option<AllocationId> {
        let location = Location::caller();
        self.record_at(label, location.file(), location.line(), bytes)
    }

    /// Records an allocation with an explicit source location.
    pub fn record_at(
        &self,
        label: &str,
        file: &'static str,
        line: u32,
        bytes: usize,
    ) -> Option<AllocationId> {
        if !self.is_tracking() {
            return None;
        }

        let id = AllocationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let live = self.live_bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.peak_bytes.fetch_max(live, Ordering::Relaxed);

        let record = AllocationRecord {
            id,
            label: label.to_owned(),
            file,
            line,
            bytes,
            timestamp: self.epoch.elapsed(),
        };
        self.records.lock().insert(id, record);
        Some(id)
    }

    /// Forgets an allocation and returns its size.
    pub fn release(&self, id: AllocationId) -> Option<usize> {
        let Some(record) = self.records.lock().remove(&id) else {
            log::warn!("AllocationTracker: release of unknown {id:?}");
            return None;
        };
        self.live_bytes.fetch_sub(record.bytes, Ordering::Relaxed);
        Some(record.bytes)
    }

    /// Bytes currently recorded as live.
    #[inline]
    #[must_use]
    pub fn total_allocated_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    #[inline]
    #[must_use]
    pub fn peak_allocated_bytes(&self) -> usize {
        self.peak_bytes.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn live_allocations(&self) -> usize {
        self.records.lock().len()
    }

    /// Visits every live record, oldest first.
    pub fn iterate_allocations(&self, mut callback: impl FnMut(&AllocationRecord)) {
        let mut records: Vec<AllocationRecord> = self.records.lock().values().cloned().collect();
        records.sort_by_key(|record| record.id);
        for record in &records {
            callback(record);
        }
    }

    /// Logs one warning per live record and returns how many there were.
    pub fn report_leaks(&self) -> usize {
        let mut count = 0;
        self.iterate_allocations(|record| {
            log::warn!(
                "Leaked allocation '{}' ({} bytes) from {}:{}",
                record.label,
                record.bytes,
                record.file,
                record.line
            );
            count += 1;
        });
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_tracker_records_nothing() {
        let tracker = AllocationTracker::disabled();
        tracker.start();
        assert!(!tracker.is_tracking());
        assert!(tracker.record("mesh", 64).is_none());
        assert_eq!(tracker.total_allocated_bytes(), 0);
    }

    #[test]
    fn test_record_and_release_balance() {
        let tracker = AllocationTracker::new(true);
        tracker.start();
        let a = tracker.record("a", 100).unwrap();
        let b = tracker.record("b", 28).unwrap();
        assert_eq!(tracker.total_allocated_bytes(), 128);

        assert_eq!(tracker.release(a), Some(100));
        assert_eq!(tracker.total_allocated_bytes(), 28);
        assert_eq!(tracker.peak_allocated_bytes(), 128);
        assert_eq!(tracker.live_allocations(), 1);
        assert_eq!(tracker.release(b), Some(28));
        assert_eq!(tracker.release(b), None);
    }

    #[test]
    fn test_stop_keeps_existing_records() {
        let tracker = AllocationTracker::new(true);
        tracker.start();
        tracker.record("kept", 8);
        tracker.stop();
        assert!(tracker.record("dropped", 8).is_none());
        assert_eq!(tracker.live_allocations(), 1);
    }

    #[test]
    fn test_records_carry_caller_location() {
        let tracker = AllocationTracker::new(true);
        tracker.start();
        let line = line!() + 1;
        tracker.record("here", 4);
        let mut seen = Vec::new();
        tracker.iterate_allocations(|r| seen.push((r.file, r.line, r.bytes)));
        assert_eq!(seen, vec![(file!(), line, 4)]);
    }
}
