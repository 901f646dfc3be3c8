use stratum_core::limits::MAX_CONTEXTS;

use super::slot::{QueueSlot, QueueWriter};
use super::{LayerDesc, LayerState};
use crate::items::{Dependency, ParameterBlock, RenderItem};
use crate::queue::{Queue, QueueConfig, QueueState};

/// Draw layer with one queue per producer.
///
/// Each queue has its own lock, so up to `MAX_CONTEXTS` threads can record
/// into the same layer without contending:
///
/// ```rust,ignore
/// std::thread::scope(|s| {
///     for index in 0..layer.queue_count() {
///         let layer = &layer;
///         s.spawn(move || {
///             let mut queue = layer.queue(index).unwrap();
///             queue.begin();
///             // record items...
///             queue.end(ParameterBlock::default(), &[]);
///         });
///     }
/// });
/// ```
#[derive(Debug)]
pub struct RenderLayer {
    desc: LayerDesc,
    queues: Vec<QueueSlot<RenderItem>>,
}

impl RenderLayer {
    /// Creates a layer with `queue_count` queues, clamped to
    /// `1..=MAX_CONTEXTS`.
    #[must_use]
    pub fn new(desc: LayerDesc, queue_count: usize, config: QueueConfig) -> Self {
        let clamped = queue_count.clamp(1, MAX_CONTEXTS);
        if clamped != queue_count {
            log::warn!(
                "RenderLayer '{}': {queue_count} queues requested, using {clamped}",
                desc.label
            );
        }
        Self {
            desc,
            queues: (0..clamped).map(|_| QueueSlot::new(config)).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn desc(&self) -> &LayerDesc {
        &self.desc
    }

    #[inline]
    #[must_use]
    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Locks queue `index` for recording.
    pub fn queue(&self, index: usize) -> Option<QueueWriter<'_, RenderItem>> {
        match self.queues.get(index) {
            Some(slot) => Some(slot.lock()),
            None => {
                log::error!(
                    "RenderLayer '{}': queue index {index} out of range ({} queues)",
                    self.desc.label,
                    self.queues.len()
                );
                None
            }
        }
    }

    pub fn begin(&self, index: usize) -> bool {
        self.queue(index).is_some_and(|mut queue| queue.begin())
    }

    pub fn end(&self, index: usize, shared: ParameterBlock, dependencies: &[Dependency]) -> bool {
        self.queue(index)
            .is_some_and(|mut queue| queue.end(shared, dependencies))
    }

    /// Opens every queue. Returns `true` if all of them accepted.
    pub fn begin_all(&self) -> bool {
        self.queues
            .iter()
            .fold(true, |ok, slot| slot.lock().begin() && ok)
    }

    /// Combined state of the queues.
    ///
    /// `Ready`, `Executed` and `Uninitialized` only when every queue agrees;
    /// any mix counts as `Queueing`.
    #[must_use]
    pub fn state(&self) -> LayerState {
        let mut states = self.queues.iter().map(QueueSlot::state);
        let Some(first) = states.next() else {
            return LayerState::Uninitialized;
        };
        if states.all(|state| state == first) {
            LayerState::from(first)
        } else {
            LayerState::Queueing
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.queues.iter().all(|slot| slot.state() == QueueState::Ready)
    }

    pub fn tag_executed(&self) {
        for slot in &self.queues {
            slot.lock().tag_executed();
        }
    }

    /// Visits every queue in index order.
    pub fn for_each_queue(&self, mut f: impl FnMut(usize, &Queue<RenderItem>)) {
        for (index, slot) in self.queues.iter().enumerate() {
            let queue = slot.lock();
            f(index, &queue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(queues: usize) -> RenderLayer {
        RenderLayer::new(LayerDesc::ordered("scene", 0), queues, QueueConfig::default())
    }

    #[test]
    fn test_queue_count_is_clamped() {
        assert_eq!(layer(0).queue_count(), 1);
        assert_eq!(layer(MAX_CONTEXTS + 3).queue_count(), MAX_CONTEXTS);
        assert_eq!(layer(2).queue_count(), 2);
    }

    #[test]
    fn test_aggregate_state() {
        let layer = layer(2);
        assert_eq!(layer.state(), LayerState::Uninitialized);

        layer.begin(0);
        assert_eq!(layer.state(), LayerState::Queueing);
        layer.begin(1);
        layer.end(0, ParameterBlock::default(), &[]);
        assert_eq!(layer.state(), LayerState::Queueing);
        assert!(!layer.is_ready());

        layer.end(1, ParameterBlock::default(), &[]);
        assert_eq!(layer.state(), LayerState::Ready);
        assert!(layer.is_ready());

        layer.tag_executed();
        assert_eq!(layer.state(), LayerState::Executed);
    }

    #[test]
    fn test_bad_queue_index_is_ignored() {
        let layer = layer(1);
        assert!(layer.queue(1).is_none());
        assert!(!layer.begin(4));
        assert_eq!(layer.state(), LayerState::Uninitialized);
    }
}
