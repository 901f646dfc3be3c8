use super::slot::{QueueSlot, QueueWriter};
use super::{LayerDesc, LayerState};
use crate::items::{ComputeItem, Dependency, ParameterBlock};
use crate::queue::{QueueConfig, QueueState};

/// Dispatch layer with a single queue.
#[derive(Debug)]
pub struct ComputeLayer {
    desc: LayerDesc,
    slot: QueueSlot<ComputeItem>,
}

impl ComputeLayer {
    #[must_use]
    pub fn new(desc: LayerDesc, config: QueueConfig) -> Self {
        Self {
            desc,
            slot: QueueSlot::new(config),
        }
    }

    #[inline]
    #[must_use]
    pub fn desc(&self) -> &LayerDesc {
        &self.desc
    }

    pub fn queue(&self) -> QueueWriter<'_, ComputeItem> {
        self.slot.lock()
    }

    pub fn begin(&self) -> bool {
        self.queue().begin()
    }

    pub fn end(&self, shared: ParameterBlock, dependencies: &[Dependency]) -> bool {
        self.queue().end(shared, dependencies)
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> LayerState {
        LayerState::from(self.slot.state())
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.slot.state() == QueueState::Ready
    }

    pub fn tag_executed(&self) {
        self.queue().tag_executed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_begin_keeps_queueing() {
        let layer = ComputeLayer::new(LayerDesc::ordered("culling", 0), QueueConfig::default());
        assert!(layer.begin());
        assert!(!layer.begin());
        assert_eq!(layer.state(), LayerState::Queueing);
    }

    #[test]
    fn test_end_before_begin_is_ignored() {
        let layer = ComputeLayer::new(LayerDesc::ordered("culling", 0), QueueConfig::default());
        assert!(!layer.end(ParameterBlock::default(), &[]));
        assert_eq!(layer.state(), LayerState::Uninitialized);
    }
}
