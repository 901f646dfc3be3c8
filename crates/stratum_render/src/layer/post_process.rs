use parking_lot::{RwLock, RwLockReadGuard};

use super::{LayerDesc, LayerState};
use crate::items::PostProcessItem;

/// Persistent chain of full-screen passes.
///
/// The item list is set once with [`create`](Self::create) and replayed
/// every frame; the layer is always ready and never changes state.
#[derive(Debug)]
pub struct PostProcessLayer {
    desc: LayerDesc,
    items: RwLock<Vec<PostProcessItem>>,
}

impl PostProcessLayer {
    #[must_use]
    pub fn new(desc: LayerDesc) -> Self {
        Self {
            desc,
            items: RwLock::new(Vec::new()),
        }
    }

    #[inline]
    #[must_use]
    pub fn desc(&self) -> &LayerDesc {
        &self.desc
    }

    /// Replaces the pass list.
    pub fn create(&self, items: Vec<PostProcessItem>) {
        if items.is_empty() {
            log::warn!("PostProcessLayer '{}': created with no items", self.desc.label);
        }
        *self.items.write() = items;
    }

    pub fn items(&self) -> RwLockReadGuard<'_, Vec<PostProcessItem>> {
        self.items.read()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> LayerState {
        LayerState::Permanent
    }

    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        true
    }

    #[inline]
    pub fn tag_executed(&self) {}
}
