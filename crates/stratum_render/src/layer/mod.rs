//! Layers
//!
//! A layer is one unit of work for the dispatcher. Every layer carries a
//! [`LayerDesc`] (label, order, pass); the payload depends on its type:
//!
//! | Variant       | Payload                          | Ready when              |
//! |---------------|----------------------------------|-------------------------|
//! | `Render`      | 1..=`MAX_CONTEXTS` render queues | every queue is ready    |
//! | `Compute`     | one compute queue                | the queue is ready      |
//! | `PostProcess` | persistent list of full-screen passes | always             |
//!
//! Layers are shared as `Arc<Layer>` between the producers that fill them
//! and the [`LayerDispatcher`](crate::LayerDispatcher). Every method takes
//! `&self`; the queues synchronize internally.

mod compute;
mod post_process;
mod render;
mod slot;

pub use compute::ComputeLayer;
pub use post_process::PostProcessLayer;
pub use render::RenderLayer;
pub use slot::{QueueSlot, QueueWriter};

use crate::queue::QueueState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    Render,
    Compute,
    PostProcess,
}

/// How a layer takes part in pass ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayerOrder {
    /// Runs in registration order within its pass and gates the next pass.
    #[default]
    Ordered,
    /// Runs as soon as it is ready once its pass is reached.
    Unordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LayerState {
    #[default]
    Uninitialized,
    Queueing,
    Ready,
    Executed,
    /// Never reset between frames.
    Permanent,
}

impl From<QueueState> for LayerState {
    fn from(state: QueueState) -> Self {
        match state {
            QueueState::Uninitialized => Self::Uninitialized,
            QueueState::Queueing => Self::Queueing,
            QueueState::Ready => Self::Ready,
            QueueState::Executed => Self::Executed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDesc {
    pub label: String,
    pub order: LayerOrder,
    pub pass: u32,
}

impl LayerDesc {
    #[must_use]
    pub fn new(label: impl Into<String>, order: LayerOrder, pass: u32) -> Self {
        Self {
            label: label.into(),
            order,
            pass,
        }
    }

    #[must_use]
    pub fn ordered(label: impl Into<String>, pass: u32) -> Self {
        Self::new(label, LayerOrder::Ordered, pass)
    }

    #[must_use]
    pub fn unordered(label: impl Into<String>, pass: u32) -> Self {
        Self::new(label, LayerOrder::Unordered, pass)
    }
}

#[derive(Debug)]
pub enum Layer {
    Render(RenderLayer),
    Compute(ComputeLayer),
    PostProcess(PostProcessLayer),
}

impl Layer {
    #[must_use]
    pub fn desc(&self) -> &LayerDesc {
        match self {
            Self::Render(layer) => layer.desc(),
            Self::Compute(layer) => layer.desc(),
            Self::PostProcess(layer) => layer.desc(),
        }
    }

    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.desc().label
    }

    #[inline]
    #[must_use]
    pub fn pass(&self) -> u32 {
        self.desc().pass
    }

    #[inline]
    #[must_use]
    pub fn order(&self) -> LayerOrder {
        self.desc().order
    }

    #[must_use]
    pub fn layer_type(&self) -> LayerType {
        match self {
            Self::Render(_) => LayerType::Render,
            Self::Compute(_) => LayerType::Compute,
            Self::PostProcess(_) => LayerType::PostProcess,
        }
    }

    #[must_use]
    pub fn state(&self) -> LayerState {
        match self {
            Self::Render(layer) => layer.state(),
            Self::Compute(layer) => layer.state(),
            Self::PostProcess(layer) => layer.state(),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        match self {
            Self::Render(layer) => layer.is_ready(),
            Self::Compute(layer) => layer.is_ready(),
            Self::PostProcess(layer) => layer.is_ready(),
        }
    }

    /// Marks the layer's queues as submitted.
    pub fn tag_executed(&self) {
        match self {
            Self::Render(layer) => layer.tag_executed(),
            Self::Compute(layer) => layer.tag_executed(),
            Self::PostProcess(layer) => layer.tag_executed(),
        }
    }

    #[must_use]
    pub fn as_render(&self) -> Option<&RenderLayer> {
        match self {
            Self::Render(layer) => Some(layer),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_compute(&self) -> Option<&ComputeLayer> {
        match self {
            Self::Compute(layer) => Some(layer),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_post_process(&self) -> Option<&PostProcessLayer> {
        match self {
            Self::PostProcess(layer) => Some(layer),
            _ => None,
        }
    }
}

impl From<RenderLayer> for Layer {
    fn from(layer: RenderLayer) -> Self {
        Self::Render(layer)
    }
}

impl From<ComputeLayer> for Layer {
    fn from(layer: ComputeLayer) -> Self {
        Self::Compute(layer)
    }
}

impl From<PostProcessLayer> for Layer {
    fn from(layer: PostProcessLayer) -> Self {
        Self::PostProcess(layer)
    }
}
