//! Backend Interfaces
//!
//! The render core never talks to a graphics API directly. A backend is
//! split along the two things the core asks of it:
//!
//! - [`ResourceBackend`]: create and destroy native objects for the
//!   [`ResourceManager`](crate::resources::ResourceManager)
//! - [`SubmissionBackend`]: consume ready layers for the
//!   [`LayerDispatcher`](crate::LayerDispatcher)
//!
//! [`Backend`] combines both with a lifecycle and is what
//! [`RenderContext`](crate::RenderContext) owns. [`HeadlessBackend`] is the
//! in-memory implementation used by tests and the demo.

mod headless;
mod state_tracker;

pub use headless::{DrawCommand, ExecutionRecord, FrameStats, HeadlessBackend};
pub use state_tracker::StateTracker;

use crate::errors::BackendError;
use crate::layer::{ComputeLayer, PostProcessLayer, RenderLayer};
use crate::resources::{ResourceDesc, ResourceKind, ResourceManager};

/// Backend-side identifier of a native object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeId(pub u64);

pub trait ResourceBackend {
    fn create_resource(&mut self, desc: ResourceDesc<'_>) -> Result<NativeId, BackendError>;

    fn destroy_resource(&mut self, kind: ResourceKind, native: NativeId);

    /// Replaces the contents of a buffer-like object.
    fn upload(&mut self, native: NativeId, data: &[u8]) -> Result<(), BackendError>;
}

/// Consumes ready layers. Calls are synchronous from the dispatcher's view.
pub trait SubmissionBackend {
    fn execute_render(&mut self, layer: &RenderLayer, resources: &ResourceManager);

    fn execute_compute(&mut self, layer: &ComputeLayer, resources: &ResourceManager);

    fn execute_post_process(&mut self, layer: &PostProcessLayer, resources: &ResourceManager);
}

pub trait Backend: ResourceBackend + SubmissionBackend {
    fn name(&self) -> &str;

    fn init(&mut self) -> Result<(), BackendError>;

    fn shutdown(&mut self);
}
