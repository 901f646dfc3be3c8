//! # Stratum
//!
//! Render dispatch and resource lifetime core for real-time renderers.
//!
//! This crate re-exports the workspace members:
//!
//! - [`stratum_core`]: pools, arenas, collections and allocation tracking
//! - [`stratum_render`]: layers, queues, the dispatcher, the resource
//!   manager and the backend interfaces
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stratum::{HeadlessBackend, Layer, LayerDesc, RenderContext, RenderLayer, RenderSettings};
//!
//! let mut ctx = RenderContext::new(HeadlessBackend::new(), RenderSettings::default());
//! ctx.init()?;
//!
//! let mut dispatcher = ctx.new_dispatcher();
//! let scene = Arc::new(Layer::from(RenderLayer::new(
//!     LayerDesc::ordered("scene", 0),
//!     2,
//!     ctx.queue_config(stratum::SortMode::Ascending),
//! )));
//! dispatcher.add_layer(Arc::clone(&scene));
//! ```

pub use stratum_core;
pub use stratum_render;

pub use stratum_core::{
    AllocationTracker, CoreError, Grid, IntMap, LinearArena, PagedArena, PagedPool, Pool,
    RingBuffer, StackArena, invariant, limits,
};
pub use stratum_render::{
    Backend, BackendError, ComputeItem, ComputeLayer, ConstantBufferCache, Dependency,
    DispatchSettings, DispatchStatus, DrawCall, Handle, HeadlessBackend, IdleStrategy, Layer,
    LayerDesc, LayerDispatcher, LayerOrder, LayerState, LayerType, NativeId, ParameterBlock,
    ParameterValue, PostProcessItem, PostProcessLayer, Queue, QueueConfig, QueueItem, QueueState,
    RenderContext, RenderError, RenderItem, RenderKey, RenderLayer, RenderSettings,
    ResourceBackend, ResourceManager, SortMode, SubmissionBackend, resources,
};
