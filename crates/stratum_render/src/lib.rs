//! # Stratum Render
//!
//! Layer dispatch, per-frame item queues and handle-based resource
//! lifetime management on top of an abstract backend.
//!
//! ```text
//!  producers (N threads)            consumer (1 thread)
//!  ─────────────────────            ───────────────────────────────────
//!  RenderLayer::queue(i)            RenderContext::dispatch(&mut dispatcher)
//!    begin / create_item / end        └─ LayerDispatcher::dispatch
//!            │                              ├─ pass 0 ─▶ backend.execute_*
//!            ▼                              ├─ pass 1 ─▶ backend.execute_*
//!     Arc<Layer>  ────────────────────▶     └─ ...
//! ```
//!
//! | Module        | Role                                                    |
//! |---------------|---------------------------------------------------------|
//! | `resources`   | descriptions, typed handles, [`ResourceManager`]        |
//! | `items`       | render / compute / post-process items, parameters       |
//! | `queue`       | [`Queue`] state machine and key sorting                 |
//! | `layer`       | [`Layer`] variants and their queues                     |
//! | `dispatcher`  | [`LayerDispatcher`] pass ordering and stall detection   |
//! | `backend`     | backend traits and the [`HeadlessBackend`]              |
//! | `cbuffer`     | [`ConstantBufferCache`]                                 |
//! | `context`     | [`RenderContext`] lifecycle                             |
//! | `settings`    | runtime configuration                                   |

pub mod backend;
pub mod cbuffer;
pub mod context;
pub mod dispatcher;
pub mod errors;
pub mod items;
pub mod layer;
pub mod queue;
pub mod resources;
pub mod settings;

pub use backend::{Backend, HeadlessBackend, NativeId, ResourceBackend, SubmissionBackend};
pub use cbuffer::ConstantBufferCache;
pub use context::RenderContext;
pub use dispatcher::{DispatchStatus, LayerDispatcher};
pub use errors::{BackendError, RenderError, Result};
pub use items::{
    ComputeItem, Dependency, DrawCall, ParameterBlock, ParameterValue, PostProcessItem, RenderItem,
    RenderKey,
};
pub use layer::{ComputeLayer, Layer, LayerDesc, LayerOrder, LayerState, LayerType, PostProcessLayer, RenderLayer};
pub use queue::{Queue, QueueConfig, QueueItem, QueueState, SortMode};
pub use resources::{Handle, ResourceManager};
pub use settings::{DispatchSettings, IdleStrategy, RenderSettings};
