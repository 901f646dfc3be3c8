//! Error Types
//!
//! Hot-path operations (queueing, dispatch, handle lookups) never return
//! errors; they log and fall back to a sentinel. The types here cover the
//! setup and backend paths where a caller can react to a failure.
//!
//! ```rust,ignore
//! use stratum_render::errors::Result;
//!
//! fn setup(ctx: &mut RenderContext<HeadlessBackend>) -> Result<()> {
//!     ctx.init()?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::backend::NativeId;
use crate::resources::ResourceKind;

/// Failures reported by a backend implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend cannot build an object from this description.
    #[error("Invalid {kind:?} descriptor: {reason}")]
    InvalidDescriptor {
        /// Kind of resource being created
        kind: ResourceKind,
        /// Why it was rejected
        reason: String,
    },

    /// The native id does not name a live backend object.
    #[error("Unknown native object {0:?}")]
    UnknownObject(NativeId),

    /// Upload larger than the destination object.
    #[error("Upload of {len} bytes exceeds object size {size}")]
    UploadTooLarge {
        /// Bytes supplied
        len: usize,
        /// Capacity of the destination
        size: usize,
    },

    /// Device creation or initialization failed.
    #[error("Backend initialization failed: {0}")]
    InitFailed(String),
}

/// The main error type of the render crate.
#[derive(Error, Debug)]
pub enum RenderError {
    // ========================================================================
    // Lifecycle
    // ========================================================================
    /// The context was used before `init()` or after `shutdown()`.
    #[error("Render context is not initialized")]
    NotInitialized,

    /// `init()` was called twice.
    #[error("Render context is already initialized")]
    AlreadyInitialized,

    // ========================================================================
    // Backend
    // ========================================================================
    /// Error bubbled up from the backend.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // ========================================================================
    // Constant buffers
    // ========================================================================
    /// A constant buffer of the cache could not be created.
    #[error("Failed to create cached constant buffer (slot {slot}, {size} bytes)")]
    ConstantBufferCache {
        /// Binding slot
        slot: usize,
        /// Size class in bytes
        size: usize,
    },
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
