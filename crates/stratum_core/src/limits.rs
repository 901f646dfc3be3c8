//! Compile-time capacity limits.
//!
//! These bound the fixed-size tables used on the dispatch hot path. They are
//! constants rather than settings so that the tables can live inline
//! (`[T; N]`, `SmallVec<[T; N]>`) without per-frame allocation.

/// Vertex buffer slots per render item.
pub const MAX_VERTEX_BUFFERS: usize = 2;

/// Simultaneously bound render targets.
pub const MAX_RENDER_TARGETS: usize = 2;

/// Parameter entries stored inline in a parameter block.
pub const MAX_PARAMETER_BLOCKS: usize = 5;

/// Bindable constant-buffer slots per shader stage.
pub const MAX_CONSTANT_BUFFERS: usize = 6;

/// Largest constant buffer in bytes.
pub const MAX_CONSTANT_BUFFER_SIZE: usize = 2 << 16;

/// Bindable shader resources per stage.
pub const MAX_SHADER_RESOURCES: usize = 2 << 7;

/// Number of dispatch passes. Passes are numbered `0..MAX_PASSES`.
pub const MAX_PASSES: u32 = 6;

/// Concurrent producer contexts, i.e. the most queues a render layer owns.
pub const MAX_CONTEXTS: usize = 4;

/// Dependencies a queue records at `end()`.
pub const MAX_DEPENDENCIES: usize = 8;

/// Smallest constant-buffer size class in bytes.
pub const MIN_CONSTANT_BUFFER_SIZE: usize = 16;
