//! Memory containers.
//!
//! | Type            | Addressing     | Growth                  | Stable refs |
//! |-----------------|----------------|-------------------------|-------------|
//! | [`Pool`]        | index          | doubles, moves elements | no          |
//! | [`PagedPool`]   | [`PagedKey`]   | appends pages           | yes         |
//! | [`StackArena`]  | bump           | none (fixed `N`)        | yes         |
//! | [`LinearArena`] | bump           | doubles, moves elements | no          |
//! | [`PagedArena`]  | bump           | appends pages           | yes         |
//!
//! Pools recycle single slots through a free-list. Arenas never free single
//! elements; they are rewound in bulk with `reset()` and keep their memory
//! for the next frame.

mod arena;
mod paged_arena;
mod paged_pool;
mod pool;
pub mod tracking;

pub use arena::{LinearArena, StackArena};
pub use paged_arena::PagedArena;
pub use paged_pool::{PagedKey, PagedPool};
pub use pool::Pool;
pub use tracking::{AllocationId, AllocationRecord, AllocationTracker};
