//! # Stratum Core
//!
//! Foundational containers for the Stratum render core.
//!
//! Everything in this crate sits below the dispatcher and the resource
//! manager and has no knowledge of either:
//!
//! - [`memory`]: index pool, pointer-stable paged pool, stack / linear / paged
//!   arenas and the injectable [`AllocationTracker`](memory::AllocationTracker)
//! - [`collections`]: open-addressed integer map, SPSC ring buffer, 2D grid
//! - [`limits`]: compile-time capacity limits shared by the render crate
//! - [`errors`]: the crate error type
//!
//! # Failure Model
//!
//! | Class                  | Behaviour                                      |
//! |------------------------|------------------------------------------------|
//! | Usage error            | `log::warn!`, no-op                            |
//! | Invariant violation    | [`invariant!`] in debug, logged in release     |
//! | Out-of-range access    | panic (`get`), `None` (`try_get`)              |
//! | Out of memory          | allocator abort                                |

pub mod collections;
pub mod errors;
pub mod limits;
pub mod memory;

pub use collections::{Grid, IntMap, RingBuffer};
pub use errors::{CoreError, Result};
pub use memory::{AllocationTracker, LinearArena, PagedArena, PagedPool, Pool, StackArena};

#[doc(hidden)]
pub use log as __log;

/// Reports a broken invariant.
///
/// Logs the message at error level and trips a debug assertion, so debug
/// builds stop at the violation while release builds keep running with the
/// diagnostic in the log.
///
/// ```rust,ignore
/// invariant!(index < len, "index {index} out of range ({len})");
/// ```
#[macro_export]
macro_rules! invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::__log::error!($($arg)+);
            if cfg!(debug_assertions) {
                panic!($($arg)+);
            }
        }
    };
}
