//! Render Settings
//!
//! Runtime configuration for the render core. Compile-time capacity limits
//! live in [`stratum_core::limits`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stratum_render::{RenderSettings, DispatchSettings, IdleStrategy};
//!
//! let settings = RenderSettings {
//!     dispatch: DispatchSettings {
//!         max_idle_rounds: 256,
//!         idle: IdleStrategy::Spin,
//!     },
//!     ..Default::default()
//! };
//! ```

use std::time::Duration;

// ---------------------------------------------------------------------------
// IdleStrategy
// ---------------------------------------------------------------------------

/// What the dispatcher does between two polling rounds that made no
/// progress.
///
/// | Strategy   | Latency | CPU use while waiting |
/// |------------|---------|-----------------------|
/// | `Spin`     | lowest  | one full core         |
/// | `Yield`    | low     | high                  |
/// | `Sleep(d)` | `≥ d`   | negligible            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleStrategy {
    /// Spin-loop hint only.
    Spin,
    /// Yield the thread to the scheduler.
    #[default]
    Yield,
    /// Sleep for the given duration.
    Sleep(Duration),
}

impl IdleStrategy {
    #[inline]
    pub fn idle(self) {
        match self {
            Self::Spin => std::hint::spin_loop(),
            Self::Yield => std::thread::yield_now(),
            Self::Sleep(duration) => std::thread::sleep(duration),
        }
    }
}

// ---------------------------------------------------------------------------
// DispatchSettings
// ---------------------------------------------------------------------------

/// Bounds on how long a single `dispatch()` call waits for layers to become
/// ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Consecutive polling rounds without progress before `dispatch()` gives
    /// up and reports a stall.
    pub max_idle_rounds: u32,
    /// Back-off applied after each idle round.
    pub idle: IdleStrategy,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_idle_rounds: 10_000,
            idle: IdleStrategy::Yield,
        }
    }
}

// ---------------------------------------------------------------------------
// RenderSettings
// ---------------------------------------------------------------------------

/// Top-level runtime configuration.
///
/// | Field                    | Default            |
/// |--------------------------|--------------------|
/// | `dispatch`               | 10 000 idle rounds, yield |
/// | `queue_page_size`        | 100 items          |
/// | `resource_pool_capacity` | 16 per kind        |
/// | `track_allocations`      | debug builds only  |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub dispatch: DispatchSettings,
    /// Items per page of each queue's arena.
    pub queue_page_size: usize,
    /// Initial slot count of each resource pool.
    pub resource_pool_capacity: usize,
    /// Whether the context records resource allocations.
    pub track_allocations: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            dispatch: DispatchSettings::default(),
            queue_page_size: 100,
            resource_pool_capacity: 16,
            track_allocations: cfg!(debug_assertions),
        }
    }
}
