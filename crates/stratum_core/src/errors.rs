//! Error Types
//!
//! Containers in this crate report most failures through sentinels and
//! logging. [`CoreError`] covers the few operations that hand a recoverable
//! failure back to the caller.

use thiserror::Error;

/// Errors produced by the core containers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A fixed-capacity container has no room left.
    #[error("{container} is full (capacity {capacity})")]
    CapacityExceeded {
        /// Name of the container type
        container: &'static str,
        /// Its fixed capacity
        capacity: usize,
    },
}

/// Alias for `Result<T, CoreError>`.
pub type Result<T> = std::result::Result<T, CoreError>;
