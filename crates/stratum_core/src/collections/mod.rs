//! Collections used on the dispatch hot path.
//!
//! - [`IntMap`]: open-addressed `u64 → u64` map for name-hash lookups
//! - [`RingBuffer`]: single-producer / single-consumer lock-free queue
//! - [`Grid`]: owned row-major 2D table with checked indexing

mod grid;
mod int_map;
mod ring_buffer;

pub use grid::Grid;
pub use int_map::{INVALID_KEY, IntMap, hash_str};
pub use ring_buffer::{RingBuffer, RingConsumer, RingProducer};
