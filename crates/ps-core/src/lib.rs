//! Foundational containers for sliding-window patch extraction.
//!
//! ## Grids
//! Grids are dense and row-major with no padding between rows. `GridView`
//! borrows a caller-owned slice; `Grid` owns its buffer. Multi-channel data
//! uses interleaved channels: `(r, c, ch)` maps to
//! `(r * width + c) * channels + ch`.
//!
//! ## Patch Stacks
//! Kernel output is a `PatchStack`, a packed sequence of `window * window`
//! patches. Samples never alias the source grid; every element is copied.

mod error;
mod grid;
mod stack;

pub use error::Error;
pub use grid::{ChannelGrid, ChannelGridView, Grid, GridView, to_f32, to_f32_interleaved};
pub use stack::PatchStack;
