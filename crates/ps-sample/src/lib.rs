//! Sliding-window patch extraction over dense row-major grids.
//!
//! `sample2d` walks every valid placement of a `window x window` patch over a
//! single-channel grid and copies it into a packed stack; `sample3d` does the
//! same for channel-interleaved grids, writing one channel block after
//! another. No padding is applied: a `height x width` source yields
//! `(height - window + 1) * (width - window + 1)` samples per channel.
//!
//! Ordering guarantees:
//! - Origins are enumerated row-major, top-left first.
//! - Within a sample, elements are row-major over the window.
//! - `sample3d` output is channel-major: block `ch` holds the samples of
//!   channel `ch`, in origin order.
//!
//! Inputs are validated before any output element is written; every rejected
//! call leaves caller-owned buffers untouched. [`SampleConfig`] selects
//! bounds-checked or raw-pointer inner loops and sequential or worker-pool
//! execution without changing the produced stack.

mod config;
mod plan;
mod sample2d;
mod sample3d;

pub use config::{Execution, SampleConfig};
pub use plan::WindowPlan;
pub use sample2d::{sample2d, sample2d_into};
pub use sample3d::{sample3d, sample3d_into};
