//! Umbrella crate for the `patch-sampler` workspace.
//!
//! Re-exports the grid containers and the sampling kernels so applications
//! can depend on a single crate.

pub use ps_core::*;
pub use ps_sample::*;
