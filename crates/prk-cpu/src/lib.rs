//! Host execution backends.
//!
//! - [`ReferenceBackend`] runs every kernel as a plain sequential loop over
//!   the generic tap list. It is the correctness baseline and is only
//!   attempted for small problems.
//! - [`ParallelBackend`] runs on a dedicated rayon thread pool, tiles the
//!   stencil loops by the configured tile size and uses radius-specialized
//!   star kernels.

#![warn(missing_docs)]

mod buffer;
mod parallel;
mod reference;
mod star;

pub use buffer::HostBuffer;
pub use parallel::ParallelBackend;
pub use reference::ReferenceBackend;
