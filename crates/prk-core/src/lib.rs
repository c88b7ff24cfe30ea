//! # PRK Core
//!
//! Core traits and types shared by the Parallel Research Kernels backends.
//!
//! A benchmark kernel is written once against [`ComputeBackend`] and runs on
//! every execution substrate that implements it: the sequential host
//! reference, the rayon thread pool, and WebGPU.
//!
//! ## Core Abstractions
//!
//! - [`ComputeBackend`] - Buffer residency, kernel submission and synchronization
//! - [`Element`] - Floating-point element types (f32, f64)
//! - [`StencilKernel`] - Coefficient form of a stencil operator
//! - [`Capabilities`] - Feature flags reported by a device
//! - [`DeviceInfo`] - Identity of a probed device

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod capabilities;
pub mod device;
pub mod element;
pub mod error;
pub mod kernel;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::*;
    pub use crate::capabilities::{Capabilities, CapabilityFlag};
    pub use crate::device::{BackendKind, DeviceInfo};
    pub use crate::element::{Element, Precision};
    pub use crate::error::*;
    pub use crate::kernel::{Pattern, StencilKernel, Tap};
}

// Re-exports for convenience
pub use backend::{ComputeBackend, GridShape};
pub use capabilities::{Capabilities, CapabilityFlag};
pub use device::{BackendKind, DeviceInfo};
pub use element::{Element, Precision};
pub use error::{PrkError, Result};
pub use kernel::{Pattern, StencilKernel, Tap};
