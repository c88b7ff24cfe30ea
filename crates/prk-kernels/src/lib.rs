//! # PRK Kernels
//!
//! Stencil and STREAM triad microbenchmarks from the Parallel Research Kernels.
//!
//! ## Stencil
//!
//! A star-shaped divergence operator of radius 1 to 5 is applied repeatedly to
//! an `n x n` grid initialized to `i + j`. After every application the input
//! is incremented by one. The first application is a warm-up and is not timed.
//! The interior L1 norm of the accumulated output must equal
//! `2 * (iterations + 1)`.
//!
//! ## Triad
//!
//! `A += B + 3 * C` over three vectors, validated by checksum and reported as
//! memory bandwidth.
//!
//! ## Backends
//!
//! Every run is attempted on each selected backend in a fixed order
//! (`reference`, `cpu`, `gpu`) and in both precisions. A backend that is
//! missing or lacks a required feature is skipped with a diagnostic.
//!
//! ```
//! use prk_kernels::{config::RunConfig, stencil::Pattern};
//!
//! let config = RunConfig::new(10, 100, 32, Pattern::Star, 2).unwrap();
//! assert_eq!(config.active_points(), 96 * 96);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod driver;
pub mod grid;
pub mod negotiate;
pub mod report;
pub mod session;
pub mod stencil;
pub mod triad;
pub mod validation;

pub use config::{RunConfig, TriadConfig};
pub use driver::{Stopwatch, TimingRecord, WallStopwatch};
pub use grid::{DeviceGrid, Grid};
pub use negotiate::{Decision, Plan, SkipReason, REFERENCE_SIZE_LIMIT};
pub use session::{Device, Outcome, Session, Workload};
pub use stencil::{StencilDescriptor, StencilOperator};
