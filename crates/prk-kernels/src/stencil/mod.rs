//! The stencil operator family.
//!
//! An operator is chosen by a pure lookup on `(pattern, radius)`. Star
//! stencils of radius 1 through 5 are implemented. Every other combination
//! resolves to [`StencilOperator::Unimplemented`], which aborts the process
//! when applied.

pub mod coefficients;
mod descriptor;
mod operator;

pub use descriptor::{parse_pattern, StencilDescriptor};
pub use operator::StencilOperator;
pub use prk_core::Pattern;

/// Largest radius with a generated operator.
pub const MAX_RADIUS: usize = 5;
