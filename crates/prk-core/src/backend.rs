//! Unified execution substrate for the benchmark kernels.
//!
//! A backend owns device-resident buffers and executes the three kernels the
//! benchmarks need over them:
//!
//! - `apply_stencil`: accumulate a weighted neighborhood sum into the output
//!   over the active region of an n x n grid
//! - `add_scalar`: add a constant to every element of a buffer
//! - `triad`: `a += b + scalar * c`
//!
//! Submissions may complete asynchronously. `synchronize` blocks until every
//! submitted kernel has finished, and `download` always returns data that
//! reflects all prior submissions.

use crate::device::{BackendKind, DeviceInfo};
use crate::element::Element;
use crate::error::{PrkError, Result};
use crate::kernel::StencilKernel;

/// Geometry of a square grid launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    /// Linear grid dimension.
    pub n: usize,
    /// Blocking factor for backends that tile their loops.
    pub tile_size: usize,
}

impl GridShape {
    /// Create a grid shape. The tile size is clamped into `[1, n]`.
    pub fn new(n: usize, tile_size: usize) -> Self {
        Self {
            n,
            tile_size: tile_size.clamp(1, n.max(1)),
        }
    }

    /// Total number of grid points.
    pub fn len(&self) -> usize {
        self.n * self.n
    }

    /// True for a zero-sized grid.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Half-open index range `[r, n - r)` of the active region along one axis.
    pub fn active_range(&self, radius: usize) -> std::ops::Range<usize> {
        radius..self.n.saturating_sub(radius)
    }

    /// Fail unless the footprint of `kernel` fits inside the grid.
    pub fn check_kernel(&self, kernel: &StencilKernel) -> Result<()> {
        if 2 * kernel.radius() + 1 > self.n {
            return Err(PrkError::UnsupportedKernel(format!(
                "{} footprint does not fit a {}x{} grid",
                kernel.label(),
                self.n,
                self.n
            )));
        }
        Ok(())
    }
}

/// Execution substrate: buffer residency, kernel submission, synchronization.
///
/// Implementations must guarantee that `input` and `output` of a stencil
/// launch never alias and that points outside the active region of the
/// output are never written.
pub trait ComputeBackend: Send + Sync {
    /// Device-resident buffer type for this backend.
    type Buffer<T: Element>: Send + Sync;

    /// Identity and capabilities of the device.
    fn device(&self) -> &DeviceInfo;

    /// Backend kind.
    fn kind(&self) -> BackendKind {
        self.device().kind
    }

    /// Allocate a device buffer initialized from host data.
    fn upload<T: Element>(&self, data: &[T]) -> Result<Self::Buffer<T>>;

    /// Copy a device buffer back to host memory.
    ///
    /// `out` must have exactly the buffer's length.
    fn download<T: Element>(&self, buffer: &Self::Buffer<T>, out: &mut [T]) -> Result<()>;

    /// Accumulate `kernel` applied to `input` into `output` over the active region.
    fn apply_stencil<T: Element>(
        &self,
        kernel: &StencilKernel,
        shape: GridShape,
        input: &Self::Buffer<T>,
        output: &mut Self::Buffer<T>,
    ) -> Result<()>;

    /// Add `value` to every element of `buffer`.
    fn add_scalar<T: Element>(&self, buffer: &mut Self::Buffer<T>, value: T) -> Result<()>;

    /// `a[i] += b[i] + scalar * c[i]` for every element.
    fn triad<T: Element>(
        &self,
        a: &mut Self::Buffer<T>,
        b: &Self::Buffer<T>,
        c: &Self::Buffer<T>,
        scalar: T,
    ) -> Result<()>;

    /// Block until all submitted work has completed.
    fn synchronize(&self) -> Result<()>;
}
