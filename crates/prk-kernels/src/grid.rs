//! Grid storage for the stencil benchmark.
//!
//! [`Grid`] holds the host copies of the input and output arrays, dense and
//! row-major. [`DeviceGrid`] is the backend-resident mirror used during the
//! timed loop. It is acquired from a host grid by uploading both arrays and
//! released through [`DeviceGrid::sync_to_host`], which consumes it, so data
//! flows back to the host exactly once per run.

use prk_core::{ComputeBackend, Element, GridShape, Result, StencilKernel};

/// Host input and output arrays of an `n x n` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T: Element> {
    n: usize,
    input: Vec<T>,
    output: Vec<T>,
}

impl<T: Element> Grid<T> {
    /// Allocate a zeroed grid.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            input: vec![T::zero(); n * n],
            output: vec![T::zero(); n * n],
        }
    }

    /// Linear dimension.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Set `input[i][j] = i + j`.
    pub fn initialize(&mut self) {
        let n = self.n;
        for (i, row) in self.input.chunks_mut(n.max(1)).enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = T::from_f64((i + j) as f64);
            }
        }
    }

    /// Add one to every input point.
    pub fn increment(&mut self) {
        let one = T::one();
        for v in &mut self.input {
            *v += one;
        }
    }

    /// Input array, row-major.
    pub fn input(&self) -> &[T] {
        &self.input
    }

    /// Output array, row-major.
    pub fn output(&self) -> &[T] {
        &self.output
    }

    /// Mutable output array.
    pub fn output_mut(&mut self) -> &mut [T] {
        &mut self.output
    }

    /// Input value at `(i, j)`.
    pub fn input_at(&self, i: usize, j: usize) -> T {
        self.input[i * self.n + j]
    }

    /// Output value at `(i, j)`.
    pub fn output_at(&self, i: usize, j: usize) -> T {
        self.output[i * self.n + j]
    }
}

/// Backend-resident copy of a [`Grid`].
///
/// Dropping it without calling [`sync_to_host`](Self::sync_to_host) discards
/// the device data and frees the buffers.
pub struct DeviceGrid<'a, B: ComputeBackend, T: Element> {
    backend: &'a B,
    shape: GridShape,
    input: B::Buffer<T>,
    output: B::Buffer<T>,
}

impl<'a, B: ComputeBackend, T: Element> DeviceGrid<'a, B, T> {
    /// Upload both arrays of `grid`.
    pub fn acquire(backend: &'a B, grid: &Grid<T>, tile_size: usize) -> Result<Self> {
        Ok(Self {
            backend,
            shape: GridShape::new(grid.n, tile_size),
            input: backend.upload(&grid.input)?,
            output: backend.upload(&grid.output)?,
        })
    }

    /// Launch geometry.
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Accumulate `kernel` applied to the input into the output.
    pub fn apply(&mut self, kernel: &StencilKernel) -> Result<()> {
        self.backend
            .apply_stencil(kernel, self.shape, &self.input, &mut self.output)
    }

    /// Add one to every input point on the device.
    pub fn increment(&mut self) -> Result<()> {
        self.backend.add_scalar(&mut self.input, T::one())
    }

    /// Copy both arrays back into `grid` and release the device storage.
    pub fn sync_to_host(self, grid: &mut Grid<T>) -> Result<()> {
        self.backend.download(&self.input, &mut grid.input)?;
        self.backend.download(&self.output, &mut grid.output)?;
        Ok(())
    }
}
