//! Multi-threaded host backend on a dedicated rayon pool.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use prk_core::error::ensure_len;
use prk_core::{
    BackendKind, Capabilities, CapabilityFlag, ComputeBackend, DeviceInfo, Element, GridShape,
    PrkError, Result, StencilKernel,
};

use crate::buffer::HostBuffer;
use crate::star::{self, Weights};

/// Data-parallel host backend.
///
/// Every kernel runs inside the backend's own thread pool, so runs on this
/// backend do not compete with work scheduled on the global rayon pool.
pub struct ParallelBackend {
    pool: ThreadPool,
    info: DeviceInfo,
}

impl ParallelBackend {
    /// Create a backend with `threads` workers (all logical cores if `None`).
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("prk-cpu-{}", i));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| PrkError::BackendError(format!("Failed to build thread pool: {}", e)))?;

        let workers = pool.current_num_threads();
        info!("Initialized CPU backend with {} worker threads", workers);

        Ok(Self {
            pool,
            info: DeviceInfo::new(
                BackendKind::Cpu,
                format!("Host CPU ({} threads)", workers),
                "rayon",
                Capabilities::with_flags([CapabilityFlag::Float64]),
            ),
        })
    }

    /// Number of worker threads.
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl ComputeBackend for ParallelBackend {
    type Buffer<T: Element> = HostBuffer<T>;

    fn device(&self) -> &DeviceInfo {
        &self.info
    }

    fn upload<T: Element>(&self, data: &[T]) -> Result<HostBuffer<T>> {
        Ok(HostBuffer::from_slice(data))
    }

    fn download<T: Element>(&self, buffer: &HostBuffer<T>, out: &mut [T]) -> Result<()> {
        ensure_len(buffer.len(), out.len())?;
        out.copy_from_slice(buffer.as_slice());
        Ok(())
    }

    fn apply_stencil<T: Element>(
        &self,
        kernel: &StencilKernel,
        shape: GridShape,
        input: &HostBuffer<T>,
        output: &mut HostBuffer<T>,
    ) -> Result<()> {
        ensure_len(shape.len(), input.len())?;
        ensure_len(shape.len(), output.len())?;
        shape.check_kernel(kernel)?;

        let weights = Weights::<T>::new(kernel);
        let input = input.as_slice();
        let output = output.as_mut_slice();
        self.pool
            .install(|| star::apply(kernel, &weights, shape, input, output));
        Ok(())
    }

    fn add_scalar<T: Element>(&self, buffer: &mut HostBuffer<T>, value: T) -> Result<()> {
        let data = buffer.as_mut_slice();
        self.pool
            .install(|| data.par_iter_mut().for_each(|v| *v += value));
        Ok(())
    }

    fn triad<T: Element>(
        &self,
        a: &mut HostBuffer<T>,
        b: &HostBuffer<T>,
        c: &HostBuffer<T>,
        scalar: T,
    ) -> Result<()> {
        ensure_len(a.len(), b.len())?;
        ensure_len(a.len(), c.len())?;

        let (a, b, c) = (a.as_mut_slice(), b.as_slice(), c.as_slice());
        self.pool.install(|| {
            a.par_iter_mut()
                .zip(b.par_iter())
                .zip(c.par_iter())
                .for_each(|((a, &b), &c)| *a += b + scalar * c)
        });
        Ok(())
    }

    fn synchronize(&self) -> Result<()> {
        // Every kernel is joined inside `install` before it returns.
        Ok(())
    }
}
