//! Sequential host reference backend.

use tracing::debug;

use prk_core::error::ensure_len;
use prk_core::{
    BackendKind, Capabilities, CapabilityFlag, ComputeBackend, DeviceInfo, Element, GridShape,
    Result, StencilKernel,
};

use crate::buffer::HostBuffer;

/// Single-threaded backend that evaluates every tap of every point in order.
pub struct ReferenceBackend {
    info: DeviceInfo,
}

impl ReferenceBackend {
    /// Create the reference backend. It is always available.
    pub fn new() -> Self {
        debug!("Initializing host reference backend");
        Self {
            info: DeviceInfo::new(
                BackendKind::Reference,
                "Host reference",
                "sequential host loops",
                Capabilities::with_flags([CapabilityFlag::Float64]),
            ),
        }
    }
}

impl Default for ReferenceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for ReferenceBackend {
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

        let n = shape.n;
        let taps: Vec<(isize, isize, T)> = kernel
            .taps()
            .iter()
            .map(|t| (t.di, t.dj, T::from_f64(t.weight)))
            .collect();

        let input = input.as_slice();
        let output = output.as_mut_slice();
        let active = shape.active_range(kernel.radius());

        for i in active.clone() {
            for j in active.clone() {
                let mut acc = output[i * n + j];
                for &(di, dj, w) in &taps {
                    let ii = (i as isize + di) as usize;
                    let jj = (j as isize + dj) as usize;
                    acc += w * input[ii * n + jj];
                }
                output[i * n + j] = acc;
            }
        }
        Ok(())
    }

    fn add_scalar<T: Element>(&self, buffer: &mut HostBuffer<T>, value: T) -> Result<()> {
        for v in buffer.as_mut_slice() {
            *v += value;
        }
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

        for ((a, &b), &c) in a
            .as_mut_slice()
            .iter_mut()
            .zip(b.as_slice())
            .zip(c.as_slice())
        {
            *a += b + scalar * c;
        }
        Ok(())
    }

    fn synchronize(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prk_core::{Pattern, Tap};

    fn east_minus_west() -> StencilKernel {
        StencilKernel::new(
            Pattern::Star,
            1,
            vec![Tap::new(0, 1, 0.5), Tap::new(0, -1, -0.5)],
        )
        .unwrap()
    }

    #[test]
    fn test_reference_stencil_accumulates() {
        let backend = ReferenceBackend::new();
        let shape = GridShape::new(4, 4);
        let host: Vec<f64> = (0..16).map(|k| (k % 4) as f64).collect();

        let input = backend.upload(&host).unwrap();
        let mut output = backend.upload(&[1.0f64; 16]).unwrap();
        backend
            .apply_stencil(&east_minus_west(), shape, &input, &mut output)
            .unwrap();

        let out = output.as_slice();
        // Interior: 1.0 + 0.5 * (j+1) - 0.5 * (j-1) = 2.0
        assert_eq!(out[5], 2.0);
        assert_eq!(out[10], 2.0);
        // Halo untouched
        assert_eq!(out[0], 1.0);
        assert_eq!(out[15], 1.0);
    }

    #[test]
    fn test_reference_rejects_wrong_length() {
        let backend = ReferenceBackend::new();
        let input = backend.upload(&[0.0f32; 9]).unwrap();
        let mut output = backend.upload(&[0.0f32; 16]).unwrap();
        let err = backend
            .apply_stencil(&east_minus_west(), GridShape::new(4, 4), &input, &mut output)
            .unwrap_err();
        assert!(err.to_string().contains("expected 16"));
    }

    #[test]
    fn test_reference_triad_and_add() {
        let backend = ReferenceBackend::new();
        let mut a = backend.upload(&[0.0f32; 8]).unwrap();
        let b = backend.upload(&[2.0f32; 8]).unwrap();
        let c = backend.upload(&[2.0f32; 8]).unwrap();

        backend.triad(&mut a, &b, &c, 3.0).unwrap();
        backend.add_scalar(&mut a, 1.0).unwrap();

        let mut out = [0.0f32; 8];
        backend.download(&a, &mut out).unwrap();
        assert!(out.iter().all(|&v| v == 9.0));
    }
}
