//! `ComputeBackend` implementation over a WebGPU device.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use prk_core::error::ensure_len;
use prk_core::{
    CapabilityFlag, ComputeBackend, DeviceInfo, Element, GridShape, Precision, PrkError, Result,
    StencilKernel,
};

use crate::adapter::WgpuAdapter;
use crate::memory::WgpuBuffer;
use crate::shader::{
    grid_dispatch, linear_dispatch, ComputePipeline, LinearParams, ShaderKind, StencilParams,
};

/// Coefficients of one stencil kernel resident on the device.
struct TapBuffers {
    offsets: wgpu::Buffer,
    weights: wgpu::Buffer,
    count: u32,
}

/// WebGPU execution backend.
///
/// Pipelines are compiled on first use and cached per (kernel, precision).
/// Stencil coefficients are uploaded once per (kernel, precision).
pub struct WgpuBackend {
    adapter: WgpuAdapter,
    pipelines: Mutex<HashMap<(ShaderKind, Precision), Arc<ComputePipeline>>>,
    taps: Mutex<HashMap<(String, Precision), Arc<TapBuffers>>>,
}

impl WgpuBackend {
    /// Acquire an adapter and device.
    pub async fn new() -> Result<Self> {
        let adapter = WgpuAdapter::new().await?;
        info!("WebGPU backend ready on {}", adapter.name());
        Ok(Self::from_adapter(adapter))
    }

    /// Wrap an existing adapter.
    pub fn from_adapter(adapter: WgpuAdapter) -> Self {
        Self {
            adapter,
            pipelines: Mutex::new(HashMap::new()),
            taps: Mutex::new(HashMap::new()),
        }
    }

    /// The underlying adapter.
    pub fn adapter(&self) -> &WgpuAdapter {
        &self.adapter
    }

    fn pipeline(&self, kind: ShaderKind, precision: Precision) -> Result<Arc<ComputePipeline>> {
        if let Some(flag) = precision.required_capability() {
            if !self.adapter.device_info().has(flag) {
                return Err(PrkError::BackendUnavailable(format!(
                    "GPU device lacks {} support",
                    flag
                )));
            }
        }

        let mut cache = self.pipelines.lock();
        if let Some(pipeline) = cache.get(&(kind, precision)) {
            return Ok(Arc::clone(pipeline));
        }
        let pipeline = Arc::new(ComputePipeline::new(self.adapter.device(), kind, precision)?);
        cache.insert((kind, precision), Arc::clone(&pipeline));
        Ok(pipeline)
    }

    fn tap_buffers<T: Element>(&self, kernel: &StencilKernel) -> Arc<TapBuffers> {
        let key = (kernel.label(), T::PRECISION);
        let mut cache = self.taps.lock();
        if let Some(taps) = cache.get(&key) {
            return Arc::clone(taps);
        }

        let offsets: Vec<[i32; 2]> = kernel
            .taps()
            .iter()
            .map(|t| [t.di as i32, t.dj as i32])
            .collect();
        let weights: Vec<T> = kernel.taps().iter().map(|t| T::from_f64(t.weight)).collect();

        let device = self.adapter.device();
        let taps = Arc::new(TapBuffers {
            offsets: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("PRK Stencil Offsets"),
                contents: bytemuck::cast_slice(&offsets),
                usage: wgpu::BufferUsages::STORAGE,
            }),
            weights: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("PRK Stencil Weights"),
                contents: bytemuck::cast_slice(&weights),
                usage: wgpu::BufferUsages::STORAGE,
            }),
            count: kernel.taps().len() as u32,
        });
        debug!("Uploaded {} taps for {}", taps.count, kernel.label());
        cache.insert(key, Arc::clone(&taps));
        taps
    }

    fn uniform<P: bytemuck::Pod>(&self, params: &P) -> wgpu::Buffer {
        self.adapter
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("PRK Params"),
                contents: bytemuck::bytes_of(params),
                usage: wgpu::BufferUsages::UNIFORM,
            })
    }

    fn scalar<T: Element>(&self, value: T) -> wgpu::Buffer {
        self.adapter
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("PRK Scalar"),
                contents: bytemuck::bytes_of(&value),
                usage: wgpu::BufferUsages::STORAGE,
            })
    }

    fn submit(
        &self,
        pipeline: &ComputePipeline,
        resources: &[wgpu::BindingResource<'_>],
        workgroups: (u32, u32),
    ) {
        let device = self.adapter.device();
        let entries: Vec<wgpu::BindGroupEntry> = resources
            .iter()
            .enumerate()
            .map(|(binding, resource)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: resource.clone(),
            })
            .collect();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("PRK Bind Group"),
            layout: pipeline.bind_group_layout(),
            entries: &entries,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("PRK Kernel Encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("PRK Kernel Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline.pipeline());
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(workgroups.0, workgroups.1, 1);
        }
        self.adapter.queue().submit(Some(encoder.finish()));
    }

    fn check_launch(&self) -> Result<()> {
        match self.adapter.take_error() {
            Some(msg) => Err(PrkError::LaunchFailed(msg)),
            None => Ok(()),
        }
    }
}

impl ComputeBackend for WgpuBackend {
    type Buffer<T: Element> = WgpuBuffer<T>;

    fn device(&self) -> &DeviceInfo {
        self.adapter.device_info()
    }

    fn upload<T: Element>(&self, data: &[T]) -> Result<WgpuBuffer<T>> {
        if T::PRECISION == Precision::Double && !self.device().has(CapabilityFlag::Float64) {
            return Err(PrkError::BackendUnavailable(
                "GPU device lacks FP64 support".to_string(),
            ));
        }
        WgpuBuffer::new_init(&self.adapter, data, Some("PRK Storage"))
    }

    fn download<T: Element>(&self, buffer: &WgpuBuffer<T>, out: &mut [T]) -> Result<()> {
        buffer.read(&self.adapter, out)?;
        self.check_launch()
    }

    fn apply_stencil<T: Element>(
        &self,
        kernel: &StencilKernel,
        shape: GridShape,
        input: &WgpuBuffer<T>,
        output: &mut WgpuBuffer<T>,
    ) -> Result<()> {
        ensure_len(shape.len(), input.len())?;
        ensure_len(shape.len(), output.len())?;
        shape.check_kernel(kernel)?;

        let pipeline = self.pipeline(ShaderKind::Stencil, T::PRECISION)?;
        let taps = self.tap_buffers::<T>(kernel);
        let params = self.uniform(&StencilParams {
            n: shape.n as u32,
            radius: kernel.radius() as u32,
            taps: taps.count,
            _pad: 0,
        });

        self.submit(
            &pipeline,
            &[
                params.as_entire_binding(),
                taps.offsets.as_entire_binding(),
                taps.weights.as_entire_binding(),
                input.as_entire_binding(),
                output.as_entire_binding(),
            ],
            grid_dispatch(shape.n),
        );
        Ok(())
    }

    fn add_scalar<T: Element>(&self, buffer: &mut WgpuBuffer<T>, value: T) -> Result<()> {
        let pipeline = self.pipeline(ShaderKind::AddScalar, T::PRECISION)?;
        let params = self.uniform(&LinearParams::new(buffer.len() as u32));
        let value = self.scalar(value);

        self.submit(
            &pipeline,
            &[
                params.as_entire_binding(),
                value.as_entire_binding(),
                buffer.as_entire_binding(),
            ],
            linear_dispatch(buffer.len()),
        );
        Ok(())
    }

    fn triad<T: Element>(
        &self,
        a: &mut WgpuBuffer<T>,
        b: &WgpuBuffer<T>,
        c: &WgpuBuffer<T>,
        scalar: T,
    ) -> Result<()> {
        ensure_len(a.len(), b.len())?;
        ensure_len(a.len(), c.len())?;

        let pipeline = self.pipeline(ShaderKind::Triad, T::PRECISION)?;
        let params = self.uniform(&LinearParams::new(a.len() as u32));
        let scalar = self.scalar(scalar);

        self.submit(
            &pipeline,
            &[
                params.as_entire_binding(),
                scalar.as_entire_binding(),
                a.as_entire_binding(),
                b.as_entire_binding(),
                c.as_entire_binding(),
            ],
            linear_dispatch(a.len()),
        );
        Ok(())
    }

    fn synchronize(&self) -> Result<()> {
        self.adapter.wait();
        self.check_launch()
    }
}
