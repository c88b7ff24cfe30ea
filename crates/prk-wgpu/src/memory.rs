//! Typed storage buffers and host readback.

use std::marker::PhantomData;

use wgpu::util::DeviceExt;

use prk_core::error::ensure_len;
use prk_core::{Element, PrkError, Result};

use crate::adapter::WgpuAdapter;

/// Storage buffer holding `len` elements of `T`.
pub struct WgpuBuffer<T: Element> {
    buffer: wgpu::Buffer,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Element> WgpuBuffer<T> {
    /// Create a storage buffer initialized from host data.
    pub fn new_init(adapter: &WgpuAdapter, data: &[T], label: Option<&str>) -> Result<Self> {
        let bytes = std::mem::size_of_val(data) as u64;
        let limits = adapter.device().limits();
        let max = limits
            .max_buffer_size
            .min(limits.max_storage_buffer_binding_size as u64);
        if bytes == 0 || bytes > max {
            return Err(PrkError::BackendError(format!(
                "Buffer of {} bytes outside device limits (1..={})",
                bytes, max
            )));
        }

        let buffer = adapter
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
            });

        Ok(Self {
            buffer,
            len: data.len(),
            _marker: PhantomData,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Size in bytes.
    pub fn size_bytes(&self) -> u64 {
        (self.len * std::mem::size_of::<T>()) as u64
    }

    /// Create a binding for this buffer.
    pub fn as_entire_binding(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }

    /// Copy the buffer into `out` through a staging buffer.
    ///
    /// Blocks until every previously submitted command has completed.
    pub fn read(&self, adapter: &WgpuAdapter, out: &mut [T]) -> Result<()> {
        ensure_len(self.len, out.len())?;
        let device = adapter.device();

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("PRK Staging Buffer"),
            size: self.size_bytes(),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("PRK Readback Encoder"),
        });
        encoder.copy_buffer_to_buffer(&self.buffer, 0, &staging, 0, self.size_bytes());
        adapter.queue().submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        adapter.wait();

        rx.recv()
            .map_err(|e| PrkError::TransferFailed(format!("Channel error: {}", e)))?
            .map_err(|e| PrkError::TransferFailed(format!("Map error: {}", e)))?;

        {
            let mapped = slice.get_mapped_range();
            bytemuck::cast_slice_mut::<T, u8>(out).copy_from_slice(&mapped);
        }
        staging.unmap();

        Ok(())
    }
}
