//! WebGPU backend for the PRK benchmarks.
//!
//! Kernels are WGSL compute shaders compiled lazily on first use, so the first
//! launch of each kernel pays the compilation cost. Double precision requires
//! the adapter to expose `SHADER_F64`.
//!
//! # Example
//!
//! ```ignore
//! use prk_wgpu::WgpuBackend;
//!
//! let backend = WgpuBackend::new().await?;
//! println!("{}", backend.adapter().name());
//! ```

#![warn(missing_docs)]

mod adapter;
mod backend;
mod memory;
mod shader;

pub use adapter::WgpuAdapter;
pub use backend::WgpuBackend;
pub use memory::WgpuBuffer;

/// Check if any WebGPU adapter is available.
pub fn is_wgpu_available() -> bool {
    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
        backends: wgpu::Backends::all(),
        ..Default::default()
    });
    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default())).is_some()
}
