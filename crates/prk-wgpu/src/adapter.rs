//! WebGPU adapter and device acquisition.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info};

use prk_core::{BackendKind, Capabilities, CapabilityFlag, DeviceInfo, PrkError, Result};

/// Selected adapter, its device and queue, and the probed capabilities.
pub struct WgpuAdapter {
    /// Kept alive for the lifetime of the device.
    #[allow(dead_code)]
    instance: wgpu::Instance,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    info: wgpu::AdapterInfo,
    device_info: DeviceInfo,
    /// Last error reported outside an error scope.
    uncaptured: Arc<Mutex<Option<String>>>,
}

impl WgpuAdapter {
    /// Request a high-performance adapter and open a device on it.
    ///
    /// `SHADER_F64` is requested whenever the adapter offers it. The device
    /// inherits the adapter's limits so large grids are not capped by the
    /// WebGPU defaults.
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| PrkError::BackendUnavailable("No WebGPU adapter found".to_string()))?;

        let info = adapter.get_info();
        let capabilities = probe_capabilities(&adapter);

        let mut required_features = wgpu::Features::empty();
        if capabilities.has(CapabilityFlag::Float64) {
            required_features |= wgpu::Features::SHADER_F64;
        }

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("PRK Device"),
                    required_features,
                    required_limits: adapter.limits(),
                },
                None,
            )
            .await
            .map_err(|e| PrkError::BackendError(format!("Failed to create device: {}", e)))?;

        let uncaptured = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&uncaptured);
        device.on_uncaptured_error(Box::new(move |e| {
            error!("WebGPU uncaptured error: {}", e);
            *slot.lock() = Some(e.to_string());
        }));

        info!(
            "Created WebGPU adapter: {} ({:?}, fp64: {})",
            info.name,
            info.backend,
            capabilities.has(CapabilityFlag::Float64)
        );

        let device_info = DeviceInfo::new(
            BackendKind::Gpu,
            info.name.clone(),
            format!("{:?}", info.backend),
            capabilities,
        );

        Ok(Self {
            instance,
            device: Arc::new(device),
            queue: Arc::new(queue),
            info,
            device_info,
            uncaptured,
        })
    }

    /// Adapter name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Graphics API the adapter runs on.
    pub fn backend(&self) -> wgpu::Backend {
        self.info.backend
    }

    /// Probed identity and capabilities.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// The wgpu device.
    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    /// The command queue.
    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    /// Block until all submitted work has finished.
    pub fn wait(&self) {
        self.device.poll(wgpu::Maintain::Wait);
    }

    /// Take the most recent uncaptured device error, if any.
    pub fn take_error(&self) -> Option<String> {
        self.uncaptured.lock().take()
    }
}

fn probe_capabilities(adapter: &wgpu::Adapter) -> Capabilities {
    let mut caps = Capabilities::new();
    if adapter
        .get_downlevel_capabilities()
        .flags
        .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
    {
        caps.add(CapabilityFlag::KernelCompilation);
    }
    if adapter.features().contains(wgpu::Features::SHADER_F64) {
        caps.add(CapabilityFlag::Float64);
    }
    caps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // May not have GPU in CI
    async fn test_adapter_creation() {
        let adapter = WgpuAdapter::new().await.unwrap();
        println!("Adapter: {} ({:?})", adapter.name(), adapter.backend());
        assert_eq!(adapter.device_info().kind, BackendKind::Gpu);
        assert!(adapter.take_error().is_none());
    }
}
