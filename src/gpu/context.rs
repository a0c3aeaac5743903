//! Headless GPU context acquisition.

use wgpu::{Adapter, Device, Queue};

/// Errors that can occur while acquiring a GPU context.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,
    #[error("Failed to request device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),
}

/// Adapter, device, and queue for one renderer.
///
/// Every renderer owns its context outright; no two renderers share a
/// device or any resource created from one.
pub struct GpuContext {
    pub adapter: Adapter,
    pub device: Device,
    pub queue: Queue,
    max_texture_dimension: u32,
}

impl GpuContext {
    /// Acquire a high-performance adapter and device, surface-free.
    pub async fn new() -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::METAL | wgpu::Backends::VULKAN | wgpu::Backends::GL,
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;
        log::debug!("using adapter {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("wavescroll"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            })
            .await?;
        let max_texture_dimension = device.limits().max_texture_dimension_2d;

        Ok(Self {
            adapter,
            device,
            queue,
            max_texture_dimension,
        })
    }

    /// Largest supported 2D texture edge, in texels.
    ///
    /// The sample-texture layout, the downsampling policy, and the zero
    /// scratch row are all sized against this limit.
    pub fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    /// Get info about the GPU adapter.
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }
}
