//! Bind group layouts for the two render pipelines.
//!
//! Both passes read their textures with `textureLoad` (the packed sample
//! texture is an unsigned-integer format and the level texture is an
//! unfilterable float format), so no sampler entries exist anywhere.
//! Binding indices come from the table in [`super::pipelines`].

use wgpu::{BindGroupLayout, BindGroupLayoutEntry, BindingType, Device, ShaderStages};

use super::pipelines::{BINDING_LEVELS, BINDING_SAMPLES, BINDING_UNIFORMS};

fn uniform_entry(binding: u32) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::FRAGMENT,
        ty: BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, sample_type: wgpu::TextureSampleType) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility: ShaderStages::FRAGMENT,
        ty: BindingType::Texture {
            sample_type,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Layout of the aggregation pass: uniforms plus the packed sample texture.
pub fn create_level_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("level_bind_group_layout"),
        entries: &[
            uniform_entry(BINDING_UNIFORMS),
            texture_entry(BINDING_SAMPLES, wgpu::TextureSampleType::Uint),
        ],
    })
}

/// Layout of the paint pass: uniforms plus the level texture.
pub fn create_paint_layout(device: &Device) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("paint_bind_group_layout"),
        entries: &[
            uniform_entry(BINDING_UNIFORMS),
            texture_entry(BINDING_LEVELS, wgpu::TextureSampleType::Float { filterable: false }),
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[tokio::test]
    async fn test_both_layouts_build() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        let _level = create_level_layout(&ctx.device);
        let _paint = create_paint_layout(&ctx.device);
    }
}
