//! The two shader programs: per-column level aggregation and waveform paint.
//!
//! Aggregation renders one level per output column into a width x 1 texture;
//! paint shades the visible surface from that texture. The split keeps the
//! expensive column-to-samples walk at column resolution instead of pixel
//! resolution.

use super::layouts;
use super::renderer::RenderError;
use super::targets::{LEVEL_FORMAT, OUTPUT_FORMAT};
use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, Queue, RenderPipeline, ShaderModule, TextureView,
};

/// Binding table shared with the WGSL sources. Renaming or rebinding a
/// shader resource means updating these indices in lockstep.
pub const BINDING_UNIFORMS: u32 = 0;
pub const BINDING_SAMPLES: u32 = 1;
pub const BINDING_LEVELS: u32 = 1;

/// Shader location of the quad position attribute.
pub const ATTR_POSITION: u32 = 0;

/// Full-screen unit-square quad (two triangles); the vertex stage maps it
/// to clip space.
pub const QUAD_VERTICES: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [0.0, 1.0],
    [1.0, 0.0],
    [1.0, 1.0],
    [0.0, 1.0],
    [1.0, 0.0],
];

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: ATTR_POSITION,
}];

/// Uniform data for the aggregation pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LevelUniforms {
    pub canvas_size: [f32; 2],
    pub texture_size: [f32; 2],
    pub scroll: [f32; 2],
    pub sample_count: f32,
    pub _padding: f32,
}

/// Uniform data for the paint pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PaintUniforms {
    pub canvas_size: [f32; 2],
    pub _padding: [f32; 2],
    pub foreground: [f32; 4],
    pub background: [f32; 4],
}

/// Allocate and fill the shared full-screen quad vertex buffer.
pub fn create_quad_buffer(device: &Device, queue: &Queue) -> Buffer {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("fullscreen_quad"),
        size: std::mem::size_of_val(&QUAD_VERTICES) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&QUAD_VERTICES));
    buffer
}

fn quad_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRIBUTES,
    }
}

/// Build a shader module with the negotiated precision prefix injected,
/// surfacing the backend's diagnostic text on failure.
async fn create_shader_module(
    device: &Device,
    label: &str,
    prefix: &str,
    body: &str,
) -> Result<ShaderModule, RenderError> {
    let source = format!("{prefix}{body}");
    let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(err) = error_scope.pop().await {
        return Err(RenderError::ShaderCompile(err.to_string()));
    }
    Ok(module)
}

async fn build_pipeline(
    device: &Device,
    label: &str,
    module: &ShaderModule,
    bind_group_layout: &BindGroupLayout,
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
) -> Result<RenderPipeline, RenderError> {
    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        immediate_size: 0,
    });

    let error_scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module,
            entry_point: Some("vs_main"),
            buffers: &[quad_vertex_layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });
    if let Some(err) = error_scope.pop().await {
        return Err(RenderError::ShaderLink(err.to_string()));
    }
    Ok(pipeline)
}

/// Aggregation-pass program: packed samples in, one level per column out.
pub struct LevelPipeline {
    pub pipeline: RenderPipeline,
    pub bind_group_layout: BindGroupLayout,
    pub uniform_buffer: Buffer,
}

impl LevelPipeline {
    /// Compile and link the aggregation program with the given precision
    /// prefix.
    pub async fn new(device: &Device, shader_prefix: &str) -> Result<Self, RenderError> {
        let module = create_shader_module(
            device,
            "levels_shader",
            shader_prefix,
            include_str!("shaders/levels.wgsl"),
        )
        .await?;

        let bind_group_layout = layouts::create_level_layout(device);
        // R32Float is not blendable.
        let pipeline = build_pipeline(
            device,
            "level_pipeline",
            &module,
            &bind_group_layout,
            LEVEL_FORMAT,
            None,
        )
        .await?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("level_uniforms"),
            size: std::mem::size_of::<LevelUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
        })
    }

    /// Create a bind group pointing at the current sample texture.
    pub fn create_bind_group(&self, device: &Device, samples: &TextureView) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("level_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: BINDING_UNIFORMS,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: BINDING_SAMPLES,
                    resource: wgpu::BindingResource::TextureView(samples),
                },
            ],
        })
    }
}

/// Paint-pass program: level texture in, shaded waveform out.
pub struct PaintPipeline {
    pub pipeline: RenderPipeline,
    pub bind_group_layout: BindGroupLayout,
    pub uniform_buffer: Buffer,
}

impl PaintPipeline {
    /// Compile and link the paint program with the given precision prefix.
    pub async fn new(device: &Device, shader_prefix: &str) -> Result<Self, RenderError> {
        let module = create_shader_module(
            device,
            "paint_shader",
            shader_prefix,
            include_str!("shaders/paint.wgsl"),
        )
        .await?;

        let bind_group_layout = layouts::create_paint_layout(device);
        let pipeline = build_pipeline(
            device,
            "paint_pipeline",
            &module,
            &bind_group_layout,
            OUTPUT_FORMAT,
            Some(wgpu::BlendState::REPLACE),
        )
        .await?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("paint_uniforms"),
            size: std::mem::size_of::<PaintUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
        })
    }

    /// Create a bind group pointing at the current level texture.
    pub fn create_bind_group(&self, device: &Device, levels: &TextureView) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("paint_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: BINDING_UNIFORMS,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: BINDING_LEVELS,
                    resource: wgpu::BindingResource::TextureView(levels),
                },
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::precision;
    use crate::gpu::GpuContext;

    #[test]
    fn test_quad_covers_unit_square() {
        for [x, y] in QUAD_VERTICES {
            assert!((0.0..=1.0).contains(&x));
            assert!((0.0..=1.0).contains(&y));
        }
        // Two triangles, three vertices each.
        assert_eq!(QUAD_VERTICES.len(), 6);
    }

    #[test]
    fn test_uniform_sizes_are_gpu_aligned() {
        assert_eq!(std::mem::size_of::<LevelUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<PaintUniforms>() % 16, 0);
    }

    #[tokio::test]
    async fn test_pipelines_build_with_negotiated_precision() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return, // Skip if no GPU
        };

        let chosen = precision::negotiate(ctx.device.features()).unwrap();
        let prefix = precision::shader_prefix(&chosen);

        let level = LevelPipeline::new(&ctx.device, &prefix).await;
        assert!(level.is_ok(), "level pipeline failed: {:?}", level.err());

        let paint = PaintPipeline::new(&ctx.device, &prefix).await;
        assert!(paint.is_ok(), "paint pipeline failed: {:?}", paint.err());
    }

    #[tokio::test]
    async fn test_broken_shader_surfaces_compile_diagnostic() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return,
        };

        // An invalid prefix makes the injected source unparsable.
        let result = LevelPipeline::new(&ctx.device, "alias scalar = not_a_type;\n").await;
        match result {
            Err(RenderError::ShaderCompile(msg)) | Err(RenderError::ShaderLink(msg)) => {
                assert!(!msg.is_empty());
            }
            other => panic!("expected a shader error, got {:?}", other.map(|_| ())),
        }
    }
}
