//! Headless scrollable waveform renderer.
//!
//! Two-pass pipeline: an aggregation pass reduces the visible sample window
//! to one level per output column (rendered into a width x 1 texture), then
//! a paint pass shades the full canvas from those levels. Splitting the
//! passes keeps the expensive column-to-samples walk at column resolution
//! instead of once per final pixel.

use super::context::{GpuContext, GpuError};
use super::pipelines::{self, LevelPipeline, LevelUniforms, PaintPipeline, PaintUniforms};
use super::precision::{self, Precision};
use super::sample_texture::SampleTexture;
use super::targets::{ReadbackBuffer, RenderTarget};
use wgpu::BindGroup;

/// Errors that can occur during renderer initialization and use.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// No GPU context obtainable. Fatal, not retried.
    #[error("GPU context unavailable: {0}")]
    Context(#[from] GpuError),
    /// No fragment-stage scalar type satisfies the mantissa floor.
    #[error("no supported fragment precision provides enough mantissa bits")]
    Precision,
    /// A shader module failed to build; carries the backend diagnostic.
    #[error("shader compilation failed: {0}")]
    ShaderCompile(String),
    /// A program failed to link into a pipeline; carries the diagnostic.
    #[error("shader program link failed: {0}")]
    ShaderLink(String),
    /// Operation invoked after `destroy()`. A contract violation by the
    /// caller, not a recoverable condition.
    #[error("renderer used after destroy()")]
    NotInitialized,
}

/// Configuration for the renderer surface and waveform colors.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub foreground: [f32; 4],
    pub background: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 350,
            foreground: [0.13, 0.59, 0.95, 1.0],
            background: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

struct RendererState {
    ctx: GpuContext,
    precision: Precision,
    level_pipeline: LevelPipeline,
    paint_pipeline: PaintPipeline,
    quad_buffer: wgpu::Buffer,
    sample_texture: SampleTexture,
    level_target: RenderTarget,
    output_target: RenderTarget,
    readback: ReadbackBuffer,
    level_bind_group: BindGroup,
    paint_bind_group: BindGroup,
    /// Zero-filled scratch row sized to the max texture dimension; resets
    /// the level texture whenever the canvas is resized.
    zero_row: Vec<u8>,
    scroll: (f32, f32),
    canvas: (u32, u32),
    samples_loaded: bool,
    config: RenderConfig,
}

/// Headless scrollable waveform renderer.
///
/// Owns its GPU context, sample texture, level texture, and output surface
/// exclusively; multiple instances never share resources.
pub struct WaveformRenderer {
    state: Option<RendererState>,
}

impl WaveformRenderer {
    /// Create and initialize a renderer.
    ///
    /// Acquires a GPU context, negotiates fragment precision, compiles and
    /// links both programs, and allocates the quad geometry, sample texture,
    /// level target, output target, and zero scratch row.
    pub async fn new(config: RenderConfig) -> Result<Self, RenderError> {
        let ctx = GpuContext::new().await?;

        let chosen =
            precision::negotiate(ctx.device.features()).ok_or(RenderError::Precision)?;
        let prefix = precision::shader_prefix(&chosen);
        log::debug!(
            "negotiated fragment precision {} ({} mantissa bits)",
            chosen.wgsl_type,
            chosen.mantissa_bits
        );

        let level_pipeline = LevelPipeline::new(&ctx.device, &prefix).await?;
        let paint_pipeline = PaintPipeline::new(&ctx.device, &prefix).await?;
        let quad_buffer = pipelines::create_quad_buffer(&ctx.device, &ctx.queue);

        let max_dim = ctx.max_texture_dimension();
        let sample_texture = SampleTexture::new(&ctx.device, max_dim);

        let level_target = RenderTarget::for_levels(&ctx.device, config.width);
        let output_target = RenderTarget::for_output(&ctx.device, config.width, config.height);
        let readback = ReadbackBuffer::new(&ctx.device, config.width, config.height);

        let level_bind_group = level_pipeline.create_bind_group(&ctx.device, sample_texture.view());
        let paint_bind_group = paint_pipeline.create_bind_group(&ctx.device, level_target.view());

        let zero_row = vec![0u8; max_dim as usize * 4];
        let canvas = (config.width, config.height);

        Ok(Self {
            state: Some(RendererState {
                ctx,
                precision: chosen,
                level_pipeline,
                paint_pipeline,
                quad_buffer,
                sample_texture,
                level_target,
                output_target,
                readback,
                level_bind_group,
                paint_bind_group,
                zero_row,
                scroll: (0.0, 1.0),
                canvas,
                samples_loaded: false,
                config,
            }),
        })
    }

    /// Replace the sample buffer.
    ///
    /// Applies the downsampling policy, grows the sample texture only if the
    /// current capacity cannot hold the new count, and repacks and uploads
    /// all sample bytes. Does not redraw; call [`Self::draw`] or
    /// [`Self::resize`].
    pub fn set_audio_samples(&mut self, samples: &[f32]) -> Result<(), RenderError> {
        let state = self.state.as_mut().ok_or(RenderError::NotInitialized)?;

        let stored = state
            .sample_texture
            .upload(&state.ctx.device, &state.ctx.queue, samples);
        // The texture may have been reallocated; rebind.
        state.level_bind_group = state
            .level_pipeline
            .create_bind_group(&state.ctx.device, state.sample_texture.view());
        state.samples_loaded = stored > 0;

        let (tex_w, tex_h) = state.sample_texture.size();
        log::debug!("stored {stored} samples in a {tex_w}x{tex_h} texture");
        Ok(())
    }

    /// Resize the drawing surface.
    ///
    /// Reinitializes the level texture (cleared via the zero scratch row)
    /// and the output surface, then redraws immediately if samples are
    /// loaded.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let state = self.state.as_mut().ok_or(RenderError::NotInitialized)?;

        state.canvas = (width, height);
        state.level_target = RenderTarget::for_levels(&state.ctx.device, width);
        state.output_target = RenderTarget::for_output(&state.ctx.device, width, height);
        state.readback = ReadbackBuffer::new(&state.ctx.device, width, height);
        state.paint_bind_group = state
            .paint_pipeline
            .create_bind_group(&state.ctx.device, state.level_target.view());
        state.reset_level_target();

        if state.samples_loaded {
            state.draw();
        }
        Ok(())
    }

    /// Store the scroll window.
    ///
    /// Values are stored verbatim: the scrollbar owns the
    /// `0 <= start <= end <= 1` invariant and out-of-range values render as
    /// undefined visuals, not errors. Redraws immediately if samples are
    /// loaded.
    pub fn set_scroll_range(&mut self, start: f32, end: f32) -> Result<(), RenderError> {
        let state = self.state.as_mut().ok_or(RenderError::NotInitialized)?;
        state.scroll = (start, end);
        if state.samples_loaded {
            state.draw();
        }
        Ok(())
    }

    /// Run the two-pass pipeline onto the output surface.
    ///
    /// Idempotent: repeated draws with unchanged state produce bit-identical
    /// output.
    pub fn draw(&self) -> Result<(), RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        state.draw();
        Ok(())
    }

    /// Read the output surface back as tightly packed RGBA pixels.
    pub fn read_pixels(&self) -> Result<Vec<u8>, RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;

        let mut encoder = state
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("readback_encoder"),
            });
        state.readback.copy_from(&mut encoder, &state.output_target);
        state.ctx.queue.submit(std::iter::once(encoder.finish()));

        Ok(state.readback.read_pixels(&state.ctx.device))
    }

    /// Release all GPU resources.
    ///
    /// The renderer is unusable afterward: every subsequent operation fails
    /// with [`RenderError::NotInitialized`].
    pub fn destroy(&mut self) {
        self.state = None;
    }

    /// Current scroll window.
    pub fn scroll_range(&self) -> Result<(f32, f32), RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        Ok(state.scroll)
    }

    /// Current sample texture extent.
    pub fn sample_texture_size(&self) -> Result<(u32, u32), RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        Ok(state.sample_texture.size())
    }

    /// Number of samples currently stored (post-stride).
    pub fn sample_count(&self) -> Result<usize, RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        Ok(state.sample_texture.sample_count())
    }

    /// Sample texture capacity in bytes; grows monotonically across loads.
    pub fn texture_capacity_bytes(&self) -> Result<usize, RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        Ok(state.sample_texture.capacity_bytes())
    }

    /// Largest supported 2D texture edge.
    pub fn max_texture_dimension(&self) -> Result<u32, RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        Ok(state.ctx.max_texture_dimension())
    }

    /// Negotiated fragment precision.
    pub fn precision(&self) -> Result<Precision, RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        Ok(state.precision)
    }

    /// Render configuration.
    pub fn config(&self) -> Result<&RenderConfig, RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        Ok(&state.config)
    }

    /// Get info about the GPU adapter.
    pub fn adapter_info(&self) -> Result<wgpu::AdapterInfo, RenderError> {
        let state = self.state.as_ref().ok_or(RenderError::NotInitialized)?;
        Ok(state.ctx.adapter_info())
    }
}

impl RendererState {
    /// Reset the level texture from the zero scratch row.
    fn reset_level_target(&self) {
        let row_bytes = self.canvas.0 as usize * 4;
        self.ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: self.level_target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.zero_row[..row_bytes],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.canvas.0 * 4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d {
                width: self.canvas.0,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
    }

    fn draw(&self) {
        let (width, height) = self.canvas;
        let (tex_w, tex_h) = self.sample_texture.size();

        let level_uniforms = LevelUniforms {
            canvas_size: [width as f32, height as f32],
            texture_size: [tex_w as f32, tex_h as f32],
            scroll: [self.scroll.0, self.scroll.1],
            sample_count: self.sample_texture.sample_count() as f32,
            _padding: 0.0,
        };
        self.ctx.queue.write_buffer(
            &self.level_pipeline.uniform_buffer,
            0,
            bytemuck::bytes_of(&level_uniforms),
        );

        let paint_uniforms = PaintUniforms {
            canvas_size: [width as f32, height as f32],
            _padding: [0.0; 2],
            foreground: self.config.foreground,
            background: self.config.background,
        };
        self.ctx.queue.write_buffer(
            &self.paint_pipeline.uniform_buffer,
            0,
            bytemuck::bytes_of(&paint_uniforms),
        );

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("waveform_encoder"),
            });

        // Aggregation pass: one fragment per output column.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("level_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.level_target.view(),
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.level_pipeline.pipeline);
            pass.set_bind_group(0, &self.level_bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            pass.draw(0..6, 0..1);
        }

        // Paint pass: shade the visible surface from the level texture.
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("paint_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.output_target.view(),
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.paint_pipeline.pipeline);
            pass.set_bind_group(0, &self.paint_bind_group, &[]);
            pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            pass.draw(0..6, 0..1);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renderer_creation() {
        let config = RenderConfig {
            width: 320,
            height: 180,
            ..Default::default()
        };

        let result = WaveformRenderer::new(config).await;
        if let Ok(renderer) = result {
            let info = renderer.adapter_info().unwrap();
            assert!(!info.name.is_empty());
            assert_eq!(renderer.precision().unwrap().wgsl_type, "f32");
        }
    }

    #[tokio::test]
    async fn test_draw_without_samples_paints_background() {
        let config = RenderConfig {
            width: 64,
            height: 32,
            foreground: [1.0, 0.0, 0.0, 1.0],
            background: [0.0, 0.0, 1.0, 1.0],
        };

        let renderer = match WaveformRenderer::new(config).await {
            Ok(r) => r,
            Err(_) => return,
        };

        renderer.draw().unwrap();
        let pixels = renderer.read_pixels().unwrap();
        assert_eq!(pixels.len(), 64 * 32 * 4);
        // Zero levels have zero extent, so every pixel is background.
        assert!(pixels.chunks(4).all(|p| p[0] == 0 && p[2] == 255));
    }

    #[tokio::test]
    async fn test_destroy_makes_operations_fail() {
        let mut renderer = match WaveformRenderer::new(RenderConfig::default()).await {
            Ok(r) => r,
            Err(_) => return,
        };

        renderer.destroy();

        assert!(matches!(renderer.draw(), Err(RenderError::NotInitialized)));
        assert!(matches!(
            renderer.set_audio_samples(&[0.0; 4]),
            Err(RenderError::NotInitialized)
        ));
        assert!(matches!(
            renderer.set_scroll_range(0.0, 1.0),
            Err(RenderError::NotInitialized)
        ));
        assert!(matches!(
            renderer.read_pixels(),
            Err(RenderError::NotInitialized)
        ));
        assert!(matches!(
            renderer.resize(10, 10),
            Err(RenderError::NotInitialized)
        ));
    }
}
