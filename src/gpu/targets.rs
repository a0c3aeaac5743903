//! The two render targets of the waveform pipeline, plus CPU readback.
//!
//! The aggregation pass writes one level per column into a width x 1
//! texture; the paint pass writes the visible frame into a canvas-sized
//! one. Both are recreated on resize, never partially updated.

use wgpu::{Device, Texture, TextureFormat, TextureUsages, TextureView};

/// Format of the width x 1 level texture the aggregation pass writes.
pub const LEVEL_FORMAT: TextureFormat = TextureFormat::R32Float;

/// Format of the visible output surface.
pub const OUTPUT_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// A texture plus its default view and extent, bundled because the view
/// must not outlive the texture.
pub struct RenderTarget {
    texture: Texture,
    view: TextureView,
    size: (u32, u32),
}

impl RenderTarget {
    fn new(
        device: &Device,
        label: &str,
        width: u32,
        height: u32,
        format: TextureFormat,
        usage: TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size: (width, height),
        }
    }

    /// The level texture: render target of the aggregation pass, input of
    /// the paint pass, and destination of the zero-row reset on resize.
    pub fn for_levels(device: &Device, width: u32) -> Self {
        Self::new(
            device,
            "level_texture",
            width,
            1,
            LEVEL_FORMAT,
            TextureUsages::RENDER_ATTACHMENT
                | TextureUsages::TEXTURE_BINDING
                | TextureUsages::COPY_DST,
        )
    }

    /// The visible output surface; copyable to the CPU for readback.
    pub fn for_output(device: &Device, width: u32, height: u32) -> Self {
        Self::new(
            device,
            "output_surface",
            width,
            height,
            OUTPUT_FORMAT,
            TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
        )
    }

    /// View for attaching or binding.
    pub fn view(&self) -> &TextureView {
        &self.view
    }

    /// Underlying texture, for copy operations.
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Target extent in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

/// Staging buffer for pulling the output surface back to the CPU.
///
/// Texture-to-buffer copies require rows padded to
/// `COPY_BYTES_PER_ROW_ALIGNMENT`; the padding is stripped again on read so
/// callers always see tightly packed RGBA rows.
pub struct ReadbackBuffer {
    buffer: wgpu::Buffer,
    size: (u32, u32),
    row_bytes: u32,
    padded_row_bytes: u32,
}

impl ReadbackBuffer {
    pub fn new(device: &Device, width: u32, height: u32) -> Self {
        let row_bytes = width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_row_bytes = row_bytes.div_ceil(align) * align;

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback_buffer"),
            size: u64::from(padded_row_bytes) * u64::from(height),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            size: (width, height),
            row_bytes,
            padded_row_bytes,
        }
    }

    /// Record a copy of the target's texture into this buffer.
    pub fn copy_from(&self, encoder: &mut wgpu::CommandEncoder, target: &RenderTarget) {
        let (width, height) = self.size;
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: target.texture(),
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.padded_row_bytes),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Aligned bytes per row of the staging layout.
    pub fn padded_row_bytes(&self) -> u32 {
        self.padded_row_bytes
    }

    /// Block until the copy is visible, then return the pixels without row
    /// padding. The buffer is unmapped again so the next copy can reuse it.
    pub fn read_pixels(&self, device: &wgpu::Device) -> Vec<u8> {
        let slice = self.buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            tx.send(result).unwrap();
        });
        device.poll(wgpu::PollType::wait_indefinitely()).unwrap();
        rx.recv().unwrap().unwrap();

        let (width, height) = self.size;
        let mapped = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for padded_row in mapped.chunks(self.padded_row_bytes as usize) {
            pixels.extend_from_slice(&padded_row[..self.row_bytes as usize]);
        }
        drop(mapped);
        self.buffer.unmap();
        pixels
    }
}
