//! Packed sample storage.
//!
//! Samples live in an `Rgba8Uint` texture, one 32-bit float per RGBA texel:
//! the float's little-endian bytes are copied into the texel verbatim and
//! reassembled bit-for-bit inside the aggregation shader
//! (`r | g << 8 | b << 16 | a << 24`, then `bitcast<f32>`). The pack side
//! here and the unpack side in `shaders/levels.wgsl` must agree; the
//! round-trip tests below pin that contract down.

use wgpu::{Device, Queue, Texture, TextureView};

/// Texture layout for a sample count: width is capped at the device limit,
/// rows wrap.
pub fn texture_extent(sample_count: usize, max_dim: u32) -> (u32, u32) {
    let width = (sample_count as u64).clamp(1, max_dim as u64) as u32;
    let height = (sample_count as u64).div_ceil(width as u64).max(1) as u32;
    (width, height)
}

/// Stride needed to fit `sample_count` samples into a `max_dim` x `max_dim`
/// texture; 1 when no reduction is needed.
pub fn downsample_stride(sample_count: usize, max_dim: u32) -> usize {
    let capacity = max_dim as u64 * max_dim as u64;
    (sample_count as u64).div_ceil(capacity).max(1) as usize
}

/// Take every `stride`-th sample.
///
/// The reduced sequence permanently replaces the original for rendering;
/// the full-resolution buffer is not retained.
pub fn downsample(samples: &[f32], stride: usize) -> Vec<f32> {
    samples.iter().step_by(stride).copied().collect()
}

/// GPU-resident packed sample texture with grow-only capacity.
///
/// The texture and its CPU staging buffer are reallocated only when a new
/// sample count does not fit, and only grown, never shrunk, so capacity is
/// amortized across file loads.
pub struct SampleTexture {
    texture: Texture,
    view: TextureView,
    size: (u32, u32),
    staging: Vec<u8>,
    sample_count: usize,
    max_dim: u32,
}

impl SampleTexture {
    /// Create an empty sample texture (1x1 placeholder until the first
    /// upload).
    pub fn new(device: &Device, max_dim: u32) -> Self {
        let (texture, view) = create_texture(device, 1, 1);
        Self {
            texture,
            view,
            size: (1, 1),
            staging: vec![0u8; 4],
            sample_count: 0,
            max_dim,
        }
    }

    /// Replace the stored samples.
    ///
    /// Applies the downsampling policy when the sequence cannot fit even at
    /// maximum texture extent, grows the texture if the current capacity is
    /// insufficient, repacks all sample bytes and uploads them. Returns the
    /// sample count that was stored (post-stride).
    pub fn upload(&mut self, device: &Device, queue: &Queue, samples: &[f32]) -> usize {
        let stride = downsample_stride(samples.len(), self.max_dim);
        let reduced;
        let samples: &[f32] = if stride > 1 {
            reduced = downsample(samples, stride);
            &reduced
        } else {
            samples
        };

        let required = samples.len() * 4;
        if required > self.staging.len() {
            let (width, height) = texture_extent(samples.len(), self.max_dim);
            let (texture, view) = create_texture(device, width, height);
            self.texture = texture;
            self.view = view;
            self.size = (width, height);
            self.staging = vec![0u8; width as usize * height as usize * 4];
        }

        // Raw byte copy, no numeric conversion: the shader reassembles each
        // texel's bytes into the original f32.
        self.staging[..required].copy_from_slice(bytemuck::cast_slice(samples));
        self.staging[required..].fill(0);

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &self.staging,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.size.0 * 4),
                rows_per_image: Some(self.size.1),
            },
            wgpu::Extent3d {
                width: self.size.0,
                height: self.size.1,
                depth_or_array_layers: 1,
            },
        );

        self.sample_count = samples.len();
        self.sample_count
    }

    /// Texture view for binding into the aggregation pass.
    pub fn view(&self) -> &TextureView {
        &self.view
    }

    /// Current texture extent in texels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Number of samples currently stored (post-stride).
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Capacity in bytes. Never shrinks across uploads.
    pub fn capacity_bytes(&self) -> usize {
        self.staging.len()
    }
}

fn create_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("sample_texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Uint,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::GpuContext;

    #[test]
    fn test_texture_extent_caps_width() {
        assert_eq!(texture_extent(100, 2048), (100, 1));
        assert_eq!(texture_extent(2048, 2048), (2048, 1));
        assert_eq!(texture_extent(2049, 2048), (2048, 2));
        assert_eq!(texture_extent(132_300, 8192), (8192, 17));
    }

    #[test]
    fn test_texture_extent_degenerate() {
        assert_eq!(texture_extent(0, 2048), (1, 1));
        assert_eq!(texture_extent(1, 2048), (1, 1));
    }

    #[test]
    fn test_downsample_stride_formula() {
        let max_dim = 2048u32;
        let capacity = (max_dim as usize).pow(2);
        assert_eq!(downsample_stride(capacity, max_dim), 1);
        assert_eq!(downsample_stride(capacity + 1, max_dim), 2);
        assert_eq!(downsample_stride(3 * capacity, max_dim), 3);

        // Strided length always fits the texture again.
        for len in [capacity + 1, 2 * capacity + 17, 5 * capacity] {
            let stride = downsample_stride(len, max_dim);
            assert_eq!(stride, len.div_ceil(capacity));
            assert!(len.div_ceil(stride) <= capacity);
        }
    }

    #[test]
    fn test_downsample_takes_every_nth() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert_eq!(downsample(&samples, 3), vec![0.0, 3.0, 6.0, 9.0]);
        assert_eq!(downsample(&samples, 1).len(), 10);
    }

    #[test]
    fn test_packed_bytes_round_trip_bit_exact() {
        // The shader rebuilds bits as r | g<<8 | b<<16 | a<<24; model that
        // here against the host-side little-endian pack.
        let samples = [0.0f32, -0.0, 1.0, -1.0, 0.5, f32::MIN_POSITIVE, 1.0e-7];
        let bytes: &[u8] = bytemuck::cast_slice(&samples);
        for (i, &sample) in samples.iter().enumerate() {
            let texel = &bytes[i * 4..i * 4 + 4];
            let bits = u32::from(texel[0])
                | u32::from(texel[1]) << 8
                | u32::from(texel[2]) << 16
                | u32::from(texel[3]) << 24;
            assert_eq!(f32::from_bits(bits).to_bits(), sample.to_bits());
        }
    }

    #[tokio::test]
    async fn test_upload_capacity_never_shrinks() {
        let ctx = match GpuContext::new().await {
            Ok(ctx) => ctx,
            Err(_) => return, // Skip if no GPU
        };

        let mut texture = SampleTexture::new(&ctx.device, ctx.max_texture_dimension());
        texture.upload(&ctx.device, &ctx.queue, &vec![0.25f32; 10_000]);
        let grown = texture.capacity_bytes();
        assert!(grown >= 10_000 * 4);

        texture.upload(&ctx.device, &ctx.queue, &vec![0.5f32; 100]);
        assert_eq!(texture.capacity_bytes(), grown);
        assert_eq!(texture.sample_count(), 100);
    }
}
