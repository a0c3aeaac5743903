//! GPU rendering using wgpu.
//!
//! Headless two-pass waveform rendering: raw sample bytes live in an
//! `Rgba8Uint` texture, an aggregation pass reduces the visible window to
//! one level per output column, and a paint pass shades the output surface
//! from those levels.

pub mod context;
pub mod layouts;
pub mod pipelines;
pub mod precision;
pub mod renderer;
pub mod sample_texture;
pub mod targets;

pub use context::{GpuContext, GpuError};
pub use pipelines::{LevelPipeline, PaintPipeline};
pub use renderer::{RenderConfig, RenderError, WaveformRenderer};
pub use sample_texture::SampleTexture;
pub use targets::{ReadbackBuffer, RenderTarget};
