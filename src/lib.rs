//! Wavescroll Core
//!
//! GPU-accelerated zoomable waveform viewer library.
//!
//! # Features
//!
//! - Audio loading (WAV, MP3, FLAC, AAC) via Symphonia
//! - Bit-exact packing of f32 samples into GPU texture bytes
//! - Two-pass rendering via wgpu: per-column level aggregation, then paint
//! - Scrollbar state machine selecting the visible `[start, end]` window
//! - PNG export of rendered frames via image

pub mod audio;
pub mod gpu;
pub mod scrollbar;
pub mod viewer;

// Re-export commonly used types
pub use audio::{load_audio, AudioData, AudioError};
pub use gpu::{GpuContext, GpuError, RenderConfig, RenderError, WaveformRenderer};
pub use scrollbar::{Cursor, DragState, HoverState, Scrollbar, ScrollbarStyle};
pub use viewer::{LoadStats, ViewerConfig, ViewerError, WaveformViewer};
