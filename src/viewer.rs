//! Host-side wiring of renderer and scrollbar.
//!
//! The viewer owns both components and relays between them: scrollbar
//! changes reach the renderer synchronously before the scrollbar repaints,
//! file loads feed decoded samples into the renderer, and resizes go to
//! both surfaces.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::audio::loader::{load_audio, AudioError};
use crate::gpu::{RenderConfig, RenderError, WaveformRenderer};
use crate::scrollbar::{Cursor, Scrollbar, ScrollbarStyle};

/// Errors that can occur while driving the viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Frame byte length does not match the configured surface size")]
    FrameSize,
}

/// Viewer layout and colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub wave_width: u32,
    pub wave_height: u32,
    pub scrollbar_height: u32,
    pub foreground: [f32; 4],
    pub background: [f32; 4],
    pub scrollbar_style: ScrollbarStyle,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let render = RenderConfig::default();
        Self {
            wave_width: render.width,
            wave_height: render.height,
            scrollbar_height: 50,
            foreground: render.foreground,
            background: render.background,
            scrollbar_style: ScrollbarStyle::default(),
        }
    }
}

impl ViewerConfig {
    /// Load a configuration from a JSON file; missing fields take their
    /// defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ViewerError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn to_render_config(&self) -> RenderConfig {
        RenderConfig {
            width: self.wave_width,
            height: self.wave_height,
            foreground: self.foreground,
            background: self.background,
        }
    }
}

/// Timings and sizes for one file load, mirrored to the log.
#[derive(Debug, Clone, Serialize)]
pub struct LoadStats {
    pub duration_secs: f64,
    pub sample_count: usize,
    pub decode_ms: f64,
    pub upload_draw_ms: f64,
}

/// Waveform viewer: a renderer plus the scrollbar that windows it.
pub struct WaveformViewer {
    renderer: Rc<RefCell<WaveformRenderer>>,
    scrollbar: Scrollbar,
    config: ViewerConfig,
}

impl WaveformViewer {
    /// Create the viewer and wire the scroll relay.
    pub async fn new(config: ViewerConfig) -> Result<Self, ViewerError> {
        let renderer = WaveformRenderer::new(config.to_render_config()).await?;
        let renderer = Rc::new(RefCell::new(renderer));

        let mut scrollbar = Scrollbar::with_style(
            config.wave_width,
            config.scrollbar_height,
            config.scrollbar_style.clone(),
        );

        // The scrollbar invokes this before its own repaint, so the renderer
        // never lags a frame behind the scrollbar within one gesture tick.
        let relay = Rc::clone(&renderer);
        scrollbar.set_on_scroll(move |start, end| {
            if let Err(err) = relay.borrow_mut().set_scroll_range(start, end) {
                log::warn!("scroll update dropped: {err}");
            }
        });

        Ok(Self {
            renderer,
            scrollbar,
            config,
        })
    }

    /// Decode an audio file, load channel 0, and draw it.
    pub fn load_file(&mut self, path: &Path) -> Result<LoadStats, ViewerError> {
        let decode_started = Instant::now();
        let audio = load_audio(path)?;
        let samples = audio.channel(0);
        let decode_ms = decode_started.elapsed().as_secs_f64() * 1e3;

        let draw_started = Instant::now();
        self.load_samples(&samples)?;
        let upload_draw_ms = draw_started.elapsed().as_secs_f64() * 1e3;

        let stats = LoadStats {
            duration_secs: audio.duration(),
            sample_count: samples.len(),
            decode_ms,
            upload_draw_ms,
        };
        log::debug!(
            "{:.1}s of audio ({} samples): decoded in {:.1} ms, drawn in {:.1} ms",
            stats.duration_secs,
            stats.sample_count,
            stats.decode_ms,
            stats.upload_draw_ms
        );
        Ok(stats)
    }

    /// Load pre-decoded samples and draw them at the configured size.
    pub fn load_samples(&mut self, samples: &[f32]) -> Result<(), ViewerError> {
        let mut renderer = self.renderer.borrow_mut();
        renderer.set_audio_samples(samples)?;
        renderer.resize(self.config.wave_width, self.config.wave_height)?;
        Ok(())
    }

    /// Relay a width change to both drawing surfaces.
    pub fn resize(&mut self, width: u32) -> Result<(), ViewerError> {
        self.config.wave_width = width;
        self.renderer
            .borrow_mut()
            .resize(width, self.config.wave_height)?;
        self.scrollbar.resize(width, self.config.scrollbar_height);
        Ok(())
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.scrollbar.pointer_down(x, y);
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.scrollbar.pointer_move(x, y);
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.scrollbar.pointer_up(x, y);
    }

    /// Cursor the host should show over the scrollbar.
    pub fn cursor(&self) -> Cursor {
        self.scrollbar.cursor()
    }

    /// The scrollbar, for reading its window and surface.
    pub fn scrollbar(&self) -> &Scrollbar {
        &self.scrollbar
    }

    /// Current scroll window.
    pub fn scroll_range(&self) -> (f32, f32) {
        self.scrollbar.scroll_range()
    }

    /// Viewer configuration.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Get info about the GPU adapter.
    pub fn adapter_info(&self) -> Result<wgpu::AdapterInfo, ViewerError> {
        Ok(self.renderer.borrow().adapter_info()?)
    }

    /// Read the rendered waveform frame as tightly packed RGBA pixels.
    pub fn waveform_pixels(&self) -> Result<Vec<u8>, ViewerError> {
        Ok(self.renderer.borrow().read_pixels()?)
    }

    /// Export the current waveform frame as a PNG file.
    pub fn export_png(&self, path: &Path) -> Result<(), ViewerError> {
        let pixels = self.waveform_pixels()?;
        let image = image::RgbaImage::from_raw(
            self.config.wave_width,
            self.config.wave_height,
            pixels,
        )
        .ok_or(ViewerError::FrameSize)?;
        image.save(path)?;
        Ok(())
    }
}
