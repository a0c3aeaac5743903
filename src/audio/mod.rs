//! Audio decoding and synthetic signal generation.
//!
//! This module provides:
//! - Audio file loading via Symphonia (WAV, MP3, FLAC, AAC)
//! - Deterministic test signals for unit tests, benches, and demos

pub mod loader;
pub mod synth;

pub use loader::{load_audio, AudioData, AudioError};
