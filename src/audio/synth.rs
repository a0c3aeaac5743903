//! Deterministic test signals.
//!
//! Tests, benches, and the demo need sample buffers with known shapes:
//! a sine for "does anything draw", seeded noise for texture, and a ramp
//! whose rising envelope makes per-column levels easy to reason about.

use std::f32::consts::TAU;

fn sample_count(sample_rate: u32, duration: f32) -> usize {
    (duration * sample_rate as f32) as usize
}

/// A sine tone of the given frequency, length, and amplitude.
pub fn generate_sine(frequency: f32, sample_rate: u32, duration: f32, amplitude: f32) -> Vec<f32> {
    let phase_step = TAU * frequency / sample_rate as f32;
    (0..sample_count(sample_rate, duration))
        .map(|i| amplitude * (i as f32 * phase_step).sin())
        .collect()
}

/// Seeded white noise; identical seeds yield identical buffers.
pub fn generate_white_noise(
    sample_rate: u32,
    duration: f32,
    amplitude: f32,
    seed: u64,
) -> Vec<f32> {
    // Knuth's MMIX linear congruential generator.
    const MUL: u64 = 6364136223846793005;
    const INC: u64 = 1442695040888963407;

    let mut state = seed;
    (0..sample_count(sample_rate, duration))
        .map(|_| {
            state = state.wrapping_mul(MUL).wrapping_add(INC);
            let unit = state as f32 / u64::MAX as f32;
            amplitude * (unit * 2.0 - 1.0)
        })
        .collect()
}

/// A linear amplitude ramp from 0.0 up to `amplitude`.
///
/// Zooming the scroll window into the start of the ramp must lower every
/// rendered level, which makes this the fixture for scroll-window tests.
pub fn generate_ramp(num_samples: usize, amplitude: f32) -> Vec<f32> {
    if num_samples <= 1 {
        return vec![0.0; num_samples];
    }
    let slope = amplitude / (num_samples - 1) as f32;
    (0..num_samples).map(|i| slope * i as f32).collect()
}
