//! Demo: render a synthetic signal and drive the scrollbar programmatically.
//!
//! Run with:
//!     cargo run --example view_sine --features tokio

use wavescroll::audio::synth::{generate_sine, generate_white_noise};
use wavescroll::viewer::{ViewerConfig, WaveformViewer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("Wavescroll - Synthetic Signal Demo");
    println!("==================================\n");

    let sample_rate: u32 = 44100;
    let duration_secs: f32 = 5.0;

    println!("Generating test signal...");
    println!("  Sample rate: {} Hz", sample_rate);
    println!("  Duration: {} seconds", duration_secs);

    // A sine carrier with a noise floor gives the waveform visible texture.
    let mut samples = generate_sine(220.0, sample_rate, duration_secs, 0.7);
    for (sample, noise) in samples
        .iter_mut()
        .zip(generate_white_noise(sample_rate, duration_secs, 0.15, 7))
    {
        *sample += noise;
    }
    println!("  Generated {} samples\n", samples.len());

    println!("Setting up viewer...");
    let config = ViewerConfig::default();
    println!(
        "  Waveform surface: {}x{}",
        config.wave_width, config.wave_height
    );
    println!(
        "  Scrollbar surface: {}x{}",
        config.wave_width, config.scrollbar_height
    );

    let mut viewer = WaveformViewer::new(config).await?;
    let adapter = viewer.adapter_info()?;
    println!("  GPU: {}\n", adapter.name);

    viewer.load_samples(&samples)?;
    viewer.export_png("waveform_full.png".as_ref())?;
    println!("Full view written to waveform_full.png");

    // Drag the right handle from fraction 1.0 to 0.25: geometry for the
    // 900x50 scrollbar is handle radius 25 and track width 850.
    let track = 850.0;
    let radius = 25.0;
    let grab_x = track + radius;
    let target_x = 0.25 * track + radius;

    viewer.pointer_move(grab_x, radius);
    viewer.pointer_down(grab_x, radius);
    viewer.pointer_move(target_x, radius);
    viewer.pointer_up(target_x, radius);

    let (start, end) = viewer.scroll_range();
    println!("Scroll window after drag: ({start:.3}, {end:.3})");

    viewer.export_png("waveform_zoomed.png".as_ref())?;
    println!("Zoomed view written to waveform_zoomed.png");

    Ok(())
}
