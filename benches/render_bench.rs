//! Benchmarks for GPU rendering operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wavescroll::audio::synth::generate_sine;
use wavescroll::gpu::{RenderConfig, WaveformRenderer};

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("GPU Rendering");

    let config = RenderConfig {
        width: 900,
        height: 350,
        ..Default::default()
    };

    let mut renderer = match pollster::block_on(WaveformRenderer::new(config)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Skipping GPU benchmarks: {}", e);
            return;
        }
    };

    let samples = generate_sine(440.0, 44100, 10.0, 0.8);
    renderer.set_audio_samples(&samples).unwrap();
    renderer.draw().unwrap();

    group.bench_function("draw_900x350", |b| {
        b.iter(|| {
            renderer.draw().unwrap();
            black_box(renderer.read_pixels().unwrap());
        });
    });

    group.finish();
}

fn bench_scroll_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scroll Updates");

    let config = RenderConfig {
        width: 900,
        height: 350,
        ..Default::default()
    };

    let mut renderer = match pollster::block_on(WaveformRenderer::new(config)) {
        Ok(r) => r,
        Err(_) => return,
    };

    let samples = generate_sine(440.0, 44100, 10.0, 0.8);
    renderer.set_audio_samples(&samples).unwrap();

    // Each scroll update triggers a full two-pass redraw.
    group.bench_function("set_scroll_range", |b| {
        let mut tick = 0u32;
        b.iter(|| {
            let start = (tick % 50) as f32 / 100.0;
            renderer.set_scroll_range(start, start + 0.5).unwrap();
            tick += 1;
        });
    });

    group.finish();
}

fn bench_sample_upload(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sample Upload");

    for seconds in [1u32, 10, 60] {
        let config = RenderConfig::default();
        let mut renderer = match pollster::block_on(WaveformRenderer::new(config)) {
            Ok(r) => r,
            Err(_) => continue,
        };

        let samples = generate_sine(440.0, 44100, seconds as f32, 0.8);

        group.bench_with_input(
            BenchmarkId::new("set_audio_samples", seconds),
            &samples,
            |b, samples| {
                b.iter(|| {
                    renderer.set_audio_samples(black_box(samples)).unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_draw, bench_scroll_update, bench_sample_upload);
criterion_main!(benches);
