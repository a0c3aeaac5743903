//! Benchmarks for the scrollbar state machine and its software painter.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wavescroll::scrollbar::Scrollbar;

fn bench_pointer_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scrollbar Input");

    // Hover-only movement: hit tests plus a repaint per move.
    group.bench_function("hover_sweep", |b| {
        let mut scrollbar = Scrollbar::new(900, 50);
        b.iter(|| {
            for x in (0..900).step_by(30) {
                scrollbar.pointer_move(black_box(x as f32), 25.0);
            }
        });
    });

    // Full handle drag: window math, callback dispatch, repaint.
    group.bench_function("handle_drag_sweep", |b| {
        let mut scrollbar = Scrollbar::new(900, 50);
        scrollbar.set_on_scroll(|start, end| {
            black_box((start, end));
        });
        b.iter(|| {
            scrollbar.pointer_move(25.0, 25.0);
            scrollbar.pointer_down(25.0, 25.0);
            for x in (25..875).step_by(50) {
                scrollbar.pointer_move(x as f32, 25.0);
            }
            // Return the handle so the next iteration starts identically.
            scrollbar.pointer_move(25.0, 25.0);
            scrollbar.pointer_up(25.0, 25.0);
        });
    });

    group.finish();
}

fn bench_repaint_widths(c: &mut Criterion) {
    let mut group = c.benchmark_group("Scrollbar Repaint");

    for width in [300u32, 900, 1920] {
        group.bench_with_input(BenchmarkId::new("resize", width), &width, |b, &width| {
            let mut scrollbar = Scrollbar::new(width, 50);
            b.iter(|| {
                // Resize repaints the whole surface.
                scrollbar.resize(black_box(width), 50);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pointer_moves, bench_repaint_widths);
criterion_main!(benches);
