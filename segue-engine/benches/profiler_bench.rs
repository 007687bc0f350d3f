//! Energy profiling performance benchmark
//!
//! Profiling is the dominant cost of track analysis and runs over every
//! sample of a track on the blocking pool.
//!
//! Target: >100x realtime for 44.1kHz stereo input

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use segue_engine::analysis::{detect_intro_end, detect_outro_start, energy_gradient, EnergyProfiler};
use std::time::Instant;

const SAMPLE_RATE: u32 = 44_100;
const CHANNELS: usize = 2;
const BLOCK_SAMPLES: usize = 8192;

/// Interleaved stereo sine sweep with a quiet head and tail
fn synthetic_track(seconds: usize) -> Vec<f32> {
    let frames = seconds * SAMPLE_RATE as usize;
    let mut samples = Vec::with_capacity(frames * CHANNELS);
    for i in 0..frames {
        let t = i as f32 / SAMPLE_RATE as f32;
        let envelope = if t < 10.0 {
            t / 10.0
        } else if t > seconds as f32 - 10.0 {
            (seconds as f32 - t) / 10.0
        } else {
            1.0
        };
        let sample = envelope * (t * 220.0 * std::f32::consts::TAU).sin() * 0.8;
        samples.push(sample);
        samples.push(sample * 0.9);
    }
    samples
}

fn bench_profile_track(c: &mut Criterion) {
    let mut group = c.benchmark_group("energy_profile");
    group.sample_size(20);

    for seconds in [30usize, 180] {
        let samples = synthetic_track(seconds);
        group.bench_function(BenchmarkId::new("profile", format!("{}s", seconds)), |b| {
            b.iter(|| {
                let start = Instant::now();

                let mut profiler = EnergyProfiler::new(SAMPLE_RATE, CHANNELS, 0.5)
                    .expect("valid profiler parameters");
                for block in samples.chunks(BLOCK_SAMPLES) {
                    profiler.push_block(block);
                }
                let profile = profiler.finish();
                black_box(&profile);

                let realtime_factor = seconds as f64 / start.elapsed().as_secs_f64();
                if realtime_factor < 100.0 {
                    eprintln!(
                        "WARNING: {}s profile at {:.1}x is below the 100x realtime target",
                        seconds, realtime_factor
                    );
                }
            });
        });
    }

    group.finish();
}

fn bench_boundary_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("boundary_detection");

    // Profile of a 3 minute track at the default segment length
    let samples = synthetic_track(180);
    let mut profiler =
        EnergyProfiler::new(SAMPLE_RATE, CHANNELS, 0.5).expect("valid profiler parameters");
    for block in samples.chunks(BLOCK_SAMPLES) {
        profiler.push_block(block);
    }
    let profile = profiler.finish();

    group.bench_function("detect_and_grade", |b| {
        b.iter(|| {
            let intro = detect_intro_end(&profile);
            let outro = detect_outro_start(&profile);
            let gradient = energy_gradient(&profile, intro);
            black_box((intro, outro, gradient));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_profile_track, bench_boundary_detection);
criterion_main!(benches);
