use std::hint::black_box;
use std::time::Instant;

use highway_assets::PrototypeRegistry;
use highway_render::RetainedScene;
use highway_stream::{SegmentFactory, SegmentWindow, StreamConfig};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn bench_segment_create(iterations: usize) {
    let factory = SegmentFactory::new(StreamConfig::default());
    let prototypes = PrototypeRegistry::with_placeholders();
    let mut rng = StdRng::seed_from_u64(7);

    let start = Instant::now();
    for i in 0..iterations {
        let _ = black_box(factory.create(black_box(i as f32), &prototypes, &mut rng));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  segment create ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_window_advance(speed: f32, iterations: usize) {
    let config = StreamConfig::default();
    let factory = SegmentFactory::new(config.clone());
    let prototypes = PrototypeRegistry::with_placeholders();
    let mut rng = StdRng::seed_from_u64(7);
    let mut scene = RetainedScene::new();
    let mut window = SegmentWindow::new(config);
    window.bootstrap(&factory, &prototypes, &mut rng, &mut scene);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(window.advance(
            black_box(speed),
            &factory,
            &prototypes,
            &mut rng,
            &mut scene,
        ));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    let (added, removed) = scene.churn();
    println!(
        "  advance (speed {speed}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}, scene churn +{added}/-{removed}"
    );
}

fn bench_shoulder_bands(bands: u32, iterations: usize) {
    let config = StreamConfig {
        shoulder_bands: bands,
        ..StreamConfig::default()
    };
    let factory = SegmentFactory::new(config);
    let prototypes = PrototypeRegistry::with_placeholders();
    let mut rng = StdRng::seed_from_u64(7);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(factory.create(0.0, &prototypes, &mut rng).scene_node());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  create + scene node ({bands} bands, {iterations} iters): {per_iter:?}/iter");
}

fn main() {
    println!("=== Window Stream Benchmarks ===\n");

    println!("Segment factory:");
    bench_segment_create(1000);
    bench_segment_create(10000);

    println!("\nWindow advance:");
    bench_window_advance(0.1, 10000);
    bench_window_advance(2.0, 10000);
    bench_window_advance(5.0, 10000);

    println!("\nShoulder bands:");
    bench_shoulder_bands(1, 5000);
    bench_shoulder_bands(2, 5000);
    bench_shoulder_bands(4, 5000);

    println!("\n=== Done ===");
}
