use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use relief_core::{
    BoxBlur, Displacement, Fractal2D, IsoRenderer, TerrainConfig, TerrainPalette, WaterPolicy,
    classify_water, generate_terrain, resample2,
};

const SIDE: usize = 257;
const WIDTH: usize = 320;
const HEIGHT: usize = 200;
const SEED: u64 = 2025;
const SEA_LEVEL: f64 = 0.35;

fn bench_diamond_square(c: &mut Criterion) {
    let fractal = Fractal2D::new(SIDE, 1.0, 0.65, Displacement::Clamped).unwrap();
    c.bench_function("Fractal2D diamond-square 257²", |b| {
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(SEED);
            black_box(fractal.generate(&mut rng).unwrap())
        })
    });
}

fn bench_resample(c: &mut Criterion) {
    let square = Fractal2D::new(SIDE, 1.0, 0.65, Displacement::Clamped)
        .unwrap()
        .generate_seeded(SEED)
        .unwrap();
    c.bench_function("resample2 257² -> 320×200", |b| {
        b.iter(|| black_box(resample2(&square, WIDTH, HEIGHT).unwrap()))
    });
}

fn bench_box_blur(c: &mut Criterion) {
    let map = generate_terrain(&TerrainConfig::geo(WIDTH, HEIGHT, SEED)).unwrap();
    for (radius, passes) in [(1, 1), (1, 4), (3, 2)] {
        let blur = BoxBlur::new(radius, passes);
        c.bench_function(&format!("BoxBlur r={radius} p={passes}"), |b| {
            b.iter(|| black_box(blur.apply(map.clone()).unwrap()))
        });
    }
}

fn bench_water(c: &mut Criterion) {
    let map = generate_terrain(&TerrainConfig::geo(WIDTH, HEIGHT, SEED)).unwrap();
    c.bench_function("classify_water edge flood", |b| {
        b.iter(|| black_box(classify_water(&map, SEA_LEVEL, WaterPolicy::EdgeFlood, None).unwrap()))
    });
    c.bench_function("classify_water fill all", |b| {
        b.iter(|| black_box(classify_water(&map, SEA_LEVEL, WaterPolicy::FillAll, None).unwrap()))
    });
}

fn bench_full_geo(c: &mut Criterion) {
    let mut cfg = TerrainConfig::geo(WIDTH, HEIGHT, SEED);
    cfg.smoothing = BoxBlur::three_by_three(2);
    let palette = TerrainPalette::default();
    c.bench_function("geo pipeline + water + color map", |b| {
        b.iter(|| {
            let map = generate_terrain(&cfg).unwrap();
            let mask = classify_water(&map, SEA_LEVEL, WaterPolicy::EdgeFlood, None).unwrap();
            black_box(palette.render_map(&map, Some(&mask), SEA_LEVEL).unwrap())
        })
    });
}

fn bench_iso(c: &mut Criterion) {
    let map = generate_terrain(&TerrainConfig::geo(96, 96, SEED)).unwrap();
    let renderer = IsoRenderer::default();
    c.bench_function("IsoRenderer 96² default tiles", |b| {
        b.iter(|| black_box(renderer.render(&map).unwrap()))
    });
}

criterion_group!(
    terrain_benchmarks,
    bench_diamond_square,
    bench_resample,
    bench_box_blur,
    bench_water,
    bench_full_geo,
    bench_iso
);
criterion_main!(terrain_benchmarks);
