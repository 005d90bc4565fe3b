//! Benchmarks for dungeon generation and treasure distribution.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use delve::generation::utils;
use delve::{default_catalog, distribute_treasure, DungeonGenerator, GenerationConfig, Generator};
use std::hint::black_box;

fn benchmark_generate(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("generate");
    let generator = DungeonGenerator::new();

    for features in [20usize, 50] {
        group.bench_with_input(BenchmarkId::new("features", features), &features, |bencher, &features| {
            let mut config = GenerationConfig::for_testing(7);
            config.max_features = features;
            let mut rng = utils::create_rng(&config);
            bencher.iter(|| black_box(generator.generate(&config, &mut rng).unwrap()));
        });
    }
    group.finish();
}

fn benchmark_distribute(criterion: &mut Criterion) {
    let config = GenerationConfig::for_testing(7);
    let mut rng = utils::create_rng(&config);
    let dungeon = DungeonGenerator::new().generate(&config, &mut rng).unwrap();
    let catalog = default_catalog();

    criterion.bench_function("distribute_treasure", |bencher| {
        bencher.iter(|| black_box(distribute_treasure(&catalog, &dungeon.rooms, &config, &mut rng).unwrap()));
    });
}

criterion_group!(benches, benchmark_generate, benchmark_distribute);
criterion_main!(benches);
