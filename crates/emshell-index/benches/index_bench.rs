//! Benchmarks for emshell lattice indexing
//!
//! Measures performance of:
//! - Shell decode / encode
//! - Series index conversions
//! - Cache lookups and cache construction
//! - Shell traversal against cube traversal

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use emshell_index::{
    coord_to_series, decode, encode, points_at, series_to_coord, total_points_in_sphere,
    BuildStrategy, CubicShells, LatticeCoord, SeriesIndex, ShellWalk, Silent, SphereIndexCache,
    DEFAULT_REPORT_INTERVAL,
};

/// Benchmark local index to coordinate conversion
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for &shell in &[1u64, 10, 100, 1000] {
        let last = points_at(shell) - 1;
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("shell", shell), &shell, |b, &r| {
            b.iter(|| decode(black_box(r), black_box(last)))
        });
    }
    group.finish();
}

/// Benchmark coordinate to local index conversion
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    let coords = [
        LatticeCoord::new(1, 0, 0),
        LatticeCoord::new(5, -3, 2),
        LatticeCoord::new(10, -5, 8),
        LatticeCoord::new(-20, 50, 30),
        LatticeCoord::new(100, -50, -100),
    ];

    for coord in coords {
        let shell = coord.radius();
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("shell", shell), &coord, |b, &c| {
            b.iter(|| encode(shell, black_box(c)))
        });
    }
    group.finish();
}

/// Benchmark global series index round trip
fn bench_series_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("series_roundtrip");

    for &index in &[0u64, 100, 10_000, 1_000_000] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(index), &index, |b, &idx| {
            b.iter(|| {
                let coord = series_to_coord(SeriesIndex(black_box(idx)));
                coord_to_series(coord)
            })
        });
    }
    group.finish();
}

/// Benchmark cache lookup against computing the index
fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    let cache = SphereIndexCache::initialize(40).expect("cache");
    let coord = LatticeCoord::new(17, -40, 3);

    group.bench_function("cache", |b| b.iter(|| cache.lookup(black_box(coord))));
    group.bench_function("computed", |b| b.iter(|| coord_to_series(black_box(coord))));
    group.finish();
}

/// Benchmark cache construction with both strategies
fn bench_cache_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_build");
    group.sample_size(20);

    for &radius in &[8u64, 16, 32] {
        group.throughput(Throughput::Elements(total_points_in_sphere(radius)));
        for strategy in [BuildStrategy::Direct, BuildStrategy::Reflected] {
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), radius),
                &radius,
                |b, &r| {
                    b.iter(|| {
                        SphereIndexCache::build(
                            &CubicShells,
                            r,
                            strategy,
                            &mut Silent,
                            DEFAULT_REPORT_INTERVAL,
                        )
                    })
                },
            );
        }
    }
    group.finish();
}

/// Benchmark walking the sphere shell by shell against a plain cube loop
fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");

    for &radius in &[8u64, 32] {
        let side = 2 * radius as i64 + 1;
        group.throughput(Throughput::Elements(total_points_in_sphere(radius)));

        group.bench_with_input(BenchmarkId::new("shell", radius), &radius, |b, &r| {
            b.iter(|| ShellWalk::shells(0, r).map(black_box).count())
        });

        group.bench_with_input(BenchmarkId::new("cube", radius), &side, |b, &s| {
            b.iter(|| {
                let mut count = 0u64;
                for i in 0..s {
                    for j in 0..s {
                        for k in 0..s {
                            black_box((i, j, k));
                            count += 1;
                        }
                    }
                }
                count
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_decode,
    bench_encode,
    bench_series_roundtrip,
    bench_lookup,
    bench_cache_build,
    bench_traversal,
);

criterion_main!(benches);
