//! Benchmarks for the CPU simulation core.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use driftfield::{FieldConfig, ParticleField};

const SURFACES: [(f32, f32); 3] = [(1280.0, 720.0), (1920.0, 1080.0), (3840.0, 2160.0)];

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_step");

    for (width, height) in SURFACES {
        let mut field = ParticleField::with_seed(width, height, FieldConfig::default(), 7);
        field.set_pointer(width / 2.0, height / 2.0);
        let label = format!("{}x{} ({} particles)", width, height, field.particle_count());

        group.bench_function(BenchmarkId::new("step", label), |b| {
            b.iter(|| {
                field.step();
                black_box(field.particle_count())
            })
        });
    }

    group.finish();
}

fn bench_connections(c: &mut Criterion) {
    let mut group = c.benchmark_group("connections");

    for (width, height) in SURFACES {
        let field = ParticleField::with_seed(width, height, FieldConfig::default(), 7);
        let cap = field.link_capacity();
        let label = format!("{}x{} ({} particles)", width, height, field.particle_count());

        // The O(n²) pair scan is the hot path worth watching as surfaces grow.
        group.bench_function(BenchmarkId::new("collect", label), |b| {
            b.iter(|| black_box(field.connections(cap).len()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_connections);
criterion_main!(benches);
