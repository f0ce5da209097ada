//! Benchmarks for shape insertion and array resizing
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gridflow::data::{ContainerRegistry, DataArray};
use gridflow::pipeline::filters::{CreateImageGeometry, InsertShape};
use gridflow::pipeline::{NullObserver, Pipeline};
use gridflow::shape::{gamma, ShapeKind, ShapeOps};

fn grain_pipeline(size: usize, kind: ShapeKind) -> Pipeline {
    let center = size as f64 / 2.0;
    let volume = (size * size * size) as f64 / 4.0;
    let mut pipeline = Pipeline::new("bench");
    pipeline.push(CreateImageGeometry::new("ImageDataContainer", [size; 3]));
    pipeline.push(InsertShape::new(kind, [center; 3], volume).with_aspect(0.8, 0.6));
    pipeline
}

fn bench_shape_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape_insertion");

    for size in [16usize, 32, 64].iter() {
        group.throughput(Throughput::Elements((size * size * size) as u64));
        for kind in [ShapeKind::Ellipsoid, ShapeKind::SuperEllipsoid, ShapeKind::Cylinder] {
            group.bench_with_input(BenchmarkId::new(kind.as_str(), size), size, |b, &size| {
                let mut pipeline = grain_pipeline(size, kind);
                b.iter(|| {
                    let mut registry = ContainerRegistry::new();
                    let report = pipeline.run(&mut registry, &mut NullObserver);
                    black_box(report.filters_executed)
                });
            });
        }
    }

    group.finish();
}

fn bench_inside_test(c: &mut Criterion) {
    let ops = ShapeOps::for_kind(ShapeKind::SuperEllipsoid, 3.5);
    c.bench_function("super_ellipsoid_inside_test", |b| {
        b.iter(|| ops.inside_test(black_box(0.3), black_box(0.4), black_box(0.5)))
    });
    c.bench_function("gamma", |b| b.iter(|| gamma(black_box(1.0 + 2.0 / 3.5))));
}

fn bench_array_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("array_resize");

    for tuples in [1_000usize, 100_000, 1_000_000].iter() {
        group.throughput(Throughput::Elements(*tuples as u64));
        group.bench_with_input(BenchmarkId::new("grow_f32x3", tuples), tuples, |b, &tuples| {
            b.iter(|| {
                let mut array = DataArray::new::<f32>("Volumes", 0, 3).unwrap();
                array.resize(black_box(tuples)).unwrap();
                black_box(array.len())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shape_insertion, bench_inside_test, bench_array_resize);
criterion_main!(benches);
