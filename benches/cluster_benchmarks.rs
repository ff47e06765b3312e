use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use supercluster::{Options, PointFeature, Supercluster};

fn grid_points(n: usize) -> Vec<PointFeature> {
    let side = (n as f64).sqrt().ceil() as usize;
    (0..n)
        .map(|i| {
            let lng = -170.0 + (i % side) as f64 * (340.0 / side as f64);
            let lat = -70.0 + (i / side) as f64 * (140.0 / side as f64);
            PointFeature::new(lng, lat).with_id(i as u64)
        })
        .collect()
}

fn benchmark_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    group.sample_size(10);

    for size in [1_000, 10_000, 100_000] {
        let points = grid_points(size);
        group.bench_with_input(BenchmarkId::new("build", size), &points, |b, points| {
            b.iter(|| Supercluster::new(black_box(points.clone()), Options::default()).unwrap())
        });
    }

    group.finish();
}

fn benchmark_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");

    let index = Supercluster::new(grid_points(100_000), Options::default()).unwrap();

    group.bench_function("get_tile_z0", |b| {
        b.iter(|| index.get_tile(black_box(0), 0, 0).unwrap())
    });

    group.bench_function("get_tile_z6", |b| {
        b.iter(|| index.get_tile(black_box(6), 32, 24).unwrap())
    });

    let top = index
        .zoom_level(0)
        .unwrap()
        .clusters()
        .iter()
        .filter(|c| !c.is_leaf())
        .max_by_key(|c| c.num_points)
        .map(|c| c.id)
        .unwrap();

    group.bench_function("get_leaves_100", |b| {
        b.iter(|| index.get_leaves(black_box(top), 100, 0).unwrap())
    });

    group.bench_function("get_cluster_expansion_zoom", |b| {
        b.iter(|| index.get_cluster_expansion_zoom(black_box(top)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, benchmark_construction, benchmark_queries);
criterion_main!(benches);
