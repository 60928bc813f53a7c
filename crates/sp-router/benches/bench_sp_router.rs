use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use sp_core::config::RouteRule;
use sp_router::RoutingTable;
use std::path::PathBuf;

fn table() -> RoutingTable {
    RoutingTable::new(vec![
        RouteRule { start: 1000, end: 2299, dest: PathBuf::from("dest/25") },
        RouteRule { start: 2300, end: 2999, dest: PathBuf::from("dest/29") },
        RouteRule { start: 3000, end: 3999, dest: PathBuf::from("dest/28") },
        RouteRule { start: 5000, end: 6999, dest: PathBuf::from("dest/26") },
        RouteRule { start: 7500, end: 7999, dest: PathBuf::from("dest/30") },
        RouteRule { start: 8000, end: 8999, dest: PathBuf::from("dest/27") },
        RouteRule { start: 9700, end: 9999, dest: PathBuf::from("dest/31") },
    ])
}

fn bench_route(c: &mut Criterion) {
    let table = table();
    let mut rng = StdRng::seed_from_u64(42);
    let ids: Vec<u32> = (0..1000).map(|_| rng.gen_range(0..10_000)).collect();

    c.bench_function("route_1000_random_ids", |b| {
        b.iter(|| {
            for id in &ids {
                black_box(table.route(*id));
            }
        })
    });

    c.bench_function("route_1000_last_range", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                black_box(table.route(9800));
            }
        })
    });
}

criterion_group!(benches, bench_route);
criterion_main!(benches);
