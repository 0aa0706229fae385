//! Benchmark: Cache hit performance

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use showcase_viewer::{AssetCache, AssetId};
use std::sync::Arc;

fn cache_hit_perf_benchmark(c: &mut Criterion) {
    let cache = AssetCache::new(100 * 1024 * 1024);
    let ids: Vec<AssetId> = (0..64)
        .map(|i| AssetId::parse(&format!("/models/model_{i}.glb")).unwrap())
        .collect();
    for id in &ids {
        cache.insert(id, Arc::from(vec![0u8; 64 * 1024]));
    }

    c.bench_function("cache_hit", |b| {
        b.iter(|| black_box(cache.get(&ids[17])))
    });

    let missing = AssetId::parse("/models/missing.glb").unwrap();
    c.bench_function("cache_miss", |b| b.iter(|| black_box(cache.get(&missing))));

    c.bench_function("cache_hit_rate", |b| {
        b.iter(|| black_box(cache.metrics().cache_hit_rate()))
    });
}

fn cache_eviction_benchmark(c: &mut Criterion) {
    // Room for four 1MB models; every insert past that evicts
    let cache = AssetCache::new(4 * 1024 * 1024);
    let payload: Arc<[u8]> = Arc::from(vec![0u8; 1024 * 1024]);
    let ids: Vec<AssetId> = (0..16)
        .map(|i| AssetId::parse(&format!("/models/model_{i}.glb")).unwrap())
        .collect();

    let mut next = 0;
    c.bench_function("cache_insert_evicting", |b| {
        b.iter(|| {
            next = (next + 1) % ids.len();
            black_box(cache.insert(&ids[next], Arc::clone(&payload)))
        })
    });
}

criterion_group!(benches, cache_hit_perf_benchmark, cache_eviction_benchmark);
criterion_main!(benches);
