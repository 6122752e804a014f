//! Throughput Benchmark for refstore
//!
//! This benchmark measures the performance of the store and its recycler
//! under various workloads. Background tasks are disabled so only the
//! measured operation runs.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use refstore::{Store, StoreBuilder, StoreConfig, Value};
use std::sync::Arc;

fn store() -> Store {
    StoreBuilder::new()
        .config(StoreConfig::default().with_max_records(2_000_000))
        .background_tasks(false)
        .build()
        .expect("valid config")
}

/// Benchmark SET operations
fn bench_set(c: &mut Criterion) {
    let store = store();
    let token = Arc::new(String::from("token"));

    let mut group = c.benchmark_group("set");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_new_key", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i);
            store.set(key, Arc::clone(&token), 600).unwrap();
            i += 1;
        });
    });

    group.bench_function("set_overwrite", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("hot:{}", i % 1_000);
            store.set(key, Arc::clone(&token), 600).unwrap();
            i += 1;
        });
    });

    group.bench_function("set_keep_ttl", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("hot:{}", i % 1_000);
            store.set(key, Arc::clone(&token), 0).unwrap();
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark GET operations
fn bench_get(c: &mut Criterion) {
    let store = store();

    // Pre-populate with data
    for i in 0..100_000 {
        let value = Value::slice(Arc::new(vec![i as u8; 16]));
        store.set(format!("key:{}", i), value, 600).unwrap();
    }

    let mut group = c.benchmark_group("get");
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_existing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("key:{}", i % 100_000);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.bench_function("get_missing", |b| {
        let mut i = 0u64;
        b.iter(|| {
            let key = format!("missing:{}", i);
            black_box(store.get(&key));
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark mixed workload (80% reads, 20% writes)
fn bench_mixed(c: &mut Criterion) {
    let store = store();
    let token = Arc::new(String::from("token"));

    // Pre-populate
    for i in 0..10_000 {
        store.set(format!("key:{}", i), Arc::clone(&token), 600).unwrap();
    }

    let mut group = c.benchmark_group("mixed");
    group.throughput(Throughput::Elements(1));

    group.bench_function("80_read_20_write", |b| {
        let mut i = 0u64;
        b.iter(|| {
            if i % 5 == 0 {
                // 20% writes
                store.set(format!("new:{}", i), Arc::clone(&token), 600).unwrap();
            } else {
                // 80% reads
                let key = format!("key:{}", i % 10_000);
                black_box(store.get(&key));
            }
            i += 1;
        });
    });

    group.finish();
}

/// Benchmark a full recycle pass over a store past its limit
fn bench_recycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("recycle");

    group.bench_function("evict_half_of_100k", |b| {
        b.iter_batched(
            || {
                let store = store();
                store.set_max_records(100_000);
                let token = Arc::new(0u64);
                for i in 0..100_000 {
                    store
                        .set(format!("key:{}", i), Arc::clone(&token), 1 + (i % 600))
                        .unwrap();
                }
                store
            },
            |store| black_box(store.recycle_now()),
            criterion::BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_mixed, bench_recycle);
criterion_main!(benches);
