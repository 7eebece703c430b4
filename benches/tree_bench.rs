//! Tree operations across buffer pool capacities.
//!
//! Every comparison dereferences a key through the pool, so the capacity
//! decides how often a traversal reloads blocks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bindisk::common::config::PoolConfig;
use bindisk::Database;
use tempfile::TempDir;

const ENTRIES: usize = 500;
const BLOCK_SIZE: usize = 64;

/// Keys in a scrambled but repeatable order.
fn keys() -> Vec<String> {
    (0..ENTRIES)
        .map(|i| format!("key-{:05}", (i * 7919) % ENTRIES))
        .collect()
}

fn open_db(capacity: usize) -> (Database, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.bin");
    std::fs::File::create(&path).unwrap();
    let db = Database::open(&PoolConfig::new(&path, capacity, BLOCK_SIZE)).unwrap();
    (db, dir)
}

fn bench_insert(c: &mut Criterion) {
    let keys = keys();
    let mut group = c.benchmark_group("insert");

    for capacity in [1, 4, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &cap| {
            b.iter(|| {
                let (mut db, _dir) = open_db(cap);
                for key in &keys {
                    db.insert(key, "value").unwrap();
                }
                black_box(db.len())
            })
        });
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let keys = keys();
    let mut group = c.benchmark_group("find");

    for capacity in [1, 4, 16, 64] {
        let (mut db, _dir) = open_db(capacity);
        for key in &keys {
            db.insert(key, "value").unwrap();
        }

        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| {
                for key in keys.iter().step_by(25) {
                    black_box(db.find(key).unwrap());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_find);
criterion_main!(benches);
