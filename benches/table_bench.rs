use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use scatter_table::ScatterTable;
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("scatter_table_insert_10k", |b| {
        b.iter_batched(
            ScatterTable::new,
            |mut t| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    let _ = t.insert(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("scatter_table_get_hit", |b| {
        let mut t = ScatterTable::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            let _ = t.insert(k.clone(), i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(t.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("scatter_table_get_miss", |b| {
        let mut t = ScatterTable::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            let _ = t.insert(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in the table
            let k = key(miss.next().unwrap());
            black_box(t.get(&k));
        })
    });
}

// Insert/remove churn at constant size: stresses tombstone accumulation
// between rebuilds, the table's known pathological workload.
fn bench_churn(c: &mut Criterion) {
    c.bench_function("scatter_table_churn", |b| {
        let mut t = ScatterTable::new();
        for (i, x) in lcg(17).take(1_000).enumerate() {
            let _ = t.insert(key(x), i as u64);
        }
        let mut gen = lcg(0xfeed);
        b.iter(|| {
            let x = gen.next().unwrap();
            let k = key(x);
            let _ = t.insert(k.clone(), x);
            black_box(t.remove(&k));
        })
    });
}

fn bench_index_access(c: &mut Criterion) {
    c.bench_function("scatter_table_get_or_insert_default", |b| {
        let mut t = ScatterTable::new();
        let keys: Vec<_> = lcg(23).take(4_096).map(key).collect();
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            let v = t.get_or_insert_default(k);
            *v = v.wrapping_add(1);
            black_box(*v);
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_churn, bench_index_access
}
criterion_main!(benches);
