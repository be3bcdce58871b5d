use chain_hashmap::{ChainHashMap, IdentityKeys, StrKeys};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
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
    c.bench_function("chain_hashmap_insert_10k", |b| {
        b.iter_batched(
            || ChainHashMap::<String, u64, _>::new(StrKeys).unwrap(),
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.put(key(x), i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("chain_hashmap_get_hit", |b| {
        let mut m = ChainHashMap::new(StrKeys).unwrap();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().enumerate() {
            m.put(k.clone(), i as u64).unwrap();
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("chain_hashmap_get_miss", |b| {
        let mut m = ChainHashMap::new(StrKeys).unwrap();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.put(key(x), i as u64).unwrap();
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in map
            let k = key(miss.next().unwrap());
            black_box(m.get(&k));
        })
    });
}

fn bench_put_remove_cycle(c: &mut Criterion) {
    c.bench_function("chain_hashmap_put_remove_identity", |b| {
        let mut m = ChainHashMap::new(IdentityKeys).unwrap();
        for i in 0..1_000usize {
            m.put(i, i).unwrap();
        }
        let mut next = 1_000usize;
        b.iter(|| {
            m.put(next, next).unwrap();
            black_box(m.remove(&(next - 1_000)));
            next += 1;
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
    targets = bench_insert, bench_get_hit, bench_get_miss, bench_put_remove_cycle
}
criterion_main!(benches);
