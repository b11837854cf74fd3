use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use topn::{summarize, BatchTopNSelector, IterSource, Record, ReservoirSampler, SortOrder};

fn stream(size: u64) -> Vec<Record> {
    (0..size)
        .map(|i| {
            // Cheap scramble so values are not already sorted.
            let v = (i.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 1) as i64;
            Record::new(format!("http://bench/{i}"), v).expect("non-empty key")
        })
        .collect()
}

fn bench_batch_topn(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_topn");

    let size = 100_000;
    let n = 100;
    let records = stream(size);

    // Larger batches mean fewer full re-sorts of the accumulator.
    for &batch_size in &[1_000usize, 10_000, 100_000] {
        group.bench_function(format!("n{n}_batch{batch_size}_len{size}"), |b| {
            b.iter(|| {
                let mut s = BatchTopNSelector::new(n, batch_size, SortOrder::Descending);
                s.consume(IterSource::new(black_box(records.clone())))
                    .expect("iter sources do not fail");
                black_box(s.finalize());
            })
        });
    }
    group.finish();
}

fn bench_reservoir(c: &mut Criterion) {
    let mut group = c.benchmark_group("reservoir");

    let sizes = [1_000, 10_000, 100_000];
    let k = 100;

    for &size in &sizes {
        let records = stream(size);
        group.bench_function(format!("alg_r_n{size}_k{k}"), |b| {
            b.iter(|| {
                let mut rng = ChaCha8Rng::seed_from_u64(42);
                let sample = ReservoirSampler::new(k)
                    .run_with_rng(IterSource::new(black_box(records.clone())), &mut rng)
                    .expect("stream longer than k");
                black_box(sample.total_items_read());
            })
        });
    }
    group.finish();
}

fn bench_histogram(c: &mut Criterion) {
    let mut group = c.benchmark_group("histogram");

    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let sample = ReservoirSampler::new(1_000)
        .run_with_rng(IterSource::new(stream(100_000)), &mut rng)
        .expect("stream longer than k");

    for &buckets in &[10usize, 100, 1_000] {
        group.bench_function(format!("k1000_buckets{buckets}"), |b| {
            b.iter(|| {
                let h = summarize(
                    black_box(sample.slots()),
                    sample.total_items_read(),
                    buckets,
                )
                .expect("buckets > 0");
                black_box(h);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_batch_topn, bench_reservoir, bench_histogram);
criterion_main!(benches);
