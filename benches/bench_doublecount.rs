use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use doublecount::fixture::{generate, Alphabet, DEFAULT_LENGTH};

fn bench_reference_scenario(c: &mut Criterion) {
    let val = generate(42, DEFAULT_LENGTH, &Alphabet::ascii_letters());
    let counters = doublecount::all_counters().expect("built-in counters");

    let mut group = c.benchmark_group("count_doubles");
    group.throughput(Throughput::Bytes(val.len() as u64));
    group.sample_size(20);
    for counter in &counters {
        group.bench_with_input(BenchmarkId::new(counter.name(), val.len()), &val, |b, v| {
            b.iter(|| counter.count(black_box(v)))
        });
    }
    group.finish();
}

fn bench_alphabet_sizes(c: &mut Criterion) {
    let counters = doublecount::all_counters().expect("built-in counters");
    let mut group = c.benchmark_group("alphabet_size");
    group.sample_size(20);

    for &size in &[1usize, 2, 52] {
        let val = generate(7, 100_000, &Alphabet::first_n(size));
        group.throughput(Throughput::Bytes(val.len() as u64));
        for counter in &counters {
            group.bench_with_input(BenchmarkId::new(counter.name(), size), &val, |b, v| {
                b.iter(|| counter.count(black_box(v)))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_reference_scenario, bench_alphabet_sizes);
criterion_main!(benches);
