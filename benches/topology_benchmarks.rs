use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use openbracket::bracket::{
    Format, GenerationOptions, SeedEntry, generate, seed_order, winners_rounds,
};
use openbracket::propagation::resolve_byes;
use openbracket::store::BracketState;

fn solo_entrants(n: usize) -> Vec<SeedEntry> {
    (1..=n as i64)
        .map(|i| SeedEntry::solo(i, &format!("player {i}"), Some(i as u32)))
        .collect()
}

/// Benchmark the canonical seeding order across bracket sizes
fn bench_seed_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed_order");
    for size in [16u32, 64, 256, 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| seed_order(size));
        });
    }
    group.finish();
}

/// Benchmark full double-elimination generation
fn bench_generate_double_elim(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_double_elim");
    for n in [16usize, 64, 256] {
        let entrants = solo_entrants(n);
        let options = GenerationOptions::solo(Format::DoubleElim, 3);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut next_id = 1;
                generate(1, &entrants, &options, &mut next_id).unwrap()
            });
        });
    }
    group.finish();
}

/// Benchmark the BYE walkover cascade on a heavily padded field
fn bench_resolve_byes(c: &mut Criterion) {
    // 129 entrants pad to 256: close to the worst-case walkover count
    let entrants = solo_entrants(129);
    let options = GenerationOptions::solo(Format::DoubleElim, 3);

    c.bench_function("resolve_byes_129_of_256", |b| {
        b.iter_batched(
            || {
                let mut next_id = 1;
                let matches = generate(1, &entrants, &options, &mut next_id).unwrap();
                BracketState::new(Format::DoubleElim, winners_rounds(256), matches)
            },
            |mut bracket| resolve_byes(&mut bracket),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_seed_order,
    bench_generate_double_elim,
    bench_resolve_byes
);
criterion_main!(benches);
