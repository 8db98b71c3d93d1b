//! Full-match simulation benchmarks
//!
//! Usage:
//!   cargo bench --bench match_sim
//!   cargo bench --bench match_sim -- heuristic

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_trumps::cards::{Attribute, CardCatalog};
use rust_trumps::core::SessionConfig;
use rust_trumps::policy::{FixedAttribute, HeuristicPolicy};
use rust_trumps::rules::resolve_round;
use rust_trumps::session::simulate_match;

fn bench_resolve_round(c: &mut Criterion) {
    let pool = CardCatalog::standard().pool();
    c.bench_function("resolve_round/all_pairs", |b| {
        b.iter(|| {
            let mut wins = 0u32;
            for a in &pool {
                for other in &pool {
                    for attr in Attribute::ALL {
                        if resolve_round(a, other, attr).winner().is_some() {
                            wins += 1;
                        }
                    }
                }
            }
            black_box(wins)
        });
    });
}

fn bench_full_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("match");

    for seed in [1u64, 7, 42] {
        group.bench_with_input(BenchmarkId::new("heuristic", seed), &seed, |b, &seed| {
            b.iter(|| {
                let summary = simulate_match(
                    SessionConfig::new().with_seed(seed),
                    &mut HeuristicPolicy::default(),
                    &mut HeuristicPolicy::default(),
                    10_000,
                )
                .unwrap();
                black_box(summary)
            });
        });

        group.bench_with_input(BenchmarkId::new("fixed_fame", seed), &seed, |b, &seed| {
            b.iter(|| {
                let summary = simulate_match(
                    SessionConfig::new().with_seed(seed),
                    &mut FixedAttribute(Attribute::Fame),
                    &mut FixedAttribute(Attribute::Fame),
                    10_000,
                )
                .unwrap();
                black_box(summary)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve_round, bench_full_match);
criterion_main!(benches);
