use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use poker_tuner::cards::{parse_cards, Card};
use poker_tuner::equity::EquityEstimator;
use poker_tuner::evaluator::evaluate;
use poker_tuner::hand::{Board, HoleCards};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn seven(s: &str) -> [Card; 7] {
    parse_cards(s).unwrap().try_into().unwrap()
}

fn bench_evaluate(c: &mut Criterion) {
    let hands = [
        ("high_card", seven("Ah Kd 7s 5c 2d 9h 3s")),
        ("full_house", seven("3c 3d 3h Js Jc 2d 7h")),
        ("royal_flush", seven("As Ks Qs Js Ts 2d 3c")),
    ];

    let mut g = c.benchmark_group("evaluate");
    for (name, cards) in &hands {
        g.bench_with_input(BenchmarkId::from_parameter(name), cards, |b, input| {
            b.iter(|| evaluate(black_box(input)))
        });
    }
    g.finish();
}

fn bench_equity(c: &mut Criterion) {
    let hole: HoleCards = "As Ad".parse().unwrap();
    let flop: Board = "Kh 7c 2d".parse().unwrap();
    let est = EquityEstimator::new(1000).unwrap();

    let mut g = c.benchmark_group("equity_1000_trials");
    for players in [2usize, 6] {
        g.bench_with_input(BenchmarkId::new("preflop", players), &players, |b, &n| {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            b.iter(|| est.estimate(&hole, &Board::default(), black_box(n), &mut rng).unwrap())
        });
        g.bench_with_input(BenchmarkId::new("flop", players), &players, |b, &n| {
            let mut rng = ChaCha8Rng::seed_from_u64(1);
            b.iter(|| est.estimate(&hole, &flop, black_box(n), &mut rng).unwrap())
        });
    }
    g.finish();
}

criterion_group!(benches, bench_evaluate, bench_equity);
criterion_main!(benches);
