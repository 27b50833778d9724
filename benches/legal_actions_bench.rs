use criterion::{black_box, criterion_group, criterion_main, Criterion};
use riichi_engine::{Match, MatchConfig, RuleVariant};

fn bench_legal_actions_dealer(c: &mut Criterion) {
    let mut game = Match::new(MatchConfig::new(42, RuleVariant::full()));
    game.start_match().unwrap();

    c.bench_function("legal_actions_dealer_turn", |b| {
        b.iter(|| {
            black_box(game.legal_actions(black_box(0)));
        });
    });
}

fn bench_legal_actions_claim_window(c: &mut Criterion) {
    let mut game = Match::new(MatchConfig::new(42, RuleVariant::full()));
    game.start_match().unwrap();
    let tile = game.players[0].hand.tiles()[0];
    game.discard(0, tile).unwrap();

    c.bench_function("legal_actions_claim_window", |b| {
        b.iter(|| {
            for seat in 0..4 {
                black_box(game.legal_actions(black_box(seat)));
            }
        });
    });
}

criterion_group!(benches, bench_legal_actions_dealer, bench_legal_actions_claim_window);
criterion_main!(benches);
