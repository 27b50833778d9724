//! 随机对局与随机手牌上的不变量检查

use proptest::prelude::*;
use riichi_engine::game::scoring::WinRequest;
use riichi_engine::game::yaku::WinContext;
use riichi_engine::tile::WinShape;
use riichi_engine::{
    Action, HandDecomposer, LegalActions, Match, MatchConfig, RuleVariant, Settlement, TileKind, Wind, WinEvaluator,
};

const MAX_STEPS: usize = 600;

/// 把合法动作展开为 (座位, 动作) 列表
fn flatten(seat: u8, legal: &LegalActions) -> Vec<(u8, Action)> {
    let mut out = Vec::new();
    if legal.draw {
        out.push((seat, Action::Draw));
    }
    if legal.exhaustive_draw {
        out.push((seat, Action::ExhaustiveDraw));
    }
    out.extend(legal.discard.iter().map(|&tile| (seat, Action::Discard { tile })));
    out.extend(legal.chii.iter().map(|&(a, b)| (seat, Action::Chii { a, b })));
    out.extend(legal.pon.iter().map(|&(a, b)| (seat, Action::Pon { a, b })));
    if legal.open_quad.is_some() {
        out.push((seat, Action::OpenQuad));
    }
    out.extend(legal.concealed_quad.iter().map(|&kind| (seat, Action::ConcealedQuad { kind })));
    out.extend(legal.added_quad.iter().map(|&tile| (seat, Action::AddedQuad { tile })));
    out.extend(legal.riichi.iter().map(|&tile| (seat, Action::Riichi { tile })));
    if legal.ron {
        out.push((seat, Action::Ron));
    }
    if legal.tsumo {
        out.push((seat, Action::Tsumo));
    }
    if legal.abortive_draw {
        out.push((seat, Action::AbortiveDraw));
    }
    out
}

/// 随机选择合法动作打完一局，每一步检查守恒
fn play_random_hand(seed: u64, choices: &[u16]) -> Match {
    let mut game = Match::new(MatchConfig::new(seed, RuleVariant::short()));
    game.start_match().unwrap();

    for step in 0..MAX_STEPS {
        if game.outcome().is_some() {
            break;
        }
        let mut candidates = Vec::new();
        for seat in 0..4 {
            let legal = game.legal_actions(seat);
            assert_eq!(legal, game.legal_actions(seat), "query must not change state");
            candidates.extend(flatten(seat, &legal));
        }
        assert!(!candidates.is_empty(), "no legal action at step {}", step);

        let pick = choices[step % choices.len()] as usize % candidates.len();
        let (seat, action) = candidates[pick];
        game.process_action(seat, action)
            .unwrap_or_else(|e| panic!("listed action {:?} by seat {} rejected: {}", action, seat, e));

        assert_eq!(game.tile_count(), 136);
        assert_eq!(game.scores().iter().sum::<i32>() + game.riichi_pot(), 100000);
    }
    game
}

fn kind_counts_ok(kinds: &[TileKind]) -> bool {
    let mut counts = [0u8; TileKind::COUNT];
    for kind in kinds {
        counts[kind.index()] += 1;
    }
    counts.iter().all(|&c| c <= 4)
}

fn arb_kind() -> impl Strategy<Value = TileKind> {
    (0..TileKind::COUNT).prop_map(|i| TileKind::from_index(i).unwrap())
}

/// 4 个面子 + 1 个雀头组成的和了形
fn arb_complete_hand() -> impl Strategy<Value = Vec<TileKind>> {
    let group = prop_oneof![
        (0usize..3, 1u8..=7).prop_map(|(suit, start)| {
            let base = suit * 9 + start as usize - 1;
            (0..3)
                .map(|k| TileKind::from_index(base + k).unwrap())
                .collect::<Vec<_>>()
        }),
        arb_kind().prop_map(|kind| vec![kind; 3]),
    ];
    (prop::collection::vec(group, 4), arb_kind())
        .prop_map(|(groups, pair)| {
            let mut kinds: Vec<TileKind> = groups.into_iter().flatten().collect();
            kinds.push(pair);
            kinds.push(pair);
            kinds
        })
        .prop_filter("at most four copies", |kinds| kind_counts_ok(kinds))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_random_play_conserves_tiles_and_points(
        seed in any::<u64>(),
        choices in prop::collection::vec(any::<u16>(), 1..64),
    ) {
        let game = play_random_hand(seed, &choices);
        if let Some(outcome) = game.outcome() {
            let serialized = serde_json::to_string(outcome).unwrap();
            prop_assert!(!serialized.is_empty());
        }
    }
}

proptest! {
    #[test]
    fn prop_decomposition_is_deterministic(mut kinds in prop::collection::vec(arb_kind(), 14)) {
        prop_assume!(kind_counts_ok(&kinds));
        kinds.sort();

        let mut cached = HandDecomposer::new();
        let first = cached.shapes(&kinds, &[]);
        let second = cached.shapes(&kinds, &[]);
        let fresh = HandDecomposer::new().shapes(&kinds, &[]);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &fresh);

        for shape in &first {
            if let WinShape::Standard(d) = shape {
                let mut tiles: Vec<TileKind> = vec![d.pair, d.pair];
                for g in &d.groups {
                    let kinds = g.group.kinds();
                    if g.group.is_triplet_like() {
                        tiles.extend(std::iter::repeat(kinds[0]).take(g.group.tile_count()));
                    } else {
                        tiles.extend(kinds);
                    }
                }
                tiles.sort();
                prop_assert_eq!(&tiles, &kinds);
            }
        }
    }

    #[test]
    fn prop_complete_hands_score_in_tens(hand in arb_complete_hand()) {
        let win_tile = hand[0];
        let mut concealed = hand.clone();
        concealed.remove(0);
        concealed.sort();

        let mut context = WinContext::ron(Wind::South, Wind::East);
        context.riichi = true;
        let mut decomposer = HandDecomposer::new();
        let evaluation = WinEvaluator::evaluate(
            &mut decomposer,
            &WinRequest {
                concealed: &concealed,
                win_tile,
                melds: &[],
                context,
                dora: &[],
                ura_dora: &[],
            },
        );
        // 立直保证有役
        let evaluation = evaluation.unwrap();
        if matches!(evaluation.shape, WinShape::SevenPairs { .. }) {
            prop_assert_eq!(evaluation.fu, 25);
        } else {
            prop_assert_eq!(evaluation.fu % 10, 0);
            prop_assert!(evaluation.fu >= 30);
        }
        prop_assert!(evaluation.fan >= 1);
        prop_assert_eq!(evaluation.base_points % 10, 0);
    }

    #[test]
    fn prop_settlements_balance(
        base in 1u32..=8000,
        honba in 0u32..6,
        pot in 0i32..5,
        winner in 0u8..4,
        offset in 1u8..4,
        dealer in 0u8..4,
    ) {
        let loser = (winner + offset) % 4;
        let pot = pot * 1000;
        let ron = Settlement::ron(winner, loser, winner == dealer, base, honba, 300, pot);
        prop_assert!(ron.is_balanced());
        prop_assert_eq!(ron.deltas[winner as usize], -ron.deltas[loser as usize] + pot);

        let tsumo = Settlement::tsumo(winner, dealer, base, honba, 300, pot);
        prop_assert!(tsumo.is_balanced());
        prop_assert!(tsumo.payments.iter().all(|p| p.amount % 100 == 0));
    }
}
