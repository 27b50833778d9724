mod common;

use common::{crafted_match, crafted_wall, held};
use riichi_engine::{ActionResult, HandOutcome, Match, MatchConfig, MatchError, Round, RuleVariant, Wind};

const DEALER: &str = "1113579m13579p19s";
const SOUTH: &str = "222678m44466p35s";
const WEST: &str = "99m2468p135s3344z";
const NORTH: &str = "3579p3579s11223z";

/// 南家自摸 40 符 2 番
fn south_tsumo(game: &mut Match) {
    game.discard(0, held(game, 0, "9m")).unwrap();
    game.draw(1).unwrap();
    game.declare_tsumo(1).unwrap();
}

#[test]
fn test_non_dealer_win_rotates_dealer() {
    let mut game = crafted_match([DEALER, SOUTH, WEST, NORTH], "4s");
    south_tsumo(&mut game);

    let result = game.advance_hand().unwrap();
    assert!(matches!(result, ActionResult::HandStarted { dealer: 1, dice: Some(_), .. }));
    assert_eq!(game.round.hand_number, 2);
    assert_eq!(game.round.repeat, 0);
    assert_eq!(game.current_seat(), 1);
    assert_eq!(game.players[1].hand.total_count(), 14);
    // 点数带入下一局
    assert_eq!(game.scores(), [23700, 27700, 24300, 24300]);
    assert_eq!(game.tile_count(), 136);
}

#[test]
fn test_advance_requires_finished_hand() {
    let mut game = crafted_match([DEALER, SOUTH, WEST, NORTH], "4s");
    assert_eq!(game.advance_hand(), Err(MatchError::HandInProgress));

    let mut fresh = Match::new(MatchConfig::new(1, RuleVariant::short()));
    assert!(!fresh.is_started());
    assert_eq!(fresh.advance_hand(), Err(MatchError::NotStarted));
    assert_eq!(fresh.draw(0), Err(MatchError::NotStarted));
    assert!(fresh.legal_actions(0).is_empty());
}

#[test]
fn test_nine_kinds_abortive_draw() {
    let south = "234567m234567p2s";
    let west = "234567m234567p3s";
    let north = "6788m678p345678s";

    // 只有 8 种幺九牌
    let eight = "1234569m159p19s12z";
    let mut game = crafted_match([eight, south, west, north], "");
    assert!(!game.legal_actions(0).abortive_draw);
    assert_eq!(game.declare_abortive_draw(0), Err(MatchError::AbortiveDrawUnavailable));

    // 10 种幺九牌
    let ten = "123459m19p19s1234z";
    let mut game = crafted_match([ten, south, west, north], "");
    assert!(game.legal_actions(0).abortive_draw);
    // 闲家还没有摸牌
    assert_eq!(game.declare_abortive_draw(1), Err(MatchError::AbortiveDrawUnavailable));

    let result = game.declare_abortive_draw(0).unwrap();
    assert_eq!(result, ActionResult::HandEnded(HandOutcome::AbortiveDraw { declarer: 0 }));
    assert_eq!(game.scores(), [25000; 4]);

    // 流局连庄
    let result = game.advance_hand().unwrap();
    assert!(matches!(result, ActionResult::HandStarted { dealer: 0, .. }));
    assert_eq!(game.round.hand_number, 1);
    assert_eq!(game.round.repeat, 1);
}

#[test]
fn test_match_ends_after_last_wind() {
    let mut game = Match::new(MatchConfig::new(5, RuleVariant::short()));
    game.round = Round {
        prevailing: Wind::East,
        hand_number: 4,
        repeat: 0,
        hand_index: 3,
    };
    assert_eq!(game.round.dealer_seat(), 3);

    // 东四局：北家坐庄，东家自摸
    let wall = crafted_wall(3, [SOUTH, WEST, NORTH, DEALER], "4s");
    game.start_with_wall(wall).unwrap();
    game.discard(3, held(&game, 3, "9m")).unwrap();
    game.draw(0).unwrap();
    let result = game.declare_tsumo(0).unwrap();
    let ActionResult::HandEnded(HandOutcome::Win { settlement, .. }) = result else {
        panic!("expected a win, got {:?}", result);
    };
    assert_eq!(settlement.deltas, [2700, -700, -700, -1300]);

    let result = game.advance_hand().unwrap();
    assert_eq!(
        result,
        ActionResult::MatchEnded {
            scores: [27700, 24300, 24300, 23700]
        }
    );
    assert!(game.is_finished());
    assert_eq!(game.advance_hand(), Err(MatchError::MatchOver));
    assert_eq!(game.draw(1), Err(MatchError::MatchOver));
    assert_eq!(game.start_match(), Err(MatchError::MatchOver));
    assert!(game.legal_actions(1).is_empty());
}

#[test]
fn test_full_variant_continues_into_south() {
    let mut game = Match::new(MatchConfig::new(5, RuleVariant::full()));
    game.round = Round {
        prevailing: Wind::East,
        hand_number: 4,
        repeat: 0,
        hand_index: 3,
    };
    let wall = crafted_wall(3, [SOUTH, WEST, NORTH, DEALER], "4s");
    game.start_with_wall(wall).unwrap();
    game.discard(3, held(&game, 3, "9m")).unwrap();
    game.draw(0).unwrap();
    game.declare_tsumo(0).unwrap();

    // 南一局：自风等于场风（南）的座位坐庄
    let result = game.advance_hand().unwrap();
    assert!(matches!(result, ActionResult::HandStarted { dealer: 1, .. }));
    assert_eq!(game.round.prevailing, Wind::South);
    assert_eq!(game.round.hand_number, 1);
    assert!(!game.is_finished());
}

#[test]
fn test_same_seed_same_deal() {
    let mut a = Match::new(MatchConfig::new(2024, RuleVariant::full()));
    let mut b = Match::new(MatchConfig::new(2024, RuleVariant::full()));
    assert_eq!(a.start_match(), b.start_match());
    assert_eq!(a.players, b.players);
    assert_eq!(a.wall.tiles(), b.wall.tiles());
    assert_eq!(a.dora_indicators(), b.dora_indicators());

    let mut c = Match::new(MatchConfig::new(2025, RuleVariant::full()));
    c.start_match().unwrap();
    assert_ne!(a.wall.tiles(), c.wall.tiles());
}

#[test]
fn test_restart_keeps_round_and_scores() {
    let mut game = crafted_match([DEALER, SOUTH, WEST, NORTH], "4s");
    south_tsumo(&mut game);
    let scores = game.scores();

    game.restart_match().unwrap();
    assert_eq!(game.scores(), scores);
    assert_eq!(game.round.hand_number, 1);
    assert!(game.outcome().is_none());
    assert_eq!(game.current_seat(), 0);
    assert_eq!(game.players[0].hand.total_count(), 14);
    assert_eq!(game.tile_count(), 136);
}

#[test]
fn test_config_round_trip() {
    let config = MatchConfig::new(77, RuleVariant::short());
    let json = serde_json::to_string(&config).unwrap();
    let back: MatchConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let custom: RuleVariant = serde_json::from_str(
        &serde_json::to_string(&RuleVariant {
            initial_score: 30000,
            ..RuleVariant::full()
        })
        .unwrap(),
    )
    .unwrap();
    let mut game = Match::new(MatchConfig::new(1, custom));
    game.start_match().unwrap();
    assert_eq!(game.scores(), [30000; 4]);
}
