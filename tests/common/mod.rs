//! 集成测试共用的牌墙构造工具
#![allow(dead_code)]

use riichi_engine::game::constants::{NUM_PLAYERS, TOTAL_TILES};
use riichi_engine::{parse_kinds, Match, MatchConfig, RuleVariant, Tile, TileKind, Wall};

/// 按副本序号从小到大分配实体牌的牌池
pub struct TilePool {
    used: [u8; TileKind::COUNT],
}

impl TilePool {
    pub fn new() -> Self {
        Self {
            used: [0; TileKind::COUNT],
        }
    }

    pub fn take(&mut self, kind: TileKind) -> Tile {
        let copy = self.used[kind.index()];
        assert!(copy < 4, "more than four copies of {}", kind);
        self.used[kind.index()] += 1;
        Tile::with_copy(kind, copy)
    }

    pub fn take_all(&mut self, notation: &str) -> Vec<Tile> {
        if notation.is_empty() {
            return Vec::new();
        }
        parse_kinds(notation)
            .unwrap()
            .into_iter()
            .map(|kind| self.take(kind))
            .collect()
    }

    /// 剩余的牌，按牌种顺序
    ///
    /// 没有用到 6z、7z 时，王牌的宝牌指示牌为 6z（宝牌 7z），岭上牌为 7z
    pub fn rest(self) -> Vec<Tile> {
        let mut tiles = Vec::new();
        for kind in TileKind::all() {
            for copy in self.used[kind.index()]..4 {
                tiles.push(Tile::with_copy(kind, copy));
            }
        }
        tiles
    }
}

/// 构造一副牌墙，使配牌后各座位恰好持有 `hands` 中的牌
///
/// # 参数
///
/// - `dealer`: 庄家座位
/// - `hands`: 按座位排列；庄家 14 张，其余 13 张，庄家的最后一张视为刚摸到的牌
/// - `draws`: 配牌之后依次摸到的牌
pub fn crafted_wall(dealer: u8, hands: [&str; 4], draws: &str) -> Wall {
    let mut pool = TilePool::new();
    let hands: Vec<Vec<Tile>> = hands.iter().map(|h| pool.take_all(h)).collect();
    for (seat, hand) in hands.iter().enumerate() {
        let expected = if seat as u8 == dealer { 14 } else { 13 };
        assert_eq!(hand.len(), expected, "seat {} holds {} tiles", seat, hand.len());
    }

    let order: Vec<usize> = (0..NUM_PLAYERS).map(|k| ((dealer + k) % NUM_PLAYERS) as usize).collect();
    let mut tiles = Vec::with_capacity(TOTAL_TILES);
    for block in 0..3 {
        for &seat in &order {
            tiles.extend_from_slice(&hands[seat][block * 4..block * 4 + 4]);
        }
    }
    tiles.extend_from_slice(&hands[order[0]][12..14]);
    for &seat in &order[1..] {
        tiles.push(hands[seat][12]);
    }
    tiles.extend(pool.take_all(draws));
    tiles.extend(pool.rest());
    assert_eq!(tiles.len(), TOTAL_TILES);
    Wall::from_tiles(tiles, 14)
}

/// 东一局、庄家为 0 号座位的对局
pub fn crafted_match(hands: [&str; 4], draws: &str) -> Match {
    let mut game = Match::new(MatchConfig::new(0, RuleVariant::short()));
    game.start_with_wall(crafted_wall(0, hands, draws)).unwrap();
    game
}

pub fn kind(notation: &str) -> TileKind {
    notation.parse().unwrap()
}

/// 某座位手中第一张该种牌
pub fn held(game: &Match, seat: u8, notation: &str) -> Tile {
    let kind = kind(notation);
    game.players[seat as usize].hand.tiles_of_kind(kind)[0]
}

/// 摸牌后立即打出摸到的牌
pub fn draw_and_discard(game: &mut Match, seat: u8) -> Tile {
    game.draw(seat).unwrap();
    let tile = game.players[seat as usize].last_draw.unwrap();
    game.discard(seat, tile).unwrap();
    tile
}
