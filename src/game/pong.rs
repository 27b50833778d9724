use crate::game::meld::Meld;
use crate::game::player::Player;
use crate::tile::Tile;
use smallvec::SmallVec;

/// 碰牌操作器
pub struct PongHandler;

impl PongHandler {
    /// 检查是否可以碰牌
    ///
    /// 碰牌条件：
    /// 1. `a`、`b` 是手中两张不同的实体牌
    /// 2. 两张牌与别人打出的牌是同一牌种
    ///
    /// # 返回
    ///
    /// 如果可以碰牌，返回 `true`，否则返回 `false`
    pub fn can_pong(player: &Player, a: Tile, b: Tile, discard: Tile) -> bool {
        a != b
            && a.kind == discard.kind
            && b.kind == discard.kind
            && player.hand.has_tile(a)
            && player.hand.has_tile(b)
    }

    /// 所有可以碰的实体牌组合
    ///
    /// 手中有三张时会列出三种组合
    pub fn options(player: &Player, discard: Tile) -> SmallVec<[(Tile, Tile); 3]> {
        let held = player.hand.tiles_of_kind(discard.kind);
        let mut options = SmallVec::new();
        for i in 0..held.len() {
            for j in i + 1..held.len() {
                options.push((held[i], held[j]));
            }
        }
        options
    }

    /// 执行碰牌
    ///
    /// # 参数
    ///
    /// - `player`: 玩家（可变引用）
    /// - `a`, `b`: 手中的两张牌
    /// - `discard`: 别人打出的牌
    /// - `from`: 放出该牌的座位
    ///
    /// # 返回
    ///
    /// 成功时返回新的副露
    pub fn pong(player: &mut Player, a: Tile, b: Tile, discard: Tile, from: u8) -> Option<Meld> {
        if !Self::can_pong(player, a, b, discard) {
            return None;
        }
        player.hand.remove_tile(a);
        player.hand.remove_tile(b);

        let mut tiles = [a, b, discard];
        tiles.sort_unstable();
        let meld = Meld::Triplet {
            tiles,
            called: discard,
            from,
        };
        player.melds.push(meld.clone());
        Some(meld)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileKind;

    #[test]
    fn test_can_pong() {
        let mut player = Player::new(0, 25000);
        let kind = TileKind::Characters(1);

        // 手牌中有两张 1 万
        player.hand.add_tile(Tile::with_copy(kind, 0));
        player.hand.add_tile(Tile::with_copy(kind, 1));

        let discard = Tile::with_copy(kind, 2);
        assert!(PongHandler::can_pong(&player, Tile::with_copy(kind, 0), Tile::with_copy(kind, 1), discard));
        // 同一张牌不能用两次
        assert!(!PongHandler::can_pong(&player, Tile::with_copy(kind, 0), Tile::with_copy(kind, 0), discard));

        // 只有一张，不能碰
        player.hand.remove_tile(Tile::with_copy(kind, 1));
        assert!(PongHandler::options(&player, discard).is_empty());
    }

    #[test]
    fn test_pong() {
        let mut player = Player::new(0, 25000);
        let kind = TileKind::RED;
        for copy in 0..3 {
            player.hand.add_tile(Tile::with_copy(kind, copy));
        }
        let discard = Tile::with_copy(kind, 3);

        // 三张时有三种组合
        assert_eq!(PongHandler::options(&player, discard).len(), 3);

        let meld = PongHandler::pong(&mut player, Tile::with_copy(kind, 0), Tile::with_copy(kind, 2), discard, 2).unwrap();
        assert!(matches!(meld, Meld::Triplet { from: 2, .. }));
        // 检查：手牌中只剩一张
        assert_eq!(player.hand.kind_count(kind), 1);
        assert!(player.hand.has_tile(Tile::with_copy(kind, 1)));
    }
}
