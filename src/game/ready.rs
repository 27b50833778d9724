use crate::game::player::Player;
use crate::tile::{HandDecomposer, Tile, TileKind};
use smallvec::SmallVec;

/// 听牌判定器
pub struct ReadyChecker;

impl ReadyChecker {
    /// 玩家当前的听牌
    ///
    /// 听牌定义：手牌差一张就能和牌（标准型、七对子或国士）
    ///
    /// # 返回
    ///
    /// 所有听的牌种；暗手张数不是 3n+1 或没有听牌时为空
    pub fn waits(decomposer: &mut HandDecomposer, player: &Player) -> SmallVec<[TileKind; 13]> {
        decomposer.waits(&player.concealed_kinds(), &player.meld_groups())
    }

    /// 打出某张牌之后的听牌
    pub fn waits_after_discard(
        decomposer: &mut HandDecomposer,
        player: &Player,
        discard: Tile,
    ) -> SmallVec<[TileKind; 13]> {
        let mut kinds = player.concealed_kinds();
        let Some(pos) = kinds.iter().position(|&k| k == discard.kind) else {
            return SmallVec::new();
        };
        kinds.remove(pos);
        decomposer.waits(&kinds, &player.meld_groups())
    }

    /// 检查是否听牌（简化版本，只返回 bool）
    pub fn is_ready(decomposer: &mut HandDecomposer, player: &Player) -> bool {
        !Self::waits(decomposer, player).is_empty()
    }

    /// 立直宣言可以打出的牌
    ///
    /// 打出后仍然听牌的每一张实体牌
    pub fn riichi_discards(decomposer: &mut HandDecomposer, player: &Player) -> Vec<Tile> {
        let mut candidates = Vec::new();
        let mut checked: SmallVec<[(TileKind, bool); 14]> = SmallVec::new();
        for &tile in player.hand.tiles() {
            let ready = match checked.iter().find(|(k, _)| *k == tile.kind) {
                Some(&(_, ready)) => ready,
                None => {
                    let ready = !Self::waits_after_discard(decomposer, player, tile).is_empty();
                    checked.push((tile.kind, ready));
                    ready
                }
            };
            if ready {
                candidates.push(tile);
            }
        }
        candidates
    }

    /// 舍张振听：自己的舍牌中有听的牌
    pub fn is_discard_furiten(player: &Player, waits: &[TileKind]) -> bool {
        let discarded = player.discarded_kinds();
        waits.iter().any(|&k| discarded.contains(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::DiscardRecord;
    use crate::tile::parse_tiles;

    fn player_with(notation: &str) -> Player {
        let mut player = Player::new(0, 25000);
        for tile in parse_tiles(notation).unwrap().unwrap() {
            player.hand.add_tile(tile);
        }
        player
    }

    #[test]
    fn test_is_ready() {
        let mut decomposer = HandDecomposer::new();
        // 差一张 4 筒或 7 筒
        let player = player_with("11234567m12356p");
        assert!(ReadyChecker::is_ready(&mut decomposer, &player));
        let waits = ReadyChecker::waits(&mut decomposer, &player);
        assert_eq!(waits.as_slice(), &[TileKind::Dots(4), TileKind::Dots(7)]);
    }

    #[test]
    fn test_not_ready() {
        let mut decomposer = HandDecomposer::new();
        let player = player_with("1379m1379p1379s1z");
        assert!(!ReadyChecker::is_ready(&mut decomposer, &player));
    }

    #[test]
    fn test_riichi_discards() {
        let mut decomposer = HandDecomposer::new();
        // 14 张：打东风听 4-7 筒
        let player = player_with("11234567m56p999s1z");
        let discards = ReadyChecker::riichi_discards(&mut decomposer, &player);
        assert_eq!(discards.len(), 1);
        assert_eq!(discards[0].kind, TileKind::Honor(1));
    }

    #[test]
    fn test_discard_furiten() {
        let mut player = player_with("11234567m56p999s");
        player.discards.push(DiscardRecord {
            tile: Tile::of(TileKind::Dots(7)),
            turn: 3,
            riichi: false,
            claimed: false,
        });
        let mut decomposer = HandDecomposer::new();
        let waits = ReadyChecker::waits(&mut decomposer, &player);
        assert_eq!(waits.as_slice(), &[TileKind::Dots(4), TileKind::Dots(7)]);
        assert!(ReadyChecker::is_discard_furiten(&player, &waits));
    }
}
