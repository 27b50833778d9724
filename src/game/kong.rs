use crate::game::meld::{Meld, QuadKind};
use crate::game::player::Player;
use crate::tile::{Tile, TileKind};
use smallvec::SmallVec;

/// 杠操作器
pub struct KongHandler;

impl KongHandler {
    /// 大明杠可用的三张手牌
    ///
    /// 大明杠条件：手牌中有三张与别人打出的牌同种的牌
    ///
    /// # 返回
    ///
    /// 如果可以杠，返回手中的三张牌，否则返回 `None`
    pub fn open_quad_tiles(player: &Player, discard: Tile) -> Option<[Tile; 3]> {
        let held = player.hand.tiles_of_kind(discard.kind);
        if held.len() >= 3 {
            Some([held[0], held[1], held[2]])
        } else {
            None
        }
    }

    /// 可以暗杠的牌种（手中有四张）
    pub fn concealed_quad_kinds(player: &Player) -> SmallVec<[TileKind; 4]> {
        player
            .hand
            .distinct_kinds()
            .into_iter()
            .filter(|&kind| player.hand.kind_count(kind) == 4)
            .collect()
    }

    /// 可以加杠的手牌（与已碰的刻子同种）
    pub fn added_quad_tiles(player: &Player) -> SmallVec<[Tile; 4]> {
        player
            .hand
            .tiles()
            .iter()
            .copied()
            .filter(|tile| Self::triplet_index(player, tile.kind).is_some())
            .collect()
    }

    /// 已碰刻子在副露中的下标
    pub fn triplet_index(player: &Player, kind: TileKind) -> Option<usize> {
        player
            .melds
            .iter()
            .position(|meld| matches!(meld, Meld::Triplet { .. }) && meld.kind() == kind)
    }

    /// 执行大明杠
    pub fn open_quad(player: &mut Player, discard: Tile, turn: u32) -> Option<Meld> {
        let held = Self::open_quad_tiles(player, discard)?;
        for tile in held {
            player.hand.remove_tile(tile);
        }
        let mut tiles = [held[0], held[1], held[2], discard];
        tiles.sort_unstable();
        let meld = Meld::Quad {
            tiles,
            kind: QuadKind::Open,
            turn,
        };
        player.melds.push(meld.clone());
        Some(meld)
    }

    /// 执行暗杠
    pub fn concealed_quad(player: &mut Player, kind: TileKind, turn: u32) -> Option<Meld> {
        if player.hand.kind_count(kind) != 4 {
            return None;
        }
        let removed = player.hand.remove_kind(kind, 4)?;
        let meld = Meld::Quad {
            tiles: [removed[0], removed[1], removed[2], removed[3]],
            kind: QuadKind::Concealed,
            turn,
        };
        player.melds.push(meld.clone());
        Some(meld)
    }

    /// 执行加杠
    ///
    /// # 返回
    ///
    /// 成功时返回 `(副露下标, 原来的刻子)`，用于抢杠时还原
    pub fn added_quad(player: &mut Player, tile: Tile, turn: u32) -> Option<(usize, Meld)> {
        let index = Self::triplet_index(player, tile.kind)?;
        if !player.hand.remove_tile(tile) {
            return None;
        }
        let original = player.melds[index].clone();
        let Meld::Triplet { tiles: [a, b, c], .. } = original else {
            return None;
        };
        let mut tiles = [a, b, c, tile];
        tiles.sort_unstable();
        player.melds[index] = Meld::Quad {
            tiles,
            kind: QuadKind::Added,
            turn,
        };
        Some((index, original))
    }

    /// 抢杠成立：还原为刻子，返回被抢的牌
    pub fn revert_added_quad(player: &mut Player, index: usize, original: Meld, tile: Tile) -> Option<Tile> {
        let meld = player.melds.get_mut(index)?;
        if !matches!(meld, Meld::Quad { kind: QuadKind::Added, .. }) {
            return None;
        }
        *meld = original;
        Some(tile)
    }
}
