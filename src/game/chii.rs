use crate::game::meld::Meld;
use crate::game::player::Player;
use crate::tile::{Tile, TileKind};
use smallvec::SmallVec;

/// 吃牌操作器
pub struct ChiiHandler;

impl ChiiHandler {
    /// 检查是否可以吃牌
    ///
    /// 吃牌条件：
    /// 1. `a`、`b` 是手中两张不同的实体牌
    /// 2. 两张牌与上家打出的牌组成顺子（顺序无关）
    pub fn can_chii(player: &Player, a: Tile, b: Tile, discard: Tile) -> bool {
        a != b
            && player.hand.has_tile(a)
            && player.hand.has_tile(b)
            && TileKind::forms_sequence(a.kind, b.kind, discard.kind)
    }

    /// 所有可以吃的组合
    ///
    /// 每种牌型组合只列出一次，使用手中该牌种的第一张实体牌
    ///
    /// # 返回
    ///
    /// `(a, b)` 列表，按牌种排序
    pub fn options(player: &Player, discard: Tile) -> SmallVec<[(Tile, Tile); 3]> {
        let mut options = SmallVec::new();
        let kind = discard.kind;
        if kind.is_honor() {
            return options;
        }
        let rank = kind.rank() as i8;
        // 被吃牌在顺子中的三个位置
        for (da, db) in [(-2i8, -1i8), (-1, 1), (1, 2)] {
            let (Some(ka), Some(kb)) = (Self::offset(kind, rank + da), Self::offset(kind, rank + db)) else {
                continue;
            };
            let (Some(&a), Some(&b)) = (
                player.hand.tiles_of_kind(ka).first(),
                player.hand.tiles_of_kind(kb).first(),
            ) else {
                continue;
            };
            options.push((a, b));
        }
        options
    }

    fn offset(kind: TileKind, rank: i8) -> Option<TileKind> {
        if !(1..=9).contains(&rank) {
            return None;
        }
        TileKind::new(kind.suit(), rank as u8)
    }

    /// 执行吃牌
    ///
    /// # 返回
    ///
    /// 成功时返回新的副露；条件不满足时手牌不变并返回 `None`
    pub fn chii(player: &mut Player, a: Tile, b: Tile, discard: Tile, from: u8) -> Option<Meld> {
        if !Self::can_chii(player, a, b, discard) {
            return None;
        }
        player.hand.remove_tile(a);
        player.hand.remove_tile(b);

        let mut tiles = [a, b, discard];
        tiles.sort_unstable();
        let meld = Meld::Sequence {
            tiles,
            called: discard,
            from,
        };
        player.melds.push(meld.clone());
        Some(meld)
    }
}
