use crate::tile::{Tile, TileKind};
use serde::{Deserialize, Serialize};

/// 动作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// 摸牌（杠后摸岭上牌）
    Draw,
    /// 出牌
    Discard { tile: Tile },
    /// 吃（顺子），`a`、`b` 为手中的两张
    Chii { a: Tile, b: Tile },
    /// 碰（刻子），`a`、`b` 为手中的两张
    Pon { a: Tile, b: Tile },
    /// 大明杠
    OpenQuad,
    /// 暗杠
    ConcealedQuad { kind: TileKind },
    /// 加杠
    AddedQuad { tile: Tile },
    /// 立直并打出 `tile`
    Riichi { tile: Tile },
    /// 荣和
    Ron,
    /// 自摸
    Tsumo,
    /// 九种九牌流局
    AbortiveDraw,
    /// 荒牌流局
    ExhaustiveDraw,
}
