use crate::tile::{DecomposedGroup, Group, GroupOrigin, Tile, TileKind};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// 杠类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuadKind {
    /// 大明杠（别人打出的牌）
    Open,
    /// 加杠（已碰的刻子摸到第四张）
    Added,
    /// 暗杠（手中四张）
    Concealed,
}

/// 副露
///
/// 吃、碰、杠形成的牌组；记录实体牌以保证牌数守恒
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Meld {
    /// 吃（顺子）
    Sequence {
        tiles: [Tile; 3],
        /// 被吃的那张牌
        called: Tile,
        /// 放出该牌的座位
        from: u8,
    },
    /// 碰（刻子）
    Triplet { tiles: [Tile; 3], called: Tile, from: u8 },
    /// 杠
    Quad {
        tiles: [Tile; 4],
        kind: QuadKind,
        /// 成杠时该玩家的巡目
        turn: u32,
    },
}

impl Meld {
    /// 牌组的代表牌种（顺子为最小的一张）
    pub fn kind(&self) -> TileKind {
        match self {
            Meld::Sequence { tiles, .. } => tiles.iter().map(|t| t.kind).min().unwrap_or(tiles[0].kind),
            Meld::Triplet { tiles, .. } => tiles[0].kind,
            Meld::Quad { tiles, .. } => tiles[0].kind,
        }
    }

    /// 是否为亮出的副露（暗杠不算）
    pub fn is_open(&self) -> bool {
        !matches!(self, Meld::Quad { kind: QuadKind::Concealed, .. })
    }

    pub fn is_quad(&self) -> bool {
        matches!(self, Meld::Quad { .. })
    }

    /// 副露中的全部实体牌
    pub fn tiles(&self) -> SmallVec<[Tile; 4]> {
        match self {
            Meld::Sequence { tiles, .. } | Meld::Triplet { tiles, .. } => SmallVec::from_slice(tiles),
            Meld::Quad { tiles, .. } => SmallVec::from_slice(tiles),
        }
    }

    /// 转换为拆解用的牌组
    pub fn to_group(&self) -> DecomposedGroup {
        let group = match self {
            Meld::Sequence { .. } => Group::Sequence { start: self.kind() },
            Meld::Triplet { .. } => Group::Triplet { kind: self.kind() },
            Meld::Quad { .. } => Group::Quad { kind: self.kind() },
        };
        DecomposedGroup {
            group,
            origin: GroupOrigin::Meld { open: self.is_open() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_kind_is_lowest() {
        let meld = Meld::Sequence {
            tiles: [
                Tile::of(TileKind::Dots(5)),
                Tile::of(TileKind::Dots(3)),
                Tile::of(TileKind::Dots(4)),
            ],
            called: Tile::of(TileKind::Dots(5)),
            from: 0,
        };
        assert_eq!(meld.kind(), TileKind::Dots(3));
        assert_eq!(meld.to_group().group, Group::Sequence { start: TileKind::Dots(3) });
        assert!(meld.is_open());
    }

    #[test]
    fn test_concealed_quad_is_not_open() {
        let kind = TileKind::RED;
        let meld = Meld::Quad {
            tiles: [0, 1, 2, 3].map(|c| Tile::with_copy(kind, c)),
            kind: QuadKind::Concealed,
            turn: 3,
        };
        assert!(!meld.is_open());
        assert!(meld.to_group().is_concealed());
        assert_eq!(meld.tiles().len(), 4);
    }
}
