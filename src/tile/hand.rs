use super::tile::{Tile, TileKind};
use smallvec::SmallVec;

/// 手牌（Hand）
///
/// 持有实体牌，始终保持排序；同种牌可以有不同副本序号
///
/// 使用 SmallVec 优化：暗手最多 14 张，使用栈分配
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Hand {
    tiles: SmallVec<[Tile; 14]>,
}

impl Hand {
    /// 创建空手牌
    pub fn new() -> Self {
        Self { tiles: SmallVec::new() }
    }

    /// 从一组牌创建手牌
    pub fn from_tiles(tiles: impl IntoIterator<Item = Tile>) -> Self {
        let mut hand = Self::new();
        for tile in tiles {
            hand.add_tile(tile);
        }
        hand
    }

    /// 添加一张牌（保持排序）
    pub fn add_tile(&mut self, tile: Tile) {
        let pos = self.tiles.partition_point(|t| *t < tile);
        self.tiles.insert(pos, tile);
    }

    /// 移除一张实体牌
    ///
    /// # 返回
    ///
    /// - `true`：成功移除
    /// - `false`：手牌中没有该牌
    pub fn remove_tile(&mut self, tile: Tile) -> bool {
        match self.tiles.iter().position(|t| *t == tile) {
            Some(pos) => {
                self.tiles.remove(pos);
                true
            }
            None => false,
        }
    }

    /// 移除 `n` 张同种牌，返回被移除的牌；数量不足时不修改手牌
    pub fn remove_kind(&mut self, kind: TileKind, n: usize) -> Option<SmallVec<[Tile; 4]>> {
        if self.kind_count(kind) < n {
            return None;
        }
        let mut removed = SmallVec::new();
        for _ in 0..n {
            let pos = self.tiles.iter().position(|t| t.kind == kind)?;
            removed.push(self.tiles.remove(pos));
        }
        Some(removed)
    }

    /// 检查是否持有某张实体牌
    pub fn has_tile(&self, tile: Tile) -> bool {
        self.tiles.contains(&tile)
    }

    /// 查询某种牌的张数
    pub fn kind_count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }

    /// 某种牌的所有实体牌
    pub fn tiles_of_kind(&self, kind: TileKind) -> SmallVec<[Tile; 4]> {
        self.tiles.iter().copied().filter(|t| t.kind == kind).collect()
    }

    /// 获取总牌数
    pub fn total_count(&self) -> usize {
        self.tiles.len()
    }

    /// 检查手牌是否为空
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// 清空手牌
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    /// 排序后的实体牌
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// 排序后的牌种序列
    pub fn kinds(&self) -> SmallVec<[TileKind; 14]> {
        self.tiles.iter().map(|t| t.kind).collect()
    }

    /// 每种牌的张数（按牌种索引）
    pub fn kind_counts(&self) -> [u8; TileKind::COUNT] {
        let mut counts = [0u8; TileKind::COUNT];
        for tile in &self.tiles {
            counts[tile.kind.index()] += 1;
        }
        counts
    }

    /// 获取所有不同的牌种（已排序）
    pub fn distinct_kinds(&self) -> SmallVec<[TileKind; 14]> {
        let mut result: SmallVec<[TileKind; 14]> = SmallVec::new();
        for tile in &self.tiles {
            if result.last() != Some(&tile.kind) {
                result.push(tile.kind);
            }
        }
        result
    }
}
