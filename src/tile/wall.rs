use super::tile::{Tile, TileKind};
use rand::seq::SliceRandom;
use rand::Rng;

/// 王牌（死墙）固定张数
pub const DEAD_WALL_SIZE: usize = 14;

/// 岭上牌张数，同时也是一局内杠的上限
pub const REPLACEMENT_TILES: usize = 4;

/// 牌墙（Wall）
///
/// 从头部摸牌，岭上牌从尾部取；最后 14 张为王牌
///
/// 使用 Box<[Tile]> 替代 Vec<Tile> 以减少堆分配
#[derive(Debug, Clone)]
pub struct Wall {
    /// 牌堆，洗牌后顺序固定
    tiles: Box<[Tile]>,
    /// 从头部已摸的牌数
    drawn_count: usize,
    /// 从尾部已摸的岭上牌数
    replacement_count: usize,
    /// 王牌张数
    dead_wall_size: usize,
}

impl Wall {
    /// 创建一副有序的完整牌墙（每种牌 `copies` 张）
    ///
    /// 生成顺序：按牌种索引，每种牌的副本序号 0..copies
    pub fn new(copies: u8, dead_wall_size: usize) -> Self {
        let mut tiles = Vec::with_capacity(TileKind::COUNT * copies as usize);
        for kind in TileKind::all() {
            for copy in 0..copies {
                tiles.push(Tile::with_copy(kind, copy));
            }
        }
        Self {
            tiles: tiles.into_boxed_slice(),
            drawn_count: 0,
            replacement_count: 0,
            dead_wall_size,
        }
    }

    /// 标准 136 张牌墙
    pub fn standard() -> Self {
        Self::new(4, DEAD_WALL_SIZE)
    }

    /// 使用给定的牌序创建牌墙（用于复盘和测试）
    pub fn from_tiles(tiles: Vec<Tile>, dead_wall_size: usize) -> Self {
        Self {
            tiles: tiles.into_boxed_slice(),
            drawn_count: 0,
            replacement_count: 0,
            dead_wall_size,
        }
    }

    /// 洗牌
    ///
    /// 使用调用方提供的随机源（Fisher-Yates），同一种子得到同一牌序
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tiles.shuffle(rng);
        self.drawn_count = 0;
        self.replacement_count = 0;
    }

    /// 开门：把第 `offset` 张牌转到牌墙头部
    pub fn break_at(&mut self, offset: usize) {
        if self.tiles.is_empty() {
            return;
        }
        let offset = offset % self.tiles.len();
        self.tiles.rotate_left(offset);
    }

    /// 从头部摸一张牌
    ///
    /// # 返回
    ///
    /// - `Some(Tile)`：成功摸牌
    /// - `None`：王牌之前已无牌可摸
    pub fn draw(&mut self) -> Option<Tile> {
        if self.drawable_count() == 0 {
            return None;
        }
        let tile = self.tiles[self.drawn_count];
        self.drawn_count += 1;
        Some(tile)
    }

    /// 从尾部摸一张岭上牌
    ///
    /// 每摸一张岭上牌，海底向前移动一张
    pub fn draw_replacement(&mut self) -> Option<Tile> {
        if self.replacement_count >= REPLACEMENT_TILES || self.drawable_count() == 0 {
            return None;
        }
        let index = self.tiles.len() - 1 - self.replacement_count;
        self.replacement_count += 1;
        Some(self.tiles[index])
    }

    /// 王牌之前还能摸的牌数
    pub fn drawable_count(&self) -> usize {
        self.tiles
            .len()
            .saturating_sub(self.dead_wall_size + self.drawn_count + self.replacement_count)
    }

    /// 牌墙中还未被摸走的牌数（含王牌）
    pub fn remaining_count(&self) -> usize {
        self.tiles.len() - self.drawn_count - self.replacement_count
    }

    /// 检查是否已无牌可摸
    pub fn is_exhausted(&self) -> bool {
        self.drawable_count() == 0
    }

    /// 已翻开的宝牌指示牌（`revealed` 张，位于王牌 len-5, len-7, ...）
    pub fn dora_indicators(&self, revealed: usize) -> Vec<Tile> {
        self.indicators(revealed, 5)
    }

    /// 里宝牌指示牌（位于宝牌指示牌之下）
    pub fn ura_dora_indicators(&self, revealed: usize) -> Vec<Tile> {
        self.indicators(revealed, 6)
    }

    fn indicators(&self, revealed: usize, base: usize) -> Vec<Tile> {
        (0..revealed.min(REPLACEMENT_TILES + 1))
            .filter_map(|k| self.tiles.len().checked_sub(base + 2 * k))
            .map(|index| self.tiles[index])
            .collect()
    }

    /// 获取总牌数（标准为 136）
    pub fn total_count(&self) -> usize {
        self.tiles.len()
    }

    /// 已从头部摸走的牌数
    pub fn drawn_count(&self) -> usize {
        self.drawn_count
    }

    /// 已摸走的岭上牌数
    pub fn replacement_count(&self) -> usize {
        self.replacement_count
    }

    /// 牌序（只读）
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

impl Default for Wall {
    fn default() -> Self {
        Self::standard()
    }
}
