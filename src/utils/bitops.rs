use crate::tile::TileKind;

/// 牌种位集合
///
/// 使用 u64 的低 34 位表示 34 种牌是否出现，第 i 位对应索引为 i 的牌种
///
/// 形状判断（国士无双、九种九牌）只比较集合，不依赖牌的排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u64);

impl KindSet {
    /// 空集合
    pub const EMPTY: KindSet = KindSet(0);

    /// 创建空集合
    pub fn new() -> Self {
        Self::EMPTY
    }

    /// 从牌种序列创建集合（重复的牌种只计一次）
    pub fn from_kinds<'a>(kinds: impl IntoIterator<Item = &'a TileKind>) -> Self {
        let mut set = Self::new();
        for kind in kinds {
            set.insert(*kind);
        }
        set
    }

    /// 全部幺九牌（13 种）
    pub fn yaochu() -> Self {
        Self::from_kinds(TileKind::YAOCHU.iter())
    }

    #[inline]
    pub fn insert(&mut self, kind: TileKind) {
        self.0 |= 1u64 << kind.index();
    }

    #[inline]
    pub fn contains(&self, kind: TileKind) -> bool {
        self.0 & (1u64 << kind.index()) != 0
    }

    /// 集合中牌种的数量
    #[inline]
    pub fn len(&self) -> u32 {
        self.0.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn intersection(&self, other: KindSet) -> KindSet {
        KindSet(self.0 & other.0)
    }

    /// 是否为 `other` 的子集
    #[inline]
    pub fn is_subset(&self, other: KindSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// 按索引顺序遍历集合中的牌种
    pub fn iter(&self) -> impl Iterator<Item = TileKind> + '_ {
        TileKind::all().filter(move |k| self.contains(*k))
    }
}
