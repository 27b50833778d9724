use super::tile::TileKind;
use crate::utils::KindSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// 按牌种索引的张数表
pub type KindCounts = [u8; TileKind::COUNT];

/// 牌组（顺子、刻子或杠）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Group {
    /// 顺子，记录起始牌
    Sequence { start: TileKind },
    /// 刻子
    Triplet { kind: TileKind },
    /// 杠（组成判定时按刻子处理）
    Quad { kind: TileKind },
}

impl Group {
    /// 牌组包含的牌种（顺子为三种，刻子/杠为一种）
    pub fn kinds(&self) -> SmallVec<[TileKind; 3]> {
        match *self {
            Group::Sequence { start } => {
                let mut kinds = SmallVec::new();
                let mut current = Some(start);
                for _ in 0..3 {
                    if let Some(kind) = current {
                        kinds.push(kind);
                        current = kind.successor();
                    }
                }
                kinds
            }
            Group::Triplet { kind } | Group::Quad { kind } => {
                let mut kinds = SmallVec::new();
                kinds.push(kind);
                kinds
            }
        }
    }

    /// 是否包含某种牌
    pub fn contains(&self, kind: TileKind) -> bool {
        self.kinds().contains(&kind)
    }

    /// 刻子或杠
    pub fn is_triplet_like(&self) -> bool {
        !matches!(self, Group::Sequence { .. })
    }

    /// 牌组中实际的牌数
    pub fn tile_count(&self) -> usize {
        match self {
            Group::Quad { .. } => 4,
            _ => 3,
        }
    }
}

/// 牌组来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupOrigin {
    /// 由暗手拆出
    Hand,
    /// 已经亮出的副露（暗杠 `open == false`）
    Meld { open: bool },
}

/// 拆解结果中的一个牌组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DecomposedGroup {
    pub group: Group,
    pub origin: GroupOrigin,
}

impl DecomposedGroup {
    pub fn from_hand(group: Group) -> Self {
        Self { group, origin: GroupOrigin::Hand }
    }

    /// 没有经过吃碰明杠（暗手拆出或暗杠）
    pub fn is_concealed(&self) -> bool {
        !matches!(self.origin, GroupOrigin::Meld { open: true })
    }
}

/// 标准型拆解：1 个雀头 + 4 个面子
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Decomposition {
    /// 雀头
    pub pair: TileKind,
    /// 面子（含已亮出的副露），按固定顺序排列
    pub groups: SmallVec<[DecomposedGroup; 4]>,
}

/// 和牌形状
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WinShape {
    /// 标准型
    Standard(Decomposition),
    /// 七对子
    SevenPairs { pairs: [TileKind; 7] },
    /// 国士无双，记录重复的那一种
    ThirteenOrphans { duplicate: TileKind },
}

/// 手牌拆解器
///
/// 枚举所有雀头位置与刻子取舍，剩余牌按顺子贪心补全
pub struct HandDecomposer {
    /// 结果缓存（键为暗手张数表与副露数）
    /// 限制缓存大小以避免内存过度使用
    cache: HashMap<(KindCounts, usize), Vec<Decomposition>>,
    /// 最大缓存大小（超过后清空缓存）
    max_cache_size: usize,
}

impl HandDecomposer {
    /// 创建新的拆解器
    pub fn new() -> Self {
        Self::with_cache_size(1000)
    }

    /// 创建新的拆解器（自定义缓存大小）
    pub fn with_cache_size(max_cache_size: usize) -> Self {
        Self {
            cache: HashMap::new(),
            max_cache_size,
        }
    }

    /// 列出所有和牌形状
    ///
    /// # 参数
    ///
    /// - `concealed`: 暗手牌种（含和了牌）
    /// - `melds`: 已亮出的副露
    ///
    /// # 返回
    ///
    /// 所有形状；不能和牌时为空
    pub fn shapes(&mut self, concealed: &[TileKind], melds: &[DecomposedGroup]) -> Vec<WinShape> {
        let counts = counts_of(concealed);
        let mut shapes: Vec<WinShape> = self
            .standard(&counts, melds)
            .into_iter()
            .map(WinShape::Standard)
            .collect();

        if melds.is_empty() {
            if let Some(pairs) = seven_pairs(&counts) {
                shapes.push(WinShape::SevenPairs { pairs });
            }
            if let Some(duplicate) = thirteen_orphans(&counts) {
                shapes.push(WinShape::ThirteenOrphans { duplicate });
            }
        }
        shapes
    }

    /// 是否构成和牌形状
    pub fn is_complete(&mut self, concealed: &[TileKind], melds: &[DecomposedGroup]) -> bool {
        let counts = counts_of(concealed);
        self.is_complete_counts(&counts, melds)
    }

    fn is_complete_counts(&mut self, counts: &KindCounts, melds: &[DecomposedGroup]) -> bool {
        if melds.is_empty() && (seven_pairs(counts).is_some() || thirteen_orphans(counts).is_some()) {
            return true;
        }
        !self.standard(counts, melds).is_empty()
    }

    /// 听牌：再摸哪些牌种可以和牌
    ///
    /// # 参数
    ///
    /// - `concealed`: 暗手牌种（不含和了牌，张数为 3n+1）
    /// - `melds`: 已亮出的副露
    pub fn waits(&mut self, concealed: &[TileKind], melds: &[DecomposedGroup]) -> SmallVec<[TileKind; 13]> {
        let mut counts = counts_of(concealed);
        let mut waits = SmallVec::new();
        if concealed.len() % 3 != 1 {
            return waits;
        }
        for kind in TileKind::all() {
            let i = kind.index();
            if counts[i] >= 4 {
                continue;
            }
            counts[i] += 1;
            if self.is_complete_counts(&counts, melds) {
                waits.push(kind);
            }
            counts[i] -= 1;
        }
        waits
    }

    /// 标准型拆解（暗手部分 + 已亮出的副露）
    ///
    /// 结果去重并按固定顺序排列，同一输入总是得到同一结果
    pub fn standard(&mut self, counts: &KindCounts, melds: &[DecomposedGroup]) -> Vec<Decomposition> {
        let total: usize = counts.iter().map(|&c| c as usize).sum();
        if total % 3 != 2 || (total - 2) / 3 + melds.len() != 4 {
            return Vec::new();
        }

        let key = (*counts, melds.len());
        let hand_only = match self.cache.get(&key) {
            Some(cached) => cached.clone(),
            None => {
                let found = decompose_counts(counts);
                if self.cache.len() >= self.max_cache_size {
                    self.cache.clear();
                }
                self.cache.insert(key, found.clone());
                found
            }
        };

        hand_only
            .into_iter()
            .map(|mut d| {
                d.groups.extend(melds.iter().copied());
                d.groups.sort_unstable();
                d
            })
            .collect()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl Default for HandDecomposer {
    fn default() -> Self {
        Self::new()
    }
}

/// 牌种序列转张数表
pub fn counts_of(kinds: &[TileKind]) -> KindCounts {
    let mut counts = [0u8; TileKind::COUNT];
    for kind in kinds {
        counts[kind.index()] += 1;
    }
    counts
}

/// 暗手部分的全部拆解
///
/// 对每个雀头候选，枚举刻子候选的所有子集，剩余牌必须恰好拆成顺子
fn decompose_counts(counts: &KindCounts) -> Vec<Decomposition> {
    let mut results = Vec::new();

    for pair_index in 0..TileKind::COUNT {
        if counts[pair_index] < 2 {
            continue;
        }
        let Some(pair) = TileKind::from_index(pair_index) else { continue };
        let mut rest = *counts;
        rest[pair_index] -= 2;

        // 一种牌即使有 4 张也只能取一个刻子，剩下一张留给顺子
        let candidates: SmallVec<[usize; 4]> = (0..TileKind::COUNT).filter(|&i| rest[i] >= 3).collect();

        for mask in 0u32..(1 << candidates.len()) {
            let mut remaining = rest;
            let mut groups: SmallVec<[DecomposedGroup; 4]> = SmallVec::new();
            for (bit, &index) in candidates.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    remaining[index] -= 3;
                    if let Some(kind) = TileKind::from_index(index) {
                        groups.push(DecomposedGroup::from_hand(Group::Triplet { kind }));
                    }
                }
            }
            if extract_sequences(&mut remaining, &mut groups) {
                groups.sort_unstable();
                results.push(Decomposition { pair, groups });
            }
        }
    }

    results.sort_unstable();
    results.dedup();
    results
}

/// 剩余牌全部拆成顺子；有剩余牌（含字牌）时失败
///
/// 只取顺子时，每门最小的牌必然是某个顺子的起点，所以贪心是完备的
fn extract_sequences(counts: &mut KindCounts, groups: &mut SmallVec<[DecomposedGroup; 4]>) -> bool {
    for suit in 0..3 {
        let base = suit * 9;
        for rank in 0..9 {
            let i = base + rank;
            while counts[i] > 0 {
                if rank > 6 || counts[i + 1] == 0 || counts[i + 2] == 0 {
                    return false;
                }
                counts[i] -= 1;
                counts[i + 1] -= 1;
                counts[i + 2] -= 1;
                match TileKind::from_index(i) {
                    Some(start) => groups.push(DecomposedGroup::from_hand(Group::Sequence { start })),
                    None => return false,
                }
            }
        }
    }
    counts[27..].iter().all(|&c| c == 0)
}

/// 七对子：恰好 7 种牌各 2 张（4 张同种不算两对）
pub fn seven_pairs(counts: &KindCounts) -> Option<[TileKind; 7]> {
    let mut pairs = [TileKind::Characters(1); 7];
    let mut n = 0;
    for (i, &c) in counts.iter().enumerate() {
        match c {
            0 => {}
            2 if n < 7 => {
                pairs[n] = TileKind::from_index(i)?;
                n += 1;
            }
            _ => return None,
        }
    }
    (n == 7).then_some(pairs)
}

/// 国士无双：13 种幺九牌齐全，外加其中一种的第二张
///
/// 以集合比较判断，返回重复的那一种
pub fn thirteen_orphans(counts: &KindCounts) -> Option<TileKind> {
    let total: u8 = counts.iter().sum();
    if total != 14 {
        return None;
    }
    let mut present = KindSet::new();
    for kind in TileKind::all().filter(|k| counts[k.index()] > 0) {
        present.insert(kind);
    }
    if present != KindSet::yaochu() {
        return None;
    }
    TileKind::YAOCHU.iter().copied().find(|k| counts[k.index()] == 2)
}
