use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 花色枚举
///
/// 三门数牌加字牌，顺序与外部记法 `m` / `p` / `s` / `z` 一致
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    /// 万子
    Characters = 0,
    /// 筒子
    Dots = 1,
    /// 索子
    Bamboo = 2,
    /// 字牌（风牌 + 三元牌）
    Honor = 3,
}

impl Suit {
    /// 三门数牌
    pub const NUMBERED: [Suit; 3] = [Suit::Characters, Suit::Dots, Suit::Bamboo];

    /// 外部记法中的花色字母
    pub fn letter(self) -> char {
        match self {
            Suit::Characters => 'm',
            Suit::Dots => 'p',
            Suit::Bamboo => 's',
            Suit::Honor => 'z',
        }
    }

    /// 从花色字母解析
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'm' => Some(Suit::Characters),
            'p' => Some(Suit::Dots),
            's' => Some(Suit::Bamboo),
            'z' => Some(Suit::Honor),
            _ => None,
        }
    }

    /// 该花色的最大点数（数牌 9，字牌 7）
    pub fn max_rank(self) -> u8 {
        match self {
            Suit::Honor => 7,
            _ => 9,
        }
    }
}

/// 风（场风 / 自风）
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Wind {
    East = 0,
    South = 1,
    West = 2,
    North = 3,
}

impl Wind {
    pub const ALL: [Wind; 4] = [Wind::East, Wind::South, Wind::West, Wind::North];

    /// 下一个风（北之后回到东）
    #[inline]
    pub fn next(self) -> Wind {
        Wind::from(self as u8 + 1)
    }

    /// 对应的字牌种类
    #[inline]
    pub fn kind(self) -> TileKind {
        TileKind::Honor(self as u8 + 1)
    }
}

impl From<u8> for Wind {
    fn from(value: u8) -> Self {
        match value % 4 {
            0 => Wind::East,
            1 => Wind::South,
            2 => Wind::West,
            _ => Wind::North,
        }
    }
}

/// 牌种（34 种）
///
/// 数牌 1-9，字牌 1-7：东南西北、白发中
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    Characters(u8),
    Dots(u8),
    Bamboo(u8),
    Honor(u8),
}

impl TileKind {
    /// 牌种总数
    pub const COUNT: usize = 34;

    /// 白
    pub const WHITE: TileKind = TileKind::Honor(5);
    /// 发
    pub const GREEN: TileKind = TileKind::Honor(6);
    /// 中
    pub const RED: TileKind = TileKind::Honor(7);

    /// 三元牌
    pub const DRAGONS: [TileKind; 3] = [Self::WHITE, Self::GREEN, Self::RED];

    /// 幺九牌（13 种）
    pub const YAOCHU: [TileKind; 13] = [
        TileKind::Characters(1),
        TileKind::Characters(9),
        TileKind::Dots(1),
        TileKind::Dots(9),
        TileKind::Bamboo(1),
        TileKind::Bamboo(9),
        TileKind::Honor(1),
        TileKind::Honor(2),
        TileKind::Honor(3),
        TileKind::Honor(4),
        TileKind::Honor(5),
        TileKind::Honor(6),
        TileKind::Honor(7),
    ];

    /// 创建一个牌种，验证输入有效性
    pub fn new(suit: Suit, rank: u8) -> Option<Self> {
        if rank < 1 || rank > suit.max_rank() {
            return None;
        }
        Some(match suit {
            Suit::Characters => TileKind::Characters(rank),
            Suit::Dots => TileKind::Dots(rank),
            Suit::Bamboo => TileKind::Bamboo(rank),
            Suit::Honor => TileKind::Honor(rank),
        })
    }

    /// 获取花色
    #[inline]
    pub fn suit(&self) -> Suit {
        match self {
            TileKind::Characters(_) => Suit::Characters,
            TileKind::Dots(_) => Suit::Dots,
            TileKind::Bamboo(_) => Suit::Bamboo,
            TileKind::Honor(_) => Suit::Honor,
        }
    }

    /// 获取点数
    #[inline]
    pub fn rank(&self) -> u8 {
        match self {
            TileKind::Characters(r) | TileKind::Dots(r) | TileKind::Bamboo(r) | TileKind::Honor(r) => *r,
        }
    }

    /// 转换为索引（0-33）
    ///
    /// 万 0-8，筒 9-17，索 18-26，字 27-33
    #[inline]
    pub fn index(&self) -> usize {
        self.suit() as usize * 9 + (self.rank() as usize - 1)
    }

    /// 从索引创建牌种
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= Self::COUNT {
            return None;
        }
        let suit = match index / 9 {
            0 => Suit::Characters,
            1 => Suit::Dots,
            2 => Suit::Bamboo,
            _ => Suit::Honor,
        };
        Self::new(suit, (index % 9) as u8 + 1)
    }

    /// 按索引顺序遍历全部 34 种牌
    pub fn all() -> impl Iterator<Item = TileKind> {
        (0..Self::COUNT).filter_map(TileKind::from_index)
    }

    #[inline]
    pub fn is_honor(&self) -> bool {
        matches!(self, TileKind::Honor(_))
    }

    /// 老头牌（数牌 1 / 9）
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !self.is_honor() && (self.rank() == 1 || self.rank() == 9)
    }

    /// 幺九牌：老头牌或字牌
    #[inline]
    pub fn is_yaochu(&self) -> bool {
        self.is_honor() || self.is_terminal()
    }

    /// 中张牌（数牌 2-8）
    #[inline]
    pub fn is_simple(&self) -> bool {
        !self.is_yaochu()
    }

    #[inline]
    pub fn is_dragon(&self) -> bool {
        matches!(self, TileKind::Honor(5..=7))
    }

    /// 风牌对应的风，非风牌返回 None
    pub fn wind(&self) -> Option<Wind> {
        match self {
            TileKind::Honor(r @ 1..=4) => Some(Wind::from(r - 1)),
            _ => None,
        }
    }

    /// 绿一色可用的牌：索子 2/3/4/6/8 与发
    pub fn is_green(&self) -> bool {
        matches!(self, TileKind::Bamboo(2 | 3 | 4 | 6 | 8)) || *self == Self::GREEN
    }

    /// 同花色下一个点数，不循环；用于顺子拼接
    pub fn successor(&self) -> Option<TileKind> {
        if self.is_honor() {
            return None;
        }
        Self::new(self.suit(), self.rank() + 1)
    }

    /// 宝牌指示牌所指示的宝牌
    ///
    /// 数牌 9 → 1，风牌 东 → 南 → 西 → 北 → 东，三元牌 白 → 发 → 中 → 白
    pub fn dora_from_indicator(&self) -> TileKind {
        match self {
            TileKind::Honor(r @ 1..=4) => TileKind::Honor(r % 4 + 1),
            TileKind::Honor(r) => TileKind::Honor((r - 5 + 1) % 3 + 5),
            _ => {
                let rank = self.rank() % 9 + 1;
                Self::new(self.suit(), rank).unwrap_or(*self)
            }
        }
    }

    /// 检查三种牌是否可以组成顺子（连续三张）
    ///
    /// 输入顺序无关，内部排序后判断
    pub fn forms_sequence(a: TileKind, b: TileKind, c: TileKind) -> bool {
        if a.is_honor() || a.suit() != b.suit() || a.suit() != c.suit() {
            return false;
        }
        let mut ranks = [a.rank(), b.rank(), c.rank()];
        ranks.sort_unstable();
        ranks[0] + 1 == ranks[1] && ranks[1] + 1 == ranks[2]
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank(), self.suit().letter())
    }
}

/// 牌记法解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileParseError {
    #[error("tile notation is empty")]
    Empty,
    #[error("invalid suit letter '{0}'")]
    InvalidSuit(char),
    #[error("invalid rank {rank} for suit '{suit}'")]
    InvalidRank { rank: u8, suit: char },
    #[error("digits without a trailing suit letter")]
    MissingSuit,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
}

impl FromStr for TileKind {
    type Err = TileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = parse_kinds(s)?;
        match kinds.as_slice() {
            [kind] => Ok(*kind),
            [] => Err(TileParseError::Empty),
            _ => Err(TileParseError::UnexpectedChar(s.chars().nth(2).unwrap_or(' '))),
        }
    }
}

/// 解析紧凑记法，如 `"123m456p789s11z"`
///
/// 数字在前，花色字母在后，同一花色可以连写多个数字
pub fn parse_kinds(notation: &str) -> Result<Vec<TileKind>, TileParseError> {
    let mut kinds = Vec::with_capacity(14);
    let mut pending: Vec<u8> = Vec::with_capacity(14);

    for c in notation.chars() {
        if c.is_whitespace() {
            continue;
        }
        if let Some(d) = c.to_digit(10) {
            pending.push(d as u8);
            continue;
        }
        if !c.is_ascii_alphabetic() {
            return Err(TileParseError::UnexpectedChar(c));
        }
        let suit = Suit::from_letter(c).ok_or(TileParseError::InvalidSuit(c))?;
        if pending.is_empty() {
            return Err(TileParseError::UnexpectedChar(c));
        }
        for rank in pending.drain(..) {
            let kind = TileKind::new(suit, rank).ok_or(TileParseError::InvalidRank { rank, suit: c })?;
            kinds.push(kind);
        }
    }

    if !pending.is_empty() {
        return Err(TileParseError::MissingSuit);
    }
    if kinds.is_empty() {
        return Err(TileParseError::Empty);
    }
    Ok(kinds)
}

/// 一张实体牌：牌种 + 副本序号（0-3）
///
/// 同一牌墙内 (kind, copy) 唯一
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub copy: u8,
}

impl Tile {
    /// 创建一张牌
    pub fn with_copy(kind: TileKind, copy: u8) -> Self {
        Self { kind, copy }
    }

    /// 副本序号为 0 的牌
    pub fn of(kind: TileKind) -> Self {
        Self { kind, copy: 0 }
    }
}

impl From<TileKind> for Tile {
    fn from(kind: TileKind) -> Self {
        Tile::of(kind)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// 解析记法并为每张牌分配不冲突的副本序号
///
/// 同种牌超过 4 张时返回 None
pub fn parse_tiles(notation: &str) -> Result<Option<Vec<Tile>>, TileParseError> {
    let kinds = parse_kinds(notation)?;
    let mut used = [0u8; TileKind::COUNT];
    let mut tiles = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let copy = used[kind.index()];
        if copy >= 4 {
            return Ok(None);
        }
        used[kind.index()] += 1;
        tiles.push(Tile::with_copy(kind, copy));
    }
    Ok(Some(tiles))
}
