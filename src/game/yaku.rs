use crate::game::constants::YAKUMAN_FAN;
use crate::tile::{Decomposition, Group, Suit, TileKind, Wind};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// 役种
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Yaku {
    Riichi,
    DoubleRiichi,
    Ippatsu,
    MenzenTsumo,
    Tanyao,
    Pinfu,
    Iipeikou,
    Ryanpeikou,
    PrevailingWind,
    SeatWind,
    White,
    Green,
    Red,
    Rinshan,
    Chankan,
    Haitei,
    Houtei,
    SanshokuDoujun,
    Ittsu,
    Chanta,
    Junchan,
    Honroutou,
    Chiitoitsu,
    Toitoi,
    Sanankou,
    SanshokuDoukou,
    Sankantsu,
    Shousangen,
    Honitsu,
    Chinitsu,
    KokushiMusou,
    Suuankou,
    Daisangen,
    Tsuuiisou,
    Shousuushii,
    Daisuushii,
    Ryuuiisou,
    Chinroutou,
    Suukantsu,
    ChuurenPoutou,
    Tenhou,
    Chiihou,
}

/// 役的等级：役满与普通役互斥
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Regular,
    Yakuman,
}

/// 听牌形式（和了牌补全的是哪一种牌组）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaitPattern {
    /// 两面
    Ryanmen,
    /// 嵌张
    Kanchan,
    /// 边张
    Penchan,
    /// 单骑
    Tanki,
    /// 双碰
    Shanpon,
}

impl WaitPattern {
    /// 和了牌补全顺子时的听牌形式
    pub fn for_sequence(start: TileKind, win: TileKind) -> WaitPattern {
        let offset = win.rank().wrapping_sub(start.rank());
        match offset {
            1 => WaitPattern::Kanchan,
            0 if start.rank() == 7 => WaitPattern::Penchan,
            2 if start.rank() == 1 => WaitPattern::Penchan,
            _ => WaitPattern::Ryanmen,
        }
    }
}

/// 和了时的场况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinContext {
    /// 自摸
    pub self_drawn: bool,
    pub seat_wind: Wind,
    pub prevailing_wind: Wind,
    pub dealer: bool,
    pub riichi: bool,
    pub double_riichi: bool,
    pub ippatsu: bool,
    /// 海底 / 河底
    pub last_tile: bool,
    /// 岭上牌
    pub after_quad: bool,
    /// 抢杠
    pub robbing_quad: bool,
    /// 第一巡且无人鸣牌
    pub first_draw: bool,
}

impl WinContext {
    /// 普通的荣和场况
    pub fn ron(seat_wind: Wind, prevailing_wind: Wind) -> Self {
        Self {
            self_drawn: false,
            seat_wind,
            prevailing_wind,
            dealer: seat_wind == prevailing_wind,
            riichi: false,
            double_riichi: false,
            ippatsu: false,
            last_tile: false,
            after_quad: false,
            robbing_quad: false,
            first_draw: false,
        }
    }

    /// 普通的自摸场况
    pub fn tsumo(seat_wind: Wind, prevailing_wind: Wind) -> Self {
        Self {
            self_drawn: true,
            ..Self::ron(seat_wind, prevailing_wind)
        }
    }
}

/// 和牌形状类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeClass {
    Standard,
    SevenPairs,
    ThirteenOrphans,
}

/// 特征中的一个牌组（荣和补全的刻子视为明刻）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureGroup {
    pub group: Group,
    pub concealed: bool,
}

/// 手牌特征
///
/// 每种形状计算一次，所有役都是这份记录上的纯函数；
/// 七对子、国士无双只填写相关字段，其余保持默认值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandFeatures {
    pub ctx: WinContext,
    pub shape: ShapeClass,
    /// 门前清
    pub concealed: bool,
    /// 雀头（七对子、国士为 None）
    pub pair: Option<TileKind>,
    /// 四个面子（含副露）
    pub groups: SmallVec<[FeatureGroup; 4]>,
    /// 七对子的七个对子
    pub pairs: SmallVec<[TileKind; 7]>,
    pub wait: Option<WaitPattern>,
    /// 全部牌（暗手 + 和了牌 + 副露，杠按 4 张计）
    pub tiles: SmallVec<[TileKind; 18]>,
}

impl HandFeatures {
    /// 标准型特征
    ///
    /// # 参数
    ///
    /// - `decomposition`: 拆解结果
    /// - `completed`: 和了牌补全的牌组下标（None 表示补全雀头）
    /// - `win`: 和了牌
    pub fn standard(
        ctx: WinContext,
        decomposition: &Decomposition,
        completed: Option<usize>,
        win: TileKind,
        concealed: bool,
        tiles: SmallVec<[TileKind; 18]>,
    ) -> Self {
        let mut wait = WaitPattern::Tanki;
        let groups = decomposition
            .groups
            .iter()
            .enumerate()
            .map(|(i, g)| {
                let mut concealed_group = g.is_concealed();
                if completed == Some(i) {
                    match g.group {
                        Group::Sequence { start } => wait = WaitPattern::for_sequence(start, win),
                        _ => {
                            wait = WaitPattern::Shanpon;
                            if !ctx.self_drawn {
                                concealed_group = false;
                            }
                        }
                    }
                }
                FeatureGroup {
                    group: g.group,
                    concealed: concealed_group,
                }
            })
            .collect();

        Self {
            ctx,
            shape: ShapeClass::Standard,
            concealed,
            pair: Some(decomposition.pair),
            groups,
            pairs: SmallVec::new(),
            wait: Some(wait),
            tiles,
        }
    }

    /// 七对子特征
    pub fn seven_pairs(ctx: WinContext, pairs: &[TileKind; 7], tiles: SmallVec<[TileKind; 18]>) -> Self {
        Self {
            ctx,
            shape: ShapeClass::SevenPairs,
            concealed: true,
            pair: None,
            groups: SmallVec::new(),
            pairs: SmallVec::from_slice(pairs),
            wait: Some(WaitPattern::Tanki),
            tiles,
        }
    }

    /// 国士无双特征
    pub fn thirteen_orphans(ctx: WinContext, tiles: SmallVec<[TileKind; 18]>) -> Self {
        Self {
            ctx,
            shape: ShapeClass::ThirteenOrphans,
            concealed: true,
            pair: None,
            groups: SmallVec::new(),
            pairs: SmallVec::new(),
            wait: None,
            tiles,
        }
    }

    /// 顺子起始牌（排序）
    pub fn sequences(&self) -> SmallVec<[TileKind; 4]> {
        let mut starts: SmallVec<[TileKind; 4]> = self
            .groups
            .iter()
            .filter_map(|g| match g.group {
                Group::Sequence { start } => Some(start),
                _ => None,
            })
            .collect();
        starts.sort_unstable();
        starts
    }

    /// 刻子（含杠）的牌种
    pub fn triplets(&self) -> SmallVec<[TileKind; 4]> {
        self.groups
            .iter()
            .filter_map(|g| match g.group {
                Group::Triplet { kind } | Group::Quad { kind } => Some(kind),
                _ => None,
            })
            .collect()
    }

    /// 暗刻数（含暗杠）
    pub fn concealed_triplets(&self) -> usize {
        self.groups
            .iter()
            .filter(|g| g.concealed && g.group.is_triplet_like())
            .count()
    }

    pub fn quads(&self) -> usize {
        self.groups.iter().filter(|g| matches!(g.group, Group::Quad { .. })).count()
    }

    /// 雀头是否为役牌（三元牌、场风、自风）
    pub fn pair_is_valued(&self) -> bool {
        match self.pair {
            Some(pair) => {
                pair.is_dragon()
                    || pair == self.ctx.prevailing_wind.kind()
                    || pair == self.ctx.seat_wind.kind()
            }
            None => false,
        }
    }

    fn has_triplet(&self, kind: TileKind) -> bool {
        self.triplets().contains(&kind)
    }
}

/// 一条役规则
#[derive(Debug, Clone, Copy)]
pub struct YakuRule {
    pub yaku: Yaku,
    /// 门前番数
    pub closed_fan: u8,
    /// 副露番数（0 表示只能门前）
    pub open_fan: u8,
    pub tier: Tier,
    pub applies: fn(&HandFeatures) -> bool,
}

macro_rules! rule {
    ($yaku:ident, $closed:expr, $open:expr, $tier:ident, $check:expr) => {
        YakuRule {
            yaku: Yaku::$yaku,
            closed_fan: $closed,
            open_fan: $open,
            tier: Tier::$tier,
            applies: $check,
        }
    };
}

/// 役表（按优先级排列）
pub static YAKU_TABLE: &[YakuRule] = &[
    rule!(Riichi, 1, 0, Regular, |f| f.ctx.riichi),
    rule!(DoubleRiichi, 2, 0, Regular, |f| f.ctx.riichi && f.ctx.double_riichi),
    rule!(Ippatsu, 1, 0, Regular, |f| f.ctx.riichi && f.ctx.ippatsu),
    rule!(MenzenTsumo, 1, 0, Regular, |f| f.concealed && f.ctx.self_drawn),
    rule!(Tanyao, 1, 1, Regular, |f| f.tiles.iter().all(|k| k.is_simple())),
    rule!(Pinfu, 1, 0, Regular, is_pinfu),
    rule!(Iipeikou, 1, 0, Regular, |f| identical_sequence_pairs(f) >= 1),
    rule!(Ryanpeikou, 3, 0, Regular, |f| identical_sequence_pairs(f) == 2),
    rule!(PrevailingWind, 1, 1, Regular, |f| f.has_triplet(f.ctx.prevailing_wind.kind())),
    rule!(SeatWind, 1, 1, Regular, |f| f.has_triplet(f.ctx.seat_wind.kind())),
    rule!(White, 1, 1, Regular, |f| f.has_triplet(TileKind::WHITE)),
    rule!(Green, 1, 1, Regular, |f| f.has_triplet(TileKind::GREEN)),
    rule!(Red, 1, 1, Regular, |f| f.has_triplet(TileKind::RED)),
    rule!(Rinshan, 1, 1, Regular, |f| f.ctx.self_drawn && f.ctx.after_quad),
    rule!(Chankan, 1, 1, Regular, |f| !f.ctx.self_drawn && f.ctx.robbing_quad),
    rule!(Haitei, 1, 1, Regular, |f| f.ctx.self_drawn && f.ctx.last_tile && !f.ctx.after_quad),
    rule!(Houtei, 1, 1, Regular, |f| !f.ctx.self_drawn && f.ctx.last_tile && !f.ctx.robbing_quad),
    rule!(SanshokuDoujun, 2, 1, Regular, is_sanshoku_doujun),
    rule!(Ittsu, 2, 1, Regular, is_ittsu),
    rule!(Chanta, 2, 1, Regular, |f| is_outside_hand(f, true)),
    rule!(Junchan, 3, 2, Regular, |f| is_outside_hand(f, false)),
    rule!(Honroutou, 2, 2, Regular, |f| {
        f.shape != ShapeClass::ThirteenOrphans && f.tiles.iter().all(|k| k.is_yaochu())
    }),
    rule!(Chiitoitsu, 2, 0, Regular, |f| f.shape == ShapeClass::SevenPairs),
    rule!(Toitoi, 2, 2, Regular, |f| f.shape == ShapeClass::Standard && f.triplets().len() == 4),
    rule!(Sanankou, 2, 2, Regular, |f| f.concealed_triplets() >= 3),
    rule!(SanshokuDoukou, 2, 2, Regular, is_sanshoku_doukou),
    rule!(Sankantsu, 2, 2, Regular, |f| f.quads() >= 3),
    rule!(Shousangen, 2, 2, Regular, |f| {
        f.pair.map_or(false, |p| p.is_dragon()) && dragon_triplets(f) == 2
    }),
    rule!(Honitsu, 3, 2, Regular, |f| single_suit(f).is_some()),
    rule!(Chinitsu, 6, 5, Regular, |f| single_suit(f) == Some(false)),
    rule!(KokushiMusou, 13, 0, Yakuman, |f| f.shape == ShapeClass::ThirteenOrphans),
    rule!(Suuankou, 13, 0, Yakuman, |f| f.concealed_triplets() == 4),
    rule!(Daisangen, 13, 13, Yakuman, |f| dragon_triplets(f) == 3),
    rule!(Tsuuiisou, 13, 13, Yakuman, |f| f.tiles.iter().all(|k| k.is_honor())),
    rule!(Shousuushii, 13, 13, Yakuman, |f| {
        f.pair.map_or(false, |p| p.wind().is_some()) && wind_triplets(f) == 3
    }),
    rule!(Daisuushii, 13, 13, Yakuman, |f| wind_triplets(f) == 4),
    rule!(Ryuuiisou, 13, 13, Yakuman, |f| f.tiles.iter().all(|k| k.is_green())),
    rule!(Chinroutou, 13, 13, Yakuman, |f| f.tiles.iter().all(|k| k.is_terminal())),
    rule!(Suukantsu, 13, 13, Yakuman, |f| f.quads() == 4),
    rule!(ChuurenPoutou, 13, 0, Yakuman, |f| {
        f.shape == ShapeClass::Standard && is_nine_gates(&f.tiles, f.concealed)
    }),
    rule!(Tenhou, 13, 0, Yakuman, |f| f.ctx.first_draw && f.ctx.self_drawn && f.ctx.dealer),
    rule!(Chiihou, 13, 0, Yakuman, |f| f.ctx.first_draw && f.ctx.self_drawn && !f.ctx.dealer),
];

/// 升级关系：基础役成立时，若列表中任一役也成立，则基础役被取代
pub static UPGRADES: &[(Yaku, &[Yaku])] = &[
    (Yaku::Riichi, &[Yaku::DoubleRiichi]),
    (Yaku::Iipeikou, &[Yaku::Ryanpeikou]),
    (Yaku::Chanta, &[Yaku::Junchan, Yaku::Honroutou]),
    (Yaku::Honitsu, &[Yaku::Chinitsu]),
    (Yaku::Sanankou, &[Yaku::Suuankou]),
    (Yaku::Sankantsu, &[Yaku::Suukantsu]),
    (Yaku::Shousangen, &[Yaku::Daisangen]),
    (Yaku::Shousuushii, &[Yaku::Daisuushii]),
];

/// 役的判定结果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YakuResult {
    /// 成立的役及其番数
    pub yaku: SmallVec<[(Yaku, u8); 8]>,
    /// 役满
    pub yakuman: bool,
}

impl YakuResult {
    pub fn is_empty(&self) -> bool {
        self.yaku.is_empty()
    }

    /// 役的番数合计（役满每个按 13 番计）
    pub fn fan(&self) -> u32 {
        if self.yakuman {
            self.yaku.len() as u32 * YAKUMAN_FAN
        } else {
            self.yaku.iter().map(|(_, fan)| *fan as u32).sum()
        }
    }

    pub fn contains(&self, yaku: Yaku) -> bool {
        self.yaku.iter().any(|(y, _)| *y == yaku)
    }
}

/// 役判定器
pub struct YakuEvaluator;

impl YakuEvaluator {
    /// 判定手牌特征上成立的役
    ///
    /// 顺序：逐条匹配 → 去掉副露下不成立的门前役 → 按升级关系去掉基础役 → 有役满时只保留役满
    pub fn evaluate(features: &HandFeatures) -> YakuResult {
        let mut matched: SmallVec<[&YakuRule; 12]> = YAKU_TABLE
            .iter()
            .filter(|rule| (rule.applies)(features))
            .filter(|rule| features.concealed || rule.open_fan > 0)
            .collect();

        let present: SmallVec<[Yaku; 12]> = matched.iter().map(|r| r.yaku).collect();
        matched.retain(|rule| !Self::is_superseded(rule.yaku, &present));

        let yakuman = matched.iter().any(|r| r.tier == Tier::Yakuman);
        if yakuman {
            matched.retain(|r| r.tier == Tier::Yakuman);
        }

        let yaku = matched
            .iter()
            .map(|r| {
                let fan = if features.concealed { r.closed_fan } else { r.open_fan };
                (r.yaku, fan)
            })
            .collect();

        YakuResult { yaku, yakuman }
    }

    /// 基础役是否被已成立的升级役取代
    pub fn is_superseded(yaku: Yaku, present: &[Yaku]) -> bool {
        UPGRADES
            .iter()
            .filter(|(base, _)| *base == yaku)
            .any(|(_, upgrades)| upgrades.iter().any(|u| present.contains(u)))
    }

    /// 查询役表中的规则
    pub fn rule(yaku: Yaku) -> Option<&'static YakuRule> {
        YAKU_TABLE.iter().find(|r| r.yaku == yaku)
    }
}

fn is_pinfu(f: &HandFeatures) -> bool {
    f.concealed
        && f.shape == ShapeClass::Standard
        && f.sequences().len() == 4
        && !f.pair_is_valued()
        && f.wait == Some(WaitPattern::Ryanmen)
}

/// 门前手中完全相同的顺子对数
fn identical_sequence_pairs(f: &HandFeatures) -> usize {
    if !f.concealed || f.shape != ShapeClass::Standard {
        return 0;
    }
    let seqs = f.sequences();
    let mut pairs = 0;
    let mut i = 0;
    while i + 1 < seqs.len() {
        if seqs[i] == seqs[i + 1] {
            pairs += 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    pairs
}

fn is_sanshoku_doujun(f: &HandFeatures) -> bool {
    let seqs = f.sequences();
    (1..=7).any(|rank| {
        Suit::NUMBERED
            .iter()
            .all(|&suit| TileKind::new(suit, rank).map_or(false, |k| seqs.contains(&k)))
    })
}

fn is_ittsu(f: &HandFeatures) -> bool {
    let seqs = f.sequences();
    Suit::NUMBERED.iter().any(|&suit| {
        [1, 4, 7]
            .iter()
            .all(|&rank| TileKind::new(suit, rank).map_or(false, |k| seqs.contains(&k)))
    })
}

fn is_sanshoku_doukou(f: &HandFeatures) -> bool {
    let triplets = f.triplets();
    (1..=9).any(|rank| {
        Suit::NUMBERED
            .iter()
            .all(|&suit| TileKind::new(suit, rank).map_or(false, |k| triplets.contains(&k)))
    })
}

/// 全带幺（允许字牌）/ 纯全带幺（不允许字牌），至少一个顺子
fn is_outside_hand(f: &HandFeatures, allow_honors: bool) -> bool {
    let Some(pair) = f.pair else { return false };
    let qualifies = |k: TileKind| if allow_honors { k.is_yaochu() } else { k.is_terminal() };
    if !qualifies(pair) || f.sequences().is_empty() {
        return false;
    }
    let blocks_ok = f.groups.iter().all(|g| match g.group {
        Group::Sequence { start } => start.rank() == 1 || start.rank() == 7,
        Group::Triplet { kind } | Group::Quad { kind } => qualifies(kind),
    });
    let has_honor = f.tiles.iter().any(|k| k.is_honor());
    blocks_ok && (!allow_honors || has_honor)
}

fn dragon_triplets(f: &HandFeatures) -> usize {
    f.triplets().iter().filter(|k| k.is_dragon()).count()
}

fn wind_triplets(f: &HandFeatures) -> usize {
    f.triplets().iter().filter(|k| k.wind().is_some()).count()
}

/// 只含一门数牌：Some(true) 混一色（带字牌），Some(false) 清一色
fn single_suit(f: &HandFeatures) -> Option<bool> {
    let mut suit = None;
    let mut has_honor = false;
    for kind in &f.tiles {
        if kind.is_honor() {
            has_honor = true;
            continue;
        }
        match suit {
            None => suit = Some(kind.suit()),
            Some(s) if s != kind.suit() => return None,
            _ => {}
        }
    }
    suit.map(|_| has_honor)
}

/// 九莲宝灯形状：门前、只含一门数牌、该门 1 与 9 各至少三张
pub fn is_nine_gates(tiles: &[TileKind], concealed: bool) -> bool {
    if !concealed || tiles.len() != 14 {
        return false;
    }
    let Some(first) = tiles.first() else { return false };
    let suit = first.suit();
    if suit == Suit::Honor || tiles.iter().any(|k| k.suit() != suit) {
        return false;
    }
    let ones = tiles.iter().filter(|k| k.rank() == 1).count();
    let nines = tiles.iter().filter(|k| k.rank() == 9).count();
    ones >= 3 && nines >= 3
}
