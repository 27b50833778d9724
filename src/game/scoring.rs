use crate::game::constants::{
    BAIMAN_BASE, HANEMAN_BASE, MANGAN_BASE, SANBAIMAN_BASE, SEVEN_PAIRS_FU, YAKUMAN_BASE,
};
use crate::game::yaku::{HandFeatures, ShapeClass, WaitPattern, WinContext, Yaku, YakuEvaluator, YakuResult};
use crate::tile::{DecomposedGroup, Group, GroupOrigin, HandDecomposer, TileKind, WinShape};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// 和了不成立的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum WinRejection {
    #[error("tiles do not form a winning shape")]
    IncompleteShape,
    #[error("winning shape has no yaku")]
    NoYaku,
    #[error("player is furiten")]
    Furiten,
    #[error("cannot win on own discard")]
    OwnDiscard,
    #[error("no tile was drawn this turn")]
    NothingDrawn,
}

/// 符数计算器
pub struct FuCalculator;

impl FuCalculator {
    /// 计算符数
    ///
    /// 七对子固定 25 符；其余向上取整到 10 的倍数，
    /// 平和自摸 20 符，其他情况不足 30 符按 30 符计
    pub fn fu(features: &HandFeatures, pinfu: bool) -> u32 {
        if features.shape == ShapeClass::SevenPairs {
            return SEVEN_PAIRS_FU;
        }
        let ctx = &features.ctx;
        if pinfu && ctx.self_drawn {
            return 20;
        }

        let mut fu = 20;
        for g in &features.groups {
            fu += Self::group_fu(g.group, g.concealed);
        }
        if let Some(pair) = features.pair {
            if pair.is_dragon() {
                fu += 2;
            }
            if pair == ctx.prevailing_wind.kind() {
                fu += 2;
            }
            if pair == ctx.seat_wind.kind() {
                fu += 2;
            }
        }
        if matches!(
            features.wait,
            Some(WaitPattern::Kanchan | WaitPattern::Penchan | WaitPattern::Tanki)
        ) {
            fu += 2;
        }
        if ctx.self_drawn {
            fu += 2;
        } else if features.concealed {
            fu += 10;
        }

        let fu = round_up(fu, 10);
        if fu == 20 {
            30
        } else {
            fu
        }
    }

    /// 刻子 / 杠的符：明刻 2，暗刻 4，杠 ×4，幺九 ×2
    pub fn group_fu(group: Group, concealed: bool) -> u32 {
        let (kind, mut fu) = match group {
            Group::Sequence { .. } => return 0,
            Group::Triplet { kind } => (kind, 2),
            Group::Quad { kind } => (kind, 8),
        };
        if concealed {
            fu *= 2;
        }
        if kind.is_yaochu() {
            fu *= 2;
        }
        fu
    }
}

/// 点数表
pub struct PointTable;

impl PointTable {
    /// 基本点
    ///
    /// 4 番以下按 `符 × 2^(2+番)` 计算（3 番 60 符、4 番 30 符以上切上满贯），
    /// 5 番以上按满贯 / 跳满 / 倍满 / 三倍满 / 役满封顶
    pub fn base_points(fu: u32, fan: u32) -> u32 {
        match fan {
            0 => 0,
            1..=4 => {
                if (fan == 3 && fu >= 60) || (fan == 4 && fu >= 30) {
                    MANGAN_BASE
                } else {
                    fu.saturating_mul(1 << (2 + fan)).min(MANGAN_BASE)
                }
            }
            5 => MANGAN_BASE,
            6 | 7 => HANEMAN_BASE,
            8..=10 => BAIMAN_BASE,
            11 | 12 => SANBAIMAN_BASE,
            _ => YAKUMAN_BASE,
        }
    }
}

/// 向上取整到 `unit` 的倍数
#[inline]
pub fn round_up(value: u32, unit: u32) -> u32 {
    value.div_ceil(unit) * unit
}

/// 点数向上取整到 100
#[inline]
pub fn round_up_100(value: u32) -> u32 {
    round_up(value, 100)
}

/// 和了评估结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEvaluation {
    /// 采用的形状
    pub shape: WinShape,
    /// 听牌形式（国士为 None）
    pub wait: Option<WaitPattern>,
    pub yaku: YakuResult,
    /// 宝牌数（役满时为 0）
    pub dora: u32,
    /// 番数合计（役 + 宝牌）
    pub fan: u32,
    pub fu: u32,
    /// 基本点
    pub base_points: u32,
}

/// 和了请求
#[derive(Debug, Clone)]
pub struct WinRequest<'a> {
    /// 暗手牌种（不含和了牌）
    pub concealed: &'a [TileKind],
    pub win_tile: TileKind,
    /// 副露
    pub melds: &'a [DecomposedGroup],
    pub context: WinContext,
    /// 宝牌（已由指示牌换算）
    pub dora: &'a [TileKind],
    /// 里宝牌（只对立直有效）
    pub ura_dora: &'a [TileKind],
}

/// 和了评估器
///
/// 对每种拆解、每种听牌解释计算点数，取最高者
pub struct WinEvaluator;

impl WinEvaluator {
    /// 评估和了
    ///
    /// # 返回
    ///
    /// - `Ok(WinEvaluation)`：点数最高的解释
    /// - `Err(WinRejection)`：形状不成立或无役
    pub fn evaluate(decomposer: &mut HandDecomposer, request: &WinRequest) -> Result<WinEvaluation, WinRejection> {
        let mut full: SmallVec<[TileKind; 14]> = request.concealed.iter().copied().collect();
        full.push(request.win_tile);
        full.sort_unstable();

        let shapes = decomposer.shapes(&full, request.melds);
        if shapes.is_empty() {
            return Err(WinRejection::IncompleteShape);
        }

        let mut all_tiles: SmallVec<[TileKind; 18]> = full.iter().copied().collect();
        for meld in request.melds {
            let kinds = meld.group.kinds();
            match meld.group {
                Group::Sequence { .. } => all_tiles.extend(kinds),
                other => all_tiles.extend(std::iter::repeat(kinds[0]).take(other.tile_count())),
            }
        }
        let concealed = request.melds.iter().all(|m| m.is_concealed());

        let mut best: Option<WinEvaluation> = None;
        for shape in shapes {
            for features in Self::interpretations(&shape, request, concealed, &all_tiles) {
                let Some(evaluation) = Self::score(&shape, &features, request) else { continue };
                let better = match &best {
                    None => true,
                    Some(b) => {
                        (evaluation.base_points, evaluation.fan, evaluation.fu) > (b.base_points, b.fan, b.fu)
                    }
                };
                if better {
                    best = Some(evaluation);
                }
            }
        }
        best.ok_or(WinRejection::NoYaku)
    }

    /// 一种形状的所有听牌解释
    fn interpretations(
        shape: &WinShape,
        request: &WinRequest,
        concealed: bool,
        all_tiles: &SmallVec<[TileKind; 18]>,
    ) -> Vec<HandFeatures> {
        let ctx = request.context;
        let win = request.win_tile;
        match shape {
            WinShape::Standard(d) => {
                let mut out = Vec::with_capacity(4);
                if d.pair == win {
                    out.push(HandFeatures::standard(ctx, d, None, win, concealed, all_tiles.clone()));
                }
                let mut seen: SmallVec<[Group; 4]> = SmallVec::new();
                for (i, g) in d.groups.iter().enumerate() {
                    if g.origin != GroupOrigin::Hand || !g.group.contains(win) || seen.contains(&g.group) {
                        continue;
                    }
                    seen.push(g.group);
                    out.push(HandFeatures::standard(ctx, d, Some(i), win, concealed, all_tiles.clone()));
                }
                out
            }
            WinShape::SevenPairs { pairs } => vec![HandFeatures::seven_pairs(ctx, pairs, all_tiles.clone())],
            WinShape::ThirteenOrphans { .. } => vec![HandFeatures::thirteen_orphans(ctx, all_tiles.clone())],
        }
    }

    fn score(shape: &WinShape, features: &HandFeatures, request: &WinRequest) -> Option<WinEvaluation> {
        let yaku = YakuEvaluator::evaluate(features);
        if yaku.is_empty() {
            return None;
        }

        let dora = if yaku.yakuman {
            0
        } else {
            let mut count = Self::count_dora(&features.tiles, request.dora);
            if request.context.riichi {
                count += Self::count_dora(&features.tiles, request.ura_dora);
            }
            count
        };

        let pinfu = yaku.contains(Yaku::Pinfu);
        let fu = FuCalculator::fu(features, pinfu);
        let fan = yaku.fan() + dora;
        let base_points = PointTable::base_points(fu, fan);

        Some(WinEvaluation {
            shape: shape.clone(),
            wait: features.wait,
            yaku,
            dora,
            fan,
            fu,
            base_points,
        })
    }

    /// 统计宝牌张数（重复的宝牌分别计数）
    pub fn count_dora(tiles: &[TileKind], dora: &[TileKind]) -> u32 {
        dora.iter()
            .map(|d| tiles.iter().filter(|k| *k == d).count() as u32)
            .sum()
    }
}
