use crate::game::constants::{
    COPIES_PER_TILE, DEAD_WALL_SIZE, HONBA_BONUS, INITIAL_SCORE, MAX_QUADS, RIICHI_DEPOSIT, TENPAI_POOL,
};
use crate::tile::{TileKind, Wind};
use serde::{Deserialize, Serialize};

/// 配牌方式
///
/// 先按 `blocks` 轮、每轮每家 `block_size` 张从庄家开始分发，
/// 然后庄家取 2 张、其余三家各取 1 张
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DealProcedure {
    pub blocks: u8,
    pub block_size: u8,
}

impl DealProcedure {
    /// 闲家配牌张数
    pub fn hand_size(&self) -> usize {
        self.blocks as usize * self.block_size as usize + 1
    }
}

impl Default for DealProcedure {
    fn default() -> Self {
        Self { blocks: 3, block_size: 4 }
    }
}

/// 规则变体
///
/// 东风战与半庄战共用同一套算法，只在这里的参数上不同
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleVariant {
    pub name: String,
    /// 每种牌的张数
    pub copies_per_kind: u8,
    /// 王牌张数
    pub dead_wall_size: usize,
    pub deal: DealProcedure,
    /// 每个场风的局数
    pub hands_per_wind: u8,
    /// 最后一个场风（超过即终局）
    pub last_wind: Wind,
    pub initial_score: i32,
    pub riichi_deposit: i32,
    /// 每本场加点
    pub honba_bonus: i32,
    /// 荒牌流局不听罚符总额
    pub tenpai_pool: i32,
    /// 一局内杠的上限
    pub max_quads: u8,
}

impl RuleVariant {
    /// 东风战
    pub fn short() -> Self {
        Self {
            name: "tonpuusen".to_string(),
            copies_per_kind: COPIES_PER_TILE,
            dead_wall_size: DEAD_WALL_SIZE,
            deal: DealProcedure::default(),
            hands_per_wind: 4,
            last_wind: Wind::East,
            initial_score: INITIAL_SCORE,
            riichi_deposit: RIICHI_DEPOSIT,
            honba_bonus: HONBA_BONUS,
            tenpai_pool: TENPAI_POOL,
            max_quads: MAX_QUADS,
        }
    }

    /// 半庄战（东 + 南）
    pub fn full() -> Self {
        Self {
            name: "hanchan".to_string(),
            last_wind: Wind::South,
            ..Self::short()
        }
    }

    /// 牌墙总张数
    pub fn wall_size(&self) -> usize {
        TileKind::COUNT * self.copies_per_kind as usize
    }

    /// 场风是否已超过本规则的最后一个场风
    pub fn is_past_last_wind(&self, prevailing: Wind, previous: Wind) -> bool {
        // 场风从北回到东时也视为结束
        prevailing > self.last_wind || prevailing < previous
    }
}

impl Default for RuleVariant {
    fn default() -> Self {
        Self::full()
    }
}

/// 对局配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// 随机种子：同一种子得到同一对局
    pub seed: u64,
    pub variant: RuleVariant,
}

impl MatchConfig {
    pub fn new(seed: u64, variant: RuleVariant) -> Self {
        Self { seed, variant }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new(0, RuleVariant::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_share_wall() {
        let short = RuleVariant::short();
        let full = RuleVariant::full();
        assert_eq!(short.wall_size(), 136);
        assert_eq!(full.wall_size(), 136);
        assert_eq!(short.deal, full.deal);
        assert_eq!(short.deal.hand_size(), 13);
        assert_eq!(short.last_wind, Wind::East);
        assert_eq!(full.last_wind, Wind::South);
    }

    #[test]
    fn test_past_last_wind() {
        let short = RuleVariant::short();
        assert!(!short.is_past_last_wind(Wind::East, Wind::East));
        assert!(short.is_past_last_wind(Wind::South, Wind::East));
        let full = RuleVariant::full();
        assert!(!full.is_past_last_wind(Wind::South, Wind::East));
        assert!(full.is_past_last_wind(Wind::West, Wind::South));
    }
}
