/// 游戏常量定义
///
/// 集中管理所有魔法数字，规则预设与计分都从这里取值

/// 玩家数量
pub const NUM_PLAYERS: u8 = 4;

/// 每种牌的数量（4 张）
pub const COPIES_PER_TILE: u8 = 4;

/// 标准牌墙总牌数（34 种 × 4 张）
pub const TOTAL_TILES: usize = 136;

/// 王牌张数
pub use crate::tile::wall::DEAD_WALL_SIZE;

/// 一局内杠的上限
pub const MAX_QUADS: u8 = 4;

/// 起始点数
pub const INITIAL_SCORE: i32 = 25000;

/// 立直供托
pub const RIICHI_DEPOSIT: i32 = 1000;

/// 立直时王牌前至少还需剩余的牌数
pub const RIICHI_MIN_WALL: usize = 4;

/// 每本场的和了加点（荣和由放铳者支付，自摸由三家平摊）
pub const HONBA_BONUS: i32 = 300;

/// 荒牌流局的不听罚符总额
pub const TENPAI_POOL: i32 = 3000;

/// 九种九牌所需的幺九牌种数
pub const NINE_TERMINALS_MIN: u32 = 9;

/// 役满番数
pub const YAKUMAN_FAN: u32 = 13;

/// 满贯基本点
pub const MANGAN_BASE: u32 = 2000;
/// 跳满基本点
pub const HANEMAN_BASE: u32 = 3000;
/// 倍满基本点
pub const BAIMAN_BASE: u32 = 4000;
/// 三倍满基本点
pub const SANBAIMAN_BASE: u32 = 6000;
/// 役满基本点
pub const YAKUMAN_BASE: u32 = 8000;

/// 七对子固定符数
pub const SEVEN_PAIRS_FU: u32 = 25;
