use crate::game::meld::Meld;
use crate::tile::{DecomposedGroup, Hand, Tile, TileKind, Wind};
use crate::utils::KindSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// 玩家阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// 空闲：可以碰、杠、荣和别人的打牌
    Idle,
    /// 应摸牌（也可以吃上家的打牌）
    AddTile,
    /// 应出牌（或立直、自摸、暗杠、加杠）
    RemoveTile,
    /// 杠后应摸岭上牌
    AddTileKan,
}

/// 舍牌记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscardRecord {
    pub tile: Tile,
    /// 打出时该玩家的巡目
    pub turn: u32,
    /// 立直宣言牌
    pub riichi: bool,
    /// 已被他家鸣走
    pub claimed: bool,
}

/// 玩家状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// 座位（0-3）
    pub seat: u8,
    /// 座位风，入座时固定
    pub seat_wind: Wind,
    /// 点数
    pub score: i32,
    /// 暗手
    pub hand: Hand,
    /// 副露
    pub melds: Vec<Meld>,
    /// 舍牌河
    pub discards: Vec<DiscardRecord>,
    /// 立直宣言时的巡目（None 表示未立直）
    pub riichi_turn: Option<u32>,
    /// 两立直
    pub double_riichi: bool,
    /// 一发有效
    pub ippatsu: bool,
    /// 当前阶段
    pub phase: Phase,
    /// 最近摸到、尚未打出的牌
    pub last_draw: Option<Tile>,
    /// 本局巡目（摸牌或鸣牌时 +1）
    pub turn: u32,
    /// 最近一次摸牌是岭上牌
    pub after_quad: bool,
    /// 见逃锁定：放过了可以荣和的牌，直到自己下次摸牌
    pub passed_win: bool,
}

impl Player {
    /// 创建新玩家
    pub fn new(seat: u8, score: i32) -> Self {
        Self {
            seat,
            seat_wind: Wind::from(seat),
            score,
            hand: Hand::new(),
            melds: Vec::new(),
            discards: Vec::new(),
            riichi_turn: None,
            double_riichi: false,
            ippatsu: false,
            phase: Phase::Idle,
            last_draw: None,
            turn: 0,
            after_quad: false,
            passed_win: false,
        }
    }

    /// 重置一局内的状态（点数保留）
    pub fn reset_for_hand(&mut self) {
        self.hand.clear();
        self.melds.clear();
        self.discards.clear();
        self.riichi_turn = None;
        self.double_riichi = false;
        self.ippatsu = false;
        self.phase = Phase::Idle;
        self.last_draw = None;
        self.turn = 0;
        self.after_quad = false;
        self.passed_win = false;
    }

    /// 门前清：没有亮出的副露（暗杠不破坏门前）
    pub fn is_concealed(&self) -> bool {
        self.melds.iter().all(|m| !m.is_open())
    }

    pub fn is_riichi(&self) -> bool {
        self.riichi_turn.is_some()
    }

    /// 副露转换为拆解用的牌组
    pub fn meld_groups(&self) -> SmallVec<[DecomposedGroup; 4]> {
        self.melds.iter().map(Meld::to_group).collect()
    }

    /// 暗手牌种（排序）
    pub fn concealed_kinds(&self) -> SmallVec<[TileKind; 14]> {
        self.hand.kinds()
    }

    /// 舍牌中出现过的牌种（含被鸣走的）
    pub fn discarded_kinds(&self) -> KindSet {
        let mut set = KindSet::new();
        for record in &self.discards {
            set.insert(record.tile.kind);
        }
        set
    }

    /// 记录见逃
    pub fn record_passed_win(&mut self) {
        self.passed_win = true;
    }

    /// 清除见逃锁定（自己摸牌时）
    pub fn clear_passed_win(&mut self) {
        self.passed_win = false;
    }

    /// 暗手 + 副露的总牌数（杠按 4 张计）
    pub fn tile_count(&self) -> usize {
        self.hand.total_count() + self.melds.iter().map(|m| m.tiles().len()).sum::<usize>()
    }

    /// 未被鸣走的舍牌数
    pub fn river_count(&self) -> usize {
        self.discards.iter().filter(|d| !d.claimed).count()
    }
}
