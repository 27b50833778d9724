use crate::game::constants::NUM_PLAYERS;
use crate::game::scoring::round_up_100;
use serde::{Deserialize, Serialize};

/// 一笔支付
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub from: u8,
    pub to: u8,
    pub amount: i32,
}

/// 结算结果
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settlement {
    /// 玩家之间的支付
    pub payments: Vec<Payment>,
    /// 每个座位的点数变化（含供托）
    pub deltas: [i32; NUM_PLAYERS as usize],
    /// 和了者收走的立直供托
    pub deposits_collected: i32,
}

impl Settlement {
    fn pay(&mut self, from: u8, to: u8, amount: i32) {
        if amount == 0 {
            return;
        }
        self.payments.push(Payment { from, to, amount });
        self.deltas[from as usize] -= amount;
        self.deltas[to as usize] += amount;
    }

    fn collect_pot(&mut self, winner: u8, pot: i32) {
        self.deposits_collected = pot;
        self.deltas[winner as usize] += pot;
    }

    /// 荣和结算
    ///
    /// 放铳者支付 `基本点 × 6`（庄家和了）或 `× 4`，取整到 100，
    /// 另加每本场 `honba_bonus`
    ///
    /// # 参数
    ///
    /// - `base_points`: 基本点
    /// - `honba`: 本场数
    /// - `honba_bonus`: 每本场加点（整局合计）
    /// - `pot`: 场上的立直供托
    pub fn ron(winner: u8, loser: u8, dealer_win: bool, base_points: u32, honba: u32, honba_bonus: i32, pot: i32) -> Self {
        let multiplier = if dealer_win { 6 } else { 4 };
        let amount = round_up_100(base_points * multiplier) as i32 + honba as i32 * honba_bonus;

        let mut settlement = Self::default();
        settlement.pay(loser, winner, amount);
        settlement.collect_pot(winner, pot);
        settlement
    }

    /// 自摸结算
    ///
    /// 庄家自摸：三家各付 `基本点 × 2`；
    /// 闲家自摸：庄家付 `基本点 × 2`，其余两家各付 `基本点`。
    /// 每家另付 `honba_bonus / 3` 每本场
    pub fn tsumo(winner: u8, dealer: u8, base_points: u32, honba: u32, honba_bonus: i32, pot: i32) -> Self {
        let per_payer_bonus = honba as i32 * (honba_bonus / (NUM_PLAYERS as i32 - 1));
        let mut settlement = Self::default();
        for payer in (0..NUM_PLAYERS).filter(|&s| s != winner) {
            let share = if winner == dealer || payer == dealer {
                round_up_100(base_points * 2)
            } else {
                round_up_100(base_points)
            };
            settlement.pay(payer, winner, share as i32 + per_payer_bonus);
        }
        settlement.collect_pot(winner, pot);
        settlement
    }

    /// 荒牌流局的不听罚符
    ///
    /// 全员听牌或全员不听时没有支付；否则不听者平分支付 `pool`，听牌者平分收取
    pub fn exhaustive_draw(tenpai: [bool; NUM_PLAYERS as usize], pool: i32) -> Self {
        let ready = tenpai.iter().filter(|t| **t).count() as i32;
        let mut settlement = Self::default();
        if ready == 0 || ready == NUM_PLAYERS as i32 {
            return settlement;
        }
        let not_ready = NUM_PLAYERS as i32 - ready;
        let amount = pool / (ready * not_ready);
        for from in (0..NUM_PLAYERS).filter(|&s| !tenpai[s as usize]) {
            for to in (0..NUM_PLAYERS).filter(|&s| tenpai[s as usize]) {
                settlement.pay(from, to, amount);
            }
        }
        settlement
    }

    /// 结算是否守恒（供托之外）
    pub fn is_balanced(&self) -> bool {
        self.deltas.iter().sum::<i32>() == self.deposits_collected
    }
}
