use crate::game::constants::NUM_PLAYERS;
use crate::tile::Wind;
use serde::{Deserialize, Serialize};

/// 座位轮转
///
/// 四个座位固定成环，上家 / 下家 / 对家都由当前座位取模得到
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Seating {
    current: u8,
}

impl Seating {
    pub fn new(current: u8) -> Self {
        Self { current: current % NUM_PLAYERS }
    }

    /// 当前行动的座位
    #[inline]
    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn set_current(&mut self, seat: u8) {
        self.current = seat % NUM_PLAYERS;
    }

    /// 轮到下一个座位
    pub fn advance(&mut self) -> u8 {
        self.current = Self::next(self.current);
        self.current
    }

    /// 下一个行动的座位
    #[inline]
    pub fn next(seat: u8) -> u8 {
        (seat + 1) % NUM_PLAYERS
    }

    /// 下家（右手边）
    #[inline]
    pub fn right(seat: u8) -> u8 {
        Self::next(seat)
    }

    /// 上家（左手边）
    #[inline]
    pub fn left(seat: u8) -> u8 {
        (seat + NUM_PLAYERS - 1) % NUM_PLAYERS
    }

    /// 对家
    #[inline]
    pub fn across(seat: u8) -> u8 {
        (seat + 2) % NUM_PLAYERS
    }
}

/// 局推进方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundAdvance {
    /// 轮庄：局数 +1，本场清零
    Normal,
    /// 连庄：本场 +1
    Repeat,
}

/// 场况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// 场风
    pub prevailing: Wind,
    /// 本场风内的局数（从 1 开始）
    pub hand_number: u8,
    /// 本场数
    pub repeat: u32,
    /// 累计局数（仅用于显示）
    pub hand_index: u32,
}

impl Round {
    /// 东一局 0 本场
    pub fn new() -> Self {
        Self {
            prevailing: Wind::East,
            hand_number: 1,
            repeat: 0,
            hand_index: 0,
        }
    }

    /// 自风偏移：每轮庄一次，庄家移到下一个座位
    pub fn wind_offset(&self) -> u8 {
        (NUM_PLAYERS - (self.hand_number.saturating_sub(1) % NUM_PLAYERS)) % NUM_PLAYERS
    }

    /// 玩家本局的自风 `(座位风 + 偏移) mod 4`，每次查询重新计算
    pub fn player_wind(&self, seat_wind: Wind) -> Wind {
        Wind::from(seat_wind as u8 + self.wind_offset())
    }

    /// 庄家座位：自风等于场风的玩家
    pub fn dealer_seat(&self) -> u8 {
        (0..NUM_PLAYERS)
            .find(|&seat| self.player_wind(Wind::from(seat)) == self.prevailing)
            .unwrap_or(0)
    }

    pub fn is_dealer(&self, seat: u8) -> bool {
        self.dealer_seat() == seat
    }

    /// 推进一局
    ///
    /// # 参数
    ///
    /// - `advance`: 轮庄或连庄
    /// - `hands_per_wind`: 每个场风的局数
    pub fn advance(&mut self, advance: RoundAdvance, hands_per_wind: u8) {
        match advance {
            RoundAdvance::Normal => {
                self.hand_number += 1;
                self.repeat = 0;
                if self.hand_number > hands_per_wind {
                    self.hand_number = 1;
                    self.prevailing = self.prevailing.next();
                }
            }
            RoundAdvance::Repeat => {
                self.repeat += 1;
            }
        }
        self.hand_index += 1;
    }
}

impl Default for Round {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbours() {
        assert_eq!(Seating::right(3), 0);
        assert_eq!(Seating::left(0), 3);
        assert_eq!(Seating::across(1), 3);
        let mut seating = Seating::new(2);
        assert_eq!(seating.advance(), 3);
        assert_eq!(seating.advance(), 0);
    }

    #[test]
    fn test_dealer_rotates_in_turn_order() {
        let mut round = Round::new();
        assert_eq!(round.dealer_seat(), 0);
        assert_eq!(round.player_wind(Wind::East), Wind::East);

        round.advance(RoundAdvance::Normal, 4);
        assert_eq!(round.dealer_seat(), 1);
        assert!(round.is_dealer(1));
        assert!(!round.is_dealer(0));
        assert_eq!(round.player_wind(Wind::South), Wind::East);
        assert_eq!(round.player_wind(Wind::East), Wind::North);

        round.advance(RoundAdvance::Normal, 4);
        assert_eq!(round.dealer_seat(), 2);
    }

    #[test]
    fn test_repeat_only_counts_honba() {
        let mut round = Round::new();
        round.advance(RoundAdvance::Repeat, 4);
        round.advance(RoundAdvance::Repeat, 4);
        assert_eq!(round.hand_number, 1);
        assert_eq!(round.repeat, 2);
        assert_eq!(round.hand_index, 2);

        round.advance(RoundAdvance::Normal, 4);
        assert_eq!(round.hand_number, 2);
        assert_eq!(round.repeat, 0);
    }

    #[test]
    fn test_wind_changes_after_cap() {
        let mut round = Round::new();
        for _ in 0..4 {
            round.advance(RoundAdvance::Normal, 4);
        }
        assert_eq!(round.prevailing, Wind::South);
        assert_eq!(round.hand_number, 1);
        assert_eq!(round.hand_index, 4);
        // 庄家为自风等于场风的玩家
        let dealer = round.dealer_seat();
        assert_eq!(round.player_wind(Wind::from(dealer)), Wind::South);
    }
}
