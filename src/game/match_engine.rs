use crate::engine::action_mask::LegalActions;
use crate::game::action::Action;
use crate::game::chii::ChiiHandler;
use crate::game::constants::{NINE_TERMINALS_MIN, NUM_PLAYERS, RIICHI_MIN_WALL};
use crate::game::kong::KongHandler;
use crate::game::meld::Meld;
use crate::game::player::{DiscardRecord, Phase, Player};
use crate::game::pong::PongHandler;
use crate::game::ready::ReadyChecker;
use crate::game::rules::{MatchConfig, RuleVariant};
use crate::game::scoring::{WinEvaluation, WinEvaluator, WinRejection, WinRequest};
use crate::game::seating::{Round, RoundAdvance, Seating};
use crate::game::settlement::Settlement;
use crate::game::yaku::WinContext;
use crate::tile::{HandDecomposer, Tile, TileKind, Wall};
use crate::utils::KindSet;
use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

const DRAW_PHASES: &[Phase] = &[Phase::AddTile, Phase::AddTileKan];
const TURN_PHASES: &[Phase] = &[Phase::RemoveTile];
const CLAIM_PHASES: &[Phase] = &[Phase::Idle, Phase::AddTile];
const CHII_PHASES: &[Phase] = &[Phase::AddTile];

/// 对局错误
///
/// 所有错误都在修改状态之前返回，被拒绝的操作不留下任何副作用
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("phase mismatch: required one of {required:?}, actual {actual:?}")]
    PhaseMismatch { required: &'static [Phase], actual: Phase },
    #[error("not this player's turn")]
    NotCurrentTurn,
    #[error("requested tile is not in the concealed hand")]
    TileNotHeld,
    #[error("tiles do not form a valid meld with the claimed tile")]
    IllegalMeldComposition,
    #[error("no qualifying win: {0}")]
    NoQualifyingWin(WinRejection),
    #[error("quad limit exceeded")]
    QuadLimitExceeded,
    #[error("riichi player must discard the drawn tile")]
    InvalidRiichiDiscard,
    #[error("no tile left to draw")]
    WallExhausted,
    #[error("invalid seat {0}")]
    InvalidPlayer(u8),
    #[error("no tile available to claim")]
    NoClaimableTile,
    #[error("call not allowed on this tile")]
    CallForbidden,
    #[error("riichi not available")]
    RiichiUnavailable,
    #[error("abortive draw not available")]
    AbortiveDrawUnavailable,
    #[error("hand is already over")]
    HandOver,
    #[error("hand is still in progress")]
    HandInProgress,
    #[error("match is over")]
    MatchOver,
    #[error("match has not started")]
    NotStarted,
}

/// 最近一张可被鸣牌 / 荣和的牌的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileSource {
    /// 舍牌
    Discard,
    /// 加杠的牌（只能抢杠）
    AddedQuad,
}

/// 最近打出的牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTile {
    pub tile: Tile,
    pub owner: u8,
    pub source: TileSource,
    /// 打出时牌墙已无牌可摸（河底）
    pub last_of_wall: bool,
}

/// 一局的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOutcome {
    /// 和了（`loser` 为 None 表示自摸）
    Win {
        winner: u8,
        loser: Option<u8>,
        evaluation: WinEvaluation,
        settlement: Settlement,
    },
    /// 九种九牌
    AbortiveDraw { declarer: u8 },
    /// 荒牌流局
    ExhaustiveDraw {
        tenpai: [bool; NUM_PLAYERS as usize],
        settlement: Settlement,
    },
}

/// 动作处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionResult {
    /// 配牌完成
    HandStarted {
        dealer: u8,
        /// 骰子（使用外部牌墙时为 None）
        dice: Option<(u8, u8)>,
        dora_indicator: Option<Tile>,
    },
    /// 摸牌
    Drawn { tile: Tile, replacement: bool },
    /// 出牌
    Discarded { tile: Tile, riichi: bool },
    /// 吃 / 碰
    Called { meld: Meld },
    /// 杠
    QuadDeclared { meld: Meld },
    /// 一局结束
    HandEnded(HandOutcome),
    /// 对局结束
    MatchEnded { scores: [i32; NUM_PLAYERS as usize] },
}

/// 加杠的还原信息（抢杠时使用）
#[derive(Debug, Clone)]
struct QuadRollback {
    seat: u8,
    index: usize,
    original: Meld,
}

/// 对局
///
/// 持有牌墙、座位、场况和规则变体，驱动摸打、鸣牌、宣言；
/// 和了判定与计分交给 [`WinEvaluator`]
#[derive(Debug, Clone)]
pub struct Match {
    variant: RuleVariant,
    seed: u64,
    /// 对局自己的随机源（洗牌、骰子）
    rng: ChaCha8Rng,
    pub players: [Player; NUM_PLAYERS as usize],
    pub seating: Seating,
    pub round: Round,
    pub wall: Wall,
    last_tile: Option<LastTile>,
    /// 本局已成的杠数
    quad_count: u8,
    /// 场上的立直供托
    riichi_pot: i32,
    /// 本局是否已有人鸣牌（含暗杠）
    calls_made: bool,
    dice: Option<(u8, u8)>,
    outcome: Option<HandOutcome>,
    quad_rollback: Option<QuadRollback>,
    started: bool,
    finished: bool,
}

impl Match {
    /// 创建新对局（尚未配牌）
    pub fn new(config: MatchConfig) -> Self {
        let MatchConfig { seed, variant } = config;
        let players = [0, 1, 2, 3].map(|seat| Player::new(seat, variant.initial_score));
        let wall = Wall::new(variant.copies_per_kind, variant.dead_wall_size);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            players,
            seating: Seating::default(),
            round: Round::new(),
            wall,
            last_tile: None,
            quad_count: 0,
            riichi_pot: 0,
            calls_made: false,
            dice: None,
            outcome: None,
            quad_rollback: None,
            started: false,
            finished: false,
            variant,
        }
    }

    // ---- 生命周期 ----

    /// 开始对局：洗牌并配第一局
    pub fn start_match(&mut self) -> Result<ActionResult, MatchError> {
        if self.finished {
            return Err(MatchError::MatchOver);
        }
        if self.started {
            return Err(MatchError::HandInProgress);
        }
        let result = self.deal_shuffled()?;
        self.started = true;
        Ok(result)
    }

    /// 使用给定牌墙开始（复盘、测试）
    ///
    /// 不掷骰子，不开门，直接按牌序配牌
    pub fn start_with_wall(&mut self, wall: Wall) -> Result<ActionResult, MatchError> {
        if self.finished {
            return Err(MatchError::MatchOver);
        }
        let result = self.deal(wall, None)?;
        self.started = true;
        Ok(result)
    }

    /// 重新洗牌配牌，保留点数与场况
    pub fn restart_match(&mut self) -> Result<ActionResult, MatchError> {
        if self.finished {
            return Err(MatchError::MatchOver);
        }
        if !self.started {
            return Err(MatchError::NotStarted);
        }
        info!("restarting {:?} {}", self.round.prevailing, self.round.hand_number);
        self.deal_shuffled()
    }

    /// 按上一局的结果推进场况并配下一局
    ///
    /// 庄家和了或流局为连庄，其他情况轮庄；场风超过规则的最后一个场风时对局结束
    pub fn advance_hand(&mut self) -> Result<ActionResult, MatchError> {
        if self.finished {
            return Err(MatchError::MatchOver);
        }
        if !self.started {
            return Err(MatchError::NotStarted);
        }
        let outcome = self.outcome.as_ref().ok_or(MatchError::HandInProgress)?;
        let dealer = self.round.dealer_seat();
        let advance = match outcome {
            HandOutcome::Win { winner, .. } if *winner != dealer => RoundAdvance::Normal,
            _ => RoundAdvance::Repeat,
        };

        let previous = self.round.prevailing;
        self.round.advance(advance, self.variant.hands_per_wind);
        if self.variant.is_past_last_wind(self.round.prevailing, previous) {
            self.finished = true;
            let scores = self.scores();
            info!("match over: {:?}", scores);
            return Ok(ActionResult::MatchEnded { scores });
        }
        self.deal_shuffled()
    }

    fn deal_shuffled(&mut self) -> Result<ActionResult, MatchError> {
        let mut wall = Wall::new(self.variant.copies_per_kind, self.variant.dead_wall_size);
        wall.shuffle(&mut self.rng);
        let dice = (self.rng.gen_range(1..=6u8), self.rng.gen_range(1..=6u8));

        // 点数决定开门的一侧（每侧 34 张），再从该侧数 2×点数 张
        let side = wall.total_count() / NUM_PLAYERS as usize;
        let sum = (dice.0 + dice.1) as usize;
        wall.break_at(((sum - 1) % NUM_PLAYERS as usize) * side + sum * 2);
        self.deal(wall, Some(dice))
    }

    fn deal(&mut self, mut wall: Wall, dice: Option<(u8, u8)>) -> Result<ActionResult, MatchError> {
        let procedure = self.variant.deal;
        if wall.drawable_count() < procedure.hand_size() * NUM_PLAYERS as usize + 1 {
            return Err(MatchError::WallExhausted);
        }

        let dealer = self.round.dealer_seat();
        for player in &mut self.players {
            player.reset_for_hand();
        }

        for _ in 0..procedure.blocks {
            for offset in 0..NUM_PLAYERS {
                let seat = (dealer + offset) % NUM_PLAYERS;
                for _ in 0..procedure.block_size {
                    let tile = wall.draw().ok_or(MatchError::WallExhausted)?;
                    self.players[seat as usize].hand.add_tile(tile);
                }
            }
        }
        // 庄家再取 2 张，其余各取 1 张
        let mut dealer_last = None;
        for offset in 0..NUM_PLAYERS {
            let seat = (dealer + offset) % NUM_PLAYERS;
            let count = if offset == 0 { 2 } else { 1 };
            for _ in 0..count {
                let tile = wall.draw().ok_or(MatchError::WallExhausted)?;
                self.players[seat as usize].hand.add_tile(tile);
                if offset == 0 {
                    dealer_last = Some(tile);
                }
            }
        }

        let dealer_player = &mut self.players[dealer as usize];
        dealer_player.phase = Phase::RemoveTile;
        dealer_player.turn = 1;
        dealer_player.last_draw = dealer_last;

        self.wall = wall;
        self.seating.set_current(dealer);
        self.last_tile = None;
        self.quad_count = 0;
        self.calls_made = false;
        self.dice = dice;
        self.outcome = None;
        self.quad_rollback = None;

        let dora_indicator = self.wall.dora_indicators(1).first().copied();
        info!(
            "deal {:?} {} ({} honba), dealer seat {}, dice {:?}",
            self.round.prevailing,
            self.round.hand_number,
            self.round.repeat,
            dealer,
            dice
        );
        Ok(ActionResult::HandStarted {
            dealer,
            dice,
            dora_indicator,
        })
    }

    // ---- 动作 ----

    /// 处理动作
    ///
    /// # 参数
    ///
    /// - `seat`: 执行动作的座位
    /// - `action`: 动作
    pub fn process_action(&mut self, seat: u8, action: Action) -> Result<ActionResult, MatchError> {
        match action {
            Action::Draw => self.draw(seat),
            Action::Discard { tile } => self.discard(seat, tile),
            Action::Chii { a, b } => self.call_sequence(seat, a, b),
            Action::Pon { a, b } => self.call_triplet(seat, a, b),
            Action::OpenQuad => self.call_open_quad(seat),
            Action::ConcealedQuad { kind } => self.call_concealed_quad(seat, kind),
            Action::AddedQuad { tile } => self.call_added_quad(seat, tile),
            Action::Riichi { tile } => self.declare_riichi(seat, tile),
            Action::Ron => self.declare_ron(seat),
            Action::Tsumo => self.declare_tsumo(seat),
            Action::AbortiveDraw => self.declare_abortive_draw(seat),
            Action::ExhaustiveDraw => self.settle_exhaustive_draw(seat),
        }
    }

    /// 摸牌（杠后摸岭上牌）
    pub fn draw(&mut self, seat: u8) -> Result<ActionResult, MatchError> {
        let replacement = self.check_draw(seat)?;
        let mut decomposer = HandDecomposer::new();
        let passed = self.passed_wins(&mut decomposer);

        let tile = if replacement {
            self.wall.draw_replacement()
        } else {
            self.wall.draw()
        }
        .ok_or(MatchError::WallExhausted)?;
        self.close_claim_window(passed);
        self.quad_rollback = None;

        let player = &mut self.players[seat as usize];
        player.hand.add_tile(tile);
        player.last_draw = Some(tile);
        player.turn += 1;
        player.after_quad = replacement;
        player.phase = Phase::RemoveTile;
        player.clear_passed_win();

        debug!("seat {} draws {} (replacement: {})", seat, tile, replacement);
        Ok(ActionResult::Drawn { tile, replacement })
    }

    /// 出牌
    pub fn discard(&mut self, seat: u8, tile: Tile) -> Result<ActionResult, MatchError> {
        self.check_discard(seat, tile)?;
        Ok(self.commit_discard(seat, tile, false))
    }

    fn commit_discard(&mut self, seat: u8, tile: Tile, riichi: bool) -> ActionResult {
        let last_of_wall = self.wall.drawable_count() == 0;
        let player = &mut self.players[seat as usize];
        player.hand.remove_tile(tile);
        let turn = player.turn;
        player.discards.push(DiscardRecord {
            tile,
            turn,
            riichi,
            claimed: false,
        });
        if !riichi {
            player.ippatsu = false;
        }
        player.last_draw = None;
        player.after_quad = false;
        player.phase = Phase::Idle;

        self.last_tile = Some(LastTile {
            tile,
            owner: seat,
            source: TileSource::Discard,
            last_of_wall,
        });
        let next = self.seating.advance();
        self.players[next as usize].phase = Phase::AddTile;

        debug!("seat {} discards {} (riichi: {})", seat, tile, riichi);
        ActionResult::Discarded { tile, riichi }
    }

    /// 吃：用手中的 `a`、`b` 与上家的舍牌组成顺子
    pub fn call_sequence(&mut self, seat: u8, a: Tile, b: Tile) -> Result<ActionResult, MatchError> {
        let last = self.check_chii(seat, a, b)?;
        let mut decomposer = HandDecomposer::new();
        let passed = self.passed_wins(&mut decomposer);

        let meld = ChiiHandler::chii(&mut self.players[seat as usize], a, b, last.tile, last.owner)
            .ok_or(MatchError::IllegalMeldComposition)?;
        self.close_claim_window(passed);
        self.mark_claimed(last);
        self.after_call(seat, Phase::RemoveTile);
        debug!("seat {} chii {} from seat {}", seat, last.tile, last.owner);
        Ok(ActionResult::Called { meld })
    }

    /// 碰：越过中间的座位，直接轮到碰牌者
    pub fn call_triplet(&mut self, seat: u8, a: Tile, b: Tile) -> Result<ActionResult, MatchError> {
        let last = self.check_pon(seat, a, b)?;
        let mut decomposer = HandDecomposer::new();
        let passed = self.passed_wins(&mut decomposer);

        let meld = PongHandler::pong(&mut self.players[seat as usize], a, b, last.tile, last.owner)
            .ok_or(MatchError::IllegalMeldComposition)?;
        self.close_claim_window(passed);
        self.mark_claimed(last);
        self.after_call(seat, Phase::RemoveTile);
        debug!("seat {} pon {} from seat {}", seat, last.tile, last.owner);
        Ok(ActionResult::Called { meld })
    }

    /// 大明杠，之后摸岭上牌
    pub fn call_open_quad(&mut self, seat: u8) -> Result<ActionResult, MatchError> {
        let last = self.check_open_quad(seat)?;
        let mut decomposer = HandDecomposer::new();
        let passed = self.passed_wins(&mut decomposer);

        let turn = self.players[seat as usize].turn;
        let meld = KongHandler::open_quad(&mut self.players[seat as usize], last.tile, turn)
            .ok_or(MatchError::TileNotHeld)?;
        self.close_claim_window(passed);
        self.mark_claimed(last);
        self.quad_count += 1;
        self.after_call(seat, Phase::AddTileKan);
        debug!("seat {} open quad {} from seat {}", seat, last.tile, last.owner);
        Ok(ActionResult::QuadDeclared { meld })
    }

    /// 暗杠，之后摸岭上牌
    pub fn call_concealed_quad(&mut self, seat: u8, kind: TileKind) -> Result<ActionResult, MatchError> {
        let mut decomposer = HandDecomposer::new();
        self.check_concealed_quad(&mut decomposer, seat, kind)?;

        let player = &mut self.players[seat as usize];
        let turn = player.turn;
        let meld = KongHandler::concealed_quad(player, kind, turn).ok_or(MatchError::TileNotHeld)?;
        player.phase = Phase::AddTileKan;
        player.last_draw = None;
        self.quad_count += 1;
        self.calls_made = true;
        self.clear_ippatsu();
        debug!("seat {} concealed quad {}", seat, kind);
        Ok(ActionResult::QuadDeclared { meld })
    }

    /// 加杠：其他玩家可以抢杠，直到杠者摸岭上牌
    pub fn call_added_quad(&mut self, seat: u8, tile: Tile) -> Result<ActionResult, MatchError> {
        self.check_added_quad(seat, tile)?;

        let player = &mut self.players[seat as usize];
        let turn = player.turn;
        let (index, original) =
            KongHandler::added_quad(player, tile, turn).ok_or(MatchError::IllegalMeldComposition)?;
        let meld = player.melds[index].clone();
        player.phase = Phase::AddTileKan;
        player.last_draw = None;

        self.quad_rollback = Some(QuadRollback { seat, index, original });
        self.quad_count += 1;
        self.calls_made = true;
        self.clear_ippatsu();
        self.last_tile = Some(LastTile {
            tile,
            owner: seat,
            source: TileSource::AddedQuad,
            last_of_wall: false,
        });
        debug!("seat {} added quad {}", seat, tile);
        Ok(ActionResult::QuadDeclared { meld })
    }

    /// 立直并打出 `tile`
    pub fn declare_riichi(&mut self, seat: u8, tile: Tile) -> Result<ActionResult, MatchError> {
        let mut decomposer = HandDecomposer::new();
        self.check_riichi(&mut decomposer, seat, tile)?;

        let deposit = self.variant.riichi_deposit;
        let double = self.players[seat as usize].discards.is_empty() && !self.calls_made;
        let player = &mut self.players[seat as usize];
        player.riichi_turn = Some(player.turn);
        player.double_riichi = double;
        player.ippatsu = true;
        player.score -= deposit;
        self.riichi_pot += deposit;

        info!("seat {} declares riichi (double: {})", seat, double);
        Ok(self.commit_discard(seat, tile, true))
    }

    /// 荣和
    pub fn declare_ron(&mut self, seat: u8) -> Result<ActionResult, MatchError> {
        let mut decomposer = HandDecomposer::new();
        let (last, evaluation) = self.check_ron(&mut decomposer, seat)?;

        let won = match last.source {
            TileSource::AddedQuad => {
                // 抢杠：先还原加杠，失败时不改变任何状态
                let rollback = self.quad_rollback.clone().ok_or(MatchError::IllegalMeldComposition)?;
                let robbed = KongHandler::revert_added_quad(
                    &mut self.players[rollback.seat as usize],
                    rollback.index,
                    rollback.original,
                    last.tile,
                )
                .ok_or(MatchError::IllegalMeldComposition)?;
                self.quad_rollback = None;
                self.quad_count = self.quad_count.saturating_sub(1);
                robbed
            }
            TileSource::Discard => {
                self.mark_claimed(last);
                last.tile
            }
        };
        self.players[seat as usize].hand.add_tile(won);

        let dealer = self.round.dealer_seat();
        let settlement = Settlement::ron(
            seat,
            last.owner,
            seat == dealer,
            evaluation.base_points,
            self.round.repeat,
            self.variant.honba_bonus,
            self.riichi_pot,
        );
        Ok(self.finish_with_win(seat, Some(last.owner), evaluation, settlement))
    }

    /// 自摸
    pub fn declare_tsumo(&mut self, seat: u8) -> Result<ActionResult, MatchError> {
        let mut decomposer = HandDecomposer::new();
        let evaluation = self.check_tsumo(&mut decomposer, seat)?;

        let settlement = Settlement::tsumo(
            seat,
            self.round.dealer_seat(),
            evaluation.base_points,
            self.round.repeat,
            self.variant.honba_bonus,
            self.riichi_pot,
        );
        Ok(self.finish_with_win(seat, None, evaluation, settlement))
    }

    /// 九种九牌
    pub fn declare_abortive_draw(&mut self, seat: u8) -> Result<ActionResult, MatchError> {
        self.check_abortive_draw(seat)?;
        let outcome = HandOutcome::AbortiveDraw { declarer: seat };
        info!("seat {} declares nine terminals abortive draw", seat);
        Ok(self.end_hand(outcome))
    }

    /// 荒牌流局：轮到的玩家无牌可摸时结算不听罚符
    pub fn settle_exhaustive_draw(&mut self, seat: u8) -> Result<ActionResult, MatchError> {
        self.check_exhaustive_draw(seat)?;
        let mut decomposer = HandDecomposer::new();
        let passed = self.passed_wins(&mut decomposer);
        self.close_claim_window(passed);

        let mut tenpai = [false; NUM_PLAYERS as usize];
        for (ready, player) in tenpai.iter_mut().zip(&self.players) {
            *ready = ReadyChecker::is_ready(&mut decomposer, player);
        }
        let settlement = Settlement::exhaustive_draw(tenpai, self.variant.tenpai_pool);
        self.apply_settlement(&settlement);

        info!("exhaustive draw, tenpai {:?}", tenpai);
        Ok(self.end_hand(HandOutcome::ExhaustiveDraw { tenpai, settlement }))
    }

    /// 当前合法动作（只读）
    pub fn legal_actions(&self, seat: u8) -> LegalActions {
        LegalActions::generate(self, seat)
    }

    // ---- 内部状态变更 ----

    /// 当前窗口中能荣和的座位（只读）
    fn passed_wins(&self, decomposer: &mut HandDecomposer) -> SmallVec<[u8; 3]> {
        let Some(last) = self.last_tile else {
            return SmallVec::new();
        };
        (0..NUM_PLAYERS)
            .filter(|&seat| seat != last.owner && self.check_ron(decomposer, seat).is_ok())
            .collect()
    }

    /// 关闭鸣牌 / 荣和窗口：能荣和却没有荣和的玩家进入见逃
    fn close_claim_window(&mut self, passed: SmallVec<[u8; 3]>) {
        for seat in passed {
            debug!("seat {} passes a win", seat);
            self.players[seat as usize].record_passed_win();
        }
        self.last_tile = None;
    }

    fn mark_claimed(&mut self, last: LastTile) {
        if let Some(record) = self.players[last.owner as usize].discards.last_mut() {
            record.claimed = true;
        }
    }

    fn after_call(&mut self, seat: u8, phase: Phase) {
        self.calls_made = true;
        for player in &mut self.players {
            player.ippatsu = false;
            if player.phase == Phase::AddTile {
                player.phase = Phase::Idle;
            }
        }
        self.seating.set_current(seat);
        let player = &mut self.players[seat as usize];
        player.phase = phase;
        player.last_draw = None;
        if phase == Phase::RemoveTile {
            player.turn += 1;
        }
    }

    fn clear_ippatsu(&mut self) {
        for player in &mut self.players {
            player.ippatsu = false;
        }
    }

    fn apply_settlement(&mut self, settlement: &Settlement) {
        for (player, delta) in self.players.iter_mut().zip(settlement.deltas) {
            player.score += delta;
        }
    }

    fn finish_with_win(
        &mut self,
        winner: u8,
        loser: Option<u8>,
        evaluation: WinEvaluation,
        settlement: Settlement,
    ) -> ActionResult {
        self.apply_settlement(&settlement);
        self.riichi_pot -= settlement.deposits_collected;
        info!(
            "seat {} wins ({}): {} fan {} fu, base {}",
            winner,
            if loser.is_some() { "ron" } else { "tsumo" },
            evaluation.fan,
            evaluation.fu,
            evaluation.base_points
        );
        self.end_hand(HandOutcome::Win {
            winner,
            loser,
            evaluation,
            settlement,
        })
    }

    fn end_hand(&mut self, outcome: HandOutcome) -> ActionResult {
        for player in &mut self.players {
            player.phase = Phase::Idle;
        }
        self.last_tile = None;
        self.quad_rollback = None;
        self.outcome = Some(outcome.clone());
        ActionResult::HandEnded(outcome)
    }

    // ---- 校验（与 LegalActions 共用） ----

    fn ensure_in_hand(&self) -> Result<(), MatchError> {
        if self.finished {
            return Err(MatchError::MatchOver);
        }
        if !self.started {
            return Err(MatchError::NotStarted);
        }
        if self.outcome.is_some() {
            return Err(MatchError::HandOver);
        }
        Ok(())
    }

    fn checked_player(&self, seat: u8) -> Result<&Player, MatchError> {
        self.ensure_in_hand()?;
        self.players.get(seat as usize).ok_or(MatchError::InvalidPlayer(seat))
    }

    fn require_phase(player: &Player, required: &'static [Phase]) -> Result<(), MatchError> {
        if required.contains(&player.phase) {
            Ok(())
        } else {
            Err(MatchError::PhaseMismatch {
                required,
                actual: player.phase,
            })
        }
    }

    fn require_current(&self, seat: u8) -> Result<(), MatchError> {
        if self.seating.current() == seat {
            Ok(())
        } else {
            Err(MatchError::NotCurrentTurn)
        }
    }

    fn require_quad_room(&self) -> Result<(), MatchError> {
        if self.quad_count >= self.variant.max_quads {
            Err(MatchError::QuadLimitExceeded)
        } else {
            Ok(())
        }
    }

    /// # 返回
    ///
    /// 是否为岭上摸牌
    pub(crate) fn check_draw(&self, seat: u8) -> Result<bool, MatchError> {
        let player = self.checked_player(seat)?;
        Self::require_phase(player, DRAW_PHASES)?;
        self.require_current(seat)?;
        if self.wall.drawable_count() == 0 {
            return Err(MatchError::WallExhausted);
        }
        Ok(player.phase == Phase::AddTileKan)
    }

    pub(crate) fn check_discard(&self, seat: u8, tile: Tile) -> Result<(), MatchError> {
        let player = self.checked_player(seat)?;
        Self::require_phase(player, TURN_PHASES)?;
        self.require_current(seat)?;
        if !player.hand.has_tile(tile) {
            return Err(MatchError::TileNotHeld);
        }
        if player.is_riichi() && player.last_draw != Some(tile) {
            return Err(MatchError::InvalidRiichiDiscard);
        }
        Ok(())
    }

    /// 吃、碰、大明杠共用的条件：有可鸣的舍牌，不是自己的，不是河底，自己未立直
    fn check_claim(&self, seat: u8, phases: &'static [Phase]) -> Result<LastTile, MatchError> {
        let player = self.checked_player(seat)?;
        Self::require_phase(player, phases)?;
        let last = self.last_tile.ok_or(MatchError::NoClaimableTile)?;
        if last.source != TileSource::Discard || last.owner == seat || last.last_of_wall || player.is_riichi() {
            return Err(MatchError::CallForbidden);
        }
        Ok(last)
    }

    pub(crate) fn check_chii(&self, seat: u8, a: Tile, b: Tile) -> Result<LastTile, MatchError> {
        let last = self.check_claim(seat, CHII_PHASES)?;
        if seat != Seating::next(last.owner) {
            return Err(MatchError::NotCurrentTurn);
        }
        let player = &self.players[seat as usize];
        if !player.hand.has_tile(a) || !player.hand.has_tile(b) {
            return Err(MatchError::TileNotHeld);
        }
        if !ChiiHandler::can_chii(player, a, b, last.tile) {
            return Err(MatchError::IllegalMeldComposition);
        }
        Ok(last)
    }

    pub(crate) fn check_pon(&self, seat: u8, a: Tile, b: Tile) -> Result<LastTile, MatchError> {
        let last = self.check_claim(seat, CLAIM_PHASES)?;
        let player = &self.players[seat as usize];
        if !player.hand.has_tile(a) || !player.hand.has_tile(b) {
            return Err(MatchError::TileNotHeld);
        }
        if !PongHandler::can_pong(player, a, b, last.tile) {
            return Err(MatchError::IllegalMeldComposition);
        }
        Ok(last)
    }

    pub(crate) fn check_open_quad(&self, seat: u8) -> Result<LastTile, MatchError> {
        let last = self.check_claim(seat, CLAIM_PHASES)?;
        self.require_quad_room()?;
        KongHandler::open_quad_tiles(&self.players[seat as usize], last.tile).ok_or(MatchError::TileNotHeld)?;
        Ok(last)
    }

    pub(crate) fn check_concealed_quad(
        &self,
        decomposer: &mut HandDecomposer,
        seat: u8,
        kind: TileKind,
    ) -> Result<(), MatchError> {
        let player = self.checked_player(seat)?;
        Self::require_phase(player, TURN_PHASES)?;
        self.require_current(seat)?;
        self.require_quad_room()?;
        if self.wall.drawable_count() == 0 {
            return Err(MatchError::WallExhausted);
        }
        if player.hand.kind_count(kind) != 4 {
            return Err(MatchError::TileNotHeld);
        }
        if player.is_riichi() {
            // 立直后只能用刚摸到的牌暗杠，且不能改变听牌
            let drawn = player.last_draw.ok_or(MatchError::CallForbidden)?;
            if drawn.kind != kind {
                return Err(MatchError::CallForbidden);
            }
            let before = ReadyChecker::waits_after_discard(decomposer, player, drawn);
            let mut after = player.clone();
            let turn = after.turn;
            KongHandler::concealed_quad(&mut after, kind, turn).ok_or(MatchError::TileNotHeld)?;
            if before != ReadyChecker::waits(decomposer, &after) {
                return Err(MatchError::CallForbidden);
            }
        }
        Ok(())
    }

    pub(crate) fn check_added_quad(&self, seat: u8, tile: Tile) -> Result<(), MatchError> {
        let player = self.checked_player(seat)?;
        Self::require_phase(player, TURN_PHASES)?;
        self.require_current(seat)?;
        self.require_quad_room()?;
        if self.wall.drawable_count() == 0 {
            return Err(MatchError::WallExhausted);
        }
        if !player.hand.has_tile(tile) {
            return Err(MatchError::TileNotHeld);
        }
        if KongHandler::triplet_index(player, tile.kind).is_none() {
            return Err(MatchError::IllegalMeldComposition);
        }
        Ok(())
    }

    /// 立直宣言前的条件（不含打出哪张牌）
    pub(crate) fn check_riichi_state(&self, seat: u8) -> Result<&Player, MatchError> {
        let player = self.checked_player(seat)?;
        Self::require_phase(player, TURN_PHASES)?;
        self.require_current(seat)?;
        if !player.is_concealed()
            || player.is_riichi()
            || player.score < self.variant.riichi_deposit
            || self.wall.drawable_count() < RIICHI_MIN_WALL
        {
            return Err(MatchError::RiichiUnavailable);
        }
        Ok(player)
    }

    pub(crate) fn check_riichi(&self, decomposer: &mut HandDecomposer, seat: u8, tile: Tile) -> Result<(), MatchError> {
        let player = self.check_riichi_state(seat)?;
        if !player.hand.has_tile(tile) {
            return Err(MatchError::TileNotHeld);
        }
        if ReadyChecker::waits_after_discard(decomposer, player, tile).is_empty() {
            return Err(MatchError::RiichiUnavailable);
        }
        Ok(())
    }

    pub(crate) fn check_ron(
        &self,
        decomposer: &mut HandDecomposer,
        seat: u8,
    ) -> Result<(LastTile, WinEvaluation), MatchError> {
        let player = self.checked_player(seat)?;
        Self::require_phase(player, CLAIM_PHASES)?;
        let last = self.last_tile.ok_or(MatchError::NoClaimableTile)?;
        if last.owner == seat {
            return Err(MatchError::NoQualifyingWin(WinRejection::OwnDiscard));
        }

        let concealed = player.concealed_kinds();
        let waits = decomposer.waits(&concealed, &player.meld_groups());
        if !waits.contains(&last.tile.kind) {
            return Err(MatchError::NoQualifyingWin(WinRejection::IncompleteShape));
        }
        if player.passed_win || ReadyChecker::is_discard_furiten(player, &waits) {
            return Err(MatchError::NoQualifyingWin(WinRejection::Furiten));
        }

        let mut context = self.win_context(player, false);
        context.last_tile = last.last_of_wall;
        context.robbing_quad = last.source == TileSource::AddedQuad;
        let evaluation = self
            .evaluate_win(decomposer, player, &concealed, last.tile.kind, context)
            .map_err(MatchError::NoQualifyingWin)?;
        Ok((last, evaluation))
    }

    pub(crate) fn check_tsumo(&self, decomposer: &mut HandDecomposer, seat: u8) -> Result<WinEvaluation, MatchError> {
        let player = self.checked_player(seat)?;
        Self::require_phase(player, TURN_PHASES)?;
        self.require_current(seat)?;
        let drawn = player
            .last_draw
            .ok_or(MatchError::NoQualifyingWin(WinRejection::NothingDrawn))?;

        let mut concealed = player.concealed_kinds();
        if let Some(pos) = concealed.iter().position(|&k| k == drawn.kind) {
            concealed.remove(pos);
        }

        let mut context = self.win_context(player, true);
        context.after_quad = player.after_quad;
        context.last_tile = !player.after_quad && self.wall.drawable_count() == 0;
        context.first_draw = player.turn == 1 && player.discards.is_empty() && !self.calls_made;
        self.evaluate_win(decomposer, player, &concealed, drawn.kind, context)
            .map_err(MatchError::NoQualifyingWin)
    }

    pub(crate) fn check_abortive_draw(&self, seat: u8) -> Result<(), MatchError> {
        let player = self.checked_player(seat)?;
        if player.turn != 1 || !player.discards.is_empty() || self.calls_made {
            return Err(MatchError::AbortiveDrawUnavailable);
        }
        let held = KindSet::from_kinds(player.hand.kinds().iter());
        if held.intersection(KindSet::yaochu()).len() < NINE_TERMINALS_MIN {
            return Err(MatchError::AbortiveDrawUnavailable);
        }
        Ok(())
    }

    pub(crate) fn check_exhaustive_draw(&self, seat: u8) -> Result<(), MatchError> {
        let player = self.checked_player(seat)?;
        Self::require_phase(player, CHII_PHASES)?;
        self.require_current(seat)?;
        if self.wall.drawable_count() > 0 {
            return Err(MatchError::HandInProgress);
        }
        Ok(())
    }

    fn win_context(&self, player: &Player, self_drawn: bool) -> WinContext {
        let seat_wind = self.round.player_wind(player.seat_wind);
        let base = if self_drawn {
            WinContext::tsumo(seat_wind, self.round.prevailing)
        } else {
            WinContext::ron(seat_wind, self.round.prevailing)
        };
        WinContext {
            riichi: player.is_riichi(),
            double_riichi: player.double_riichi,
            ippatsu: player.ippatsu,
            ..base
        }
    }

    fn evaluate_win(
        &self,
        decomposer: &mut HandDecomposer,
        player: &Player,
        concealed: &[TileKind],
        win_tile: TileKind,
        context: WinContext,
    ) -> Result<WinEvaluation, WinRejection> {
        let melds = player.meld_groups();
        let dora = self.dora_kinds(false);
        let ura_dora = if context.riichi {
            self.dora_kinds(true)
        } else {
            SmallVec::new()
        };
        WinEvaluator::evaluate(
            decomposer,
            &WinRequest {
                concealed,
                win_tile,
                melds: &melds,
                context,
                dora: &dora,
                ura_dora: &ura_dora,
            },
        )
    }

    fn dora_kinds(&self, ura: bool) -> SmallVec<[TileKind; 5]> {
        let revealed = 1 + self.quad_count as usize;
        let indicators = if ura {
            self.wall.ura_dora_indicators(revealed)
        } else {
            self.wall.dora_indicators(revealed)
        };
        indicators.iter().map(|t| t.kind.dora_from_indicator()).collect()
    }

    // ---- 查询 ----

    pub fn variant(&self) -> &RuleVariant {
        &self.variant
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player(&self, seat: u8) -> Option<&Player> {
        self.players.get(seat as usize)
    }

    pub fn current_seat(&self) -> u8 {
        self.seating.current()
    }

    pub fn last_tile(&self) -> Option<LastTile> {
        self.last_tile
    }

    pub fn quad_count(&self) -> u8 {
        self.quad_count
    }

    pub fn riichi_pot(&self) -> i32 {
        self.riichi_pot
    }

    pub fn dice(&self) -> Option<(u8, u8)> {
        self.dice
    }

    pub fn outcome(&self) -> Option<&HandOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 已翻开的宝牌指示牌（每成一杠多翻一张）
    pub fn dora_indicators(&self) -> Vec<Tile> {
        self.wall.dora_indicators(1 + self.quad_count as usize)
    }

    pub fn scores(&self) -> [i32; NUM_PLAYERS as usize] {
        std::array::from_fn(|seat| self.players[seat].score)
    }

    /// 牌数守恒检查用：牌墙剩余 + 暗手 + 副露 + 河
    pub fn tile_count(&self) -> usize {
        self.wall.remaining_count()
            + self
                .players
                .iter()
                .map(|p| p.hand.total_count() + p.melds.iter().map(|m| m.tiles().len()).sum::<usize>() + p.river_count())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(seed: u64) -> Match {
        let mut game = Match::new(MatchConfig::new(seed, RuleVariant::short()));
        game.start_match().unwrap();
        game
    }

    #[test]
    fn test_deal() {
        let game = started(7);
        let dealer = game.round.dealer_seat();
        assert_eq!(dealer, 0);
        assert_eq!(game.current_seat(), dealer);
        for player in &game.players {
            let expected = if player.seat == dealer { 14 } else { 13 };
            assert_eq!(player.hand.total_count(), expected);
        }
        assert_eq!(game.players[0].phase, Phase::RemoveTile);
        assert!(game.players[0].last_draw.is_some());
        assert_eq!(game.wall.drawable_count(), 136 - 14 - 53);
        assert_eq!(game.tile_count(), 136);
        assert!(game.dice().is_some());
    }

    #[test]
    fn test_same_seed_same_deal() {
        let a = started(42);
        let b = started(42);
        let c = started(43);
        assert_eq!(a.wall.tiles(), b.wall.tiles());
        assert_eq!(a.players[1].hand, b.players[1].hand);
        assert_ne!(a.wall.tiles(), c.wall.tiles());
    }

    #[test]
    fn test_discard_passes_turn() {
        let mut game = started(1);
        let tile = game.players[0].hand.tiles()[0];
        let result = game.discard(0, tile).unwrap();
        assert_eq!(result, ActionResult::Discarded { tile, riichi: false });
        assert_eq!(game.current_seat(), 1);
        assert_eq!(game.players[1].phase, Phase::AddTile);
        assert_eq!(game.players[0].phase, Phase::Idle);
        assert_eq!(game.last_tile().map(|l| l.owner), Some(0));
        assert_eq!(game.tile_count(), 136);
    }

    #[test]
    fn test_rejection_leaves_state() {
        let mut game = started(3);
        let before = game.clone();
        // 闲家不能在庄家的回合出牌
        let tile = game.players[1].hand.tiles()[0];
        assert!(matches!(
            game.discard(1, tile),
            Err(MatchError::PhaseMismatch { actual: Phase::Idle, .. })
        ));
        assert_eq!(game.draw(0), Err(MatchError::PhaseMismatch {
            required: DRAW_PHASES,
            actual: Phase::RemoveTile,
        }));
        assert_eq!(game.players, before.players);
        assert_eq!(game.wall.drawn_count(), before.wall.drawn_count());
    }

    #[test]
    fn test_not_started() {
        let mut game = Match::new(MatchConfig::default());
        assert_eq!(game.draw(0), Err(MatchError::NotStarted));
        assert_eq!(game.advance_hand(), Err(MatchError::NotStarted));
        assert_eq!(game.legal_actions(0), LegalActions::default());
    }

    #[test]
    fn test_restart_keeps_scores() {
        let mut game = started(5);
        game.players[2].score = 30000;
        let hand_before = game.players[0].hand.clone();
        game.restart_match().unwrap();
        assert_eq!(game.players[2].score, 30000);
        assert_eq!(game.round, Round::new());
        // 重新洗牌后配牌不同（概率上）
        assert_ne!(game.players[0].hand, hand_before);
        assert_eq!(game.tile_count(), 136);
    }

    #[test]
    fn test_robbing_without_added_quad_changes_nothing() {
        let mut game = started(5);
        let tiles = crate::tile::parse_tiles("78m234p567p345s55z").unwrap().unwrap();
        game.players[3].hand = crate::tile::Hand::from_tiles(tiles);
        game.players[3].phase = Phase::Idle;
        // 加杠的还原信息丢失时，抢杠必须整体失败
        game.last_tile = Some(LastTile {
            tile: Tile::with_copy(TileKind::Characters(9), 3),
            owner: 2,
            source: TileSource::AddedQuad,
            last_of_wall: false,
        });
        game.quad_rollback = None;
        let mut decomposer = HandDecomposer::new();
        assert!(game.check_ron(&mut decomposer, 3).is_ok());

        let players = game.players.clone();
        assert_eq!(game.declare_ron(3), Err(MatchError::IllegalMeldComposition));
        assert_eq!(game.players, players);
        assert_eq!(game.quad_count, 0);
        assert!(game.last_tile.is_some());
        assert!(game.outcome.is_none());
    }

    #[test]
    fn test_failed_replacement_draw_keeps_claim_window() {
        let mut game = started(8);
        for _ in 0..crate::tile::wall::REPLACEMENT_TILES {
            assert!(game.wall.draw_replacement().is_some());
        }
        let tile = game.players[0].hand.tiles()[0];
        game.discard(0, tile).unwrap();
        game.players[1].phase = Phase::AddTileKan;

        let players = game.players.clone();
        let drawable = game.wall.drawable_count();
        assert_eq!(game.draw(1), Err(MatchError::WallExhausted));
        // 摸牌失败时不关闭鸣牌窗口
        assert_eq!(game.players, players);
        assert_eq!(game.last_tile.map(|t| t.tile), Some(tile));
        assert_eq!(game.wall.drawable_count(), drawable);
    }
}
