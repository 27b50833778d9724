/// 四人立直麻将核心引擎
/// 
/// 摸打鸣牌的回合状态机、手牌拆解与役 / 符 / 点数计算

pub mod tile;
pub mod utils;
pub mod game;
pub mod engine;

// 重新导出常用类型
pub use tile::{parse_kinds, parse_tiles, Hand, HandDecomposer, Suit, Tile, TileKind, TileParseError, Wall, Wind};
pub use utils::KindSet;
pub use game::action::Action;
pub use game::meld::{Meld, QuadKind};
pub use game::player::{Phase, Player};
pub use game::rules::{MatchConfig, RuleVariant};
pub use game::seating::{Round, Seating};
pub use game::yaku::{Yaku, YakuEvaluator, YakuResult};
pub use game::scoring::{WinEvaluation, WinEvaluator, WinRejection};
pub use game::settlement::Settlement;
pub use game::match_engine::{ActionResult, HandOutcome, Match, MatchError};
pub use engine::action_mask::LegalActions;
