use crate::game::chii::ChiiHandler;
use crate::game::kong::KongHandler;
use crate::game::match_engine::Match;
use crate::game::pong::PongHandler;
use crate::game::ready::ReadyChecker;
use crate::tile::{HandDecomposer, Tile, TileKind};
use serde::{Deserialize, Serialize};

/// 合法动作
///
/// 每一项都由对应操作使用的同一个校验函数生成，
/// 所以列出的动作提交后一定被接受
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegalActions {
    /// 可以摸牌（含岭上牌）
    pub draw: bool,
    /// 可以宣告荒牌流局
    pub exhaustive_draw: bool,
    /// 可以打出的牌
    pub discard: Vec<Tile>,
    /// 可以吃的两张手牌
    pub chii: Vec<(Tile, Tile)>,
    /// 可以碰的两张手牌
    pub pon: Vec<(Tile, Tile)>,
    /// 大明杠使用的三张手牌
    pub open_quad: Option<[Tile; 3]>,
    /// 可以暗杠的牌种
    pub concealed_quad: Vec<TileKind>,
    /// 可以加杠的牌
    pub added_quad: Vec<Tile>,
    /// 立直时可以打出的牌
    pub riichi: Vec<Tile>,
    pub ron: bool,
    pub tsumo: bool,
    /// 九种九牌
    pub abortive_draw: bool,
}

impl LegalActions {
    /// 生成某个座位当前的合法动作
    ///
    /// 只读，不修改对局状态；对局未开始、已结束或座位无效时全部为空
    pub fn generate(game: &Match, seat: u8) -> Self {
        let Some(player) = game.player(seat) else {
            return Self::default();
        };
        let mut decomposer = HandDecomposer::new();
        let mut actions = Self {
            draw: game.check_draw(seat).is_ok(),
            exhaustive_draw: game.check_exhaustive_draw(seat).is_ok(),
            ron: game.check_ron(&mut decomposer, seat).is_ok(),
            tsumo: game.check_tsumo(&mut decomposer, seat).is_ok(),
            abortive_draw: game.check_abortive_draw(seat).is_ok(),
            ..Self::default()
        };

        actions.discard = player
            .hand
            .tiles()
            .iter()
            .copied()
            .filter(|&tile| game.check_discard(seat, tile).is_ok())
            .collect();

        if let Some(last) = game.last_tile() {
            actions.chii = ChiiHandler::options(player, last.tile)
                .into_iter()
                .filter(|&(a, b)| game.check_chii(seat, a, b).is_ok())
                .collect();
            actions.pon = PongHandler::options(player, last.tile)
                .into_iter()
                .filter(|&(a, b)| game.check_pon(seat, a, b).is_ok())
                .collect();
            if game.check_open_quad(seat).is_ok() {
                actions.open_quad = KongHandler::open_quad_tiles(player, last.tile);
            }
        }

        actions.concealed_quad = KongHandler::concealed_quad_kinds(player)
            .into_iter()
            .filter(|&kind| game.check_concealed_quad(&mut decomposer, seat, kind).is_ok())
            .collect();
        actions.added_quad = KongHandler::added_quad_tiles(player)
            .into_iter()
            .filter(|&tile| game.check_added_quad(seat, tile).is_ok())
            .collect();

        if game.check_riichi_state(seat).is_ok() {
            actions.riichi = ReadyChecker::riichi_discards(&mut decomposer, player);
        }

        actions
    }

    /// 是否没有任何合法动作
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
