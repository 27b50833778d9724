/// 游戏逻辑模块
/// 
/// 包含座位与场况、玩家、鸣牌、规则、役与计分、结算和对局状态机

pub mod constants;
pub mod seating;
pub mod player;
pub mod meld;
pub mod rules;
pub mod yaku;
pub mod scoring;
pub mod settlement;
pub mod action;
pub mod chii;
pub mod pong;
pub mod kong;
pub mod ready;
pub mod match_engine;
