/// 牌相关模块
///
/// 包含牌（Tile）、牌墙（Wall）、手牌（Hand）与和牌拆解的实现

pub mod tile;
pub mod wall;
pub mod hand;
pub mod decompose;

// 重新导出常用类型
pub use tile::{parse_kinds, parse_tiles, Suit, Tile, TileKind, TileParseError, Wind};
pub use wall::Wall;
pub use hand::Hand;
pub use decompose::{DecomposedGroup, Decomposition, Group, GroupOrigin, HandDecomposer, WinShape};
