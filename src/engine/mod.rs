/// 动作查询模块

pub mod action_mask;

pub use action_mask::LegalActions;
