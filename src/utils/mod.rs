/// 工具模块

pub mod bitops;

pub use bitops::KindSet;
