//! 翻译管道模块
//!
//! 从DOM中提取可翻译单元

pub mod collector;

// 重新导出主要类型
pub use collector::{
    BulkTarget, CollectorConfig, NodeClass, TextCollector, TranslatableUnit, UnitKind,
};
