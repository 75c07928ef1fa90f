//! # Page Translator
//!
//! 对HTML文档树做增量翻译：首次加载时翻译整页，之后只翻译新插入的子树，
//! 翻译结果按 (原文, 目标语言) 缓存。
//!
//! ## 模块组织
//!
//! - `parsers` - HTML解析与DOM操作
//! - `translation` - 提取、翻译、写回和变更监听
//! - `env` - 环境变量

pub mod env;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use parsers::*;
