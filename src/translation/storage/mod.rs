//! 存储模块
//!
//! 提供翻译缓存和语言选择的持久化。

pub mod cache;
pub mod language;

pub use cache::{CacheKey, CacheStats, TranslationCache};
pub use language::{
    FileLanguageStore, LanguagePhase, LanguageState, LanguageStore, MemoryLanguageStore,
    ReloadRequest,
};
