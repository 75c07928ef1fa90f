//! 翻译模块
//!
//! 对文档树做增量翻译，采用清晰的模块化架构：
//! - **core**: 翻译客户端、分发器、变更监听器和页面会话
//! - **pipeline**: 可翻译单元的提取
//! - **storage**: 翻译缓存和语言选择的持久化
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use page_translator::translation::{ConfigManager, PageSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigManager::new()?.into_config();
//! let html = std::fs::read("index.html")?;
//! let session = PageSession::from_config(html, "utf-8", config)?;
//!
//! let page = session.load().await?;
//! if let Some(report) = &page.report {
//!     println!("翻译了 {} 个单元", report.translated());
//! }
//! # Ok(())
//! # }
//! ```

/// 配置管理模块
///
/// 语言设置、翻译服务地址、提取策略
pub mod config;

/// 核心翻译模块
pub mod core;

/// 错误处理模块
pub mod error;

/// 可翻译单元的提取
pub mod pipeline;

/// 存储管理模块 - 翻译缓存和语言选择
pub mod storage;

pub use config::{ConfigManager, TranslationConfig};
pub use self::core::{
    Dispatcher, GoogleTranslateOracle, LiveDocument, LoadedPage, MutationBatch, MutationWatcher,
    PageSession, PassMode, PassReport, TranslationClient, TranslationOracle, TranslationOrigin,
    TreeChangeObserver,
};
pub use error::{ErrorCategory, TranslationError, TranslationResult};
pub use pipeline::{TextCollector, TranslatableUnit, UnitKind};
pub use storage::{LanguageState, TranslationCache};
