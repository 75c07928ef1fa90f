//! 翻译系统核心模块
//!
//! - **client** (`client.rs`): 翻译预言机接口与带缓存的翻译客户端
//! - **dispatcher** (`dispatcher.rs`): 对一棵子树执行提取、并发翻译和写回
//! - **watcher** (`watcher.rs`): 监听节点插入，只翻译新增的子树
//! - **session** (`session.rs`): 页面加载流程与切换语言后的重新加载
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use page_translator::translation::{PageSession, TranslationConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let html = b"<html><body><p>Hello</p></body></html>".to_vec();
//! let session = PageSession::from_config(html, "utf-8", TranslationConfig::default_with_lang("fr", None))?;
//!
//! let mut page = session.load().await?;
//! page.insert_html("<p>Loaded later</p>").await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod dispatcher;
pub mod session;
pub mod watcher;

pub use client::{
    parse_fragments, ClientStats, GoogleTranslateOracle, Translation, TranslationClient,
    TranslationOracle, TranslationOrigin,
};
pub use dispatcher::{Dispatcher, PassReport, UnitOutcome};
pub use session::{selected_language, sync_language_selector, LoadedPage, PageSession, PassMode};
pub use watcher::{
    LiveDocument, MutationBatch, MutationHandler, MutationRecord, MutationWatcher,
    TreeChangeObserver,
};
