//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    use std::time::Duration;

    // 语言设置
    pub const DEFAULT_TARGET_LANG: &str = "es";
    pub const DEFAULT_PAGE_LANG: &str = "es";
    pub const DEFAULT_SOURCE_LANG: &str = "auto";

    // 持久化语言选择使用的键
    pub const LANGUAGE_KEY: &str = "idioma-pagina";

    // 语言选择器元素的 id
    pub const SELECTOR_ID: &str = "lang-select";

    // 默认API设置
    pub const DEFAULT_API_URL: &str = "https://translate.googleapis.com/translate_a/single";
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    // 变更监听器同时进行翻译的批次上限
    pub const MAX_CONCURRENT_BATCHES: usize = 16;

    // 跳过的元素，其内容不是可见文本
    pub const SKIP_ELEMENTS: &[&str] = &["script", "style", "template"];

    // 整段翻译模式下的候选元素
    pub const BULK_SELECTORS: &[&str] = &["p", "h1", "h2", "h3", "span", "a", "li", "button"];

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "page-translator.toml",
        ".page-translator.toml",
        "page-translator.json",
        "~/.config/page-translator/config.toml",
        "/etc/page-translator/config.toml",
    ];
}
