//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 语言配置
    pub target_lang: String,
    pub page_lang: String,
    pub source_lang: String,
    pub language_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_store_path: Option<String>,
    pub selector_id: String,

    // 翻译服务
    pub api_url: String,
    pub request_timeout_secs: u64,

    // 提取策略
    pub skip_elements: Vec<String>,
    pub bulk_selectors: Vec<String>,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            page_lang: constants::DEFAULT_PAGE_LANG.to_string(),
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            language_key: constants::LANGUAGE_KEY.to_string(),
            language_store_path: None,
            selector_id: constants::SELECTOR_ID.to_string(),

            api_url: constants::DEFAULT_API_URL.to_string(),
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT.as_secs(),

            skip_elements: to_strings(constants::SKIP_ELEMENTS),
            bulk_selectors: to_strings(constants::BULK_SELECTORS),
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl TranslationConfig {
    /// 创建带指定语言的默认配置
    pub fn default_with_lang(target_lang: &str, api_url: Option<&str>) -> Self {
        let mut config = Self {
            target_lang: target_lang.to_string(),
            ..Self::default()
        };
        if let Some(url) = api_url {
            config.api_url = url.to_string();
        }
        config
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.target_lang.trim().is_empty() {
            return Err(TranslationError::ConfigError("目标语言不能为空".to_string()));
        }

        if self.language_key.trim().is_empty() {
            return Err(TranslationError::ConfigError("语言存储键不能为空".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时必须大于0".to_string()));
        }

        url::Url::parse(&self.api_url)?;

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{translation, EnvVar};

        // 未设置或无法解析的变量保留当前值
        self.target_lang = translation::TargetLang::get_or_default(self.target_lang.clone());
        self.page_lang = translation::PageLang::get_or_default(self.page_lang.clone());
        self.source_lang = translation::SourceLang::get_or_default(self.source_lang.clone());

        let api_url = translation::ApiUrl::get_or_default(self.api_url.clone());
        if api_url != self.api_url {
            tracing::info!("环境变量覆盖 API URL: {}", api_url);
            self.api_url = api_url;
        }

        self.request_timeout_secs =
            translation::RequestTimeout::get_or_default(self.request_timeout()).as_secs();

        if let Ok(path) = translation::LanguageStorePath::get() {
            self.language_store_path = Some(path);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 展开 `~` 后的语言存储路径
    pub fn language_store_path(&self) -> Option<PathBuf> {
        self.language_store_path
            .as_deref()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
    }
}

/// 简化的配置管理器
#[derive(Debug)]
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 按搜索路径加载配置，再应用环境变量覆盖
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let mut manager = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                Self {
                    config: TranslationConfig::default(),
                    source: None,
                }
            }
        };

        manager.config.apply_env_overrides();
        manager.config.validate()?;
        Ok(manager)
    }

    /// 从指定文件加载配置（不应用环境变量）
    pub fn from_file(path: &Path) -> TranslationResult<Self> {
        tracing::info!("加载配置文件: {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("读取配置文件失败 {}: {}", path.display(), e))
        })?;

        let config: TranslationConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))?
        } else {
            toml::from_str(&content)?
        };
        config.validate()?;

        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 配置来源文件，使用默认配置时为 `None`
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn find_config_file() -> Option<PathBuf> {
        constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists())
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &Path) -> TranslationResult<()> {
        let content = toml::to_string_pretty(&TranslationConfig::default())
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
