//! 语言状态模块
//!
//! 当前目标语言保存在外部存储中（跨重新加载保留），缺失时回退到默认值。
//! 修改语言不做就地重译，而是请求一次完整的重新加载。

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 持久化的键值存储，保存用户选择的语言
pub trait LanguageStore {
    fn load(&self, key: &str) -> TranslationResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> TranslationResult<()>;
}

/// 内存存储，进程内有效
#[derive(Debug, Default)]
pub struct MemoryLanguageStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryLanguageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageStore for MemoryLanguageStore {
    fn load(&self, key: &str) -> TranslationResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> TranslationResult<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON 文件存储：一个扁平的字符串对象
#[derive(Debug, Clone)]
pub struct FileLanguageStore {
    path: PathBuf,
}

impl FileLanguageStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> TranslationResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            TranslationError::StorageError(format!(
                "无法解析语言存储 {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

impl LanguageStore for FileLanguageStore {
    fn load(&self, key: &str) -> TranslationResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> TranslationResult<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&values)
            .map_err(|e| TranslationError::StorageError(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// 语言状态机：Unset → Set(lang)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguagePhase {
    Unset,
    Set(String),
}

/// 语言修改后需要执行的重新加载
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "语言修改只有在重新加载后才会生效"]
pub struct ReloadRequest {
    pub lang: String,
}

/// 当前目标语言
pub struct LanguageState {
    store: Box<dyn LanguageStore>,
    key: String,
    default_lang: String,
}

impl LanguageState {
    pub fn new(store: Box<dyn LanguageStore>, key: &str, default_lang: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
            default_lang: default_lang.to_string(),
        }
    }

    /// 按配置选择存储：配置了路径时使用文件，否则使用内存
    pub fn from_config(config: &TranslationConfig) -> Self {
        let store: Box<dyn LanguageStore> = match config.language_store_path() {
            Some(path) => Box::new(FileLanguageStore::new(path)),
            None => Box::new(MemoryLanguageStore::new()),
        };
        Self::new(store, &config.language_key, &config.target_lang)
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    pub fn phase(&self) -> LanguagePhase {
        match self.store.load(&self.key) {
            Ok(Some(lang)) if !lang.trim().is_empty() => LanguagePhase::Set(lang),
            Ok(_) => LanguagePhase::Unset,
            Err(e) => {
                tracing::warn!("读取语言选择失败，使用默认语言 {}: {}", self.default_lang, e);
                LanguagePhase::Unset
            }
        }
    }

    /// 当前目标语言，未设置时为默认值
    pub fn get(&self) -> String {
        match self.phase() {
            LanguagePhase::Set(lang) => lang,
            LanguagePhase::Unset => self.default_lang.clone(),
        }
    }

    /// 记录新的语言，并返回需要执行的重新加载
    pub fn set(&self, lang: &str) -> TranslationResult<ReloadRequest> {
        let lang = lang.trim();
        if lang.is_empty() {
            return Err(TranslationError::ConfigError("语言代码不能为空".to_string()));
        }

        self.store.save(&self.key, lang)?;
        tracing::info!("语言已切换为 {}，需要重新加载", lang);

        Ok(ReloadRequest {
            lang: lang.to_string(),
        })
    }
}
