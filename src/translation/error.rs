//! 翻译模块统一错误处理
//!
//! 翻译本身是尽力而为的：预言机（远程翻译服务）的失败在客户端边界内被吸收，
//! 只有配置加载和语言持久化会把错误交给调用方。

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 翻译服务返回了非预期的结构
    #[error("响应格式错误: {0}")]
    MalformedResponse(String),

    /// 语言选择持久化错误
    #[error("存储错误: {0}")]
    StorageError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl TranslationError {
    /// 是否可以通过回退到原文恢复
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TranslationError::NetworkError(_) | TranslationError::MalformedResponse(_)
        )
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::MalformedResponse(_) => ErrorCategory::Oracle,
            TranslationError::StorageError(_) => ErrorCategory::Storage,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::InternalError(_) => ErrorCategory::Internal,
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Oracle,
    Storage,
    Parsing,
    Internal,
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TranslationError::MalformedResponse(error.to_string())
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::MalformedResponse(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<url::ParseError> for TranslationError {
    fn from(error: url::ParseError) -> Self {
        TranslationError::ConfigError(format!("无效的URL: {}", error))
    }
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::StorageError(format!("IO错误: {}", error))
    }
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
