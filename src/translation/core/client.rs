//! 翻译客户端
//!
//! 包装外部翻译预言机（远程翻译服务），在每次远程调用前查询缓存。
//! 客户端从不把错误抛出自身边界：任何失败都会被记录，并返回未翻译的原文。
//!
//! 同一批次中两个相同键的单元在任一请求完成前被并发派发时，两者都会发起远程调用；
//! 缓存只避免跨批次的重复调用，不对进行中的请求去重。最坏情况是重复调用，
//! 后写入的结果覆盖一个相等的值，不会产生不一致状态。

use std::cell::Cell;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::translation::config::TranslationConfig;
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::storage::cache::TranslationCache;

/// 外部翻译预言机的请求/响应契约
///
/// 返回按响应顺序排列的译文片段；片段之间不加分隔符直接拼接即为完整译文。
/// 所有调用都在单线程运行时上进行，实现不需要是 `Send`。
#[async_trait(?Send)]
pub trait TranslationOracle {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<String>>;
}

/// 基于 `translate_a/single` 接口的HTTP预言机
#[derive(Debug, Clone)]
pub struct GoogleTranslateOracle {
    client: reqwest::Client,
    endpoint: Url,
}

impl GoogleTranslateOracle {
    pub fn new(api_url: &str, timeout: Duration) -> TranslationResult<Self> {
        let endpoint = Url::parse(api_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("无法创建HTTP客户端: {}", e)))?;

        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &TranslationConfig) -> TranslationResult<Self> {
        Self::new(&config.api_url, config.request_timeout())
    }

    /// 构造请求URL：`client=gtx&sl=<源>&tl=<目标>&dt=t&q=<文本>`
    pub fn request_url(&self, text: &str, source_lang: &str, target_lang: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client", "gtx")
            .append_pair("sl", source_lang)
            .append_pair("tl", target_lang)
            .append_pair("dt", "t")
            .append_pair("q", text);
        url
    }
}

#[async_trait(?Send)]
impl TranslationOracle for GoogleTranslateOracle {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<String>> {
        let url = self.request_url(text, source_lang, target_lang);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        parse_fragments(&body)
    }
}

/// 解析预言机响应：`[[["译文", "原文", ...], ...], ...]`
///
/// 取第一个元素中每个片段的首项；`null` 视为空片段，其他非字符串值视为格式错误。
pub fn parse_fragments(body: &str) -> TranslationResult<Vec<String>> {
    let value: Value = serde_json::from_str(body)?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::MalformedResponse("缺少译文片段列表".to_string()))?;

    segments
        .iter()
        .map(|segment| match segment.get(0) {
            Some(Value::String(fragment)) => Ok(fragment.clone()),
            Some(Value::Null) => Ok(String::new()),
            other => Err(TranslationError::MalformedResponse(format!(
                "非预期的片段: {:?}",
                other
            ))),
        })
        .collect()
}

/// 单次翻译的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOrigin {
    /// 空白输入，未发起任何调用
    Blank,
    /// 缓存命中
    Cache,
    /// 远程调用成功
    Remote,
    /// 远程调用失败，返回原文
    Fallback,
}

/// 翻译结果及其来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub text: String,
    pub origin: TranslationOrigin,
}

/// 客户端统计信息快照
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub remote_calls: u64,
    pub failures: u64,
}

/// 翻译客户端，独占持有缓存
pub struct TranslationClient<O> {
    oracle: O,
    cache: TranslationCache,
    source_lang: String,
    remote_calls: Cell<u64>,
    failures: Cell<u64>,
}

impl<O: TranslationOracle> TranslationClient<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_cache(oracle, TranslationCache::new())
    }

    pub fn with_cache(oracle: O, cache: TranslationCache) -> Self {
        Self {
            oracle,
            cache,
            source_lang: "auto".to_string(),
            remote_calls: Cell::new(0),
            failures: Cell::new(0),
        }
    }

    /// 设置发送给预言机的源语言（默认 `auto`）
    pub fn with_source_lang(mut self, source_lang: &str) -> Self {
        self.source_lang = source_lang.to_string();
        self
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            remote_calls: self.remote_calls.get(),
            failures: self.failures.get(),
        }
    }

    /// 翻译文本；失败时返回原文
    pub async fn translate(&self, text: &str, target_lang: &str) -> String {
        self.translate_detailed(text, target_lang).await.text
    }

    /// 翻译文本并返回结果来源；失败会被记录但不会向上传播
    pub async fn translate_detailed(&self, text: &str, target_lang: &str) -> Translation {
        if text.trim().is_empty() {
            return Translation {
                text: text.to_string(),
                origin: TranslationOrigin::Blank,
            };
        }

        if let Some(cached) = self.cache.get(text, target_lang) {
            return Translation {
                text: cached,
                origin: TranslationOrigin::Cache,
            };
        }

        match self.request(text, target_lang).await {
            Ok(translated) => Translation {
                text: translated,
                origin: TranslationOrigin::Remote,
            },
            Err(e) => {
                self.failures.set(self.failures.get() + 1);
                tracing::warn!("翻译失败，保留原文 {:?} ({}): {}", text, target_lang, e);
                Translation {
                    text: text.to_string(),
                    origin: TranslationOrigin::Fallback,
                }
            }
        }
    }

    /// 可失败的翻译：缓存未命中时发起远程调用并写入缓存
    pub async fn try_translate(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        if let Some(cached) = self.cache.get(text, target_lang) {
            return Ok(cached);
        }

        self.request(text, target_lang).await
    }

    async fn request(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        self.remote_calls.set(self.remote_calls.get() + 1);

        let fragments = self
            .oracle
            .translate(text, &self.source_lang, target_lang)
            .await?;
        let translated = fragments.concat();

        self.cache.put(text, target_lang, &translated);
        tracing::debug!("翻译完成 {:?} -> {:?} ({})", text, translated, target_lang);
        Ok(translated)
    }
}
