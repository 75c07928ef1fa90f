//! 翻译缓存模块
//!
//! 进程级的 (原文, 目标语言) → 译文 映射。没有淘汰策略也没有TTL，
//! 大小只受见过的不同键数量约束；同一个键的最后一次写入生效。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// 缓存键：观察到的原文（不做任何归一化）与目标语言代码
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub text: String,
    pub target_lang: String,
}

impl CacheKey {
    pub fn new(text: &str, target_lang: &str) -> Self {
        Self {
            text: text.to_string(),
            target_lang: target_lang.to_string(),
        }
    }
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_entries: usize,
}

impl CacheStats {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64
        }
    }
}

/// 翻译缓存
///
/// 与文档句柄一样只在单线程运行时中使用。
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: RefCell<HashMap<CacheKey, String>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl TranslationCache {
    /// 创建新的翻译缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取缓存条目
    pub fn get(&self, text: &str, target_lang: &str) -> Option<String> {
        let found = self
            .entries
            .borrow()
            .get(&CacheKey::new(text, target_lang))
            .cloned();

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.set(counter.get() + 1);

        found
    }

    /// 插入缓存条目
    pub fn put(&self, text: &str, target_lang: &str, translated: &str) {
        self.entries
            .borrow_mut()
            .insert(CacheKey::new(text, target_lang), translated.to_string());
    }

    /// 检查是否包含指定键（不计入统计）
    pub fn contains(&self, text: &str, target_lang: &str) -> bool {
        self.entries
            .borrow()
            .contains_key(&CacheKey::new(text, target_lang))
    }

    /// 获取缓存大小
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        let cache_hits = self.hits.get();
        let cache_misses = self.misses.get();

        CacheStats {
            total_requests: cache_hits + cache_misses,
            cache_hits,
            cache_misses,
            total_entries: self.len(),
        }
    }
}
