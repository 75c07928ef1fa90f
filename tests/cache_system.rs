//! 缓存系统集成测试
//!
//! 测试翻译客户端与缓存的协作：命中、未命中、统计

use page_translator::translation::storage::{CacheKey, TranslationCache};
use page_translator::translation::{TranslationClient, TranslationOrigin};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::MockOracle;

/// 基本场景：Hello → Hola，并写入缓存
#[tokio::test]
async fn test_hello_is_translated_and_cached() {
    let client = TranslationClient::new(MockOracle::new().with_reply("Hello", &["Hola"]));

    let translated = client.translate("Hello", "es").await;

    assert_eq!(translated, "Hola");
    assert_eq!(client.cache().get("Hello", "es").as_deref(), Some("Hola"));
    assert_eq!(client.oracle().calls(), vec![("Hello".to_string(), "es".to_string())]);
}

/// 多段响应按顺序拼接
#[tokio::test]
async fn test_fragments_are_concatenated_in_order() {
    let client = TranslationClient::new(
        MockOracle::new().with_reply("Good morning. Welcome.", &["Buenos días. ", "Bienvenido."]),
    );

    let translated = client.translate("Good morning. Welcome.", "es").await;
    assert_eq!(translated, "Buenos días. Bienvenido.");
}

/// 第二次翻译同一文本不会调用远程服务
#[tokio::test]
async fn test_translation_is_idempotent() {
    let client = TranslationClient::new(MockOracle::new());

    let first = client.translate_detailed("Gallery", "it").await;
    let second = client.translate_detailed("Gallery", "it").await;

    assert_eq!(first.origin, TranslationOrigin::Remote);
    assert_eq!(second.origin, TranslationOrigin::Cache);
    assert_eq!(first.text, second.text);
    assert_eq!(client.oracle().call_count(), 1);
    assert_eq!(client.stats().remote_calls, 1);
}

/// 空白输入直接原样返回，不查缓存也不发请求
#[tokio::test]
async fn test_blank_input_short_circuits() {
    let client = TranslationClient::new(MockOracle::new());

    for text in ["", " ", "\n\t  "] {
        let result = client.translate_detailed(text, "es").await;
        assert_eq!(result.text, text);
        assert_eq!(result.origin, TranslationOrigin::Blank);
    }

    assert_eq!(client.oracle().call_count(), 0);
    assert_eq!(client.cache().stats().total_requests, 0);
    assert!(client.cache().is_empty());
}

/// 预先填充的缓存直接生效
#[tokio::test]
async fn test_prepopulated_cache_is_used() {
    let cache = TranslationCache::new();
    cache.put("Cards", "es", "Tarjetas");
    let client = TranslationClient::with_cache(MockOracle::new(), cache);

    assert_eq!(client.translate("Cards", "es").await, "Tarjetas");
    assert_eq!(client.oracle().call_count(), 0);
}

/// 统计信息反映命中与未命中
#[tokio::test]
async fn test_cache_statistics() {
    let client = TranslationClient::new(MockOracle::new());

    client.translate("one", "en").await;
    client.translate("one", "en").await;
    client.translate("two", "en").await;
    client.translate("one", "fr").await;

    let stats = client.cache().stats();
    assert_eq!(stats.total_entries, 3);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_misses, 3);
    assert_eq!(stats.total_requests, 4);
    assert!((stats.hit_rate() - 0.25).abs() < f64::EPSILON);
}

#[test]
fn test_cache_key_distinguishes_language() {
    assert_ne!(CacheKey::new("Hola", "en"), CacheKey::new("Hola", "fr"));
    assert_eq!(CacheKey::new("Hola", "en"), CacheKey::new("Hola", "en"));
}
