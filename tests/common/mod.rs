// 集成测试公共模块
//
// 提供测试辅助工具和共享功能：HTML样例、可编排的模拟翻译服务、测试环境

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use markup5ever_rcdom::{Handle, RcDom};

use page_translator::html::{find_nodes, html_to_dom};
use page_translator::translation::core::{parse_fragments, Dispatcher, MutationWatcher};
use page_translator::translation::error::{TranslationError, TranslationResult};
use page_translator::translation::storage::{LanguageState, MemoryLanguageStore};
use page_translator::translation::{TextCollector, TranslationClient, TranslationOracle};

/// 可编排的模拟翻译服务
///
/// 默认把文本翻译为两段 `["<lang>:", text]`，拼接后即 `"<lang>:text"`。
#[derive(Default)]
pub struct MockOracle {
    replies: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    malformed: HashSet<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, text: &str, fragments: &[&str]) -> Self {
        self.replies.insert(
            text.to_string(),
            fragments.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn malformed_on(mut self, text: &str) -> Self {
        self.malformed.insert(text.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 按调用顺序记录的 (原文, 目标语言)
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, text: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == text)
            .count()
    }

    /// 同时进行中的调用数的最大值
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait(?Send)]
impl TranslationOracle for MockOracle {
    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        target_lang: &str,
    ) -> TranslationResult<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), target_lang.to_string()));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(text) {
            return Err(TranslationError::NetworkError(format!(
                "connection refused: {}",
                text
            )));
        }
        if self.malformed.contains(text) {
            return parse_fragments(r#"{"error": "unexpected"}"#);
        }

        Ok(self
            .replies
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![format!("{}:", target_lang), text.to_string()]))
    }
}

/// 测试环境：共享同一个客户端的分发器和语言状态
pub struct TestEnvironment {
    pub client: Rc<TranslationClient<MockOracle>>,
    pub dispatcher: Rc<Dispatcher<MockOracle>>,
    pub language: Rc<LanguageState>,
}

impl TestEnvironment {
    pub fn new(oracle: MockOracle) -> Self {
        let client = Rc::new(TranslationClient::new(oracle));
        let dispatcher = Rc::new(Dispatcher::new(
            Rc::clone(&client),
            TextCollector::default(),
        ));
        let language = Rc::new(LanguageState::new(
            Box::new(MemoryLanguageStore::new()),
            "idioma-pagina",
            "es",
        ));
        Self {
            client,
            dispatcher,
            language,
        }
    }

    pub fn oracle(&self) -> &MockOracle {
        self.client.oracle()
    }

    pub fn watcher(&self) -> MutationWatcher<MockOracle> {
        MutationWatcher::new(Rc::clone(&self.dispatcher), Rc::clone(&self.language))
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new(MockOracle::new())
    }
}

/// HTML测试辅助工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    pub fn create_test_dom(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").unwrap()
    }

    pub fn first(dom: &RcDom, tag: &str) -> Handle {
        Self::all(dom, tag).remove(0)
    }

    pub fn all(dom: &RcDom, tag: &str) -> Vec<Handle> {
        find_nodes(&dom.document, &[tag])
    }

    /// 含有文本、输入框、下拉框以及不可见内容的页面
    pub fn create_mixed_page() -> String {
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Gallery</title>
    <style>body { color: red; }</style>
</head>
<body>
    <h1>Welcome</h1>
    <p>Browse the <a href="/cards">collection</a> below.</p>
    <input type="text" placeholder="Search" value="">
    <textarea>Leave a comment</textarea>
    <select id="sort">
        <option value="new">Newest</option>
        <option value="old">Oldest</option>
    </select>
    <script>console.log("not text");</script>
    <div id="gallery"></div>
</body>
</html>"#
            .to_string()
    }

    /// 带语言选择器的页面
    pub fn create_page_with_selector() -> String {
        r#"<!DOCTYPE html>
<html>
<body>
    <select id="lang-select">
        <option value="es">Español</option>
        <option value="en">English</option>
        <option value="fr">Français</option>
    </select>
    <h1>Galería</h1>
    <p>Bienvenido</p>
    <div id="gallery"></div>
</body>
</html>"#
            .to_string()
    }
}
