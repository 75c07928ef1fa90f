//! 页面会话
//!
//! 把各个组件按加载流程串起来：解析原始文档，同步语言选择器，执行首次整页
//! 翻译，然后挂上变更监听器。切换语言时不做原地回译，而是持久化新语言后
//! 从原始文档重新走一遍加载流程。

use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::html::{
    element_children, find_element_by_id, get_node_attr, get_node_name, html_to_dom,
    set_node_attr, text_content,
};
use crate::translation::config::TranslationConfig;
use crate::translation::core::client::{
    GoogleTranslateOracle, TranslationClient, TranslationOracle,
};
use crate::translation::core::dispatcher::{Dispatcher, PassReport};
use crate::translation::core::watcher::{LiveDocument, MutationBatch, MutationWatcher};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::collector::{CollectorConfig, TextCollector};
use crate::translation::storage::{LanguageState, ReloadRequest};

/// 整页遍历方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PassMode {
    /// 按节点提取单元（默认）
    #[default]
    Incremental,
    /// 整段翻译叶子展示元素的旧模式
    Bulk,
}

/// 一次加载的结果
pub struct LoadedPage<O> {
    pub document: LiveDocument,
    pub watcher: MutationWatcher<O>,
    pub batches: UnboundedReceiver<MutationBatch>,
    pub language: String,
    /// 首次整页遍历的报告；页面本身就是目标语言时为 `None`
    pub report: Option<PassReport>,
}

impl<O: TranslationOracle> LoadedPage<O> {
    /// 处理加载后发生的所有插入
    pub async fn flush_mutations(&mut self) -> PassReport {
        self.watcher.process_pending(&mut self.batches).await
    }

    /// 向 `<body>` 追加HTML片段，并立即翻译新插入的内容
    pub async fn insert_html(&mut self, html: &str) -> PassReport {
        let body = self.document.body();
        self.document.append_html(&body, html);
        self.flush_mutations().await
    }
}

/// 页面会话
pub struct PageSession<O> {
    source: Vec<u8>,
    encoding: String,
    config: TranslationConfig,
    dispatcher: Rc<Dispatcher<O>>,
    language: Rc<LanguageState>,
    mode: PassMode,
}

impl PageSession<GoogleTranslateOracle> {
    /// 使用配置中的翻译服务和语言存储创建会话
    pub fn from_config(
        source: Vec<u8>,
        encoding: &str,
        config: TranslationConfig,
    ) -> TranslationResult<Self> {
        let oracle = GoogleTranslateOracle::from_config(&config)?;
        let client = TranslationClient::new(oracle).with_source_lang(&config.source_lang);
        let language = LanguageState::from_config(&config);
        Ok(Self::new(source, encoding, config, client, language))
    }
}

impl<O: TranslationOracle> PageSession<O> {
    pub fn new(
        source: Vec<u8>,
        encoding: &str,
        config: TranslationConfig,
        client: TranslationClient<O>,
        language: LanguageState,
    ) -> Self {
        let collector = TextCollector::new(CollectorConfig::from(&config));
        Self {
            source,
            encoding: encoding.to_string(),
            config,
            dispatcher: Rc::new(Dispatcher::new(Rc::new(client), collector)),
            language: Rc::new(language),
            mode: PassMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: PassMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher<O> {
        &self.dispatcher
    }

    pub fn client(&self) -> &TranslationClient<O> {
        self.dispatcher.client()
    }

    pub fn language(&self) -> &LanguageState {
        &self.language
    }

    /// 加载流程：解析、同步选择器、首次翻译、挂载监听器
    pub async fn load(&self) -> TranslationResult<LoadedPage<O>> {
        let dom = html_to_dom(&self.source, &self.encoding)
            .map_err(|e| TranslationError::ParseError(format!("解析HTML失败: {}", e)))?;
        let document = LiveDocument::new(dom);
        let lang = self.language.get();

        sync_language_selector(&document.dom().document, &self.config.selector_id, &lang);

        let report = if lang == self.config.page_lang {
            tracing::info!("页面已是 {}，跳过首次翻译", lang);
            None
        } else {
            let body = document.body();
            let report = match self.mode {
                PassMode::Incremental => self.dispatcher.translate_page(&body, &lang).await,
                PassMode::Bulk => self.dispatcher.translate_page_bulk(&body, &lang).await,
            };
            Some(report)
        };

        let watcher = MutationWatcher::new(Rc::clone(&self.dispatcher), Rc::clone(&self.language));
        let batches = watcher.attach(&document);

        Ok(LoadedPage {
            document,
            watcher,
            batches,
            language: lang,
            report,
        })
    }

    /// 执行语言修改后的重新加载
    pub async fn reload(&self, request: ReloadRequest) -> TranslationResult<LoadedPage<O>> {
        tracing::info!("重新加载页面: {}", request.lang);
        self.load().await
    }

    /// 切换语言：持久化后从原始文档重新加载
    pub async fn change_language(&self, lang: &str) -> TranslationResult<LoadedPage<O>> {
        let request = self.language.set(lang)?;
        self.reload(request).await
    }
}

fn language_options(select: &Handle) -> Vec<Handle> {
    let mut options = Vec::new();
    for child in element_children(select) {
        match get_node_name(&child) {
            Some("option") => options.push(child),
            Some("optgroup") => options.extend(language_options(&child)),
            _ => {}
        }
    }
    options
}

fn option_value(option: &Handle) -> String {
    get_node_attr(option, "value").unwrap_or_else(|| text_content(option).trim().to_string())
}

/// 把选择器中与 `lang` 对应的选项标记为选中；返回是否找到该选项
pub fn sync_language_selector(document: &Handle, selector_id: &str, lang: &str) -> bool {
    let Some(select) = find_element_by_id(document, selector_id) else {
        return false;
    };

    let mut found = false;
    for option in language_options(&select) {
        if option_value(&option) == lang {
            set_node_attr(&option, "selected", Some(String::new()));
            found = true;
        } else {
            set_node_attr(&option, "selected", None);
        }
    }
    found
}

/// 读取选择器当前的取值：选中的选项，否则为第一个选项
pub fn selected_language(dom: &RcDom, selector_id: &str) -> Option<String> {
    let select = find_element_by_id(&dom.document, selector_id)?;
    let options = language_options(&select);
    options
        .iter()
        .find(|option| get_node_attr(option, "selected").is_some())
        .or_else(|| options.first())
        .map(option_value)
}
