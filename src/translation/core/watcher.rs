//! 变更监听器
//!
//! 文档结构的变化通过 [`TreeChangeObserver`] 能力以批次的形式通知出来，
//! [`MutationWatcher`] 只把新插入的顶层元素交给分发器，已经翻译过的
//! 内容不会被再次遍历。
//!
//! 已送达的批次在分发前先合并为一个批次，再同步提取单元：同一节点不会因为
//! 先后出现在两个批次里而被翻译两次。

use std::cell::RefCell;
use std::rc::Rc;

use futures::stream::{self, StreamExt};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::html::{append_child, find_nodes, fragment_to_nodes, is_ancestor_of};
use crate::translation::config::constants;
use crate::translation::core::client::TranslationOracle;
use crate::translation::core::dispatcher::{Dispatcher, PassReport};
use crate::translation::pipeline::collector::TranslatableUnit;
use crate::translation::storage::LanguageState;

/// 一次插入操作：目标父节点及其新增的子节点
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub target: Handle,
    pub added_nodes: Vec<Handle>,
}

/// 一次通知中一起送达的变更记录
#[derive(Debug, Clone, Default)]
pub struct MutationBatch {
    pub records: Vec<MutationRecord>,
}

impl MutationBatch {
    pub fn single(target: &Handle, added_nodes: Vec<Handle>) -> Self {
        Self {
            records: vec![MutationRecord {
                target: target.clone(),
                added_nodes,
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.iter().all(|r| r.added_nodes.is_empty())
    }

    /// 把另一个批次的记录并入本批次
    pub fn extend(&mut self, other: MutationBatch) {
        self.records.extend(other.records);
    }

    /// 本批次新增的顶层元素节点
    ///
    /// 非元素节点被忽略；若某个节点是同批次另一个新增节点的后代，则只保留祖先。
    pub fn inserted_roots(&self) -> Vec<Handle> {
        let elements: Vec<Handle> = self
            .records
            .iter()
            .flat_map(|r| r.added_nodes.iter())
            .filter(|node| matches!(node.data, NodeData::Element { .. }))
            .cloned()
            .collect();

        let mut roots: Vec<Handle> = Vec::with_capacity(elements.len());
        for node in &elements {
            let duplicate = roots.iter().any(|root| Rc::ptr_eq(root, node));
            let nested = elements
                .iter()
                .any(|other| !Rc::ptr_eq(other, node) && is_ancestor_of(other, node));
            if !duplicate && !nested {
                roots.push(node.clone());
            }
        }
        roots
    }
}

/// 变更处理函数
pub type MutationHandler = Box<dyn Fn(&MutationBatch)>;

/// 文档结构变化的通知能力
pub trait TreeChangeObserver {
    /// 注册处理函数；此后每次插入都会以批次的形式回调
    fn on_nodes_inserted(&self, handler: MutationHandler);
}

/// 可被观察的文档：所有插入都经由它进行，并通知订阅者
pub struct LiveDocument {
    dom: RcDom,
    handlers: RefCell<Vec<Rc<dyn Fn(&MutationBatch)>>>,
}

impl LiveDocument {
    pub fn new(dom: RcDom) -> Self {
        Self {
            dom,
            handlers: RefCell::new(Vec::new()),
        }
    }

    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    pub fn into_dom(self) -> RcDom {
        self.dom
    }

    /// 文档的 `<body>`，不存在时退回文档根节点
    pub fn body(&self) -> Handle {
        find_nodes(&self.dom.document, &["html", "body"])
            .into_iter()
            .next()
            .unwrap_or_else(|| self.dom.document.clone())
    }

    /// 将一组游离节点追加到 `parent`，并作为一个批次通知
    pub fn append_children(&self, parent: &Handle, nodes: Vec<Handle>) {
        if nodes.is_empty() {
            return;
        }
        for node in &nodes {
            append_child(parent, node.clone());
        }
        self.notify(&MutationBatch::single(parent, nodes));
    }

    pub fn append_child(&self, parent: &Handle, node: Handle) {
        self.append_children(parent, vec![node]);
    }

    /// 解析HTML片段并追加到 `parent`，返回插入的节点
    pub fn append_html(&self, parent: &Handle, html: &str) -> Vec<Handle> {
        let nodes = fragment_to_nodes(html);
        self.append_children(parent, nodes.clone());
        nodes
    }

    /// 回调期间处理函数可以再订阅或再插入；新订阅从下一次通知起生效
    fn notify(&self, batch: &MutationBatch) {
        let handlers: Vec<Rc<dyn Fn(&MutationBatch)>> = self.handlers.borrow().clone();
        for handler in &handlers {
            handler(batch);
        }
    }
}

impl TreeChangeObserver for LiveDocument {
    fn on_nodes_inserted(&self, handler: MutationHandler) {
        self.handlers.borrow_mut().push(Rc::from(handler));
    }
}

/// 变更监听器：把新插入的子树交给分发器
pub struct MutationWatcher<O> {
    dispatcher: Rc<Dispatcher<O>>,
    language: Rc<LanguageState>,
}

impl<O: TranslationOracle> MutationWatcher<O> {
    pub fn new(dispatcher: Rc<Dispatcher<O>>, language: Rc<LanguageState>) -> Self {
        Self {
            dispatcher,
            language,
        }
    }

    /// 订阅观察者，返回接收变更批次的通道
    pub fn attach(&self, observer: &dyn TreeChangeObserver) -> UnboundedReceiver<MutationBatch> {
        let (tx, rx) = mpsc::unbounded_channel();
        observer.on_nodes_inserted(Box::new(move |batch: &MutationBatch| {
            if tx.send(batch.clone()).is_err() {
                tracing::debug!("变更通道已关闭，丢弃批次");
            }
        }));
        rx
    }

    /// 读取当前语言并同步提取批次中的单元
    fn prepare(&self, batch: &MutationBatch) -> (String, Vec<TranslatableUnit>) {
        let lang = self.language.get();
        let roots = batch.inserted_roots();
        if roots.is_empty() {
            return (lang, Vec::new());
        }

        let collector = self.dispatcher.collector();
        let units: Vec<TranslatableUnit> = roots
            .iter()
            .flat_map(|root| collector.collect_units(root))
            .collect();
        tracing::debug!(
            "处理变更批次: {} 个新节点, {} 个单元 -> {}",
            roots.len(),
            units.len(),
            lang
        );
        (lang, units)
    }

    /// 处理一个批次：只翻译新插入的顶层元素
    pub async fn process_batch(&self, batch: &MutationBatch) -> PassReport {
        let (lang, units) = self.prepare(batch);
        self.dispatcher.translate_units(units, &lang).await
    }

    /// 把通道中所有已送达的批次合并为一个批次处理后返回
    pub async fn process_pending(&self, rx: &mut UnboundedReceiver<MutationBatch>) -> PassReport {
        let mut merged = MutationBatch::default();
        while let Ok(batch) = rx.try_recv() {
            merged.extend(batch);
        }
        self.process_batch(&merged).await
    }

    /// 持续处理批次直到通道关闭
    ///
    /// 每次唤醒时把已送达的批次合并后立即提取单元，随后的翻译与之后的批次
    /// 相互重叠，最多同时进行 [`constants::MAX_CONCURRENT_BATCHES`] 组。
    pub async fn run(&self, rx: UnboundedReceiver<MutationBatch>) -> PassReport {
        let batches = stream::unfold(rx, |mut rx| async move {
            let mut batch = rx.recv().await?;
            while let Ok(more) = rx.try_recv() {
                batch.extend(more);
            }
            Some((batch, rx))
        });

        let total = batches
            .map(|batch| {
                let (lang, units) = self.prepare(&batch);
                async move { self.dispatcher.translate_units(units, &lang).await }
            })
            .buffer_unordered(constants::MAX_CONCURRENT_BATCHES)
            .fold(PassReport::default(), |mut acc, report| async move {
                acc.merge(report);
                acc
            })
            .await;

        tracing::info!("变更监听结束，共处理 {} 个单元", total.units());
        total
    }
}
