//! 翻译分发器
//!
//! 对一棵子树执行一次完整的“提取 → 翻译 → 写回”。所有单元的翻译调用同时发起，
//! 并通过 [`join_all`] 作为屏障一起等待；每个单元的结果独立写回其原始槽位，
//! 某个单元失败不会阻塞或回滚其他单元。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use futures::future::join_all;
use markup5ever_rcdom::Handle;

use crate::translation::core::client::{TranslationClient, TranslationOrigin, TranslationOracle};
use crate::translation::pipeline::collector::{TextCollector, TranslatableUnit, UnitKind};

/// 单个单元的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitOutcome {
    pub kind: UnitKind,
    pub source: String,
    pub translated: String,
    pub origin: TranslationOrigin,
}

impl UnitOutcome {
    /// 槽位是否被写入了新的文本
    pub fn is_written(&self) -> bool {
        matches!(self.origin, TranslationOrigin::Cache | TranslationOrigin::Remote)
    }
}

/// 一次翻译遍历的报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub outcomes: Vec<UnitOutcome>,
}

impl PassReport {
    pub fn units(&self) -> usize {
        self.outcomes.len()
    }

    fn count(&self, origin: TranslationOrigin) -> usize {
        self.outcomes.iter().filter(|o| o.origin == origin).count()
    }

    pub fn translated(&self) -> usize {
        self.count(TranslationOrigin::Remote)
    }

    pub fn cached(&self) -> usize {
        self.count(TranslationOrigin::Cache)
    }

    pub fn fallbacks(&self) -> usize {
        self.count(TranslationOrigin::Fallback)
    }

    /// 合并另一份报告
    pub fn merge(&mut self, other: PassReport) {
        self.outcomes.extend(other.outcomes);
    }
}

/// 忙碌标记的RAII守卫，离开作用域时自动清除
struct BusyGuard<'a>(&'a Cell<bool>);

impl<'a> BusyGuard<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// 翻译分发器
pub struct Dispatcher<O> {
    client: Rc<TranslationClient<O>>,
    collector: TextCollector,
    busy: Cell<bool>,
}

impl<O: TranslationOracle> Dispatcher<O> {
    pub fn new(client: Rc<TranslationClient<O>>, collector: TextCollector) -> Self {
        Self {
            client,
            collector,
            busy: Cell::new(false),
        }
    }

    pub fn client(&self) -> &TranslationClient<O> {
        &self.client
    }

    pub fn collector(&self) -> &TextCollector {
        &self.collector
    }

    /// 整页遍历进行中（对调用方可见的唯一“忙碌”信号）
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// 翻译一棵子树；所有单元的调用都结束后返回
    pub async fn translate_subtree(&self, root: &Handle, target_lang: &str) -> PassReport {
        let units = self.collector.collect_units(root);
        self.translate_units(units, target_lang).await
    }

    /// 翻译一组已经提取好的单元
    ///
    /// 单元的原文在提取时就已确定，调用方可以先同步提取、稍后再等待翻译。
    pub async fn translate_units(
        &self,
        units: Vec<TranslatableUnit>,
        target_lang: &str,
    ) -> PassReport {
        if units.is_empty() {
            tracing::debug!("没有可翻译单元 ({})", target_lang);
            return PassReport::default();
        }

        let started = Instant::now();
        let tasks = units.into_iter().map(|unit| async move {
            let result = self
                .client
                .translate_detailed(unit.source(), target_lang)
                .await;

            let outcome = UnitOutcome {
                kind: unit.kind(),
                source: unit.source().to_string(),
                translated: result.text,
                origin: result.origin,
            };
            if outcome.is_written() {
                unit.write(&outcome.translated);
            }
            outcome
        });

        let report = PassReport {
            outcomes: join_all(tasks).await,
        };

        tracing::info!(
            "翻译遍历完成 ({}): {} 个单元, {} 远程, {} 缓存, {} 回退, 用时 {:?}",
            target_lang,
            report.units(),
            report.translated(),
            report.cached(),
            report.fallbacks(),
            started.elapsed()
        );

        report
    }

    /// 对整页执行细粒度遍历，期间设置忙碌标记
    pub async fn translate_page(&self, root: &Handle, target_lang: &str) -> PassReport {
        let _busy = BusyGuard::new(&self.busy);
        self.translate_subtree(root, target_lang).await
    }

    /// 整段翻译模式：翻译叶子展示元素的聚合文本
    ///
    /// 这是较粗糙的旧模式，会丢弃元素内部的结构，已被 [`Self::translate_subtree`] 取代。
    pub async fn translate_page_bulk(&self, root: &Handle, target_lang: &str) -> PassReport {
        let _busy = BusyGuard::new(&self.busy);
        let targets = self.collector.collect_bulk_targets(root);

        let tasks = targets.into_iter().map(|target| async move {
            let result = self
                .client
                .translate_detailed(&target.text, target_lang)
                .await;

            let outcome = UnitOutcome {
                kind: UnitKind::TextContent,
                source: target.text.clone(),
                translated: result.text,
                origin: result.origin,
            };
            if outcome.is_written() {
                target.write(&outcome.translated);
            }
            outcome
        });

        let report = PassReport {
            outcomes: join_all(tasks).await,
        };
        tracing::info!(
            "整段翻译完成 ({}): {} 个元素, {} 回退",
            target_lang,
            report.units(),
            report.fallbacks()
        );
        report
    }
}
