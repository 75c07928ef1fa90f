//! 可翻译单元收集器
//!
//! 从DOM子树中按先序深度优先顺序提取可翻译单元。每个节点先经过一次
//! 分类（[`NodeClass`]），再根据分类决定产出哪些单元、是否继续向下遍历。
//! 空白文本永远不会产出单元，因此不会为空白文本发起网络请求。

use markup5ever_rcdom::{Handle, NodeData};

use crate::html::{
    element_children, get_node_attr, get_node_name, set_node_attr, set_text_content, text_content,
};
use crate::translation::config::{constants, TranslationConfig};

/// 可翻译单元所指向的槽位类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// 文本节点的内容
    TextContent,
    /// `placeholder` 属性
    Placeholder,
    /// 输入框的当前值
    Value,
    /// `<option>` 的标签文本
    OptionLabel,
}

/// 节点分类，每个节点在遍历中只分类一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    /// 非空白的文本节点
    Text,
    /// `<input>` / `<textarea>`，可能产出 Placeholder 和 Value
    Editable,
    /// `<select>`，每个非空选项产出一个 OptionLabel
    Options,
    /// 普通元素或文档节点，继续遍历子节点
    Container,
    /// 空白文本、注释以及配置中跳过的元素
    Skip,
}

/// 一个可翻译单元：恰好对应一个可变的文本槽位
///
/// 单元是临时的，由一次遍历产生、在写回后丢弃。
#[derive(Debug, Clone)]
pub struct TranslatableUnit {
    kind: UnitKind,
    node: Handle,
    source: String,
}

impl TranslatableUnit {
    fn new(kind: UnitKind, node: &Handle, source: String) -> Self {
        Self {
            kind,
            node: node.clone(),
            source,
        }
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// 槽位所在的节点（文本单元为文本节点本身）
    pub fn node(&self) -> &Handle {
        &self.node
    }

    /// 提取时观察到的原文
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 槽位当前的文本
    pub fn current_text(&self) -> String {
        match self.kind {
            UnitKind::TextContent | UnitKind::OptionLabel => text_content(&self.node),
            UnitKind::Placeholder => get_node_attr(&self.node, "placeholder").unwrap_or_default(),
            UnitKind::Value => read_value(&self.node),
        }
    }

    /// 用译文原地覆盖槽位
    pub fn write(&self, translated: &str) {
        match self.kind {
            UnitKind::TextContent | UnitKind::OptionLabel => {
                set_text_content(&self.node, translated)
            }
            UnitKind::Placeholder => {
                set_node_attr(&self.node, "placeholder", Some(translated.to_string()))
            }
            UnitKind::Value => {
                if get_node_name(&self.node) == Some("textarea") {
                    set_text_content(&self.node, translated);
                } else {
                    set_node_attr(&self.node, "value", Some(translated.to_string()));
                }
            }
        }
    }
}

fn read_value(node: &Handle) -> String {
    if get_node_name(node) == Some("textarea") {
        text_content(node)
    } else {
        get_node_attr(node, "value").unwrap_or_default()
    }
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// 整段翻译模式的目标：没有子元素的展示元素及其聚合文本
#[derive(Debug, Clone)]
pub struct BulkTarget {
    pub node: Handle,
    pub text: String,
}

impl BulkTarget {
    pub fn write(&self, translated: &str) {
        set_text_content(&self.node, translated);
    }
}

/// 文本收集器配置
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 跳过的元素标签（连同其子树）
    pub skip_elements: Vec<String>,
    /// 整段翻译模式下的候选元素标签
    pub bulk_selectors: Vec<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            skip_elements: constants::SKIP_ELEMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bulk_selectors: constants::BULK_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl From<&TranslationConfig> for CollectorConfig {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            skip_elements: config.skip_elements.clone(),
            bulk_selectors: config.bulk_selectors.clone(),
        }
    }
}

/// DOM文本收集器
#[derive(Debug, Clone, Default)]
pub struct TextCollector {
    config: CollectorConfig,
}

impl TextCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    /// 对单个节点分类
    pub fn classify(&self, node: &Handle) -> NodeClass {
        match &node.data {
            NodeData::Text { contents } => {
                if is_blank(&contents.borrow()) {
                    NodeClass::Skip
                } else {
                    NodeClass::Text
                }
            }
            NodeData::Element { name, .. } => {
                let tag_name = name.local.as_ref();
                match tag_name {
                    "input" | "textarea" => NodeClass::Editable,
                    "select" => NodeClass::Options,
                    _ if self.should_skip_element(tag_name) => NodeClass::Skip,
                    _ => NodeClass::Container,
                }
            }
            NodeData::Document => NodeClass::Container,
            _ => NodeClass::Skip,
        }
    }

    /// 收集子树中的全部可翻译单元（先序深度优先）
    pub fn collect_units(&self, root: &Handle) -> Vec<TranslatableUnit> {
        let mut units = Vec::new();
        self.collect_recursive(root, &mut units);
        tracing::debug!("收集到 {} 个可翻译单元", units.len());
        units
    }

    fn collect_recursive(&self, node: &Handle, units: &mut Vec<TranslatableUnit>) {
        match self.classify(node) {
            NodeClass::Text => {
                units.push(TranslatableUnit::new(
                    UnitKind::TextContent,
                    node,
                    text_content(node),
                ));
            }
            NodeClass::Editable => {
                if let Some(placeholder) = get_node_attr(node, "placeholder") {
                    if !is_blank(&placeholder) {
                        units.push(TranslatableUnit::new(UnitKind::Placeholder, node, placeholder));
                    }
                }

                let value = read_value(node);
                if !is_blank(&value) {
                    units.push(TranslatableUnit::new(UnitKind::Value, node, value));
                }
            }
            NodeClass::Options => self.collect_options(node, units),
            NodeClass::Container => {
                for child in node.children.borrow().iter() {
                    self.collect_recursive(child, units);
                }
            }
            NodeClass::Skip => {}
        }
    }

    /// 选项可以直接位于 `<select>` 下，也可以在 `<optgroup>` 中
    fn collect_options(&self, node: &Handle, units: &mut Vec<TranslatableUnit>) {
        for child in element_children(node) {
            match get_node_name(&child) {
                Some("option") => {
                    let label = text_content(&child);
                    if !is_blank(&label) {
                        units.push(TranslatableUnit::new(UnitKind::OptionLabel, &child, label));
                    }
                }
                Some("optgroup") => self.collect_options(&child, units),
                _ => {}
            }
        }
    }

    /// 整段翻译模式：收集没有子元素、文本非空的候选展示元素
    pub fn collect_bulk_targets(&self, root: &Handle) -> Vec<BulkTarget> {
        let mut targets = Vec::new();
        self.collect_bulk_recursive(root, &mut targets);
        targets
    }

    fn collect_bulk_recursive(&self, node: &Handle, targets: &mut Vec<BulkTarget>) {
        if let Some(tag_name) = get_node_name(node) {
            if self.should_skip_element(tag_name) {
                return;
            }

            if self.is_bulk_candidate(tag_name) && element_children(node).is_empty() {
                let text = text_content(node);
                if !is_blank(&text) {
                    targets.push(BulkTarget {
                        node: node.clone(),
                        text,
                    });
                }
                return;
            }
        }

        for child in node.children.borrow().iter() {
            self.collect_bulk_recursive(child, targets);
        }
    }

    fn should_skip_element(&self, tag_name: &str) -> bool {
        self.config.skip_elements.iter().any(|tag| tag == tag_name)
    }

    fn is_bulk_candidate(&self, tag_name: &str) -> bool {
        self.config.bulk_selectors.iter().any(|tag| tag == tag_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{find_element_by_id, find_nodes, html_to_dom};
    use markup5ever_rcdom::RcDom;

    fn dom(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").unwrap()
    }

    fn kinds_and_sources(units: &[TranslatableUnit]) -> Vec<(UnitKind, String)> {
        units
            .iter()
            .map(|unit| (unit.kind(), unit.source().to_string()))
            .collect()
    }

    #[test]
    fn test_placeholder_without_value() {
        let dom = dom(r#"<input id="q" placeholder="Search">"#);
        let units = TextCollector::default().collect_units(&dom.document);

        assert_eq!(
            kinds_and_sources(&units),
            vec![(UnitKind::Placeholder, "Search".to_string())]
        );
    }

    #[test]
    fn test_input_with_placeholder_and_value() {
        let dom = dom(r#"<input placeholder="Name" value="John"><textarea>Notes</textarea>"#);
        let units = TextCollector::default().collect_units(&dom.document);

        assert_eq!(
            kinds_and_sources(&units),
            vec![
                (UnitKind::Placeholder, "Name".to_string()),
                (UnitKind::Value, "John".to_string()),
                (UnitKind::Value, "Notes".to_string()),
            ]
        );
    }

    #[test]
    fn test_select_yields_one_label_per_option() {
        let dom = dom(
            r#"<select><option>Yes</option><option> </option>
               <optgroup><option>No</option></optgroup></select>"#,
        );
        let units = TextCollector::default().collect_units(&dom.document);

        assert_eq!(
            kinds_and_sources(&units),
            vec![
                (UnitKind::OptionLabel, "Yes".to_string()),
                (UnitKind::OptionLabel, "No".to_string()),
            ]
        );
    }

    #[test]
    fn test_preorder_and_all_descendants() {
        let dom = dom("<div>One<p>Two<span>Three</span></p>Four</div><!-- c --><p>  </p>");
        let units = TextCollector::default().collect_units(&dom.document);
        let sources: Vec<&str> = units.iter().map(|u| u.source()).collect();

        assert_eq!(sources, vec!["One", "Two", "Three", "Four"]);
        assert!(units.iter().all(|u| u.kind() == UnitKind::TextContent));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let dom = dom("<h1>Title</h1><input placeholder=\"x\"><select><option>A</option></select>");
        let collector = TextCollector::default();

        let first = kinds_and_sources(&collector.collect_units(&dom.document));
        let second = kinds_and_sources(&collector.collect_units(&dom.document));
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_skips_scripts_and_styles() {
        let dom = dom("<style>p{}</style><script>var a = 'Hi';</script><p>Shown</p>");
        let units = TextCollector::default().collect_units(&dom.document);

        assert_eq!(units.len(), 1);
        assert_eq!(units[0].source(), "Shown");
    }

    #[test]
    fn test_classify() {
        let dom = dom("<div id=\"d\"><input id=\"i\"><select id=\"s\"></select></div>");
        let collector = TextCollector::default();
        let get = |id| find_element_by_id(&dom.document, id).unwrap();

        assert_eq!(collector.classify(&dom.document), NodeClass::Container);
        assert_eq!(collector.classify(&get("d")), NodeClass::Container);
        assert_eq!(collector.classify(&get("i")), NodeClass::Editable);
        assert_eq!(collector.classify(&get("s")), NodeClass::Options);
    }

    #[test]
    fn test_write_back_targets_exact_slot() {
        let dom = dom(
            r#"<p>Hello</p><input placeholder="Search" value="Query"><select><option>Yes</option></select>"#,
        );
        let units = TextCollector::default().collect_units(&dom.document);
        for unit in &units {
            unit.write(&format!("[{}]", unit.source()));
        }

        let p = find_nodes(&dom.document, &["p"]).remove(0);
        let input = find_nodes(&dom.document, &["input"]).remove(0);
        let option = find_nodes(&dom.document, &["option"]).remove(0);

        assert_eq!(text_content(&p), "[Hello]");
        assert_eq!(get_node_attr(&input, "placeholder").as_deref(), Some("[Search]"));
        assert_eq!(get_node_attr(&input, "value").as_deref(), Some("[Query]"));
        assert_eq!(text_content(&option), "[Yes]");
        assert!(units.iter().all(|u| u.current_text() == format!("[{}]", u.source())));
    }

    #[test]
    fn test_bulk_targets_are_leaf_display_elements() {
        let dom = dom(
            "<p>Intro <span>inner</span></p><li>Item</li><div>Plain</div><button> </button><a>Link</a>",
        );
        let targets = TextCollector::default().collect_bulk_targets(&dom.document);
        let texts: Vec<&str> = targets.iter().map(|t| t.text.as_str()).collect();

        assert_eq!(texts, vec!["inner", "Item", "Link"]);
    }
}
