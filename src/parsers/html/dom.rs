use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::driver::ParseOpts;
use html5ever::interface::{Attribute, QualName};
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, parse_document, parse_fragment, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> io::Result<RcDom> {
    let s = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => encoding.decode(data).0.into_owned(),
        None => String::from_utf8_lossy(data).into_owned(),
    };

    parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut s.as_bytes())
}

/// 将 HTML 片段解析为一组游离节点（没有父节点），用于之后插入文档
pub fn fragment_to_nodes(html: &str) -> Vec<Handle> {
    let context = QualName::new(None, ns!(html), LocalName::from("body"));
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, vec![]).one(html);

    // 片段解析的结果挂在 document > html 之下
    let root = dom.document.children.borrow().first().cloned();
    let Some(root) = root else {
        return Vec::new();
    };

    let nodes = std::mem::take(&mut *root.children.borrow_mut());
    for node in &nodes {
        node.parent.set(None);
    }
    nodes
}

/// 查找指定路径的DOM节点
pub fn find_nodes(node: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let Some((node_name, rest)) = node_names.split_first() else {
        return Vec::new();
    };

    let mut found_nodes = Vec::new();
    let matches = get_node_name(node) == Some(*node_name);

    if matches && rest.is_empty() {
        found_nodes.push(node.clone());
    }

    for child_node in node.children.borrow().iter() {
        if matches && !rest.is_empty() {
            found_nodes.append(&mut find_nodes(child_node, rest));
        } else {
            found_nodes.append(&mut find_nodes(child_node, node_names));
        }
    }

    found_nodes
}

/// 根据 id 属性查找元素（先序遍历中的第一个）
pub fn find_element_by_id(node: &Handle, id: &str) -> Option<Handle> {
    if get_node_attr(node, "id").as_deref() == Some(id) {
        return Some(node.clone());
    }

    node.children
        .borrow()
        .iter()
        .find_map(|child| find_element_by_id(child, id))
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// 元素子节点（忽略文本、注释等）
pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// 节点的文本内容：所有后代文本节点按文档顺序拼接
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    push_text_content(node, &mut out);
    out
}

fn push_text_content(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        _ => {
            for child in node.children.borrow().iter() {
                push_text_content(child, out);
            }
        }
    }
}

/// 创建游离的文本节点
pub fn create_text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    })
}

/// 覆盖文本内容
///
/// 文本节点直接替换其内容；元素节点的全部子节点被替换为单个文本节点。
pub fn set_text_content(node: &Handle, text: &str) {
    match &node.data {
        NodeData::Text { contents } => {
            *contents.borrow_mut() = StrTendril::from_slice(text);
        }
        NodeData::Element { .. } => {
            let old_children = std::mem::take(&mut *node.children.borrow_mut());
            for child in &old_children {
                child.parent.set(None);
            }
            append_child(node, create_text_node(text));
        }
        _ => {}
    }
}

/// 将游离节点追加为 `parent` 的最后一个子节点
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 判断 `ancestor` 是否为 `node` 的祖先（不含自身）
pub fn is_ancestor_of(ancestor: &Handle, node: &Handle) -> bool {
    let mut current = parent_of(node);
    while let Some(parent) = current {
        if Rc::ptr_eq(&parent, ancestor) {
            return true;
        }
        current = parent_of(&parent);
    }
    false
}

/// 获取父节点（不移除父链接）
pub fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|weak| weak.upgrade());
    node.parent.set(weak);
    parent
}

/// 序列化文档
pub fn serialize_document(dom: &RcDom) -> io::Result<Vec<u8>> {
    serialize_node(&dom.document)
}

/// 序列化任意节点（文档节点会输出完整文档）
pub fn serialize_node(node: &Handle) -> io::Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    let opts = match node.data {
        NodeData::Document => SerializeOpts::default(),
        _ => SerializeOpts {
            traversal_scope: TraversalScope::IncludeNode,
            ..Default::default()
        },
    };
    let serializable: SerializableHandle = node.clone().into();
    serialize(&mut buf, &serializable, opts)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").unwrap()
    }

    #[test]
    fn test_find_nodes_by_path() {
        let dom = dom("<html><body><p>a</p><div><p>b</p></div></body></html>");
        let paragraphs = find_nodes(&dom.document, &["html", "body", "p"]);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(text_content(&paragraphs[0]), "a");

        let nested = find_nodes(&dom.document, &["div", "p"]);
        assert_eq!(nested.len(), 1);
        assert_eq!(text_content(&nested[0]), "b");
    }

    #[test]
    fn test_set_and_get_attr() {
        let dom = dom("<input id=\"q\" placeholder=\"Search\">");
        let input = find_element_by_id(&dom.document, "q").unwrap();

        assert_eq!(get_node_attr(&input, "placeholder").as_deref(), Some("Search"));
        set_node_attr(&input, "placeholder", Some("Buscar".to_string()));
        assert_eq!(get_node_attr(&input, "placeholder").as_deref(), Some("Buscar"));

        set_node_attr(&input, "value", Some("hola".to_string()));
        assert_eq!(get_node_attr(&input, "value").as_deref(), Some("hola"));

        set_node_attr(&input, "value", None);
        assert_eq!(get_node_attr(&input, "value"), None);
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let dom = dom("<p id=\"x\">Hello <b>big</b> world</p>");
        let p = find_element_by_id(&dom.document, "x").unwrap();
        assert_eq!(text_content(&p), "Hello big world");

        set_text_content(&p, "Hola");
        assert_eq!(p.children.borrow().len(), 1);
        assert_eq!(text_content(&p), "Hola");
    }

    #[test]
    fn test_fragment_nodes_are_detached() {
        let nodes = fragment_to_nodes("<div><span>One</span></div><p>Two</p>");
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|node| parent_of(node).is_none()));
        assert_eq!(get_node_name(&nodes[1]), Some("p"));
    }

    #[test]
    fn test_append_child_and_ancestry() {
        let dom = dom("<body><div id=\"root\"></div></body>");
        let root = find_element_by_id(&dom.document, "root").unwrap();
        let nodes = fragment_to_nodes("<section><p>Deep</p></section>");
        let section = nodes[0].clone();
        append_child(&root, section.clone());

        let p = find_nodes(&section, &["p"]).remove(0);
        assert!(is_ancestor_of(&root, &p));
        assert!(is_ancestor_of(&section, &p));
        assert!(!is_ancestor_of(&p, &section));
        assert!(text_content(&root).contains("Deep"));
    }

    #[test]
    fn test_serialize_round_trip_keeps_text() {
        let dom = dom("<p>Hello</p>");
        let html = String::from_utf8(serialize_document(&dom).unwrap()).unwrap();
        assert!(html.contains("<p>Hello</p>"));
    }
}
