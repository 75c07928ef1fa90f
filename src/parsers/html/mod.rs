//! HTML解析和DOM操作
//!
//! - `dom`: 解析、查询、修改和序列化DOM

pub mod dom;

pub use dom::{
    append_child, create_text_node, element_children, find_element_by_id, find_nodes,
    fragment_to_nodes, get_node_attr, get_node_name, html_to_dom, is_ancestor_of, parent_of,
    serialize_document, serialize_node, set_node_attr, set_text_content, text_content,
};
