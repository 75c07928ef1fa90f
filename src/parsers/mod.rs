//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM查询与修改、序列化

pub mod html;

pub use html::{html_to_dom, serialize_document};
