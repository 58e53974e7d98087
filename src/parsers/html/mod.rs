//! HTML 解析与 DOM 操作
//!
//! # 模块组织
//!
//! - `dom` - 节点查找、属性读写、结构修改
//! - `metadata` - 标题、字符集、canonical 链接等元数据读取
//! - `serializer` - 文档与节点的序列化

pub mod dom;
pub mod metadata;
pub mod serializer;

pub use dom::{
    append_child, append_class, clone_subtree, detach_node, find_element_by_exact_class,
    find_element_by_id, find_elements, find_elements_by_class, find_elements_by_exact_class,
    find_nodes_path, get_child_node_by_name, get_node_attr, get_node_name, get_node_text,
    get_parent_node, has_class, html_to_dom, insert_after, new_element, new_text, node_id,
    normalize_text, replace_node, set_node_attr, unwrap_node, walk_elements,
};
pub use metadata::{get_canonical_link, get_charset, get_meta_description, get_title};
pub use serializer::{serialize_children, serialize_document, serialize_node};
