//! DOM 基础操作
//!
//! 基于 rcdom 的节点查找、属性读写和结构修改工具，
//! 供清理、配对、翻译和样式各阶段共用。

use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::driver::ParseOpts;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

/// 将 HTML 字节转换为 DOM
///
/// 关闭 scripting 模式解析，使 `<noscript>` 的内容成为真正的元素节点，
/// 清理阶段才能将其中的图片释放出来。
pub fn html_to_dom(data: &[u8], document_encoding: String) -> RcDom {
    let s: String;

    if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
        let (string, _, _) = encoding.decode(data);
        s = string.to_string();
    } else {
        s = String::from_utf8_lossy(data).to_string();
    }

    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            scripting_enabled: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .read_from(&mut s.as_bytes())
        .unwrap()
}

/// 节点的稳定标识符，用于去重集合
///
/// rcdom 的 Handle 不能作为 HashSet 的键，这里取节点的指针地址，
/// 在一次运行内保持稳定。
pub fn node_id(node: &Handle) -> usize {
    Rc::as_ptr(node) as usize
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点（不破坏节点的父链接）
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    child.parent.set(weak);
    parent
}

/// 根据名称获取直接子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => {
            for attr in attrs.borrow().iter() {
                if &*attr.name.local == attr_name {
                    return Some(attr.value.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// 设置节点属性；`attr_value` 为 None 时删除该属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.clone() {
                    let _ = &attrs_mut[i].value.clear();
                    let _ = &attrs_mut[i].value.push_slice(attr_value.as_str());
                } else {
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value.clone() {
                let name = LocalName::from(attr_name);

                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), name),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// 检查 class 属性是否包含指定的类名（按空白分词匹配）
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|value| value.split_whitespace().any(|token| token == class_name))
        .unwrap_or(false)
}

/// 向 class 属性追加一个类名（已存在时不重复追加）
pub fn append_class(node: &Handle, class_name: &str) {
    if has_class(node, class_name) {
        return;
    }

    match get_node_attr(node, "class") {
        Some(existing) if !existing.trim().is_empty() => {
            set_node_attr(node, "class", Some(format!("{existing} {class_name}")));
        }
        _ => {
            set_node_attr(node, "class", Some(class_name.to_string()));
        }
    }
}

/// 拼接节点及其后代的全部文本
pub fn get_node_text(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { ref contents } = node.data {
        out.push_str(&contents.borrow());
    }

    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// 去掉首尾空白并把连续空白压缩为单个空格
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// 沿名称路径查找 DOM 节点
///
/// `node_names` 描述一条由外向内的标签路径，例如
/// `["html", "head", "title"]`，返回路径末端的所有节点。
pub fn find_nodes_path(node: &Handle, node_names: Vec<&str>) -> Vec<Handle> {
    assert!(!node_names.is_empty());

    let mut found_nodes = Vec::new();
    let node_name = node_names[0];

    if node_names.len() == 1 {
        if let NodeData::Element { ref name, .. } = node.data {
            if &*name.local == node_name {
                found_nodes.push(node.clone());
            }
        }

        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes_path(child_node, node_names.clone()));
        }
    } else if let NodeData::Element { ref name, .. } = node.data {
        if &*name.local == node_name {
            let mut new_node_names = node_names;
            new_node_names.remove(0);
            found_nodes.append(&mut find_nodes_path(node, new_node_names));
        } else {
            for child_node in node.children.borrow().iter() {
                found_nodes.append(&mut find_nodes_path(child_node, node_names.clone()));
            }
        }
    } else {
        for child_node in node.children.borrow().iter() {
            found_nodes.append(&mut find_nodes_path(child_node, node_names.clone()));
        }
    }

    found_nodes
}

/// 按文档顺序收集所有名称匹配的元素
pub fn find_elements(root: &Handle, node_names: &[&str]) -> Vec<Handle> {
    let mut found = Vec::new();
    walk_elements(root, &mut |node| {
        if let Some(name) = get_node_name(node) {
            if node_names.contains(&name) {
                found.push(node.clone());
            }
        }
    });
    found
}

/// 查找第一个 class 属性与给定值完全相等的元素
pub fn find_element_by_exact_class(root: &Handle, class_value: &str) -> Option<Handle> {
    let mut found = None;
    walk_elements(root, &mut |node| {
        if found.is_none() && get_node_attr(node, "class").as_deref() == Some(class_value) {
            found = Some(node.clone());
        }
    });
    found
}

/// 收集所有 class 属性与给定值完全相等的元素
pub fn find_elements_by_exact_class(root: &Handle, class_value: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    walk_elements(root, &mut |node| {
        if get_node_attr(node, "class").as_deref() == Some(class_value) {
            found.push(node.clone());
        }
    });
    found
}

/// 收集所有包含指定类名（按分词匹配）的元素
pub fn find_elements_by_class(root: &Handle, class_name: &str) -> Vec<Handle> {
    let mut found = Vec::new();
    walk_elements(root, &mut |node| {
        if has_class(node, class_name) {
            found.push(node.clone());
        }
    });
    found
}

/// 查找第一个 id 属性等于给定值的元素
pub fn find_element_by_id(root: &Handle, id: &str) -> Option<Handle> {
    let mut found = None;
    walk_elements(root, &mut |node| {
        if found.is_none() && get_node_attr(node, "id").as_deref() == Some(id) {
            found = Some(node.clone());
        }
    });
    found
}

/// 先序遍历所有元素节点
pub fn walk_elements<F: FnMut(&Handle)>(node: &Handle, visit: &mut F) {
    if let NodeData::Element { .. } = node.data {
        visit(node);
    }

    for child in node.children.borrow().iter() {
        walk_elements(child, visit);
    }
}

/// 创建一个带属性的新元素节点
pub fn new_element(tag: &str, attributes: &[(&str, &str)]) -> Handle {
    let attrs = attributes
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: format_tendril!("{}", value),
        })
        .collect::<Vec<Attribute>>();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 创建一个文本节点
pub fn new_text(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

/// 向父节点追加子节点
pub fn append_child(parent: &Handle, child: &Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child.clone());
}

/// 将节点从其父节点中摘除
pub fn detach_node(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// 用新节点原位替换旧节点
pub fn replace_node(old: &Handle, new: &Handle) {
    let Some(parent) = get_parent_node(old) else {
        return;
    };

    detach_node(new);

    let mut children = parent.children.borrow_mut();
    if let Some(position) = children.iter().position(|child| Rc::ptr_eq(child, old)) {
        new.parent.set(Some(Rc::downgrade(&parent)));
        children[position] = new.clone();
    }
    drop(children);
    old.parent.set(None);
}

/// 在目标节点之后插入新节点
pub fn insert_after(target: &Handle, new: &Handle) {
    let Some(parent) = get_parent_node(target) else {
        return;
    };

    let mut children = parent.children.borrow_mut();
    if let Some(position) = children.iter().position(|child| Rc::ptr_eq(child, target)) {
        new.parent.set(Some(Rc::downgrade(&parent)));
        children.insert(position + 1, new.clone());
    }
}

/// 解开节点：把其子节点原位提升到父节点中，然后丢弃该节点
pub fn unwrap_node(node: &Handle) {
    let Some(parent) = get_parent_node(node) else {
        return;
    };

    let grandchildren: Vec<Handle> = node.children.borrow_mut().drain(..).collect();

    let mut children = parent.children.borrow_mut();
    if let Some(position) = children.iter().position(|child| Rc::ptr_eq(child, node)) {
        children.remove(position);
        for (offset, grandchild) in grandchildren.iter().enumerate() {
            grandchild.parent.set(Some(Rc::downgrade(&parent)));
            children.insert(position + offset, grandchild.clone());
        }
    }
    drop(children);
    node.parent.set(None);
}

/// 深拷贝一个节点及其子树
///
/// 拷贝结果不属于任何父节点，可自由挂接到别的文档中。
pub fn clone_subtree(node: &Handle) -> Handle {
    let copy = match &node.data {
        NodeData::Element {
            name,
            attrs,
            mathml_annotation_xml_integration_point,
            ..
        } => Node::new(NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: RefCell::new(None),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        }),
        NodeData::Text { contents } => Node::new(NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        }),
        NodeData::Comment { contents } => Node::new(NodeData::Comment {
            contents: contents.clone(),
        }),
        NodeData::Document => Node::new(NodeData::Document),
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => Node::new(NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        }),
        NodeData::ProcessingInstruction { target, contents } => {
            Node::new(NodeData::ProcessingInstruction {
                target: target.clone(),
                contents: contents.clone(),
            })
        }
    };

    for child in node.children.borrow().iter() {
        let child_copy = clone_subtree(child);
        append_child(&copy, &child_copy);
    }

    copy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8".to_string())
    }

    #[test]
    fn test_get_and_set_node_attr() {
        let dom = parse("<p id=\"a\">hi</p>");
        let p = find_elements(&dom.document, &["p"]).remove(0);

        assert_eq!(get_node_attr(&p, "id"), Some("a".to_string()));

        set_node_attr(&p, "data-pair-id", Some("pair-1".to_string()));
        assert_eq!(get_node_attr(&p, "data-pair-id"), Some("pair-1".to_string()));

        set_node_attr(&p, "id", None);
        assert_eq!(get_node_attr(&p, "id"), None);
    }

    #[test]
    fn test_append_class() {
        let dom = parse("<p class=\"note\">hi</p>");
        let p = find_elements(&dom.document, &["p"]).remove(0);

        append_class(&p, "h3-p-pair");
        assert_eq!(get_node_attr(&p, "class"), Some("note h3-p-pair".to_string()));

        // 重复追加不产生副本
        append_class(&p, "h3-p-pair");
        assert_eq!(get_node_attr(&p, "class"), Some("note h3-p-pair".to_string()));
    }

    #[test]
    fn test_has_class_matches_tokens() {
        let dom = parse("<div class=\"entry-content clearfix\"></div>");
        let div = find_elements(&dom.document, &["div"]).remove(0);

        assert!(has_class(&div, "entry-content"));
        assert!(has_class(&div, "clearfix"));
        assert!(!has_class(&div, "entry"));
    }

    #[test]
    fn test_get_node_text_concatenates_descendants() {
        let dom = parse("<p>甲<strong>乙</strong>丙</p>");
        let p = find_elements(&dom.document, &["p"]).remove(0);

        assert_eq!(get_node_text(&p), "甲乙丙");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  a \n b\t c  "), "a b c");
        assert_eq!(normalize_text("   "), "");
    }

    #[test]
    fn test_find_elements_document_order() {
        let dom = parse("<div><p>1</p><ul><li>2</li></ul><p>3</p></div>");
        let found = find_elements(&dom.document, &["p", "li"]);
        let texts: Vec<String> = found.iter().map(get_node_text).collect();

        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_replace_node() {
        let dom = parse("<div><p>old</p></div>");
        let p = find_elements(&dom.document, &["p"]).remove(0);

        let span = new_element("span", &[]);
        append_child(&span, &new_text("new"));
        replace_node(&p, &span);

        let div = find_elements(&dom.document, &["div"]).remove(0);
        assert_eq!(get_node_text(&div), "new");
        assert!(find_elements(&dom.document, &["p"]).is_empty());
    }

    #[test]
    fn test_unwrap_node_keeps_children_in_place() {
        let dom = parse("<div>a<noscript><img src=\"x\"></noscript>b</div>");
        let noscript = find_elements(&dom.document, &["noscript"]).remove(0);

        unwrap_node(&noscript);

        assert!(find_elements(&dom.document, &["noscript"]).is_empty());
        assert_eq!(find_elements(&dom.document, &["img"]).len(), 1);
    }

    #[test]
    fn test_clone_subtree_is_detached() {
        let dom = parse("<p style=\"x\">原文<em>斜体</em></p>");
        let p = find_elements(&dom.document, &["p"]).remove(0);

        let copy = clone_subtree(&p);
        assert!(get_parent_node(&copy).is_none());
        assert_eq!(get_node_text(&copy), "原文斜体");
        assert_eq!(get_node_attr(&copy, "style"), Some("x".to_string()));

        // 修改拷贝不影响原节点
        set_node_attr(&copy, "style", Some("y".to_string()));
        assert_eq!(get_node_attr(&p, "style"), Some("x".to_string()));
    }
}
