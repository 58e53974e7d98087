//! 页面清理
//!
//! 去除脚本、样式、内联事件属性和已知的站点模板元素，
//! 并修复延迟加载占位图片。清理是幂等的：对已清理的文档
//! 再执行一次不会产生任何结构变化。

use markup5ever_rcdom::Handle;
use tracing::debug;

use crate::parsers::html::{
    detach_node, find_element_by_id, find_elements, find_elements_by_exact_class, get_node_attr,
    set_node_attr, unwrap_node, walk_elements,
};

/// 按完整 class 属性值移除的站点模板元素
const BOILERPLATE_CLASSES: &[&str] = &[
    "global-navigator",
    "weixin-share-tip hide",
    "simple header clearfix",
    "jiong__article--small",
    "article-sns-tool",
    "popup-download-wrapper",
    "article-info__author",
    "article-footer",
];

/// 按 id 移除的站点模板元素
const BOILERPLATE_IDS: &[&str] = &["stick-header"];

/// 清理文档
///
/// 依次执行：移除 script/style、解开 noscript、删除延迟加载
/// 占位图、剥离 on* 事件属性、移除模板元素和全部 h1。
pub fn sanitize_document(root: &Handle) {
    remove_elements(root, &["script", "style"]);

    // 释放 noscript 中的真实内容
    for noscript in find_elements(root, &["noscript"]) {
        unwrap_node(&noscript);
    }

    // Cloudflare 的延迟加载占位图带有 data-cfsrc 属性
    let mut lazy_removed = 0;
    for img in find_elements(root, &["img"]) {
        if get_node_attr(&img, "data-cfsrc").is_some() {
            detach_node(&img);
            lazy_removed += 1;
        }
    }
    if lazy_removed > 0 {
        debug!("已移除 {} 个延迟加载占位图片", lazy_removed);
    }

    strip_event_attributes(root);

    for class_value in BOILERPLATE_CLASSES {
        for element in find_elements_by_exact_class(root, class_value) {
            detach_node(&element);
        }
    }
    for id_value in BOILERPLATE_IDS {
        if let Some(element) = find_element_by_id(root, id_value) {
            detach_node(&element);
        }
    }

    remove_elements(root, &["h1"]);
}

fn remove_elements(root: &Handle, names: &[&str]) {
    for element in find_elements(root, names) {
        detach_node(&element);
    }
}

/// 剥离所有以 on 开头的内联事件属性（不区分大小写）
fn strip_event_attributes(root: &Handle) {
    let mut elements = Vec::new();
    walk_elements(root, &mut |node| elements.push(node.clone()));

    for element in elements {
        let event_attrs: Vec<String> = attr_names(&element)
            .into_iter()
            .filter(|name| name.len() >= 2 && name[..2].eq_ignore_ascii_case("on"))
            .collect();

        for name in event_attrs {
            set_node_attr(&element, &name, None);
        }
    }
}

fn attr_names(node: &Handle) -> Vec<String> {
    match &node.data {
        markup5ever_rcdom::NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .map(|attr| attr.name.local.to_string())
            .collect(),
        _ => Vec::new(),
    }
}
