//! 展示样式处理
//!
//! 为配对元素应用固定的正文样式，修正 ifanr 模板中若干写死的
//! 祖先样式，并给未翻译的普通段落做字号与间距处理。样式全部
//! 以内联 style 属性写入，输出页面无需外部样式表。

use std::collections::HashSet;

use markup5ever_rcdom::{Handle, NodeData};
use tracing::{debug, info};

use crate::parsers::html::{
    append_child, find_elements, find_elements_by_class, find_elements_by_exact_class,
    get_node_attr, get_node_name, get_parent_node, has_class, insert_after, new_element, new_text,
    node_id, normalize_text, replace_node, set_node_attr,
};
use crate::pipeline::pairing::PAIR_CLASS;

/// 配对段落的正文样式
const PAIRED_STYLE: &str = "line-height: 1.3rem; margin-bottom: 1.2rem; \
font-family: PingFangSC-Regular,'Helvetica Neue',Helvetica,Arial,sans-serif; \
font-size: .875rem; color: #121212; letter-spacing: .01875rem; text-align: justify;";

/// 目录区父容器在模板里写死的样式，配对后需要清除
const PARENT_STYLE_TO_CLEAR: &str = "margin-bottom: 0; width: 88%;";

/// 曾祖父容器的模板样式与替换值
const GGPARENT_STYLE_FROM: &str = "padding: 0 14px;";
const GGPARENT_STYLE_TO: &str = "padding:0 0 30px 0";

/// 序号元素的模板样式与替换值
const BULLET_STYLE_FROM: &str = "float: left; margin-right: 6px; margin-bottom: 0; width: 30px;";
const BULLET_STYLE_TO: &str =
    "line-height: 1.36rem;float: left; margin-right: 2px; margin-bottom: 0; width: 30px;";

/// 祖父容器的负外边距
const GRANDPARENT_STYLE: &str = "margin:0 0.1rem 0 -0.5rem";

/// 为配对的 p 标签应用正文样式并修正其祖先的模板样式
pub fn apply_paired_styles(root: &Handle) {
    for p_tag in find_elements_by_class(root, PAIR_CLASS) {
        if get_node_name(&p_tag) != Some("p") {
            continue;
        }

        set_node_attr(&p_tag, "style", Some(PAIRED_STYLE.to_string()));

        let parent = get_parent_node(&p_tag);
        if let Some(parent) = &parent {
            if get_node_attr(parent, "style").as_deref() == Some(PARENT_STYLE_TO_CLEAR) {
                set_node_attr(parent, "style", None);
            }

            // 序号元素是父节点的前一个元素兄弟
            if let Some(sibling) = previous_element_sibling(parent) {
                if get_node_attr(&sibling, "style").as_deref() == Some(BULLET_STYLE_FROM) {
                    set_node_attr(&sibling, "style", Some(BULLET_STYLE_TO.to_string()));
                }
            }
        }

        if let Some(ggparent) = nth_ancestor(&p_tag, 3) {
            if get_node_attr(&ggparent, "style").as_deref() == Some(GGPARENT_STYLE_FROM) {
                set_node_attr(&ggparent, "style", Some(GGPARENT_STYLE_TO.to_string()));
            }
        }
    }
}

/// 为配对段落所在的区块添加外边距和分割线
///
/// 祖先节点会被多个配对段落共享，使用节点标识集合去重，
/// 保证每个区块只处理一次。
pub fn apply_section_chrome(root: &Handle) {
    let mut processed_grandparents: HashSet<usize> = HashSet::new();
    let mut processed_ggparents: HashSet<usize> = HashSet::new();

    for p_tag in paired_paragraphs(root) {
        if let Some(grandparent) = nth_ancestor(&p_tag, 2) {
            if processed_grandparents.insert(node_id(&grandparent)) {
                set_node_attr(&grandparent, "style", Some(GRANDPARENT_STYLE.to_string()));
            }
        }

        if let Some(ggparent) = nth_ancestor(&p_tag, 3) {
            if processed_ggparents.insert(node_id(&ggparent)) {
                let hr_tag = new_element("hr", &[("style", "width:20%;")]);
                insert_after(&ggparent, &hr_tag);
            }
        }
    }

    if let Some(entry_content) = find_elements_by_exact_class(root, "entry-content clearfix")
        .into_iter()
        .next()
    {
        set_node_attr(&entry_content, "style", Some("padding: 0 2rem;".to_string()));
    }

    debug!(
        "已为 {} 个区块添加外边距，插入 {} 条分割线",
        processed_grandparents.len(),
        processed_ggparents.len()
    );
}

/// 为剩余的 p/li 标签缩小字号并添加外边距
///
/// 跳过已有双语结构的标签、配对标签以及配对区块内部的标签。
/// 返回实际添加了样式的标签数量。
pub fn style_remaining_tags(root: &Handle) -> usize {
    // 豁免区：配对段落的曾祖父子树
    let mut exclusion_zones: HashSet<usize> = HashSet::new();
    for p_tag in paired_paragraphs(root) {
        if let Some(ggparent) = nth_ancestor(&p_tag, 3) {
            exclusion_zones.insert(node_id(&ggparent));
        }
    }
    info!("识别到 {} 个豁免区", exclusion_zones.len());

    let mut count = 0;
    for tag in find_elements(root, &["p", "li"]) {
        if has_direct_lang_en_span(&tag) {
            continue;
        }
        if get_node_name(&tag) == Some("p") && has_class(&tag, PAIR_CLASS) {
            continue;
        }
        if has_ancestor_in(&tag, &exclusion_zones) {
            continue;
        }

        wrap_bare_text_in_spans(&tag);

        let existing_style = get_node_attr(&tag, "style");
        let mut style_parts: Vec<&str> = Vec::new();
        if !style_contains(&existing_style, "font-size") {
            style_parts.push("font-size: 80%;");
        }
        if !style_contains(&existing_style, "letter-spacing") {
            style_parts.push("letter-spacing: .001rem; font-size: .875rem;line-height: 1.375rem;");
        }
        if !style_contains(&existing_style, "line-height") {
            style_parts.push("line-height: 1.6rem;");
        }
        if get_node_name(&tag) == Some("p") && !style_contains(&existing_style, "margin-bottom") {
            style_parts.push("margin-bottom: 5%;");
        }

        if !style_parts.is_empty() {
            let final_style = style_parts.join(" ");
            // 新样式前置，使模板原有样式保持优先
            let merged = match existing_style {
                Some(existing) => format!("{final_style}{existing}"),
                None => final_style,
            };
            set_node_attr(&tag, "style", Some(merged));
            count += 1;
        }
    }

    count
}

fn paired_paragraphs(root: &Handle) -> Vec<Handle> {
    find_elements_by_class(root, PAIR_CLASS)
        .into_iter()
        .filter(|tag| get_node_name(tag) == Some("p"))
        .collect()
}

fn style_contains(style: &Option<String>, needle: &str) -> bool {
    style.as_deref().map(|s| s.contains(needle)).unwrap_or(false)
}

/// 沿父链向上走 n 级
fn nth_ancestor(node: &Handle, n: usize) -> Option<Handle> {
    let mut current = node.clone();
    for _ in 0..n {
        let parent = get_parent_node(&current)?;
        if get_node_name(&parent).is_none() {
            return None;
        }
        current = parent;
    }
    Some(current)
}

fn has_ancestor_in(node: &Handle, zone_ids: &HashSet<usize>) -> bool {
    let mut current = node.clone();
    while let Some(parent) = get_parent_node(&current) {
        if zone_ids.contains(&node_id(&parent)) {
            return true;
        }
        current = parent;
    }
    false
}

/// 标签是否已含有直接子级的英文 span（即已是双语结构）
fn has_direct_lang_en_span(tag: &Handle) -> bool {
    tag.children
        .borrow()
        .iter()
        .any(|child| get_node_name(child) == Some("span") && has_class(child, "lang-en"))
}

fn previous_element_sibling(node: &Handle) -> Option<Handle> {
    let parent = get_parent_node(node)?;
    let children = parent.children.borrow();
    let position = children
        .iter()
        .position(|child| std::rc::Rc::ptr_eq(child, node))?;

    children[..position]
        .iter()
        .rev()
        .find(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
}

/// 把标签的裸文本子节点包进 span，便于统一控制行内样式
fn wrap_bare_text_in_spans(tag: &Handle) {
    let text_children: Vec<Handle> = tag
        .children
        .borrow()
        .iter()
        .filter(|child| match &child.data {
            NodeData::Text { contents } => !normalize_text(&contents.borrow()).is_empty(),
            _ => false,
        })
        .cloned()
        .collect();

    for text_node in text_children {
        if let NodeData::Text { contents } = &text_node.data {
            let span_tag = new_element("span", &[]);
            let text = contents.borrow().to_string();
            append_child(&span_tag, &new_text(&text));
            replace_node(&text_node, &span_tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{html_to_dom, serialize_node};
    use crate::pipeline::pairing::{pair_headings, PairingOptions};
    use markup5ever_rcdom::RcDom;

    fn parse(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8".to_string())
    }

    #[test]
    fn test_paired_paragraph_gets_body_style() {
        let dom = parse(
            "<body><div class=\"entry-content\">\
             <p>新模型上线公告</p><h3>新模型上线公告：详情</h3>\
             </div></body>",
        );
        pair_headings(&dom.document, PairingOptions::default());
        apply_paired_styles(&dom.document);

        let p = find_elements(&dom.document, &["p"]).remove(0);
        let style = get_node_attr(&p, "style").unwrap();
        assert!(style.contains("PingFangSC-Regular"));
        assert!(style.contains("text-align: justify;"));
    }

    #[test]
    fn test_template_ancestor_styles_rewritten() {
        let dom = parse(
            "<body><div class=\"entry-content\">\
             <div style=\"padding: 0 14px;\"><div><div style=\"margin-bottom: 0; width: 88%;\">\
             <p class=\"h3-p-pair\" data-pair-id=\"pair-1\">摘要文本字样</p>\
             </div></div></div></div></body>",
        );
        apply_paired_styles(&dom.document);

        let p = find_elements(&dom.document, &["p"]).remove(0);
        let parent = get_parent_node(&p).unwrap();
        assert_eq!(get_node_attr(&parent, "style"), None);

        let ggparent = nth_ancestor(&p, 3).unwrap();
        assert_eq!(
            get_node_attr(&ggparent, "style"),
            Some("padding:0 0 30px 0".to_string())
        );
    }

    #[test]
    fn test_section_chrome_dedupes_shared_ancestors() {
        // 两个配对段落共享同一个祖父与曾祖父
        let dom = parse(
            "<body><div class=\"entry-content\">\
             <div><div><div>\
             <p class=\"h3-p-pair\">第一条摘要文本</p>\
             <p class=\"h3-p-pair\">第二条摘要文本</p>\
             </div></div></div></div></body>",
        );
        apply_section_chrome(&dom.document);

        assert_eq!(find_elements(&dom.document, &["hr"]).len(), 1);
    }

    #[test]
    fn test_generic_styling_wraps_text_and_shrinks_font() {
        let dom = parse("<body><div class=\"entry-content\"><p>一段普通文本</p></div></body>");
        let count = style_remaining_tags(&dom.document);
        assert_eq!(count, 1);

        let p = find_elements(&dom.document, &["p"]).remove(0);
        let style = get_node_attr(&p, "style").unwrap();
        assert!(style.contains("font-size: 80%;"));
        assert!(style.contains("margin-bottom: 5%;"));
        assert_eq!(serialize_node(&p).matches("<span>").count(), 1);
    }

    #[test]
    fn test_generic_styling_skips_bilingual_and_paired_tags() {
        let dom = parse(
            "<body><div class=\"entry-content\">\
             <p><span class=\"lang-en\">news</span><span class=\"lang-zh\">新闻</span></p>\
             <p class=\"h3-p-pair\">配对摘要文本</p>\
             </div></body>",
        );
        let count = style_remaining_tags(&dom.document);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_generic_styling_respects_exclusion_zones() {
        let dom = parse(
            "<body><div class=\"entry-content\">\
             <div><div><div>\
             <p class=\"h3-p-pair\">配对摘要文本</p>\
             <li>豁免区内的列表项</li>\
             </div></div></div>\
             <p>豁免区外的段落</p>\
             </div></body>",
        );
        let count = style_remaining_tags(&dom.document);
        assert_eq!(count, 1);

        let li = find_elements(&dom.document, &["li"]).remove(0);
        assert_eq!(get_node_attr(&li, "style"), None);
    }

    #[test]
    fn test_existing_style_values_not_duplicated() {
        let dom = parse(
            "<body><p style=\"font-size: 12px; letter-spacing: 1px; \
             line-height: 2; margin-bottom: 1px;\">带样式的段落</p></body>",
        );
        let count = style_remaining_tags(&dom.document);
        assert_eq!(count, 0);
    }
}
