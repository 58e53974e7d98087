//! 文档元数据读取
//!
//! 提取标题、字符集、canonical 链接和描述，供输出与 Feed 生成使用。

use markup5ever_rcdom::{Handle, NodeData};

use super::dom::{find_elements, find_nodes_path, get_node_attr};

/// 获取文档标题文本
pub fn get_title(node: &Handle) -> Option<String> {
    for title_node in find_nodes_path(node, vec!["html", "head", "title"]).iter() {
        for child_node in title_node.children.borrow().iter() {
            if let NodeData::Text { ref contents } = child_node.data {
                return Some(contents.borrow().to_string());
            }
        }
    }

    None
}

/// 获取文档声明的字符集
pub fn get_charset(node: &Handle) -> Option<String> {
    for meta_node in find_nodes_path(node, vec!["html", "head", "meta"]).iter() {
        if let Some(meta_charset_node_attr_value) = get_node_attr(meta_node, "charset") {
            // <meta charset="..." /> 格式
            return Some(meta_charset_node_attr_value);
        }

        if get_node_attr(meta_node, "http-equiv")
            .unwrap_or_default()
            .eq_ignore_ascii_case("content-type")
        {
            if let Some(content) = get_node_attr(meta_node, "content") {
                // <meta http-equiv="content-type" content="text/html; charset=..." /> 格式
                for part in content.split(';') {
                    let part = part.trim();
                    if let Some(charset) = part.strip_prefix("charset=") {
                        return Some(charset.trim_matches('"').to_string());
                    }
                }
            }
        }
    }

    None
}

/// 获取 canonical 链接地址
pub fn get_canonical_link(node: &Handle) -> Option<String> {
    for link_node in find_elements(node, &["link"]).iter() {
        if get_node_attr(link_node, "rel")
            .unwrap_or_default()
            .eq_ignore_ascii_case("canonical")
        {
            if let Some(href) = get_node_attr(link_node, "href") {
                return Some(href);
            }
        }
    }

    None
}

/// 获取 `<meta name="description">` 的内容
pub fn get_meta_description(node: &Handle) -> Option<String> {
    for meta_node in find_elements(node, &["meta"]).iter() {
        if get_node_attr(meta_node, "name")
            .unwrap_or_default()
            .eq_ignore_ascii_case("description")
        {
            return get_node_attr(meta_node, "content");
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    const PAGE: &str = "<html><head>\
        <meta charset=\"utf-8\">\
        <title>爱范儿早报</title>\
        <link rel=\"canonical\" href=\"https://www.ifanr.com/123\">\
        <meta name=\"description\" content=\"每日科技早报\">\
        </head><body></body></html>";

    #[test]
    fn test_metadata_extraction() {
        let dom = html_to_dom(PAGE.as_bytes(), "utf-8".to_string());

        assert_eq!(get_title(&dom.document), Some("爱范儿早报".to_string()));
        assert_eq!(get_charset(&dom.document), Some("utf-8".to_string()));
        assert_eq!(
            get_canonical_link(&dom.document),
            Some("https://www.ifanr.com/123".to_string())
        );
        assert_eq!(
            get_meta_description(&dom.document),
            Some("每日科技早报".to_string())
        );
    }

    #[test]
    fn test_metadata_missing() {
        let dom = html_to_dom(b"<html><body></body></html>", "utf-8".to_string());

        assert_eq!(get_title(&dom.document), None);
        assert_eq!(get_canonical_link(&dom.document), None);
        assert_eq!(get_meta_description(&dom.document), None);
    }
}
