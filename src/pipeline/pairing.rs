//! 标题与摘要配对
//!
//! 早报页面的目录摘要段落会逐字出现在对应的 `<h3>` 新闻标题里。
//! 配对引擎按文档顺序扫描段落，用不区分大小写的子串包含关系
//! 找到第一个匹配的标题，给两者写入相同的配对标记。

use markup5ever_rcdom::Handle;
use tracing::{debug, info};

use crate::parsers::html::{
    append_class, find_elements, get_child_node_by_name, get_node_name, get_node_text, has_class,
    normalize_text, set_node_attr, walk_elements,
};

/// 配对元素共享的标记类名
pub const PAIR_CLASS: &str = "h3-p-pair";

/// 配对标识属性名，值形如 `pair-1`、`pair-2`
pub const PAIR_ID_ATTR: &str = "data-pair-id";

/// 参与配对的段落文本最小长度（字符数）
///
/// 过短的段落（如单个标点或序号）永远不会被配对。
pub const MIN_PAIR_TEXT_CHARS: usize = 4;

/// 配对策略配置
#[derive(Clone, Copy, Debug, Default)]
pub struct PairingOptions {
    /// 允许一个标题匹配多个段落
    ///
    /// 默认关闭：标题在首次匹配后即从候选池中移除，避免一个
    /// 标题吸附多个不相关的段落。打开后恢复多对一的旧行为。
    pub reuse_headings: bool,
}

/// 在内容容器内为段落和标题建立配对标记
///
/// 返回成功标记的配对数。只修改匹配元素的属性，不移动或删除节点。
pub fn pair_headings(root: &Handle, options: PairingOptions) -> usize {
    let container = find_content_container(root);

    let p_list = find_elements(&container, &["p"]);
    let h3_list = find_elements(&container, &["h3"]);
    let mut heading_used = vec![false; h3_list.len()];
    let mut pair_counter = 0;

    for p_tag in &p_list {
        let p_text = normalize_text(&get_node_text(p_tag));
        if p_text.chars().count() < MIN_PAIR_TEXT_CHARS {
            continue;
        }
        let p_text_lower = p_text.to_lowercase();

        for (index, h3_tag) in h3_list.iter().enumerate() {
            if heading_used[index] && !options.reuse_headings {
                continue;
            }

            let h3_text_lower = normalize_text(&get_node_text(h3_tag)).to_lowercase();
            if !h3_text_lower.contains(&p_text_lower) {
                continue;
            }

            pair_counter += 1;
            let unique_identifier = format!("pair-{pair_counter}");
            for tag in [p_tag, h3_tag] {
                append_class(tag, PAIR_CLASS);
                set_node_attr(tag, PAIR_ID_ATTR, Some(unique_identifier.clone()));
            }
            heading_used[index] = true;

            debug!("段落「{}」已配对为 {}", p_text, unique_identifier);
            break; // 首个匹配即停，不找最优匹配
        }
    }

    info!("内容匹配完成，共成功标记了 {} 对 p/h3 元素", pair_counter);
    pair_counter
}

/// 定位主要内容区域
///
/// 优先选择 class 含 entry-content 的 div，否则退回 body。
/// body 也不存在时（片段文档）使用根节点本身。
pub fn find_content_container(root: &Handle) -> Handle {
    let mut container = None;
    walk_elements(root, &mut |node| {
        if container.is_none()
            && get_node_name(node) == Some("div")
            && has_class(node, "entry-content")
        {
            container = Some(node.clone());
        }
    });

    if let Some(found) = container {
        return found;
    }

    if let Some(html) = get_child_node_by_name(root, "html") {
        if let Some(body) = get_child_node_by_name(&html, "body") {
            return body;
        }
    }

    root.clone()
}
