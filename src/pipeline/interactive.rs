//! 交互脚本注入
//!
//! 输出页面内置两种交互：点击配对元素滚动到它的另一半，
//! 双击双语段落在中英文之间切换。脚本本身是静态数据，
//! 追加到 body 末尾。

use markup5ever_rcdom::Handle;
use tracing::{info, warn};

use crate::parsers::html::{append_child, find_elements, new_element, new_text};

/// 点击滚动与双语切换脚本
const TOGGLE_SCRIPT: &str = r#"
document.addEventListener('DOMContentLoaded', function() {
    const pairedElements = document.querySelectorAll('.h3-p-pair');
    pairedElements.forEach(element => {
        element.style.cursor = 'pointer';
        element.title = 'Click to scroll to the corresponding tag';
        element.addEventListener('click', function(e) {
            if (e.target.closest('[ondblclick*="toggleLang"]')) {
               return;
            }
            const pairId = this.dataset.pairId;
            if (!pairId) return;
            const siblings = document.querySelectorAll(`[data-pair-id='${pairId}']`);
            for (const sibling of siblings) {
                if (sibling !== this) {
                    sibling.scrollIntoView({ behavior: 'smooth', block: 'center' });
                    break;
                }
            }
        });
    });
});
function toggleLang(element) {
    let spanEn = null;
    let spanZh = null;
    for (const child of element.children) {
        if (child.classList.contains('lang-en')) {
            spanEn = child;
        } else if (child.classList.contains('lang-zh')) {
            spanZh = child;
        }
    }
    if (spanEn && spanZh) {
        if (spanEn.style.display === 'none') {
            spanEn.style.display = 'inline';
            spanZh.style.display = 'none';
        } else {
            spanEn.style.display = 'none';
            spanZh.style.display = 'inline';
        }
    } else {
        console.warn('Could not find both .lang-en and .lang-zh direct child spans for toggling.', element);
    }
}
"#;

/// 向 body 末尾追加交互脚本
///
/// 找不到 body 时（片段文档）记录警告并跳过。
pub fn inject_interactivity(root: &Handle) -> bool {
    let Some(body_tag) = find_elements(root, &["body"]).into_iter().next() else {
        warn!("文档中没有 body 元素，跳过脚本注入");
        return false;
    };

    let script_tag = new_element("script", &[]);
    append_child(&script_tag, &new_text(TOGGLE_SCRIPT));
    append_child(&body_tag, &script_tag);
    info!("交互脚本注入成功");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{get_node_text, html_to_dom};

    #[test]
    fn test_script_appended_to_body() {
        let dom = html_to_dom(b"<html><body><p>x</p></body></html>", "utf-8".to_string());
        assert!(inject_interactivity(&dom.document));

        let scripts = find_elements(&dom.document, &["script"]);
        assert_eq!(scripts.len(), 1);
        assert!(get_node_text(&scripts[0]).contains("function toggleLang"));

        // 脚本是 body 的最后一个子节点
        let body = find_elements(&dom.document, &["body"]).remove(0);
        let last = body.children.borrow().last().cloned().unwrap();
        assert!(std::rc::Rc::ptr_eq(&last, &scripts[0]));
    }
}
