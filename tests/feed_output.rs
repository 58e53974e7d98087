//! RSS 输出集成测试
//!
//! 把页面管道的输出重新解析后交给 RSS 渲染器，验证两端
//! 能够衔接：双语结构被压平、条目切分正确、时间换算可靠。

use chrono::{TimeZone, Utc};

use zaobao::core::{create_bilingual_page_from_data, ZaobaoOptions};
use zaobao::feed::{render_rss, TitleMode};
use zaobao::network::Session;
use zaobao::parsers::html::{
    append_child, find_elements, get_node_text, html_to_dom, new_element, new_text,
    serialize_children, set_node_attr,
};
use zaobao::translation::{TranslationBackend, TranslationResult};

/// 给每个 p/li 注入双语结构的桩后端
struct BilingualStub;

impl TranslationBackend for BilingualStub {
    fn translate(&self, input: &str, _instruction: &str) -> TranslationResult<String> {
        let dom = html_to_dom(input.as_bytes(), "utf-8".to_string());
        for tag in find_elements(&dom.document, &["p", "li"]) {
            let original = get_node_text(&tag);
            tag.children.borrow_mut().clear();

            let en = new_element("span", &[("class", "lang-en"), ("style", "display:inline;")]);
            append_child(&en, &new_text(&format!("EN {}", original.trim())));
            let zh = new_element("span", &[("class", "lang-zh"), ("style", "display:none;")]);
            append_child(&zh, &new_text(&original));

            append_child(&tag, &en);
            append_child(&tag, &zh);
            set_node_attr(&tag, "ondblclick", Some("toggleLang(this)".to_string()));
        }
        let body = find_elements(&dom.document, &["body"]).remove(0);
        Ok(serialize_children(&body))
    }
}

fn page_html() -> Vec<u8> {
    r#"<html><head>
        <title>早报 | 今日科技</title>
        <link rel="canonical" href="https://www.ifanr.com/999">
        <meta name="description" content="每日科技早报">
        </head><body>
        <div class="article-info__category"><time>昨天 07:15</time></div>
        <div class="entry-content">
        <h3>第一条新闻标题</h3>
        <p>第一条新闻的正文内容在这里</p>
        <h3>是周末啊，休息一下</h3>
        <p>周末寄语不应成为条目</p>
        <h3>第二条新闻标题</h3>
        <p>第二条新闻的正文内容在这里</p>
        </div></body></html>"#
        .as_bytes()
        .to_vec()
}

#[test]
fn test_pipeline_output_renders_to_english_feed() {
    let session = Session::new(ZaobaoOptions::default()).unwrap();
    let (page, _) =
        create_bilingual_page_from_data(session, page_html(), None, Some(&BilingualStub)).unwrap();

    let dom = html_to_dom(&page, "utf-8".to_string());
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
    let rss = render_rss(&dom, None, TitleMode::None, now).unwrap();
    let xml = String::from_utf8(rss).unwrap();

    // 条目：两条新闻，周末标题被排除
    assert!(xml.contains("<title>第一条新闻标题</title>"));
    assert!(xml.contains("<title>第二条新闻标题</title>"));
    assert!(!xml.contains("<title>是周末啊"));

    // 正文只保留英文，双语痕迹被压平
    assert!(xml.contains("EN 第一条新闻的正文内容在这里"));
    assert!(!xml.contains("ondblclick"));
    assert!(!xml.contains("lang-zh"));

    // "昨天 07:15" 以注入的时间为基准换算
    assert!(xml.contains("Sun, 01 Jun 2025 07:15:00 +0000"));

    // 频道信息取自页面元数据
    assert!(xml.contains("<link>https://www.ifanr.com/999</link>"));
    assert!(xml.contains("<description>每日科技早报</description>"));
}

#[test]
fn test_feed_without_time_tag_uses_injected_now() {
    let html = r#"<html><body><div class="entry-content">
        <h3>唯一一条新闻</h3><p>正文</p>
        </div></body></html>"#;
    let dom = html_to_dom(html.as_bytes(), "utf-8".to_string());
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();

    let rss = render_rss(&dom, None, TitleMode::None, now).unwrap();
    let xml = String::from_utf8(rss).unwrap();
    assert!(xml.contains("Mon, 02 Jun 2025 10:00:00 +0000"));
}
