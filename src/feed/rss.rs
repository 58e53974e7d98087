//! RSS 2.0 输出
//!
//! 把处理完成的双语页面转换成一个 RSS 文件：每个 h3 标题是
//! 一个条目，正文取到下一个 h3 为止，双语切换元素被压平成
//! 纯英文段落。输入文档不被修改，所有改写都发生在克隆上。

use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Duration, Timelike, Utc};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use tracing::{info, warn};

use crate::core::ZaobaoError;
use crate::parsers::html::{
    append_child, clone_subtree, find_element_by_id, find_elements, find_elements_by_class,
    get_node_attr, get_node_name, get_node_text, get_parent_node, has_class, new_element,
    new_text, normalize_text, replace_node, serialize_children, walk_elements,
};
use crate::parsers::html::{get_canonical_link, get_meta_description, get_title};
use crate::translation::{prompts, TranslationBackend, TranslationError};

/// 频道信息缺失时的后备值
const DEFAULT_CHANNEL_TITLE: &str = "爱范儿早报";
const DEFAULT_CHANNEL_LINK: &str = "https://www.ifanr.com";
const DEFAULT_CHANNEL_DESCRIPTION: &str = "每日科技早报";

/// 不作为新闻条目的标题片段
const EXCLUDED_TITLE_PHRASES: &[&str] = &["周末也值得一看的新闻", "是周末啊"];

/// 批量标题翻译的分段符
const TITLE_SEPARATOR: &str = "|||";

/// 条目标题的翻译方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TitleMode {
    /// 保留原文标题
    #[default]
    None,
    /// 逐条翻译，单条失败回退原文
    Each,
    /// 拼接后一次翻译，分段数量不符则整体失败
    Joined,
}

/// 从处理后的页面 DOM 生成 RSS 文件内容
///
/// `now` 由调用方注入，相对时间（"昨天 HH:MM"）以它为基准解析。
pub fn render_rss(
    dom: &RcDom,
    backend: Option<&dyn TranslationBackend>,
    title_mode: TitleMode,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, ZaobaoError> {
    let root = &dom.document;

    let channel_title = get_title(root).unwrap_or_else(|| DEFAULT_CHANNEL_TITLE.to_string());
    let channel_link =
        get_canonical_link(root).unwrap_or_else(|| DEFAULT_CHANNEL_LINK.to_string());
    let channel_description =
        get_meta_description(root).unwrap_or_else(|| DEFAULT_CHANNEL_DESCRIPTION.to_string());
    let pub_date = resolve_publish_time(root, now).format("%a, %d %b %Y %H:%M:%S %z");
    let pub_date = pub_date.to_string();

    let container = find_content_root(root)?;
    let headings: Vec<Handle> = find_elements(&container, &["h3"])
        .into_iter()
        .filter(|h3| is_news_heading(h3))
        .collect();

    let original_titles: Vec<String> = headings
        .iter()
        .map(|h3| normalize_text(&get_node_text(h3)))
        .collect();
    let display_titles = translate_titles(&original_titles, backend, title_mode)?;

    info!("共收集到 {} 个新闻条目", headings.len());

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;

    let mut rss_start = BytesStart::new("rss");
    rss_start.push_attribute(("version", "2.0"));
    rss_start.push_attribute((
        "xmlns:content",
        "http://purl.org/rss/1.0/modules/content/",
    ));
    writer
        .write_event(Event::Start(rss_start))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("channel")))
        .map_err(xml_error)?;

    write_text_element(&mut writer, "title", &channel_title)?;
    write_text_element(&mut writer, "link", &channel_link)?;
    write_text_element(&mut writer, "description", &channel_description)?;
    write_text_element(&mut writer, "language", "zh-CN")?;
    write_text_element(&mut writer, "lastBuildDate", &pub_date)?;

    for ((h3, original_title), display_title) in headings
        .iter()
        .zip(original_titles.iter())
        .zip(display_titles.iter())
    {
        writer
            .write_event(Event::Start(BytesStart::new("item")))
            .map_err(xml_error)?;

        write_text_element(&mut writer, "title", display_title)?;
        write_text_element(&mut writer, "link", &channel_link)?;
        write_text_element(&mut writer, "pubDate", &pub_date)?;

        // guid 基于原文标题，标题翻译方式不影响条目身份
        let mut guid = BytesStart::new("guid");
        guid.push_attribute(("isPermaLink", "false"));
        writer.write_event(Event::Start(guid)).map_err(xml_error)?;
        writer
            .write_event(Event::Text(BytesText::new(&format!(
                "{channel_link}#{}",
                original_title.replace(' ', "-")
            ))))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("guid")))
            .map_err(xml_error)?;

        let body = extract_item_body(h3);
        writer
            .write_event(Event::Start(BytesStart::new("description")))
            .map_err(xml_error)?;
        writer
            .write_event(Event::CData(BytesCData::new(&body)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::End(BytesEnd::new("description")))
            .map_err(xml_error)?;

        writer
            .write_event(Event::End(BytesEnd::new("item")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("channel")))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new("rss")))
        .map_err(xml_error)?;

    Ok(writer.into_inner())
}

fn xml_error<E: std::fmt::Display>(e: E) -> ZaobaoError {
    ZaobaoError::new(&format!("写入 XML 失败: {e}"))
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), ZaobaoError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)?;
    Ok(())
}

/// 定位放置新闻条目的容器
///
/// 依次尝试 id、class 和 body；都找不到说明输入不是早报页面。
fn find_content_root(root: &Handle) -> Result<Handle, ZaobaoError> {
    if let Some(by_id) = find_element_by_id(root, "entry-content") {
        return Ok(by_id);
    }
    if let Some(by_class) = find_elements_by_class(root, "entry-content").into_iter().next() {
        return Ok(by_class);
    }
    if let Some(body) = find_elements(root, &["body"]).into_iter().next() {
        return Ok(body);
    }
    Err(ZaobaoError::new("在 HTML 中找不到 entry-content 容器"))
}

fn is_news_heading(h3: &Handle) -> bool {
    let title = normalize_text(&get_node_text(h3));
    if title.is_empty() {
        return false;
    }
    !EXCLUDED_TITLE_PHRASES
        .iter()
        .any(|phrase| title.contains(phrase))
}

/// 解析文章的相对发布时间
///
/// 页面只显示 "昨天 HH:MM"，换算成以 `now` 为基准的绝对时间；
/// 找不到或格式不符时退回 `now` 本身。
fn resolve_publish_time(root: &Handle, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(category) = find_elements_by_class(root, "article-info__category")
        .into_iter()
        .next()
    else {
        return now;
    };
    let Some(time_tag) = find_elements(&category, &["time"]).into_iter().next() else {
        return now;
    };

    let text = normalize_text(&get_node_text(&time_tag));
    if !text.contains("昨天") {
        return now;
    }

    let Ok(clock) = Regex::new(r"(\d{1,2}):(\d{2})") else {
        return now;
    };
    let Some(caps) = clock.captures(&text) else {
        return now;
    };
    let (Ok(hour), Ok(minute)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) else {
        return now;
    };

    let yesterday = now - Duration::days(1);
    yesterday
        .with_hour(hour)
        .and_then(|t| t.with_minute(minute))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// 按模式翻译条目标题
fn translate_titles(
    titles: &[String],
    backend: Option<&dyn TranslationBackend>,
    mode: TitleMode,
) -> Result<Vec<String>, ZaobaoError> {
    let Some(backend) = backend else {
        return Ok(titles.to_vec());
    };

    match mode {
        TitleMode::None => Ok(titles.to_vec()),
        TitleMode::Each => {
            let mut cache: HashMap<&str, String> = HashMap::new();
            let mut translated = Vec::with_capacity(titles.len());
            for title in titles {
                if let Some(hit) = cache.get(title.as_str()) {
                    translated.push(hit.clone());
                    continue;
                }
                match backend.translate(title, prompts::TITLE) {
                    Ok(en) => {
                        cache.insert(title.as_str(), en.clone());
                        translated.push(en);
                    }
                    Err(e) => {
                        warn!("标题 '{}' 翻译失败，保留原文: {}", title, e);
                        translated.push(title.clone());
                    }
                }
            }
            Ok(translated)
        }
        TitleMode::Joined => {
            if titles.is_empty() {
                return Ok(Vec::new());
            }
            let joined = titles.join(TITLE_SEPARATOR);
            let response = backend
                .translate(&joined, prompts::TITLE)
                .map_err(|e| ZaobaoError::new(&format!("批量标题翻译失败: {e}")))?;
            let parts: Vec<String> = response
                .split(TITLE_SEPARATOR)
                .map(|s| s.trim().to_string())
                .collect();
            if parts.len() != titles.len() {
                let mismatch = TranslationError::TitleCountMismatch {
                    sent: titles.len(),
                    received: parts.len(),
                };
                return Err(ZaobaoError::new(&mismatch.to_string()));
            }
            Ok(parts)
        }
    }
}

/// 提取一个条目的正文 HTML
///
/// 取标题之后、下一个 h3 之前的所有同级节点，在克隆上压平
/// 双语元素后序列化。
fn extract_item_body(h3: &Handle) -> String {
    let Some(parent) = get_parent_node(h3) else {
        return String::new();
    };

    let mut body = String::new();
    let mut after_heading = false;
    for sibling in parent.children.borrow().iter() {
        if Rc::ptr_eq(sibling, h3) {
            after_heading = true;
            continue;
        }
        if !after_heading {
            continue;
        }

        match &sibling.data {
            NodeData::Element { .. } => {
                if get_node_name(sibling) == Some("h3") {
                    break;
                }
                let holder = new_element("div", &[]);
                append_child(&holder, &clone_subtree(sibling));
                flatten_bilingual(&holder);
                body.push_str(&serialize_children(&holder));
            }
            NodeData::Text { ref contents } => {
                let text = contents.borrow().to_string();
                if !text.trim().is_empty() {
                    body.push_str(&text);
                }
            }
            _ => {}
        }
    }

    body
}

/// 把双语切换元素压平成纯英文段落
///
/// 带 ondblclick 的元素被替换为一个只含 lang-en 文本的 p，
/// 原样式保留。没有 lang-en 子元素的切换元素保持不动。
fn flatten_bilingual(holder: &Handle) {
    let mut toggles: Vec<Handle> = Vec::new();
    walk_elements(holder, &mut |tag| {
        if get_node_attr(tag, "ondblclick").is_some() {
            toggles.push(tag.clone());
        }
    });

    for toggle in toggles {
        let mut english: Option<Handle> = None;
        walk_elements(&toggle, &mut |tag| {
            if english.is_none() && get_node_name(tag) == Some("span") && has_class(tag, "lang-en")
            {
                english = Some(tag.clone());
            }
        });

        let Some(en_span) = english else {
            continue;
        };

        let text = normalize_text(&get_node_text(&en_span));
        let replacement = match get_node_attr(&toggle, "style") {
            Some(style) => new_element("p", &[("style", &style)]),
            None => new_element("p", &[]),
        };
        append_child(&replacement, &new_text(&text));
        replace_node(&toggle, &replacement);
    }
}
