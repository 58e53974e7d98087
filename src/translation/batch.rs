//! 批量翻译与回填
//!
//! 待翻译元素按发现顺序切成固定大小的批次，每批克隆为一个
//! `<div>` 片段发给后端，返回的片段解析后按 1:1 数量校验回填。
//! 数量不符或调用失败时整批保留原文，流程继续处理下一批。

use markup5ever_rcdom::Handle;
use tracing::{info, warn};

use crate::parsers::html::{
    append_child, clone_subtree, find_elements, find_elements_by_class, get_node_name,
    get_node_text, has_class, html_to_dom, new_element, normalize_text, replace_node,
    serialize_node,
};
use crate::pipeline::pairing::{find_content_container, PAIR_CLASS};
use crate::translation::backend::{prompts, TranslationBackend};
use crate::translation::error::{TranslationError, TranslationResult};

/// 每批发送的元素数量上限，用于控制请求体大小
///
/// 批次边界没有语义：给定相同的输入顺序，切分结果是确定的。
pub const BATCH_SIZE: usize = 20;

/// 结构化翻译所有配对段落
///
/// 配对段落一次性作为单个批次发送（数量有限）。翻译失败或
/// 数量不符时保留原文。返回成功替换的元素数。
pub fn translate_paired_paragraphs(root: &Handle, backend: &dyn TranslationBackend) -> usize {
    let paired: Vec<Handle> = find_elements_by_class(root, PAIR_CLASS)
        .into_iter()
        .filter(|tag| get_node_name(tag) == Some("p"))
        .collect();

    if paired.is_empty() {
        info!("未找到需要翻译的配对段落，跳过结构化翻译");
        return 0;
    }

    match translate_batch(&paired, &["p"], prompts::STRUCTURAL, backend) {
        Ok(count) => {
            info!("配对段落翻译完成，共替换 {} 个元素", count);
            count
        }
        Err(e) => {
            warn!("配对段落翻译失败，保留原文: {}", e);
            0
        }
    }
}

/// 交互式双语翻译内容区域内剩余的 p/li 元素
///
/// 跳过已配对的段落和没有文本的元素，按 `batch_size` 顺序分批。
/// 单批失败只影响该批，返回总共替换的元素数。
pub fn translate_interactive(
    root: &Handle,
    backend: &dyn TranslationBackend,
    batch_size: usize,
) -> usize {
    let container = find_content_container(root);

    let candidates: Vec<Handle> = find_elements(&container, &["p", "li"])
        .into_iter()
        .filter(|tag| !has_class(tag, PAIR_CLASS))
        .filter(|tag| !normalize_text(&get_node_text(tag)).is_empty())
        .collect();

    if candidates.is_empty() {
        info!("在主要内容区域未找到需要翻译的 p 或 li 标签");
        return 0;
    }

    info!("提取了 {} 个 p/li 标签用于交互式翻译", candidates.len());

    let mut replaced = 0;
    for (index, batch_tags) in candidates.chunks(batch_size).enumerate() {
        info!(
            "正在处理批次 {} (共 {} 个标签)",
            index + 1,
            batch_tags.len()
        );

        match translate_batch(batch_tags, &["p", "li"], prompts::INTERACTIVE, backend) {
            Ok(count) => {
                replaced += count;
            }
            Err(e) => {
                warn!("批次 {} 翻译失败，保留原文: {}", index + 1, e);
            }
        }
    }

    replaced
}

/// 翻译一个批次并回填
///
/// 把每个元素的深拷贝装进一个 `<div>` 片段发送；解析返回片段，
/// 收集期望标签名的元素并校验数量。数量一致时按顺序原位替换。
fn translate_batch(
    tags: &[Handle],
    expected_names: &[&str],
    instruction: &str,
    backend: &dyn TranslationBackend,
) -> TranslationResult<usize> {
    let snippet_div = new_element("div", &[]);
    for tag in tags {
        append_child(&snippet_div, &clone_subtree(tag));
    }

    let response = backend.translate(&serialize_node(&snippet_div), instruction)?;

    let translated_dom = html_to_dom(response.as_bytes(), "utf-8".to_string());
    let translated_tags = find_elements(&translated_dom.document, expected_names);

    if translated_tags.len() != tags.len() {
        return Err(TranslationError::CountMismatch {
            sent: tags.len(),
            received: translated_tags.len(),
        });
    }

    for (original_tag, translated_tag) in tags.iter().zip(translated_tags.iter()) {
        replace_node(original_tag, translated_tag);
    }

    Ok(tags.len())
}
