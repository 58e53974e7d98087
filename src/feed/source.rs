//! 文章发现
//!
//! 早报没有固定地址，每天的文章要从站点的 RSS 源里按标题
//! 标记找出来。取第一条命中的条目（源按时间倒序排列）。

use feed_rs::parser;
use tracing::info;
use url::Url;

use crate::core::ZaobaoError;
use crate::network::session::Session;

/// 标题中标识早报文章的标记
pub const POST_MARKER: &str = "早报";

/// 从 RSS 源中发现的文章
#[derive(Debug, Clone)]
pub struct DiscoveredPost {
    pub title: String,
    pub link: String,
}

/// 从 RSS 源中找出标题包含标记的最新文章
///
/// 源不可达、解析失败或没有命中条目都是致命错误。
pub fn discover_latest_post(
    session: &Session,
    feed_url: &str,
    marker: &str,
) -> Result<DiscoveredPost, ZaobaoError> {
    info!("正在从 RSS 源获取最新的早报链接: {}", feed_url);

    let parsed_url = Url::parse(feed_url)
        .map_err(|e| ZaobaoError::new(&format!("无效的 RSS 源地址 '{feed_url}': {e}")))?;
    let bytes = session.fetch(&parsed_url)?;

    let feed = parser::parse(&bytes[..])
        .map_err(|e| ZaobaoError::new(&format!("解析 RSS 源失败: {e}")))?;

    for entry in &feed.entries {
        let Some(title) = entry.title.as_ref().map(|t| t.content.clone()) else {
            continue;
        };
        if !title.contains(marker) {
            continue;
        }
        let Some(link) = entry.links.first().map(|l| l.href.clone()) else {
            continue;
        };

        info!("成功找到最新早报: '{}'", title);
        return Ok(DiscoveredPost { title, link });
    }

    Err(ZaobaoError::new(&format!(
        "在 RSS 源中未找到标题包含 \"{marker}\" 的文章"
    )))
}
