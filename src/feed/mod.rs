//! RSS 输入与输出
//!
//! - `source` - 从站点 RSS 源发现最新的早报文章
//! - `rss` - 把处理后的页面渲染成 RSS 2.0 文件

pub mod rss;
pub mod source;

pub use rss::{render_rss, TitleMode};
pub use source::{discover_latest_post, DiscoveredPost, POST_MARKER};
