//! # Zaobao Library
//!
//! 把爱范儿早报页面转换成双语交互页面或 RSS 源的工具库。
//!
//! ## 模块组织
//!
//! - `core` - 核心处理流程与错误类型
//! - `parsers` - HTML 解析、DOM 操作与序列化
//! - `pipeline` - 清理、配对、样式与脚本注入各阶段
//! - `translation` - 翻译后端接口与批量翻译
//! - `feed` - 文章发现与 RSS 输出
//! - `network` - HTTP 会话管理
//! - `env` - 环境变量配置

pub mod core;
pub mod env;
pub mod feed;
pub mod network;
pub mod parsers;
pub mod pipeline;
pub mod translation;

// Re-export commonly used items for convenience
pub use crate::core::{
    create_bilingual_page, create_bilingual_page_from_data, ZaobaoError, ZaobaoOptions,
};
pub use crate::feed::{discover_latest_post, render_rss, TitleMode};
pub use crate::network::Session;
pub use crate::translation::{GenAiBackend, TranslationBackend};
