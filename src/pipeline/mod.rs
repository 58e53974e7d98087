//! 页面处理管道
//!
//! 文档在各阶段之间以独占方式传递，原地修改：
//!
//! 1. `sanitize` - 清理脚本、样式与站点模板
//! 2. `pairing` - 标题与摘要段落配对
//! 3. `style` - 应用展示样式
//! 4. `interactive` - 注入切换与滚动脚本

pub mod interactive;
pub mod pairing;
pub mod sanitize;
pub mod style;

pub use interactive::inject_interactivity;
pub use pairing::{find_content_container, pair_headings, PairingOptions, PAIR_CLASS, PAIR_ID_ATTR};
pub use sanitize::sanitize_document;
pub use style::{apply_paired_styles, apply_section_chrome, style_remaining_tags};
