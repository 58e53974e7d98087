//! # 网络模块
//!
//! HTTP 会话管理与页面抓取。
//!
//! - `session` - 会话配置、User-Agent、超时与抓取

pub mod session;

pub use session::{Session, DEFAULT_USER_AGENT, FETCH_TIMEOUT};
