//! HTTP 会话管理
//!
//! 所有出站请求（RSS 源与文章页面）都经过同一个 `Session`，
//! 以复用连接和统一 User-Agent、超时等配置。

use std::time::Duration;

use tracing::info;
use url::Url;

use crate::core::{ZaobaoError, ZaobaoOptions};

/// 默认 User-Agent，移动端标识可拿到排版更紧凑的页面
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 13_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.1.1 Mobile/15E148 Safari/604.1";

/// 页面与 RSS 源抓取的超时时间
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP 会话
pub struct Session {
    pub options: ZaobaoOptions,
    client: reqwest::blocking::Client,
}

impl Session {
    pub fn new(options: ZaobaoOptions) -> Result<Self, ZaobaoError> {
        let user_agent = options
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| ZaobaoError::new(&format!("创建 HTTP 客户端失败: {e}")))?;

        Ok(Self { options, client })
    }

    /// 抓取一个 URL 的原始字节
    ///
    /// 非成功状态码视为错误，调用方决定是否致命。
    pub fn fetch(&self, url: &Url) -> Result<Vec<u8>, ZaobaoError> {
        info!("正在抓取 {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| ZaobaoError::new(&format!("请求 {url} 失败: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ZaobaoError::new(&format!(
                "请求 {url} 返回非成功状态: {status}"
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| ZaobaoError::new(&format!("读取 {url} 响应失败: {e}")))?;

        Ok(bytes.to_vec())
    }
}
