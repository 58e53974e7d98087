//! 统一的环境变量管理
//!
//! 每个变量是一个实现 `EnvVar` 的零大小类型，集中声明名称、
//! 默认值与校验规则。模块底部提供便捷函数供各处调用。

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "环境变量 '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    /// 变量未设置时的默认值，`None` 表示必填
    fn default() -> Option<T> {
        None
    }

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => match Self::default() {
                Some(default) => Ok(default),
                None => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "必需的环境变量未设置".to_string(),
                }),
            },
        }
    }
}

/// 翻译服务鉴权令牌，必填
pub struct AuthToken;
impl EnvVar<String> for AuthToken {
    const NAME: &'static str = "AI_AUTH_TOKEN";
    const DESCRIPTION: &'static str = "翻译服务的 Bearer 鉴权令牌";

    fn parse(value: &str) -> EnvResult<String> {
        let token = value.trim();
        if token.is_empty() {
            return Err(EnvError {
                variable: Self::NAME.to_string(),
                message: "令牌不能为空".to_string(),
            });
        }
        Ok(token.to_string())
    }
}

/// 翻译服务地址
pub struct ApiUrl;
impl EnvVar<String> for ApiUrl {
    const NAME: &'static str = "ZAOBAO_API_URL";
    const DESCRIPTION: &'static str = "翻译服务的 HTTP 端点";

    fn default() -> Option<String> {
        Some("https://genai-api.thisisray.workers.dev/api/v1/completion".to_string())
    }

    fn parse(value: &str) -> EnvResult<String> {
        let url = value.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(url.to_string())
        } else {
            Err(EnvError {
                variable: Self::NAME.to_string(),
                message: "地址必须以 http:// 或 https:// 开头".to_string(),
            })
        }
    }
}

/// 翻译模型名称
pub struct ModelName;
impl EnvVar<String> for ModelName {
    const NAME: &'static str = "ZAOBAO_MODEL";
    const DESCRIPTION: &'static str = "翻译服务使用的模型名";

    fn default() -> Option<String> {
        Some("gemini-1.5-flash".to_string())
    }

    fn parse(value: &str) -> EnvResult<String> {
        let name = value.trim();
        if name.is_empty() {
            return Err(EnvError {
                variable: Self::NAME.to_string(),
                message: "模型名不能为空".to_string(),
            });
        }
        Ok(name.to_string())
    }
}

/// 文章来源的 RSS 地址
pub struct FeedUrl;
impl EnvVar<String> for FeedUrl {
    const NAME: &'static str = "ZAOBAO_FEED_URL";
    const DESCRIPTION: &'static str = "发现最新早报文章的 RSS 源";

    fn default() -> Option<String> {
        Some("https://www.ifanr.com/feed".to_string())
    }

    fn parse(value: &str) -> EnvResult<String> {
        let url = value.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(url.to_string())
        } else {
            Err(EnvError {
                variable: Self::NAME.to_string(),
                message: "地址必须以 http:// 或 https:// 开头".to_string(),
            })
        }
    }
}

/// 鉴权令牌，未设置时返回错误
pub fn auth_token() -> EnvResult<String> {
    AuthToken::get()
}

/// 翻译服务地址，带默认值
pub fn api_url() -> String {
    ApiUrl::get().unwrap_or_else(|_| ApiUrl::default().unwrap())
}

/// 模型名，带默认值
pub fn model_name() -> String {
    ModelName::get().unwrap_or_else(|_| ModelName::default().unwrap())
}

/// RSS 源地址，带默认值
pub fn feed_url() -> String {
    FeedUrl::get().unwrap_or_else(|_| FeedUrl::default().unwrap())
}
