//! 翻译模块统一错误处理

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug)]
pub enum TranslationError {
    /// 配置错误（缺少密钥等），在进程启动时即为致命错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 网络错误（连接失败、超时）
    #[error("网络错误: {0}")]
    Network(#[from] reqwest::Error),

    /// 翻译服务错误（非成功状态码等）
    #[error("翻译服务错误: {0}")]
    Service(String),

    /// 返回的标签数量与发送的数量不符
    #[error("返回的标签数量 ({received}) 与发送的数量 ({sent}) 不符")]
    CountMismatch { sent: usize, received: usize },

    /// 批量标题翻译的分段数量不符
    #[error("返回的标题数量 ({received}) 与发送的数量 ({sent}) 不符")]
    TitleCountMismatch { sent: usize, received: usize },

    /// 请求体序列化错误
    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
