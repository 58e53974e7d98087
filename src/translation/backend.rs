//! 翻译后端
//!
//! 后端被建模为一个单方法接口：输入待译文本和指令，返回译文。
//! 指令提示词是配置数据而不是逻辑，便于在测试中用确定性的
//! 桩实现替换真实服务。

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::env;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译后端接口
///
/// 真实实现是一次阻塞的 HTTP 调用；测试中用桩实现返回预设内容。
pub trait TranslationBackend {
    /// 翻译一段文本或标记片段
    ///
    /// `instruction` 描述期望的输出形态（保留结构、嵌入双语 span 等）。
    fn translate(&self, input: &str, instruction: &str) -> TranslationResult<String>;
}

/// 指令提示词
///
/// 提示词即后端的"协议描述"：要求保留标签结构和全部属性，
/// 并保证返回的元素数量与发送一致。
pub mod prompts {
    /// 结构化翻译：仅替换文本，保留标签与属性
    pub const STRUCTURAL: &str = "You are an expert HTML translator. You will receive an HTML snippet containing several <p> tags.
Your task is to translate ONLY the Chinese text content within each <p> tag to English.
Crucially, you MUST preserve the original HTML structure and ALL attributes (like class, data-pair-id, style, etc.) of every tag exactly as they were.
Do not add any new tags, attributes, or explanations. Only return the modified HTML snippet.";

    /// 交互式双语翻译：原文与译文各包一层 span，双击切换
    pub const INTERACTIVE: &str = r#"You are an expert HTML translator who creates interactive, bilingual text.
You will receive an HTML snippet containing <p> and <li> tags with Chinese text.
Your task is to perform the following transformation for EACH tag:
1.  Translate the Chinese text content into English, ensuring that any nested HTML tags (like <strong>, <em>, <a>) are preserved in their correct positions within the translated text.
2.  Wrap the original Chinese content (including its nested tags) in a span: `<span class="lang-zh" style="display:none;">...</span>`.
3.  Wrap the newly translated English content (including its preserved nested tags) in another span: `<span class="lang-en" style="display:inline; letter-spacing: .001rem; font-size: .875rem;line-height: 1.375rem;">...</span>`.
4.  Place BOTH of these spans inside the original parent tag (e.g., <p> or <li>).
5.  Add an `ondblclick="toggleLang(this)"` attribute to the parent tag (<p> or <li>) to enable language switching on double-click.
6.  You MUST preserve all original attributes of the parent tag (like class, style, etc.) and merge them with the new `ondblclick` attribute.
7.  Do not add any other explanations, comments, or script tags. Only return the modified HTML snippet."#;

    /// 标题翻译：纯文本，逐条或按分隔符批量
    pub const TITLE: &str = "You are an expert news translator. Translate the following Chinese news headline(s) to concise English.
If the input contains the separator `|||`, translate each segment independently and return the translations joined by the same `|||` separator, in the same order and with the same number of segments.
Return ONLY the translated text, with no explanations or quotation marks.";
}

/// 发往翻译服务的请求体
#[derive(Debug, Clone, Serialize)]
pub struct TranslationRequest {
    pub input: String,
    pub system: String,
    pub temperature: f32,
    pub model: String,
}

/// 基于 HTTP 的翻译后端
///
/// 请求体为 `{input, system, temperature, model}`，鉴权使用
/// Bearer 令牌，响应体即译文本身（无结构化包装）。
pub struct GenAiBackend {
    client: reqwest::blocking::Client,
    api_url: String,
    auth_token: String,
    model: String,
}

impl GenAiBackend {
    /// 采样温度，取较低值以保证输出稳定
    const TEMPERATURE: f32 = 0.3;

    /// 翻译调用的超时时间
    const TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new(api_url: String, auth_token: String, model: String) -> TranslationResult<Self> {
        if auth_token.trim().is_empty() {
            return Err(TranslationError::Config(
                "鉴权令牌为空，无法调用翻译服务".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(TranslationError::Network)?;

        Ok(Self {
            client,
            api_url,
            auth_token,
            model,
        })
    }

    /// 从环境变量构建后端
    ///
    /// 缺少 `AI_AUTH_TOKEN` 是致命的配置错误。
    pub fn from_env() -> TranslationResult<Self> {
        let auth_token = env::auth_token()
            .map_err(|e| TranslationError::Config(e.to_string()))?;
        let api_url = env::api_url();
        let model = env::model_name();

        Self::new(api_url, auth_token, model)
    }
}

impl TranslationBackend for GenAiBackend {
    fn translate(&self, input: &str, instruction: &str) -> TranslationResult<String> {
        let payload = TranslationRequest {
            input: input.to_string(),
            system: instruction.to_string(),
            temperature: Self::TEMPERATURE,
            model: self.model.clone(),
        };

        info!("正在向翻译服务发送请求 ({} 字符)", input.chars().count());

        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .body(serde_json::to_string(&payload)?)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Service(format!(
                "HTTP {status}: {}",
                response.text().unwrap_or_default()
            )));
        }

        Ok(response.text()?.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_is_config_error() {
        let result = GenAiBackend::new(
            "https://example.com/api".to_string(),
            "  ".to_string(),
            "gemini-1.5-flash".to_string(),
        );
        assert!(matches!(result, Err(TranslationError::Config(_))));
    }

    #[test]
    fn test_request_payload_shape() {
        let payload = TranslationRequest {
            input: "<p>你好</p>".to_string(),
            system: prompts::STRUCTURAL.to_string(),
            temperature: 0.3,
            model: "gemini-1.5-flash".to_string(),
        };
        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&payload).unwrap()).unwrap();

        assert_eq!(json["input"], "<p>你好</p>");
        assert_eq!(json["model"], "gemini-1.5-flash");
        assert!(json["system"].as_str().unwrap().contains("HTML translator"));
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }
}
