//! 核心处理流程
//!
//! 从目标（URL 或本地文件）取得早报页面原始字节，按固定顺序
//! 跑完清理、配对、翻译、样式与脚本注入各阶段，输出完整的
//! 双语 HTML 文档。

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use markup5ever_rcdom::RcDom;
use url::Url;

use crate::network::session::Session;
use crate::parsers::html::{get_charset, get_title, html_to_dom, serialize_document};
use crate::pipeline::{
    apply_paired_styles, apply_section_chrome, inject_interactivity, pair_headings,
    sanitize_document, style_remaining_tags, PairingOptions,
};
use crate::translation::{
    translate_interactive, translate_paired_paragraphs, TranslationBackend, BATCH_SIZE,
};

/// 处理过程中可能发生的错误
#[derive(Debug)]
pub struct ZaobaoError {
    details: String,
}

impl ZaobaoError {
    pub fn new(msg: &str) -> ZaobaoError {
        ZaobaoError {
            details: msg.to_string(),
        }
    }
}

impl fmt::Display for ZaobaoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.details)
    }
}

impl Error for ZaobaoError {}

/// 处理选项
#[derive(Clone, Debug)]
pub struct ZaobaoOptions {
    /// 自定义 User-Agent，缺省使用移动端标识
    pub user_agent: Option<String>,
    /// 输出编码，缺省沿用文档自身声明的编码
    pub encoding: Option<String>,
    /// 允许一个标题与多个摘要段落配对
    pub reuse_headings: bool,
    /// 跳过所有翻译调用，只做清理、配对与样式
    pub no_translate: bool,
    /// 交互式翻译的批次大小
    pub batch_size: usize,
}

impl Default for ZaobaoOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            encoding: None,
            reuse_headings: false,
            no_translate: false,
            batch_size: BATCH_SIZE,
        }
    }
}

/// 从 URL 或本地文件路径生成双语页面
///
/// 目标不可达或文件不存在是致命错误。返回输出字节和文档标题。
pub fn create_bilingual_page(
    session: Session,
    target: &str,
    backend: Option<&dyn TranslationBackend>,
) -> Result<(Vec<u8>, Option<String>), ZaobaoError> {
    let input_data = if target.starts_with("http://") || target.starts_with("https://") {
        let parsed_url = Url::parse(target)
            .map_err(|e| ZaobaoError::new(&format!("无效的 URL '{target}': {e}")))?;
        session.fetch(&parsed_url)?
    } else {
        let path = Path::new(target);
        if !path.exists() {
            return Err(ZaobaoError::new(&format!("文件不存在: {target}")));
        }
        fs::read(path).map_err(|e| ZaobaoError::new(&format!("读取文件失败: {e}")))?
    };

    create_bilingual_page_from_data(session, input_data, None, backend)
}

/// 从已有的原始字节生成双语页面
pub fn create_bilingual_page_from_data(
    session: Session,
    input_data: Vec<u8>,
    input_encoding: Option<String>,
    backend: Option<&dyn TranslationBackend>,
) -> Result<(Vec<u8>, Option<String>), ZaobaoError> {
    let processor = DocumentProcessor::new(session);
    processor.process_document(input_data, input_encoding, backend)
}

/// 文档处理器，负责协调整个处理流程
pub struct DocumentProcessor {
    session: Session,
}

impl DocumentProcessor {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// 处理文档数据并返回最终结果
    ///
    /// 各阶段的顺序是固定的：翻译在样式之前跑结构化一轮，
    /// 在样式之后跑交互式一轮，保证提示词看到的标记形态稳定。
    pub fn process_document(
        self,
        input_data: Vec<u8>,
        input_encoding: Option<String>,
        backend: Option<&dyn TranslationBackend>,
    ) -> Result<(Vec<u8>, Option<String>), ZaobaoError> {
        let options = &self.session.options;
        self.validate_encoding(options)?;

        // 1. 按文档声明的编码解析
        let (dom, document_encoding) = self.parse_with_charset(&input_data, input_encoding);

        // 2. 清理脚本、样式与站点模板
        sanitize_document(&dom.document);

        // 3. 标题与摘要配对
        let pairing = PairingOptions {
            reuse_headings: options.reuse_headings,
        };
        pair_headings(&dom.document, pairing);

        // 4. 结构化翻译配对段落
        if let Some(backend) = self.active_backend(backend) {
            translate_paired_paragraphs(&dom.document, backend);
        }

        // 5. 配对样式与区块装饰
        apply_paired_styles(&dom.document);
        inject_interactivity(&dom.document);
        apply_section_chrome(&dom.document);

        // 6. 交互式双语翻译剩余正文
        if let Some(backend) = self.active_backend(backend) {
            translate_interactive(&dom.document, backend, options.batch_size);
        }

        // 7. 剩余标签的兜底样式
        style_remaining_tags(&dom.document);

        // 8. 序列化输出
        let document_title = get_title(&dom.document);
        let final_encoding = options.encoding.clone().unwrap_or(document_encoding);
        let result = serialize_document(dom, final_encoding);

        Ok((result, document_title))
    }

    fn active_backend<'a>(
        &self,
        backend: Option<&'a dyn TranslationBackend>,
    ) -> Option<&'a dyn TranslationBackend> {
        if self.session.options.no_translate {
            None
        } else {
            backend
        }
    }

    fn validate_encoding(&self, options: &ZaobaoOptions) -> Result<(), ZaobaoError> {
        if let Some(custom_encoding) = &options.encoding {
            if Encoding::for_label_no_replacement(custom_encoding.as_bytes()).is_none() {
                return Err(ZaobaoError::new(&format!(
                    "未知的编码 \"{custom_encoding}\""
                )));
            }
        }
        Ok(())
    }

    /// 先按 UTF-8 解析，再根据文档内声明的 charset 重新解析
    fn parse_with_charset(
        &self,
        input_data: &[u8],
        input_encoding: Option<String>,
    ) -> (RcDom, String) {
        let mut encoding = input_encoding.unwrap_or_else(|| "utf-8".to_string());
        let mut dom = html_to_dom(input_data, encoding.clone());

        if let Some(charset) = get_charset(&dom.document) {
            if !charset.eq_ignore_ascii_case(&encoding)
                && Encoding::for_label_no_replacement(charset.as_bytes()).is_some()
            {
                encoding = charset;
                dom = html_to_dom(input_data, encoding.clone());
            }
        }

        (dom, encoding)
    }
}
