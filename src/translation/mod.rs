//! 翻译子系统
//!
//! `backend` 定义后端接口与 HTTP 实现，`batch` 负责批量
//! 切分与回填，`error` 是统一错误类型。

pub mod backend;
pub mod batch;
pub mod error;

pub use backend::{prompts, GenAiBackend, TranslationBackend, TranslationRequest};
pub use batch::{translate_interactive, translate_paired_paragraphs, BATCH_SIZE};
pub use error::{TranslationError, TranslationResult};
