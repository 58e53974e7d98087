//! 命令行入口
//!
//! 两个子命令：`page` 生成双语 HTML 页面，`feed` 把已生成的
//! 页面转换成 RSS 文件。

use std::fs;
use std::process;

use atty::Stream;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zaobao::core::{create_bilingual_page, ZaobaoError, ZaobaoOptions};
use zaobao::env;
use zaobao::feed::{discover_latest_post, render_rss, TitleMode, POST_MARKER};
use zaobao::network::Session;
use zaobao::parsers::html::html_to_dom;
use zaobao::translation::{GenAiBackend, TranslationBackend, BATCH_SIZE};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

#[derive(Parser, Debug)]
#[command(name = "zaobao", version, about = "爱范儿早报双语页面与 RSS 生成器")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 抓取早报页面并生成双语 HTML
    Page {
        /// 文章 URL 或本地 HTML 文件，缺省时从 RSS 源发现最新早报
        target: Option<String>,

        /// 输出文件路径
        #[arg(short, long)]
        output: String,

        /// 允许一个标题与多个摘要段落配对
        #[arg(long)]
        reuse_headings: bool,

        /// 跳过所有翻译调用
        #[arg(long)]
        no_translate: bool,

        /// 自定义 User-Agent
        #[arg(long)]
        user_agent: Option<String>,

        /// 交互式翻译的批次大小
        #[arg(long, default_value_t = BATCH_SIZE)]
        batch_size: usize,
    },
    /// 把已生成的双语页面转换成 RSS 文件
    Feed {
        /// 输入的 HTML 文件路径
        input: String,

        /// 输出文件路径
        #[arg(short, long)]
        output: String,

        /// 条目标题的翻译方式
        #[arg(long, value_enum, default_value_t = TitleMode::None)]
        translate_titles: TitleMode,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        print_error_message(&e.to_string());
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), ZaobaoError> {
    match cli.command {
        Command::Page {
            target,
            output,
            reuse_headings,
            no_translate,
            user_agent,
            batch_size,
        } => {
            let options = ZaobaoOptions {
                user_agent,
                encoding: None,
                reuse_headings,
                no_translate,
                batch_size,
            };
            let session = Session::new(options)?;

            let backend = if no_translate {
                None
            } else {
                Some(build_backend()?)
            };

            let target = match target {
                Some(target) => target,
                None => {
                    let post = discover_latest_post(&session, &env::feed_url(), POST_MARKER)?;
                    post.link
                }
            };

            let (document, title) = create_bilingual_page(
                session,
                &target,
                backend.as_ref().map(|b| b as &dyn TranslationBackend),
            )?;

            fs::write(&output, document)
                .map_err(|e| ZaobaoError::new(&format!("写入 {output} 失败: {e}")))?;
            info!(
                "页面已保存到 {} ({})",
                output,
                title.as_deref().unwrap_or("无标题")
            );
            Ok(())
        }
        Command::Feed {
            input,
            output,
            translate_titles,
        } => {
            let html = fs::read(&input)
                .map_err(|e| ZaobaoError::new(&format!("读取 {input} 失败: {e}")))?;
            let dom = html_to_dom(&html, "utf-8".to_string());

            let backend = if translate_titles == TitleMode::None {
                None
            } else {
                Some(build_backend()?)
            };

            let rss = render_rss(
                &dom,
                backend.as_ref().map(|b| b as &dyn TranslationBackend),
                translate_titles,
                Utc::now(),
            )?;

            fs::write(&output, rss)
                .map_err(|e| ZaobaoError::new(&format!("写入 {output} 失败: {e}")))?;
            info!("RSS 文件已保存到 {}", output);
            Ok(())
        }
    }
}

fn build_backend() -> Result<GenAiBackend, ZaobaoError> {
    GenAiBackend::from_env().map_err(|e| ZaobaoError::new(&e.to_string()))
}

/// 把错误打印到 stderr，终端下标红
fn print_error_message(msg: &str) {
    if atty::is(Stream::Stderr) {
        eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
    } else {
        eprintln!("{msg}");
    }
}
