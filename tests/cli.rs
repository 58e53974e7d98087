//! 命令行集成测试
//!
//! 只覆盖不需要网络和翻译服务的路径。

use assert_cmd::Command;
use std::fs;

fn sample_page(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("zaobao.html");
    fs::write(
        &path,
        r#"<html><head><title>早报 | 测试</title></head><body>
        <div class="entry-content">
        <p>新款手机正式发布上市</p>
        <h3>新款手机正式发布上市，首发价格公布</h3>
        <p>这是一段普通的正文内容。</p>
        </div></body></html>"#,
    )
    .unwrap();
    path
}

#[test]
fn test_page_from_local_file_without_translation() {
    let dir = tempfile::tempdir().unwrap();
    let input = sample_page(dir.path());
    let output = dir.path().join("out.html");

    Command::cargo_bin("zaobao")
        .unwrap()
        .args([
            "page",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--no-translate",
        ])
        .assert()
        .success();

    let html = fs::read_to_string(&output).unwrap();
    assert!(html.contains("data-pair-id=\"pair-1\""));
    assert!(html.contains("function toggleLang"));
}

#[test]
fn test_page_missing_input_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.html");

    Command::cargo_bin("zaobao")
        .unwrap()
        .args([
            "page",
            "/nonexistent/zaobao.html",
            "-o",
            output.to_str().unwrap(),
            "--no-translate",
        ])
        .assert()
        .failure()
        .code(1);

    assert!(!output.exists());
}

#[test]
fn test_feed_from_generated_page() {
    let dir = tempfile::tempdir().unwrap();
    let input = sample_page(dir.path());
    let page_out = dir.path().join("page.html");
    let rss_out = dir.path().join("feed.xml");

    Command::cargo_bin("zaobao")
        .unwrap()
        .args([
            "page",
            input.to_str().unwrap(),
            "-o",
            page_out.to_str().unwrap(),
            "--no-translate",
        ])
        .assert()
        .success();

    Command::cargo_bin("zaobao")
        .unwrap()
        .args([
            "feed",
            page_out.to_str().unwrap(),
            "-o",
            rss_out.to_str().unwrap(),
        ])
        .assert()
        .success();

    let xml = fs::read_to_string(&rss_out).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<rss version=\"2.0\""));
    assert!(xml.contains("新款手机正式发布上市，首发价格公布"));
}

#[test]
fn test_feed_missing_input_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let rss_out = dir.path().join("feed.xml");

    Command::cargo_bin("zaobao")
        .unwrap()
        .args(["feed", "/nonexistent/page.html", "-o", rss_out.to_str().unwrap()])
        .assert()
        .failure()
        .code(1);
}
