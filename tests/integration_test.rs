//! End-to-end tests against the server binary.
//!
//! A shell script stands in for tesseract: it answers `--version` and prints a
//! fixed line of text for every image it is given.

#![cfg(unix)]

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::io::Cursor;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use tempfile::TempDir;

// Use atomic counter to give each test a unique port
static PORT_COUNTER: AtomicU16 = AtomicU16::new(9500);

const TOKEN: &str = "integration-token";

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ImageReport {
    filename: String,
    status: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct UploadResponse {
    text: String,
    images: Vec<ImageReport>,
    processing_time_ms: u64,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ErrorResponse {
    error: String,
    code: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct InfoResponse {
    version: String,
    engine: String,
    languages: Vec<String>,
    installed_languages: Vec<String>,
    max_batch_size: usize,
}

struct TestServer {
    child: Child,
    port: u16,
    upload_dir: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let tesseract = write_fake_tesseract(dir.path());
        let upload_dir = dir.path().join("uploads");

        let child = Command::new(env!("CARGO_BIN_EXE_batch-ocr-server"))
            .args(["--host", "127.0.0.1", "--port", &port.to_string()])
            .args(["--access-token", TOKEN])
            .arg("--tesseract-path")
            .arg(&tesseract)
            .args(["--languages", "eng+rus"])
            .arg("--upload-dir")
            .arg(&upload_dir)
            .spawn()
            .expect("Failed to start server");

        let server = Self {
            child,
            port,
            upload_dir,
            _dir: dir,
        };
        server.wait_ready().await;
        server
    }

    async fn wait_ready(&self) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", self.base_url()))
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready on port {}", self.port);
    }

    fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    fn leftover_uploads(&self) -> usize {
        std::fs::read_dir(&self.upload_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn write_fake_tesseract(dir: &Path) -> PathBuf {
    let path = dir.join("tesseract");
    let script = r#"#!/bin/sh
case "$1" in
  --version) echo "tesseract 5.3.0"; exit 0 ;;
  --list-langs) printf 'List of available languages in "/usr/share/tessdata/" (2):\neng\nrus\n'; exit 0 ;;
esac
printf 'Hello from %s\n\f' "$4"
"#;
    std::fs::write(&path, script).expect("Failed to write fake tesseract");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake tesseract executable");
    path
}

fn sample_png() -> Vec<u8> {
    let img = image::RgbImage::from_fn(60, 20, |x, _| {
        if x % 6 < 3 {
            image::Rgb([20, 20, 20])
        } else {
            image::Rgb([235, 235, 235])
        }
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    bytes
}

fn upload_form(token: &str, files: Vec<(&str, Vec<u8>)>) -> Form {
    let mut form = Form::new().text("access_token", token.to_string());
    for (filename, bytes) in files {
        let part = Part::bytes(bytes).file_name(filename.to_string());
        form = form.part("file", part);
    }
    form
}

async fn post_upload(server: &TestServer, form: Form) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/upload", server.base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start().await;

    let response: HealthResponse = reqwest::get(format!("{}/health", server.base_url()))
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.status, "ok");
}

#[tokio::test]
async fn test_info_endpoint() {
    let server = TestServer::start().await;

    let response: InfoResponse = reqwest::get(format!("{}/info", server.base_url()))
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.engine, "tesseract");
    assert_eq!(response.languages, vec!["eng", "rus"]);
    assert_eq!(response.installed_languages, vec!["eng", "rus"]);
    assert_eq!(response.max_batch_size, 10);
}

#[tokio::test]
async fn test_upload_aggregates_text_and_cleans_up() {
    let server = TestServer::start().await;

    let form = upload_form(
        TOKEN,
        vec![
            ("a.png", sample_png()),
            ("b.gif", b"GIF89a".to_vec()),
            ("c.PNG", sample_png()),
        ],
    );
    let response = post_upload(&server, form).await;
    assert!(response.status().is_success());

    let result: UploadResponse = response.json().await.expect("Failed to parse response");

    assert_eq!(result.text, "Hello from eng+rus\n\nHello from eng+rus\n\n");
    let statuses: Vec<&str> = result.images.iter().map(|i| i.status.as_str()).collect();
    assert_eq!(statuses, vec!["recognized", "skipped", "recognized"]);
    assert_eq!(server.leftover_uploads(), 0);
}

#[tokio::test]
async fn test_upload_with_wrong_token_is_denied() {
    let server = TestServer::start().await;

    let response = post_upload(&server, upload_form("nope", vec![("a.png", sample_png())])).await;

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let error: ErrorResponse = response.json().await.expect("Failed to parse response");
    assert_eq!(error.code, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_upload_of_eleven_images_is_rejected() {
    let server = TestServer::start().await;

    let files = (0..11).map(|_| ("page.png", sample_png())).collect();
    let response = post_upload(&server, upload_form(TOKEN, files)).await;

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json().await.expect("Failed to parse response");
    assert_eq!(error.code, "BATCH_SIZE");
}

#[tokio::test]
async fn test_upload_of_corrupt_image_reports_no_text() {
    let server = TestServer::start().await;

    let response = post_upload(
        &server,
        upload_form(TOKEN, vec![("x.jpg", b"not really a jpeg".to_vec())]),
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = response.json().await.expect("Failed to parse response");
    assert_eq!(error.code, "NO_TEXT_EXTRACTED");
    assert_eq!(server.leftover_uploads(), 0);
}
