//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temporary media root and SQLite
//! file, default config, and a full [`AppContext`]. The [`TestHarness::with_server`]
//! constructor starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;

use image::{DynamicImage, ImageFormat, RgbImage};
use tempfile::TempDir;

use imagehost::config::Config;
use imagehost::server::{create_router, AppContext};

/// Test harness wrapping a fully-constructed [`AppContext`] whose storage
/// lives in a temporary directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub dir: TempDir,
}

impl TestHarness {
    /// Create a new harness with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a new harness with a custom configuration. Storage paths are
    /// replaced with temporary ones.
    pub fn with_config(mut config: Config) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        config.storage.media_root = dir.path().join("media");
        config.storage.database_path = dir.path().join("imagehost.db");

        let ctx = AppContext::from_config(config).expect("failed to build app context");
        Self { ctx, dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::with_server_config(Config::default()).await
    }

    /// Start an Axum server with custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let harness = Self::with_config(config);
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Absolute path of a stored file given its media-relative path.
    pub fn media_path(&self, relative: &str) -> std::path::PathBuf {
        self.ctx.config.storage.media_root.join(relative)
    }

    /// Number of files in the `images/` directory of the media root.
    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.media_path("images"))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Encode a solid-colour RGB image of the given size.
pub fn image_bytes(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 80, 40])));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("failed to encode test image");
    buf.into_inner()
}

/// PNG fixture of the given size.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    image_bytes(width, height, ImageFormat::Png)
}

/// PNG with a valid signature and header but garbage pixel data.
pub fn corrupt_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 7) as u8, (y * 7) as u8, ((x ^ y) * 3) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("failed to encode test image");
    let mut data = buf.into_inner();
    let end = data.len() - 20;
    data[60..end].fill(0xAB);
    data
}

/// Dimensions of encoded image bytes.
pub fn dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data).expect("response is not an image");
    (img.width(), img.height())
}

/// Multipart form for the upload endpoint. `None` fields are omitted.
pub fn upload_form(
    title: Option<&str>,
    width: Option<&str>,
    height: Option<&str>,
    file: Option<(&str, Vec<u8>)>,
) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    if let Some(title) = title {
        form = form.text("title", title.to_string());
    }
    if let Some(width) = width {
        form = form.text("width", width.to_string());
    }
    if let Some(height) = height {
        form = form.text("height", height.to_string());
    }
    if let Some((filename, data)) = file {
        form = form.part(
            "image",
            reqwest::multipart::Part::bytes(data).file_name(filename.to_string()),
        );
    }
    form
}

/// POST a multipart form to `/images/` and return the status and JSON body.
pub async fn post_upload(
    addr: SocketAddr,
    form: reqwest::multipart::Form,
) -> (reqwest::StatusCode, serde_json::Value) {
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/images/"))
        .multipart(form)
        .send()
        .await
        .expect("upload request failed");
    let status = resp.status();
    let body = resp.json().await.expect("upload response is not JSON");
    (status, body)
}

/// GET a path and return the status and JSON body.
pub async fn get_json(addr: SocketAddr, path: &str) -> (reqwest::StatusCode, serde_json::Value) {
    let resp = reqwest::get(format!("http://{addr}{path}"))
        .await
        .expect("request failed");
    let status = resp.status();
    let body = resp.json().await.expect("response is not JSON");
    (status, body)
}
