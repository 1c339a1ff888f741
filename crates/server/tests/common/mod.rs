//! Common test utilities for E2E testing with mocks.
//!
//! The fixture builds the full router in-process over a temporary upload
//! directory. Audio and video conversions go through a `MockTranscoder`;
//! image conversions run for real.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use convertino_core::testing::MockTranscoder;
use convertino_core::{
    Backends, Config, ConversionOrchestrator, FileRegistry, ServerConfig, Storage, StorageConfig,
};

/// Re-export fixtures for test convenience
pub use convertino_core::testing::fixtures;

const BOUNDARY: &str = "convertino-test-boundary";

/// Test fixture for E2E testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_upload() {
///     let fixture = TestFixture::new();
///     let response = fixture.upload("photo.png", &fixtures::rgba_png(8, 8)).await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock transcoder behind the audio and video backends
    pub transcoder: Arc<MockTranscoder>,
    /// Original-file registry shared with the orchestrator
    pub registry: Arc<FileRegistry>,
    /// Temporary directory holding the uploads
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON, or `Null`.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }

    /// Body as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    /// Create a new test fixture with the default upload limit.
    pub fn new() -> Self {
        Self::with_max_upload_bytes(StorageConfig::default().max_upload_bytes)
    }

    /// Create a test fixture with a custom upload limit.
    pub fn with_max_upload_bytes(max_upload_bytes: u64) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            storage: StorageConfig {
                upload_dir: temp_dir.path().to_path_buf(),
                max_upload_bytes,
            },
            ..Default::default()
        };

        let transcoder = Arc::new(MockTranscoder::new());
        let registry = Arc::new(FileRegistry::new());
        let orchestrator = Arc::new(ConversionOrchestrator::new(
            Storage::new(temp_dir.path()),
            Arc::clone(&registry),
            Backends::with_transcoder(transcoder.clone()),
            max_upload_bytes,
        ));

        let state = Arc::new(convertino_server::state::AppState::new(config, orchestrator));
        let router = convertino_server::api::create_router(state);

        Self {
            router,
            transcoder,
            registry,
            temp_dir,
        }
    }

    pub fn upload_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn stored_path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Names currently in the upload directory, sorted.
    pub fn stored_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.temp_dir.path())
            .expect("Failed to list upload dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Upload directory listing once the converted file released by a finished
    /// download has been removed in the background.
    pub async fn settled_files(&self, expected: usize) -> Vec<String> {
        for _ in 0..100 {
            if self.stored_files().len() <= expected {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.stored_files()
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Upload `data` as the multipart `file` field.
    pub async fn upload(&self, filename: &str, data: &[u8]) -> TestResponse {
        self.post_multipart("/converter", Some(("file", filename, data)))
            .await
    }

    /// POST a multipart body with at most one file field.
    pub async fn post_multipart(
        &self,
        path: &str,
        file: Option<(&str, &str, &[u8])>,
    ) -> TestResponse {
        let mut body = Vec::new();
        match file {
            Some((field, filename, data)) => {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!(
                        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n"
                    )
                    .as_bytes(),
                );
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Request conversion of a stored file.
    pub async fn convert(&self, filename: &str, output_format: &str) -> TestResponse {
        self.post_form(
            &format!("/convert/{}", filename),
            &format!("output_format={}", output_format),
        )
        .await
    }

    /// POST an urlencoded form body.
    pub async fn post_form(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request and collect the whole body.
    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            bytes,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status,
            $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text()
        );
    };
}
