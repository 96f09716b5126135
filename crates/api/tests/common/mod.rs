//! Shared helpers for API integration tests.
//!
//! Every test gets an in-memory part store and a throwaway uploads
//! directory, wired through the same router builder as production.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use piniplm_api::config::ServerConfig;
use piniplm_api::router::build_app_router;
use piniplm_api::state::AppState;
use piniplm_core::part::NewPart;
use piniplm_core::types::PartId;
use piniplm_store::{FileStorage, PartStore};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "piniplm-test-boundary";

/// A router plus direct access to its state. Dropping it removes the
/// uploads directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _uploads: TempDir,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(uploads: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        data_file: uploads.path().join("data.json"),
        uploads_dir: uploads.path().to_path_buf(),
        max_upload_bytes: 1024 * 1024,
    }
}

pub async fn build_test_app() -> TestApp {
    let uploads = tempfile::tempdir().expect("create uploads dir");
    let config = test_config(&uploads);
    let files = FileStorage::open(&config.uploads_dir)
        .await
        .expect("open file storage");

    let state = AppState {
        store: Arc::new(PartStore::in_memory()),
        files: Arc::new(files),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        _uploads: uploads,
    }
}

impl TestApp {
    /// Create a part directly in the store, bypassing upload.
    pub async fn seed_part(&self, name: &str) -> PartId {
        self.state
            .store
            .create_part(NewPart {
                name: name.into(),
                file: None,
            })
            .await
            .expect("seed part")
            .id
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> Response<Body> {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send_json(Method::POST, uri, body).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send_json(Method::PUT, uri, body).await
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: Value) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// POST a single-file multipart upload.
    pub async fn upload(&self, file_name: &str, bytes: &[u8]) -> Response<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        self.send_multipart(body).await
    }

    pub async fn send_multipart(&self, body: Vec<u8>) -> Response<Body> {
        let request = Request::post("/api/v1/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}
