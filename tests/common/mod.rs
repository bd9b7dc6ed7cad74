//! Shared test harness for integration tests.
//!
//! [`TestHarness`] builds the full router over either storage backend. The
//! files backend and the static directory live in a temporary directory that
//! is removed when the harness is dropped.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use liji::config::{Config, StorageBackend};
use liji::server::{create_router, AppContext};
use liji::storage::{JsonFileStore, LedgerStore, SqliteStore};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const FAVICON_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#;
pub const INDEX_HTML: &str = "<!doctype html><title>liji</title>";

pub struct TestHarness {
    pub ctx: AppContext,
    pub dir: TempDir,
}

impl TestHarness {
    pub fn new(backend: StorageBackend) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");

        let static_dir = dir.path().join("public");
        std::fs::create_dir_all(&static_dir).expect("failed to create static dir");
        std::fs::write(static_dir.join("favicon.svg"), FAVICON_SVG).unwrap();
        std::fs::write(static_dir.join("index.html"), INDEX_HTML).unwrap();

        let mut config = Config::default();
        config.server.static_dir = Some(static_dir);
        config.storage.backend = backend;
        config.storage.data_dir = dir.path().join("data");

        let store: Arc<dyn LedgerStore> = match backend {
            StorageBackend::Sqlite => {
                Arc::new(SqliteStore::in_memory().expect("failed to create in-memory store"))
            }
            StorageBackend::Files => {
                std::fs::create_dir_all(&config.storage.data_dir).unwrap();
                Arc::new(JsonFileStore::new(&config.storage.data_dir))
            }
        };

        Self {
            ctx: AppContext::new(config, store),
            dir,
        }
    }

    /// Harness over a caller-provided store, for tests that inspect it directly.
    pub fn with_store(store: Arc<dyn LedgerStore>) -> Self {
        let mut harness = Self::new(store.backend());
        harness.ctx = AppContext::new((*harness.ctx.config).clone(), store);
        harness
    }

    pub fn sqlite() -> Self {
        Self::new(StorageBackend::Sqlite)
    }

    pub fn files() -> Self {
        Self::new(StorageBackend::Files)
    }

    /// Both backends, for tests that must hold for either.
    pub fn all() -> Vec<Self> {
        vec![Self::sqlite(), Self::files()]
    }

    pub fn data_dir(&self) -> PathBuf {
        self.ctx.config.storage.data_dir.clone()
    }

    pub fn router(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response.into_body()).await)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .router()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response.into_body()).await)
    }

    pub fn label(&self) -> String {
        self.ctx.store.backend().to_string()
    }
}

/// Parse a response body as JSON; non-JSON bodies become `Value::Null`.
pub async fn body_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
