use crate::config::{Config, StorageBackend};
use crate::storage::LedgerStore;
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::ToSchema;

pub mod error;
pub mod openapi;
pub mod routes_ledger;
pub mod routes_password;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn LedgerStore>,
}

impl AppContext {
    pub fn new(config: Config, store: Arc<dyn LedgerStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let static_dir = ctx.config.server.static_dir.clone();
    let body_limit = ctx.config.server.max_body_bytes;

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/favicon.ico", get(favicon))
        .route("/favicon.svg", get(favicon))
        .nest("/api", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // SPA fallback: index.html for any path that is not a file
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        }
    }

    app
}

fn api_routes() -> Router<AppContext> {
    routes_password::password_routes()
        .merge(routes_ledger::ledger_routes())
        // Swagger UI at /api/docs
        .merge(openapi::openapi_routes())
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and storage are up", body = HealthResponse),
        (status = 503, description = "Storage unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(ctx): State<AppContext>) -> impl IntoResponse {
    let backend = ctx.store.backend();

    match ctx.store.ping() {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                backend: backend.to_string(),
                database: (backend == StorageBackend::Sqlite).then(|| "connected".to_string()),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(backend = %backend, error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "error".to_string(),
                    backend: backend.to_string(),
                    database: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

/// Serve `<static_dir>/favicon.svg` for both favicon paths.
async fn favicon(State(ctx): State<AppContext>) -> Response {
    let Some(dir) = ctx.config.server.static_dir.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(dir.join("favicon.svg")).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/svg+xml")], bytes).into_response(),
        Err(e) => {
            tracing::debug!("Favicon not available: {}", e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Start the HTTP server and run until a shutdown signal arrives
pub async fn start_server(config: Config, store: Arc<dyn LedgerStore>) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let backend = store.backend();
    let app = create_router(AppContext::new(config, store));

    tracing::info!("Starting server on {} ({} backend)", addr, backend);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
