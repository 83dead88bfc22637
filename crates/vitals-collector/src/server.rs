//! HTTP server implementation using axum.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::State;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use vitals_core::Published;
use vitals_telemetry::Metrics;

use crate::config::CollectorConfig;
use crate::error::{CollectorError, CollectorResult};
use crate::ingest::IngestionReconciler;
use crate::publisher::SnapshotPublisher;
use crate::store::SnapshotStore;

/// Shared application state for axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    reconciler: IngestionReconciler,
    publisher: SnapshotPublisher,
}

impl AppState {
    pub fn new(store: SnapshotStore) -> Self {
        Self {
            reconciler: IngestionReconciler::new(store.clone()),
            publisher: SnapshotPublisher::new(store),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusBody {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Create the axum router.
///
/// With `static_dir`, unmatched paths are served from it and fall back to
/// its `index.html` for HTML clients.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let index = static_dir.map(|dir| dir.join("index.html"));
    let spa = move |headers: HeaderMap| spa_fallback(headers, index.clone());

    let router = Router::new()
        .route("/health", get(health))
        .route("/api/telemetry", get(get_telemetry).post(post_telemetry))
        .route("/metrics", get(metrics))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir).fallback(spa.into_service())),
        None => router.fallback(spa),
    };

    router.layer(CorsLayer::permissive())
}

async fn health() -> Json<StatusBody> {
    Json(StatusBody { status: "ok" })
}

/// Current snapshot, or the waiting sentinel.
async fn get_telemetry(State(state): State<AppState>) -> Json<Published> {
    Json(state.publisher.publish())
}

/// Ingest one telemetry message.
///
/// The raw body is taken so that non-JSON input gets the same 400 as
/// non-object JSON.
async fn post_telemetry(State(state): State<AppState>, body: Bytes) -> Response {
    match state.reconciler.ingest_bytes(&body) {
        Ok(_) => Json(StatusBody { status: "received" }).into_response(),
        Err(e) => {
            Metrics::ingest("invalid");
            warn!(error = %e, "Rejected telemetry payload");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "Invalid payload",
                }),
            )
                .into_response()
        }
    }
}

/// Prometheus text exposition.
async fn metrics() -> Response {
    match Metrics::gather_text() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Catch-all for unknown paths.
async fn spa_fallback(headers: HeaderMap, index: Option<PathBuf>) -> Response {
    if !accepts_html(&headers) {
        return (StatusCode::NOT_FOUND, Json(ErrorBody { error: "Not found" })).into_response();
    }

    let page = match index {
        Some(path) => tokio::fs::read_to_string(path).await.ok(),
        None => None,
    };
    match page {
        Some(html) => Html(html).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            "Client not built or found. Build the dashboard client into the static directory.",
        )
            .into_response(),
    }
}

/// Whether the `Accept` header admits an HTML response. No header admits anything.
fn accepts_html(headers: &HeaderMap) -> bool {
    let Some(accept) = headers.get(header::ACCEPT) else {
        return true;
    };
    let Ok(accept) = accept.to_str() else {
        return false;
    };
    accept.split(',').any(|part| {
        let media = part.split(';').next().unwrap_or("").trim();
        matches!(media, "text/html" | "text/*" | "*/*")
    })
}

/// Bind the collector's listen address (all interfaces).
pub async fn bind(config: &CollectorConfig) -> CollectorResult<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    TcpListener::bind(addr)
        .await
        .map_err(|source| CollectorError::Bind { addr, source })
}

/// Serve the collector on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    store: SnapshotStore,
    config: &CollectorConfig,
    shutdown: F,
) -> CollectorResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(AppState::new(store), config.static_dir.as_deref());

    let addr = listener.local_addr()?;
    info!(%addr, static_dir = ?config.static_dir, "Collector listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Collector stopped");
    Ok(())
}

/// Run the collector HTTP server.
pub async fn run_server<F>(
    store: SnapshotStore,
    config: CollectorConfig,
    shutdown: F,
) -> CollectorResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(&config).await?;
    serve(listener, store, &config, shutdown).await
}
