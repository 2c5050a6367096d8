use axum::{
    Json, Router,
    extract::State,
    handler::Handler,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tn_api_types::AppConfig;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

const SERVICE: &str = "tree-server";

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

#[derive(Clone)]
pub(crate) struct SiteState {
    static_dir: Arc<PathBuf>,
    app_config: Arc<AppConfig>,
}

impl SiteState {
    pub(crate) fn new(static_dir: PathBuf, app_config: AppConfig) -> Self {
        Self {
            static_dir: Arc::new(static_dir),
            app_config: Arc::new(app_config),
        }
    }
}

/// Static files first; unknown page routes fall back to the entry documents.
pub(crate) fn router(state: SiteState) -> Router {
    let static_files =
        ServeDir::new(state.static_dir.as_path()).fallback(spa_fallback.with_state(state.clone()));

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/app-config.json", get(app_config))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Which entry document serves a path that matched no static file.
///
/// Paths whose last segment looks like a file name are real misses.
pub(crate) fn rewrite_target(path: &str) -> Option<&'static str> {
    let last_segment = path.rsplit('/').next().unwrap_or_default();
    if last_segment.contains('.') {
        return None;
    }

    if path.starts_with("/intro") {
        Some("intro.html")
    } else {
        Some("index.html")
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: SERVICE,
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: SERVICE,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn app_config(State(state): State<SiteState>) -> Json<AppConfig> {
    Json(state.app_config.as_ref().clone())
}

async fn spa_fallback(State(state): State<SiteState>, uri: Uri) -> Response {
    let Some(document) = rewrite_target(uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let path = state.static_dir.join(document);
    debug!(from = uri.path(), to = %path.display(), "history fallback");

    match tokio::fs::read(&path).await {
        Ok(body) => Html(body).into_response(),
        Err(err) => {
            error!(%err, path = %path.display(), "entry document unavailable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
