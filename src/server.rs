//! HTTP transport over the search service.
//!
//! A thin boundary: routes, parameter extraction, and status-code mapping.
//! All search semantics live in [`crate::service`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/search` | Corpus search (`q`, `page`, `per_page`) |
//! | `GET`  | `/search/document` | Within-document search (`q`, `id`, `page`, `per_page`) |
//! | `GET`  | `/documents` | List indexed documents |
//! | `GET`  | `/documents/{id}` | Raw document bytes |
//!
//! # Error Contract
//!
//! Error responses are JSON:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "page must be >= 1" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support browser-based
//! clients.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::error::ShelfError;
use crate::scanner;
use crate::service::SearchService;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    service: Arc<SearchService>,
    library_root: PathBuf,
    extensions: Vec<String>,
}

/// Build the application router. Exposed separately from [`run_server`] so
/// tests can drive the full HTTP surface in-process.
pub fn router(config: &Config, service: Arc<SearchService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState {
        service,
        library_root: config.library.root.clone(),
        extensions: config.library.extensions.clone(),
    };

    Router::new()
        .route("/health", get(handle_health))
        .route("/search", get(handle_search))
        .route("/search/document", get(handle_search_document))
        .route("/documents", get(handle_list_documents))
        .route("/documents/{id}", get(handle_get_document))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server on the configured bind address and runs until the
/// process is terminated.
pub async fn run_server(config: &Config, service: Arc<SearchService>) -> anyhow::Result<()> {
    let app = router(config, service);

    println!("papershelf listening on http://{}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`).
    code: String,
    /// Human-readable error message.
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ShelfError> for AppError {
    fn from(err: ShelfError) -> Self {
        match &err {
            ShelfError::InvalidArgument(_) | ShelfError::InvalidQuery(_) => AppError {
                status: StatusCode::BAD_REQUEST,
                code: "bad_request".to_string(),
                message: err.to_string(),
            },
            ShelfError::NotFound(_) => AppError {
                status: StatusCode::NOT_FOUND,
                code: "not_found".to_string(),
                message: err.to_string(),
            },
            ShelfError::Unreadable { .. } | ShelfError::Index(_) | ShelfError::Scan { .. } => {
                AppError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "internal".to_string(),
                    message: err.to_string(),
                }
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /search ============

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_per_page")]
    per_page: i64,
}

fn default_page() -> i64 {
    1
}
fn default_per_page() -> i64 {
    20
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    let response = state
        .service
        .search_corpus(&params.q, params.page, params.per_page)
        .await?;
    Ok(Json(response).into_response())
}

// ============ GET /search/document ============

#[derive(Deserialize)]
struct DocumentSearchParams {
    q: String,
    id: String,
    #[serde(default = "default_page")]
    page: i64,
    #[serde(default = "default_per_page")]
    per_page: i64,
}

async fn handle_search_document(
    State(state): State<AppState>,
    Query(params): Query<DocumentSearchParams>,
) -> Result<Response, AppError> {
    let response = state
        .service
        .search_document(&params.q, &params.id, params.page, params.per_page)
        .await?;
    Ok(Json(response).into_response())
}

// ============ GET /documents ============

async fn handle_list_documents(State(state): State<AppState>) -> Result<Response, AppError> {
    let documents = state.service.list_documents().await?;
    Ok(Json(documents).into_response())
}

// ============ GET /documents/{id} ============

async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let path = scanner::resolve_document_path(&state.library_root, &id, &state.extensions)?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::from(ShelfError::NotFound(id.clone())))?;

    let content_type = if id.to_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
