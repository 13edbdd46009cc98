//! JSON HTTP API.
//!
//! Serves catalog lookups and progress updates over the same [`Dex`] the
//! console uses, plus the bundled web page.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/api/progress` | Seen / caught totals |
//! | `GET`  | `/api/list?filter=all\|caught\|seen\|encountered` | Records with progress flags |
//! | `GET`  | `/api/search?id=25` or `?q=pikachu` | One record, by id or by name |
//! | `POST` | `/api/encounter?id=25` | Mark a record as seen |
//! | `POST` | `/api/catch?id=25` | Mark a record as caught |
//! | `POST` | `/api/reset?id=25` | Reset one record |
//! | `POST` | `/api/reset-all` | Reset all progress |
//! | `GET`  | `/`, `/index.html` | The configured HTML page |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "no record with id 152" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `persist_error` (500).
//!
//! Every successful mutation is saved before the response is sent. Mutations
//! and their saves run on the blocking thread pool.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the page can be opened
//! from disk or another host.

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::session::{Action, Dex};
use crate::views::{list_records, ListFilter, ProgressSummary, RecordView};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    dex: Arc<Dex>,
    /// Page served at `/` and `/index.html`.
    page: Option<Arc<PathBuf>>,
}

/// Loads the catalog and progress, then serves the API on `[server].bind`.
///
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let dex = Arc::new(Dex::open(config)?);
    let app = router(dex, config.server.page.clone());

    let bind_addr = &config.server.bind;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    println!("Pokedex server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the API router over an existing [`Dex`].
pub fn router(dex: Arc<Dex>, page: Option<PathBuf>) -> Router {
    let state = AppState {
        dex,
        page: page.map(Arc::new),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/progress", get(handle_progress))
        .route("/api/list", get(handle_list))
        .route("/api/search", get(handle_search))
        .route("/api/encounter", post(handle_encounter))
        .route("/api/catch", post(handle_catch))
        .route("/api/reset", post(handle_reset))
        .route("/api/reset-all", post(handle_reset_all))
        .route("/", get(handle_page))
        .route("/index.html", get(handle_page))
        .route("/health", get(handle_health))
        .fallback(handle_fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn persist_error(err: anyhow::Error) -> AppError {
    error!("failed to save progress: {:#}", err);
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "persist_error",
        message: format!("failed to save progress: {}", err),
    }
}

/// Parses the `id` query parameter. Ids that cannot name a record (negative
/// or too large) are reported as not found rather than malformed.
fn parse_id(raw: Option<&str>) -> Result<u32, AppError> {
    let raw = raw.ok_or_else(|| bad_request("missing id"))?;
    let id: i64 = raw
        .trim()
        .parse()
        .map_err(|_| bad_request(format!("invalid id: {}", raw)))?;
    u32::try_from(id).map_err(|_| not_found(format!("no record with id {}", id)))
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

// ============ GET /api/progress ============

async fn handle_progress(State(state): State<AppState>) -> Json<ProgressSummary> {
    Json(state.dex.read(ProgressSummary::new))
}

// ============ GET /api/list ============

#[derive(Deserialize)]
struct ListParams {
    filter: Option<String>,
}

async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RecordView>>, AppError> {
    let filter = match params.filter.as_deref() {
        Some(raw) => raw.parse::<ListFilter>().map_err(bad_request)?,
        None => ListFilter::All,
    };
    let catalog = state.dex.catalog();
    Ok(Json(
        state
            .dex
            .read(|progress| list_records(catalog, progress, filter)),
    ))
}

// ============ GET /api/search ============

#[derive(Deserialize)]
struct SearchParams {
    id: Option<String>,
    q: Option<String>,
}

/// Looks up one record. `id` takes precedence over `q` when both are given.
async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<RecordView>, AppError> {
    let catalog = state.dex.catalog();
    let record = match (params.id.as_deref(), params.q.as_deref()) {
        (Some(raw), _) => {
            let id = parse_id(Some(raw))?;
            catalog
                .lookup_by_id(id)
                .ok_or_else(|| not_found(format!("no record with id {}", id)))?
        }
        (None, Some(name)) => {
            let name = name.trim();
            catalog
                .lookup_by_name(name)
                .ok_or_else(|| not_found(format!("no record named {}", name)))?
        }
        (None, None) => return Err(bad_request("expected an id or q parameter")),
    };

    Ok(Json(
        state
            .dex
            .read(|progress| RecordView::new(record, progress)),
    ))
}

// ============ POST /api/encounter, /api/catch, /api/reset ============

#[derive(Deserialize)]
struct IdParams {
    id: Option<String>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

async fn handle_encounter(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<Json<SuccessResponse>, AppError> {
    apply(state, Action::Encounter, params).await
}

async fn handle_catch(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<Json<SuccessResponse>, AppError> {
    apply(state, Action::Catch, params).await
}

async fn handle_reset(
    State(state): State<AppState>,
    Query(params): Query<IdParams>,
) -> Result<Json<SuccessResponse>, AppError> {
    apply(state, Action::Reset, params).await
}

async fn apply(
    state: AppState,
    action: Action,
    params: IdParams,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = parse_id(params.id.as_deref())?;
    if state.dex.catalog().lookup_by_id(id).is_none() {
        return Err(not_found(format!("no record with id {}", id)));
    }

    let changed = run_blocking(&state.dex, move |dex| dex.apply(action, id)).await?;
    if changed {
        info!(?action, id, "progress updated");
    }
    Ok(Json(SuccessResponse { success: true }))
}

// ============ POST /api/reset-all ============

async fn handle_reset_all(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, AppError> {
    run_blocking(&state.dex, |dex| dex.reset_all()).await?;
    info!("all progress reset");
    Ok(Json(SuccessResponse { success: true }))
}

/// Runs a progress mutation, and the save that follows it, on the blocking
/// pool. The lock is taken there, never on a runtime worker.
async fn run_blocking<T, F>(dex: &Arc<Dex>, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&Dex) -> anyhow::Result<T> + Send + 'static,
{
    let dex = Arc::clone(dex);
    tokio::task::spawn_blocking(move || f(&dex))
        .await
        .context("progress task panicked")
        .and_then(|saved| saved)
        .map_err(persist_error)
}

// ============ GET / ============

async fn handle_page(State(state): State<AppState>) -> Response {
    let Some(path) = state.page else {
        return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
    };
    match tokio::fs::read_to_string(path.as_path()).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            info!(path = %path.display(), "page unavailable: {}", e);
            (StatusCode::NOT_FOUND, "404 Not Found").into_response()
        }
    }
}

async fn handle_fallback() -> AppError {
    not_found("no such endpoint")
}
