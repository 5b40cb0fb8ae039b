use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use docchat_core::normalize::collapse_whitespace;
use docchat_core::retrieve::join_passages;
use docchat_core::{
    best_passages, build_index, Index, ScoredPassage, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K,
    FALLBACK_ANSWER,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// One uploaded document and its immutable index. Exactly one session is
/// held at a time; uploading a new document evicts the previous one.
struct Session {
    fingerprint: String,
    index: Index,
}

#[derive(Clone, Default)]
pub struct AppState {
    session: Arc<RwLock<Option<Session>>>,
}

#[derive(Deserialize)]
pub struct UploadParams {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub fingerprint: String,
    pub passages: usize,
    pub cached: bool,
}

#[derive(Deserialize)]
pub struct AskParams {
    pub q: String,
    #[serde(default = "default_top_k")]
    pub k: usize,
}
fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Serialize)]
pub struct AskResponse {
    pub query: String,
    pub took_s: f64,
    pub answer: String,
    pub results: Vec<ScoredPassage>,
}

pub fn build_app() -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/document", post(upload_handler))
        .route("/ask", get(ask_handler))
        .route("/status", get(status_handler))
        .route("/passage/:id", get(passage_handler))
        .with_state(AppState::default())
        .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES))
        .layer(cors)
}

pub async fn upload_handler(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: String,
) -> Json<UploadResponse> {
    let text = collapse_whitespace(&body);
    let fingerprint = content_fingerprint(&text);

    let mut guard = state.session.write();
    if let Some(session) = guard.as_ref() {
        if session.fingerprint == fingerprint {
            return Json(UploadResponse {
                fingerprint,
                passages: session.index.passages().len(),
                cached: true,
            });
        }
    }

    let start = Instant::now();
    let index = build_index(&text, params.chunk_size.max(1));
    let passages = index.passages().len();
    tracing::info!(
        %fingerprint,
        passages,
        took_s = start.elapsed().as_secs_f64(),
        "document indexed"
    );
    *guard = Some(Session { fingerprint: fingerprint.clone(), index });
    Json(UploadResponse { fingerprint, passages, cached: false })
}

pub async fn ask_handler(
    State(state): State<AppState>,
    Query(params): Query<AskParams>,
) -> Result<Json<AskResponse>, (StatusCode, String)> {
    let start = Instant::now();
    let guard = state.session.read();
    let session = guard
        .as_ref()
        .ok_or((StatusCode::CONFLICT, "no document uploaded".to_string()))?;

    let k = params.k.clamp(1, 50);
    let (answer, results) = match best_passages(&params.q, &session.index, k) {
        Some(top) => (join_passages(&session.index, &top), top),
        None => (FALLBACK_ANSWER.to_string(), Vec::new()),
    };

    Ok(Json(AskResponse {
        query: params.q,
        took_s: start.elapsed().as_secs_f64(),
        answer,
        results,
    }))
}

pub async fn status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let guard = state.session.read();
    match guard.as_ref() {
        Some(session) => Json(serde_json::json!({
            "loaded": true,
            "fingerprint": session.fingerprint,
            "passages": session.index.passages().len(),
        })),
        None => Json(serde_json::json!({ "loaded": false })),
    }
}

pub async fn passage_handler(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let guard = state.session.read();
    let session = guard
        .as_ref()
        .ok_or((StatusCode::CONFLICT, "no document uploaded".to_string()))?;
    match session.index.passage(id) {
        Some(p) => Ok(Json(serde_json::json!({ "id": p.id, "text": p.raw_text }))),
        None => Err((StatusCode::NOT_FOUND, "no such passage".to_string())),
    }
}

fn content_fingerprint(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
