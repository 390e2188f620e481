//! HTTP surface: `POST /upload_pdfs`, `POST /ask_question`, `GET /health`.
//!
//! Handlers are thin: they decode the request, call [`QaService`], and map
//! [`PdfQaError`] onto a status code plus a `{"detail": "..."}` body.

use crate::error::PdfQaError;
use crate::service::{QaService, UploadedDocument};
use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Multipart field name carrying the PDF parts.
pub const FILES_FIELD: &str = "files";

/// Acknowledgement returned by a successful upload.
pub const UPLOAD_ACK: &str = "PDFs uploaded, saved locally, and content extracted.";

/// Build the application router around a shared service.
///
/// `max_upload_bytes` bounds the body of `/upload_pdfs` only; question bodies
/// keep axum's default limit.
pub fn router(service: Arc<QaService>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/upload_pdfs",
            post(upload_pdfs).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/ask_question", post(ask_question))
        .route("/health", get(health))
        .layer(CorsLayer::very_permissive())
        .with_state(service)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

async fn upload_pdfs(
    State(service): State<Arc<QaService>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut documents = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        documents.push(UploadedDocument::new(filename, bytes.to_vec()));
    }

    info!(file_count = documents.len(), "Received upload request");
    service.ingest(documents).await?;

    Ok(Json(UploadResponse {
        message: UPLOAD_ACK.to_string(),
    }))
}

async fn ask_question(
    State(service): State<Arc<QaService>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(request) = payload?;
    let answer = service.answer(request.question.as_deref()).await?;
    Ok(Json(AskResponse { answer }))
}

/// Liveness probe: always 200 while the process is serving.
async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

// ── Errors ───────────────────────────────────────────────────────────────

/// An error ready to be rendered as an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl From<PdfQaError> for ApiError {
    fn from(err: PdfQaError) -> Self {
        if err.is_client_error() {
            Self::BadRequest(err.to_string())
        } else {
            error!("Request failed: {:?}", err);
            Self::Internal(err.to_string())
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            Self::PayloadTooLarge(detail) => (StatusCode::PAYLOAD_TOO_LARGE, detail),
            Self::Internal(detail) => (StatusCode::INTERNAL_SERVER_ERROR, detail),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
