use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use listscan_ocr::{ListPipeline, OcrBackend, ParsedItem};

use crate::error::AppError;

/// The backend is chosen at startup, so handlers see one erased type.
pub type BoxedPipeline = ListPipeline<Box<dyn OcrBackend>>;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<BoxedPipeline>,
}

#[derive(Serialize)]
struct ItemsResponse {
    items: Vec<ParsedItem>,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/process-image", post(process_image))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Accept one uploaded image and return the aggregated item list.
async fn process_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ItemsResponse>, AppError> {
    let mut data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("malformed multipart body: {e}")))?
    {
        let is_file_field = field.name() == Some("file");
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("failed to read upload: {e}")))?;
        if is_file_field {
            data = Some(bytes);
            break;
        }
        if data.is_none() {
            data = Some(bytes);
        }
    }
    let data = data.ok_or_else(|| AppError::bad_request("missing image upload"))?;

    let items = state.pipeline.process_bytes(&data).await?;
    Ok(Json(ItemsResponse { items }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
