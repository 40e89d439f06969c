use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use listscan_ocr::{PipelineError, PreprocessError};

/// Request failure surfaced to the client as a JSON error body.
///
/// Undecodable uploads are the client's fault (400); everything else in the
/// pipeline is a generic server failure (500). There are no partial results.
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: message.into() }
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        tracing::error!("Error processing image: {err}");
        match &err {
            PipelineError::Preprocess(PreprocessError::Load(_)) => {
                Self::bad_request(err.to_string())
            }
            _ => Self::internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
