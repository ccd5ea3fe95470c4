use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use medassist_core::error::CoreError;
use medassist_storage::error::StorageError;
use medassist_transcribe::error::TranscribeError;
use medassist_vision::error::VisionError;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    PayloadTooLarge(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl ApiError {
    /// Map an extractor rejection, keeping "too large" distinct from other
    /// malformed input.
    fn from_rejection(status: StatusCode, body_text: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(format!(
                "request body is too large, uploads are limited to {} MB",
                crate::MAX_UPLOAD_BYTES / (1024 * 1024)
            ))
        } else {
            ApiError::BadRequest(body_text)
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::from_rejection(e.status(), e.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        ApiError::from_rejection(e.status(), e.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(e: MultipartRejection) -> Self {
        ApiError::from_rejection(e.status(), e.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::from_rejection(e.status(), e.body_text())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { key } => ApiError::NotFound(format!("object not found: {key}")),
            StorageError::PreconditionFailed { .. } => {
                ApiError::Conflict("record was modified concurrently, please retry".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<VisionError> for ApiError {
    fn from(e: VisionError) -> Self {
        ApiError::BadRequest(format!("Image analysis failed: {e}"))
    }
}

impl From<TranscribeError> for ApiError {
    fn from(e: TranscribeError) -> Self {
        match e {
            TranscribeError::UnsupportedFormat(_) | TranscribeError::EmptyAudio => {
                ApiError::BadRequest(format!("Voice transcription failed: {e}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_statuses() {
        let not_found: ApiError = StorageError::NotFound { key: "k".into() }.into();
        assert!(matches!(not_found, ApiError::NotFound(_)));

        let conflict: ApiError = StorageError::PreconditionFailed { key: "k".into() }.into();
        assert!(matches!(conflict, ApiError::Conflict(_)));

        let internal: ApiError = StorageError::GetObject("boom".into()).into();
        assert!(matches!(internal, ApiError::Internal(_)));
    }

    #[test]
    fn caption_failures_are_bad_requests() {
        match ApiError::from(VisionError::MissingApiKey) {
            ApiError::BadRequest(msg) => assert!(msg.starts_with("Image analysis failed: ")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn oversized_bodies_are_payload_too_large() {
        let err = ApiError::from_rejection(StatusCode::PAYLOAD_TOO_LARGE, "length limit".into());
        assert!(matches!(err, ApiError::PayloadTooLarge(_)));
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);

        let err = ApiError::from_rejection(StatusCode::UNPROCESSABLE_ENTITY, "missing field".into());
        assert!(matches!(err, ApiError::BadRequest(msg) if msg == "missing field"));
    }

    #[test]
    fn internal_errors_are_masked() {
        let response = ApiError::Internal("secret detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
