use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::submission::SubmissionError;

/// Structured error body for non-page responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("A submission is in flight")]
    Busy,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            WebError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone())
            }
            WebError::Busy => (
                StatusCode::CONFLICT,
                "BUSY",
                "A diagnosis is already running".to_string(),
            ),
            WebError::Internal(detail) => {
                tracing::error!(detail, "Web internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}

impl From<SubmissionError> for WebError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Busy => WebError::Busy,
            other => WebError::Internal(other.to_string()),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for WebError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        WebError::BadRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn busy_maps_to_conflict() {
        let response = WebError::from(SubmissionError::Busy).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BUSY");
    }

    #[tokio::test]
    async fn internal_hides_detail() {
        let response = WebError::Internal("lock poisoned at state.rs".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }
}
