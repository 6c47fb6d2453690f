use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::scrape::ScrapeError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Scrape(e) => scrape_parts(e),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

fn scrape_parts(err: &ScrapeError) -> (StatusCode, &'static str, String) {
    let (status, code) = match err {
        ScrapeError::Configuration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR"),
        ScrapeError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ScrapeError::ServiceUnavailable(_) => (StatusCode::BAD_GATEWAY, "SERVICE_UNAVAILABLE"),
        ScrapeError::MalformedResponse(_) => (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE"),
        ScrapeError::UpstreamJobFailed(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_JOB_FAILED"),
        ScrapeError::TimedOut { .. } => (StatusCode::GATEWAY_TIMEOUT, "SCRAPE_TIMEOUT"),
        ScrapeError::Cancelled { .. } => (StatusCode::SERVICE_UNAVAILABLE, "SCRAPE_CANCELLED"),
    };
    if status.is_server_error() {
        tracing::error!("Scrape error: {err}");
    }
    (status, code, err.to_string())
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::types::RunStatus;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_client_errors_map_to_4xx() {
        assert_eq!(
            status_of(AppError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ScrapeError::InvalidInput("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_scrape_errors_map_to_gateway_statuses() {
        assert_eq!(
            status_of(ScrapeError::Configuration("no token".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ScrapeError::ServiceUnavailable("down".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ScrapeError::UpstreamJobFailed(RunStatus::Failed).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ScrapeError::TimedOut { run_id: None }.into()),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_upstream_failure_message_names_status() {
        let (_, code, message) =
            AppError::from(ScrapeError::UpstreamJobFailed(RunStatus::Aborted)).parts();
        assert_eq!(code, "UPSTREAM_JOB_FAILED");
        assert!(message.contains("ABORTED"));
    }
}
