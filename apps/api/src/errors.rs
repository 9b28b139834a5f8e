use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::access::gate::{AccessDecision, ReasonCode};
use crate::llm_client::LlmError;
use crate::mailer::MailError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing caller-supplied fields. Rejected before any gate runs.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A gate said no. Carries the decision so clients can render a specific message.
    #[error("Access denied: {0:?}")]
    Denied(AccessDecision),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Email error: {0}")]
    Mail(#[from] MailError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Denied(decision) => return denial_response(decision),
            AppError::InvalidInput(msg) => (
                StatusCode::BAD_REQUEST,
                ReasonCode::InvalidInput.as_str(),
                msg.clone(),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Mail(e) => {
                tracing::error!("Email error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EMAIL_ERROR",
                    "Your results could not be emailed".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// 429 + `Retry-After` for quota denials, 403 for location denials.
fn denial_response(decision: &AccessDecision) -> Response {
    let reason = decision.reason_code.unwrap_or(ReasonCode::RateLimited);
    let (status, message) = match reason {
        ReasonCode::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests, please try again later",
        ),
        ReasonCode::OutsideServiceArea => (
            StatusCode::FORBIDDEN,
            "This service is not available in your area",
        ),
        ReasonCode::GeoUnavailable => (
            StatusCode::FORBIDDEN,
            "We could not verify your location",
        ),
        ReasonCode::InvalidInput => (StatusCode::BAD_REQUEST, "Invalid input"),
    };

    let body = Json(json!({
        "error": {
            "code": reason.as_str(),
            "message": message,
            "decision": decision,
        }
    }));

    let mut response = (status, body).into_response();
    if reason == ReasonCode::RateLimited {
        response.headers_mut().insert(
            header::RETRY_AFTER,
            HeaderValue::from(decision.retry_after_secs()),
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let response = AppError::Denied(AccessDecision::rate_limited(12_001)).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "13");

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
        assert_eq!(body["error"]["decision"]["reset_in_ms"], 12_001);
    }

    #[tokio::test]
    async fn test_geo_denials_are_forbidden() {
        for reason in [ReasonCode::GeoUnavailable, ReasonCode::OutsideServiceArea] {
            let response = AppError::Denied(AccessDecision::deny(reason)).into_response();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
            assert!(response.headers().get(header::RETRY_AFTER).is_none());
            assert_eq!(body_json(response).await["error"]["code"], reason.as_str());
        }
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let response = AppError::InvalidInput("email is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
        assert_eq!(body["error"]["message"], "email is required");
    }

    #[tokio::test]
    async fn test_provider_errors_hide_details() {
        let response = AppError::Llm(LlmError::EmptyContent).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["message"], "An AI processing error occurred");
    }
}
