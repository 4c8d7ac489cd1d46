//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps the [`AuthError`] taxonomy, validation failures and store failures to
//! HTTP status codes with a JSON body `{"error": {"code", "message"}}`.
//!
//! Every token failure produces the same 401 body, and so does every login
//! failure. The specific reason is logged, never returned.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use vpi_core::{AuthError, ValidationError};
use vpi_crypto::{CredentialError, SigningError};

use crate::store::StoreError;

/// Message returned for every failed bearer resolution.
pub const INVALID_TOKEN_MESSAGE: &str = "could not validate credentials";

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "CONFLICT", "UNAUTHORIZED").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failure (401). Carries the client-facing message.
    #[error("{0}")]
    Unauthorized(String),

    /// Conflict with an existing resource (409).
    #[error("{0}")]
    Conflict(String),

    /// A dependency is unreachable (503). Message is logged but not returned.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// The 401 returned for any failed bearer resolution.
    pub fn invalid_token() -> Self {
        Self::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
    }

    /// Return the HTTP status code and machine-readable error code.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            Self::ServiceUnavailable(_) => {
                tracing::error!(error = %self, "dependency unavailable");
                "Service temporarily unavailable".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        if err.is_token_error() {
            return Self::invalid_token();
        }
        match err {
            AuthError::DuplicateEmail => Self::Conflict(err.to_string()),
            AuthError::StoreUnavailable(detail) => Self::ServiceUnavailable(detail),
            other => Self::Unauthorized(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidRecord(detail) => Self::Internal(detail),
            other => AuthError::from(other).into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<SigningError> for AppError {
    fn from(err: SigningError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_of(err: AppError) -> (StatusCode, Option<HeaderValue>, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let www = response.headers().get(header::WWW_AUTHENTICATE).cloned();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, www, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (
                AppError::Validation("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT, "CONFLICT"),
            (
                AppError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err:?}");
        }
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let err = AppError::from(AuthError::DuplicateEmail);
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[test]
    fn every_token_error_collapses_to_one_message() {
        for kind in [
            AuthError::InvalidSignature,
            AuthError::Malformed,
            AuthError::Expired,
            AuthError::MissingSubject,
        ] {
            match AppError::from(kind) {
                AppError::Unauthorized(msg) => assert_eq!(msg, INVALID_TOKEN_MESSAGE),
                other => panic!("expected Unauthorized, got {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_record_is_internal() {
        let err = AppError::from(StoreError::InvalidRecord("row 1".into()));
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        let err = AppError::from(StoreError::Unavailable("refused".into()));
        assert_eq!(err.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unauthorized_carries_bearer_challenge() {
        let (status, www, body) = body_of(AppError::from(AuthError::InvalidCredentials)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(www.unwrap(), "Bearer");
        assert_eq!(body.error.message, "incorrect email or password");
    }

    #[tokio::test]
    async fn internal_detail_is_hidden() {
        let (_, www, body) =
            body_of(AppError::Internal("password=hunter2 leaked".into())).await;
        assert!(www.is_none());
        assert!(!body.error.message.contains("hunter2"));
    }

    #[tokio::test]
    async fn store_detail_is_hidden() {
        let (status, _, body) = body_of(AppError::from(AuthError::StoreUnavailable(
            "connection refused at 10.0.0.5".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.error.message.contains("10.0.0.5"));
    }
}
