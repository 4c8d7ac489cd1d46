//! # Custom Extractors & Validation
//!
//! Helpers that turn axum's JSON and form rejections into [`AppError`]
//! responses with the standard error body, plus the [`Validate`] trait for
//! request DTOs.

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::{Form, Json};

use crate::error::AppError;

/// Request types that check business rules beyond what serde enforces.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
///
/// ```ignore
/// async fn handler(body: Result<Json<T>, JsonRejection>) -> Result<..., AppError> {
///     let req = extract_json(body)?;
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a URL-encoded form body, mapping rejections to [`AppError::BadRequest`].
pub fn extract_form<T>(result: Result<Form<T>, FormRejection>) -> Result<T, AppError> {
    result
        .map(|Form(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a form body and check it with [`Validate`]. Rule violations are
/// reported as [`AppError::BadRequest`], matching OAuth2's `invalid_request`.
pub fn extract_validated_form<T: Validate>(
    result: Result<Form<T>, FormRejection>,
) -> Result<T, AppError> {
    let value = extract_form(result)?;
    value.validate().map_err(AppError::BadRequest)?;
    Ok(value)
}
