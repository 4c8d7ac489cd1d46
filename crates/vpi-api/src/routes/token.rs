//! # Token Route
//!
//! `POST /token` — OAuth2 resource-owner password grant. The form carries
//! `username` (the email) and `password`; a successful login returns a signed
//! access token.
//!
//! Unknown email, malformed email and wrong password all produce the same
//! 401 body. The unknown-email path verifies against a decoy hash so its
//! latency matches. A password longer than `MAX_PASSWORD_BYTES` is never
//! hashed; it takes the decoy path and fails the same way.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use vpi_core::{AuthError, Email, MAX_PASSWORD_BYTES};
use zeroize::Zeroizing;

use crate::error::AppError;
use crate::extractors::{extract_validated_form, Validate};
use crate::state::AppState;

/// OAuth2 password-grant form. Unknown fields such as `scope` and
/// `client_id` are accepted and ignored.
#[derive(Deserialize, ToSchema)]
pub struct LoginForm {
    /// The account email.
    pub username: String,
    pub password: String,
    /// Must be `password` when present.
    #[serde(default)]
    pub grant_type: Option<String>,
}

impl Validate for LoginForm {
    fn validate(&self) -> Result<(), String> {
        match self.grant_type.as_deref() {
            None | Some("password") => Ok(()),
            Some(other) => Err(format!("unsupported grant_type '{other}'")),
        }
    }
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`.
    #[schema(example = "bearer")]
    pub token_type: String,
}

/// Build the token router.
pub fn router() -> Router<AppState> {
    Router::new().route("/token", post(login))
}

/// POST /token — Exchange email and password for an access token.
#[utoipa::path(
    post,
    path = "/token",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login succeeded", body = TokenResponse),
        (status = 400, description = "Malformed form or unsupported grant type", body = crate::error::ErrorBody),
        (status = 401, description = "Incorrect email or password", body = crate::error::ErrorBody),
        (status = 503, description = "User store unavailable", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn login(
    State(state): State<AppState>,
    body: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let form = extract_validated_form(body)?;
    let oversized = form.password.len() > MAX_PASSWORD_BYTES;
    let password = Zeroizing::new(form.password);
    let password = if oversized { Zeroizing::new(String::new()) } else { password };

    let user = match Email::new(&form.username) {
        Ok(email) if !oversized => state.users.find_by_email(&email).await?,
        _ => None,
    };

    let Some(user) = state.verify_password(password, user).await? else {
        tracing::info!("login rejected: incorrect email or password");
        return Err(AuthError::InvalidCredentials.into());
    };

    let access_token = state.tokens.issue_default(user.email.as_str())?;
    tracing::info!(user_id = %user.id, "access token issued");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(grant_type: Option<&str>) -> LoginForm {
        LoginForm {
            username: "lee@example.com".into(),
            password: "hunter22".into(),
            grant_type: grant_type.map(String::from),
        }
    }

    #[test]
    fn grant_type_may_be_absent_or_password() {
        assert!(form(None).validate().is_ok());
        assert!(form(Some("password")).validate().is_ok());
    }

    #[test]
    fn other_grant_types_are_rejected() {
        assert!(form(Some("client_credentials")).validate().is_err());
        assert!(form(Some("")).validate().is_err());
    }
}
