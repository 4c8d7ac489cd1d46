//! # User Routes
//!
//! - `POST /register` — create an account
//! - `GET  /users/me` — profile of the bearer token's user

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use vpi_core::{validate_full_name, validate_password, Email, NewUser, User};
use zeroize::Zeroizing;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

/// Registration request body.
///
/// No `Debug`: the struct holds a plaintext password.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub full_name: String,
    /// 8 to 1024 bytes.
    pub password: String,
}

/// A user as returned to clients. Has no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub is_active: bool,
    pub is_superuser: bool,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            email: user.email.to_string(),
            full_name: user.full_name.clone(),
            is_active: user.is_active,
            is_superuser: user.is_superuser,
        }
    }
}

/// Build the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/users/me", get(me))
}

/// POST /register — Create a user account.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserProfile),
        (status = 400, description = "Malformed JSON body", body = crate::error::ErrorBody),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid email, name or password", body = crate::error::ErrorBody),
        (status = 503, description = "User store unavailable", body = crate::error::ErrorBody),
    ),
    tag = "users"
)]
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let req = extract_json(body)?;
    let password = Zeroizing::new(req.password);

    let email = Email::new(&req.email)?;
    let full_name = validate_full_name(&req.full_name)?;
    validate_password(&password)?;

    let password_hash = state.hash_password(password).await?;
    let user = state
        .users
        .insert(NewUser {
            email,
            full_name,
            password_hash,
        })
        .await
        .map_err(|err| {
            tracing::info!(reason = %err, "registration rejected");
            AppError::from(err)
        })?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

/// GET /users/me — Profile of the authenticated user.
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserProfile),
        (status = 401, description = "Missing, invalid or expired token", body = crate::error::ErrorBody),
        (status = 503, description = "User store unavailable", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(UserProfile::from(&user))
}
