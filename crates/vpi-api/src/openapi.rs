//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one document served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Assembled OpenAPI spec for the service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "VPI Auth Service",
        version = "0.1.0",
        description = "User registration, password login issuing bearer tokens, and bearer token resolution.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::users::register,
        crate::routes::users::me,
        crate::routes::token::login,
        crate::routes::health::health,
    ),
    components(schemas(
        crate::routes::users::RegisterRequest,
        crate::routes::users::UserProfile,
        crate::routes::token::LoginForm,
        crate::routes::token::TokenResponse,
        crate::routes::health::HealthResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "users", description = "Registration and profile"),
        (name = "auth", description = "Token issuance"),
        (name = "health", description = "Liveness probe"),
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by protected routes.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/register", "/users/me", "/token", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
