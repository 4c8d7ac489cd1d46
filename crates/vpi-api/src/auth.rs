//! # Bearer Authentication
//!
//! [`CurrentUser`] resolves `Authorization: Bearer <token>` to the stored
//! [`User`] the token names. Handlers take it as an argument; there is no
//! separate auth middleware.
//!
//! Resolution steps:
//!
//! 1. Parse the header. Missing header, wrong scheme or empty token fail.
//! 2. Validate the token signature, expiry and subject.
//! 3. Parse the subject as an email and look it up in the store.
//!
//! Any failure in steps 1-3 is a 401 with the same body and a
//! `WWW-Authenticate: Bearer` challenge. The concrete reason is logged at
//! `warn`. A store outage during step 3 is a 503 instead.

use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use vpi_core::{Email, User};

use crate::error::AppError;
use crate::state::AppState;

/// The authenticated user behind a request's bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).map_err(|reason| {
            tracing::warn!(reason, "bearer authentication rejected");
            AppError::invalid_token()
        })?;

        let subject = state.tokens.validate(token).map_err(|err| {
            tracing::warn!(reason = %err, "bearer authentication rejected");
            AppError::from(err)
        })?;

        let email = Email::new(&subject).map_err(|err| {
            tracing::warn!(reason = %err, "bearer authentication rejected: subject is not an email");
            AppError::invalid_token()
        })?;

        match state.users.find_by_email(&email).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                tracing::warn!(subject = %email, "bearer authentication rejected: no such user");
                Err(AppError::invalid_token())
            }
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme name is matched case-insensitively. Returns a short reason on
/// failure, suitable for logs only.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or("missing authorization header")?
        .to_str()
        .map_err(|_| "authorization header is not valid ASCII")?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or("authorization header has no credentials")?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("authorization scheme is not Bearer");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("empty bearer token");
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn parses_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(bearer_token(&headers("bearer tok")), Ok("tok"));
        assert_eq!(bearer_token(&headers("BEARER tok")), Ok("tok"));
    }

    #[test]
    fn missing_header_is_rejected() {
        assert!(bearer_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert!(bearer_token(&headers("Basic dXNlcjpwYXNz")).is_err());
        assert!(bearer_token(&headers("Token abc")).is_err());
    }

    #[test]
    fn empty_or_bare_scheme_is_rejected() {
        assert!(bearer_token(&headers("Bearer")).is_err());
        assert!(bearer_token(&headers("Bearer    ")).is_err());
    }
}
