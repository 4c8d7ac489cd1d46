//! # Token Service
//!
//! Access tokens are compact JWTs signed with a symmetric HMAC secret:
//!
//! ```text
//! base64url(header) . base64url({"sub": email, "iat": secs, "exp": secs}) . base64url(hmac)
//! ```
//!
//! A token is valid iff its signature matches the service secret and its
//! `exp` is strictly after the verification time. Nothing is stored server
//! side; rotating the secret is the only way to invalidate issued tokens.
//!
//! ## Expiry granularity
//!
//! `exp` is whole seconds. For a positive TTL the exact deadline
//! `now + ttl` is rounded up to the next whole second, so a token is always
//! valid immediately after issuance and outlives its TTL by less than one
//! second. A zero or negative TTL yields a token that is already expired.
//!
//! ## Validation order
//!
//! Signature first, then expiry, then subject. A tampered token therefore
//! reports [`AuthError::InvalidSignature`] (or [`AuthError::Malformed`] if it
//! no longer parses) even when its claims are also expired.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use vpi_core::{AuthError, ServiceConfig, SigningSecret, TokenAlgorithm};

use crate::error::SigningError;

/// Claims written into every issued token.
#[derive(Debug, Serialize)]
struct Claims<'a> {
    sub: &'a str,
    iat: i64,
    exp: i64,
}

/// Claims read back after the signature has been verified.
///
/// `sub` is optional here so that its absence is reported as
/// [`AuthError::MissingSubject`] rather than as a parse failure.
#[derive(Debug, Deserialize)]
struct VerifiedClaims {
    #[serde(default)]
    sub: Option<String>,
    exp: i64,
}

/// Issues and validates signed access tokens. Immutable after construction.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
    default_ttl: TimeDelta,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

fn jwt_algorithm(algorithm: TokenAlgorithm) -> Algorithm {
    match algorithm {
        TokenAlgorithm::Hs256 => Algorithm::HS256,
        TokenAlgorithm::Hs384 => Algorithm::HS384,
        TokenAlgorithm::Hs512 => Algorithm::HS512,
    }
}

impl TokenService {
    /// Build a token service around a signing secret.
    pub fn new(secret: &SigningSecret, algorithm: TokenAlgorithm, default_ttl: TimeDelta) -> Self {
        let algorithm = jwt_algorithm(algorithm);

        // Expiry is checked by `validate_at` against an explicit clock with
        // no leeway, so the library's own wall-clock check is disabled.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.expose()),
            decoding_key: DecodingKey::from_secret(secret.expose()),
            algorithm,
            validation,
            default_ttl,
        }
    }

    /// Build from the service configuration.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            &config.signing_secret,
            config.token_algorithm,
            config.access_token_ttl,
        )
    }

    /// Lifetime applied by [`issue_default`](Self::issue_default).
    pub fn default_ttl(&self) -> TimeDelta {
        self.default_ttl
    }

    /// Issue a token for `subject` expiring `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: TimeDelta) -> Result<String, SigningError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token for `subject` with the default lifetime.
    pub fn issue_default(&self, subject: &str) -> Result<String, SigningError> {
        self.issue(subject, self.default_ttl)
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// A zero or negative `ttl` produces a token that is already expired.
    ///
    /// # Errors
    ///
    /// - [`SigningError::EmptySubject`] for an empty subject.
    /// - [`SigningError::Encoding`] if the JWT library fails.
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<String, SigningError> {
        if subject.is_empty() {
            return Err(SigningError::EmptySubject);
        }
        let iat = now.timestamp();
        let exp = expiry_second(now, ttl);

        let claims = Claims {
            sub: subject,
            iat,
            exp,
        };
        jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| SigningError::Encoding(e.to_string()))
    }

    /// Validate a token and return its subject.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Malformed`]: not a parseable JWT, or `exp` missing.
    /// - [`AuthError::InvalidSignature`]: signature mismatch, or the header
    ///   names a different algorithm.
    /// - [`AuthError::Expired`]: `now` is at or past `exp`.
    /// - [`AuthError::MissingSubject`]: no `sub`, or an empty one.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let data =
            jsonwebtoken::decode::<VerifiedClaims>(token, &self.decoding_key, &self.validation)
                .map_err(|e| classify(e.kind()))?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        match claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => Err(AuthError::MissingSubject),
        }
    }
}

/// `exp` claim for a token issued at `now` with lifetime `ttl`.
fn expiry_second(now: DateTime<Utc>, ttl: TimeDelta) -> i64 {
    if ttl <= TimeDelta::zero() {
        return now.timestamp().saturating_add(ttl.num_seconds());
    }
    match now.checked_add_signed(ttl) {
        Some(deadline) if deadline.timestamp_subsec_nanos() > 0 => {
            deadline.timestamp().saturating_add(1)
        }
        Some(deadline) => deadline.timestamp(),
        None => i64::MAX,
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::MissingRequiredClaim(claim) if claim == "sub" => AuthError::MissingSubject,
        _ => AuthError::Malformed,
    }
}
