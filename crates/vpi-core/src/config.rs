//! # Service Configuration
//!
//! [`ServiceConfig`] is read once at process start and passed by reference
//! into the credential manager, token service and store. Nothing reads the
//! environment after startup.
//!
//! ## Environment Variables
//!
//! | Variable                      | Required | Default |
//! |-------------------------------|----------|---------|
//! | `DATABASE_URL`                | yes      | none    |
//! | `JWT_SECRET_KEY`              | yes      | none    |
//! | `JWT_ALGORITHM`               | no       | `HS256` |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | no       | `30`    |
//! | `PORT`                        | no       | `8000`  |
//! | `PASSWORD_HASH_MEMORY_KIB`    | no       | `19456` |
//! | `PASSWORD_HASH_ITERATIONS`    | no       | `2`     |
//! | `PASSWORD_HASH_PARALLELISM`   | no       | `1`     |
//! | `DATABASE_MAX_CONNECTIONS`    | no       | `10`    |
//!
//! A missing or unusable signing secret is a startup error. There is no
//! fallback secret.

use std::str::FromStr;

use chrono::TimeDelta;
use zeroize::Zeroizing;

use crate::error::ConfigError;

/// Minimum accepted length of the HMAC signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Symmetric signing algorithm for access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    Hs256,
    /// HMAC with SHA-384.
    Hs384,
    /// HMAC with SHA-512.
    Hs512,
}

impl TokenAlgorithm {
    /// The JOSE name of this algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }
}

impl std::fmt::Display for TokenAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(Self::Hs256),
            "HS384" => Ok(Self::Hs384),
            "HS512" => Ok(Self::Hs512),
            other => Err(format!(
                "unsupported algorithm {other:?}, expected HS256, HS384 or HS512"
            )),
        }
    }
}

/// HMAC signing secret. Zeroized on drop, redacted in `Debug`.
#[derive(Clone)]
pub struct SigningSecret(Zeroizing<Vec<u8>>);

impl SigningSecret {
    /// Wrap raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WeakSecret`] if shorter than [`MIN_SECRET_BYTES`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ConfigError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakSecret {
                min: MIN_SECRET_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Access the secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

/// Argon2 cost parameters used for new password hashes.
///
/// Verification always uses the parameters embedded in the stored hash, so
/// changing these does not invalidate existing passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism (lanes).
    pub parallelism: u32,
}

impl Default for HashCost {
    /// OWASP-recommended Argon2id baseline (19 MiB, 2 passes, 1 lane).
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Complete service configuration.
///
/// Custom `Debug` redacts the database URL (it usually embeds a password)
/// and the signing secret.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Postgres connection string.
    pub database_url: Zeroizing<String>,
    /// Maximum pooled database connections.
    pub database_max_connections: u32,
    /// HMAC secret for access tokens.
    pub signing_secret: SigningSecret,
    /// Signing algorithm for access tokens.
    pub token_algorithm: TokenAlgorithm,
    /// Lifetime of tokens issued at login.
    pub access_token_ttl: TimeDelta,
    /// Argon2 cost for new password hashes.
    pub hash_cost: HashCost,
    /// HTTP listen port.
    pub port: u16,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("signing_secret", &self.signing_secret)
            .field("token_algorithm", &self.token_algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("hash_cost", &self.hash_cost)
            .field("port", &self.port)
            .finish()
    }
}

impl ServiceConfig {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first when present;
    /// variables already set in the environment take precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first missing or invalid variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first missing or invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let secret = get("JWT_SECRET_KEY").ok_or(ConfigError::Missing("JWT_SECRET_KEY"))?;
        let signing_secret = SigningSecret::new(secret.into_bytes())?;

        let token_algorithm = match get("JWT_ALGORITHM") {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                var: "JWT_ALGORITHM",
                reason,
            })?,
            None => TokenAlgorithm::default(),
        };

        let ttl_minutes: i64 = parse_or(
            get("ACCESS_TOKEN_EXPIRE_MINUTES"),
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            DEFAULT_TOKEN_TTL_MINUTES,
        )?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                var: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: "must be a positive number of minutes".into(),
            });
        }
        let access_token_ttl =
            TimeDelta::try_minutes(ttl_minutes).ok_or_else(|| ConfigError::Invalid {
                var: "ACCESS_TOKEN_EXPIRE_MINUTES",
                reason: "out of range".into(),
            })?;

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_or(
                get("PASSWORD_HASH_MEMORY_KIB"),
                "PASSWORD_HASH_MEMORY_KIB",
                defaults.memory_kib,
            )?,
            iterations: parse_or(
                get("PASSWORD_HASH_ITERATIONS"),
                "PASSWORD_HASH_ITERATIONS",
                defaults.iterations,
            )?,
            parallelism: parse_or(
                get("PASSWORD_HASH_PARALLELISM"),
                "PASSWORD_HASH_PARALLELISM",
                defaults.parallelism,
            )?,
        };

        let database_max_connections: u32 = parse_or(
            get("DATABASE_MAX_CONNECTIONS"),
            "DATABASE_MAX_CONNECTIONS",
            10,
        )?;
        if database_max_connections == 0 {
            return Err(ConfigError::Invalid {
                var: "DATABASE_MAX_CONNECTIONS",
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            database_url: Zeroizing::new(database_url),
            database_max_connections,
            signing_secret,
            token_algorithm,
            access_token_ttl,
            hash_cost,
            port: parse_or(get("PORT"), "PORT", 8000)?,
        })
    }
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
