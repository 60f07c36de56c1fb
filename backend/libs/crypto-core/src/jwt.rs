/// Shared JWT module for Moodfeed services
///
/// Tokens are signed by the account service with HS256 and a shared secret
/// (`JWT_SECRET`). Feed-side services only need to validate them; issuance is
/// kept here so tests and tooling produce tokens the same way.
///
/// ## Usage
///
/// Call `initialize_jwt_secret()` once during startup before any JWT operation:
///
/// ```rust,no_run
/// use crypto_core::jwt;
///
/// let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET required");
/// jwt::initialize_jwt_secret(&secret, 3600).expect("Failed to initialize JWT secret");
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// JWT algorithm - tokens are issued with a shared secret
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 3600;

// ============================================================================
// Data Structures
// ============================================================================

/// Claims carried by an access token
///
/// Field names match the account service payload (`userId`, `loginId`, ...).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: i64,
    pub login_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not initialized. Call initialize_jwt_secret() during startup.")]
    NotInitialized,

    #[error("JWT secret already initialized")]
    AlreadyInitialized,

    #[error("JWT secret must not be empty")]
    EmptySecret,

    #[error("Token validation failed: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("Failed to generate token: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

// ============================================================================
// Key Storage
// ============================================================================

/// Initialized once at startup and never modified.
static JWT_KEYS: OnceCell<JwtKeys> = OnceCell::new();

/// Initialize the shared secret used to sign and verify tokens
///
/// Can only be called once; later calls return `JwtError::AlreadyInitialized`.
pub fn initialize_jwt_secret(secret: &str, ttl_secs: i64) -> Result<(), JwtError> {
    if secret.is_empty() {
        return Err(JwtError::EmptySecret);
    }

    let keys = JwtKeys {
        encoding: EncodingKey::from_secret(secret.as_bytes()),
        decoding: DecodingKey::from_secret(secret.as_bytes()),
        ttl_secs: if ttl_secs > 0 {
            ttl_secs
        } else {
            DEFAULT_ACCESS_TOKEN_TTL_SECS
        },
    };

    JWT_KEYS
        .set(keys)
        .map_err(|_| JwtError::AlreadyInitialized)?;

    tracing::debug!("JWT secret initialized (algorithm={:?})", JWT_ALGORITHM);
    Ok(())
}

fn keys() -> Result<&'static JwtKeys, JwtError> {
    JWT_KEYS.get().ok_or(JwtError::NotInitialized)
}

// ============================================================================
// Token Generation
// ============================================================================

/// Generate an access token for `user_id`
pub fn generate_access_token(
    user_id: i64,
    login_id: &str,
    email: Option<&str>,
    nickname: Option<&str>,
) -> Result<String, JwtError> {
    let keys = keys()?;
    let now = Utc::now();
    let expiry = now + Duration::seconds(keys.ttl_secs);

    let claims = Claims {
        user_id,
        login_id: login_id.to_string(),
        email: email.map(str::to_string),
        nickname: nickname.map(str::to_string),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
    };

    encode(&Header::new(JWT_ALGORITHM), &claims, &keys.encoding).map_err(JwtError::Encoding)
}

// ============================================================================
// Token Validation
// ============================================================================

/// Validate and decode a JWT token
///
/// Checks the HS256 signature and expiration. `token` is the raw token
/// without the `Bearer ` prefix.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>, JwtError> {
    let keys = keys()?;

    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;

    decode::<Claims>(token, &keys.decoding, &validation).map_err(JwtError::Invalid)
}

// ============================================================================
// Tests
// ============================================================================
