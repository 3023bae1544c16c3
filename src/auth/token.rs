//! Bearer tokens
//!
//! Uses HMAC-signed, self-contained tokens.
//! No server-side session storage needed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AppError;

/// Which half of a token pair a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Signed token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub token_type: TokenType,
    pub user_id: i64,
    /// Unique token id (ULID)
    pub jti: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    pub fn new(token_type: TokenType, user_id: i64, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_type,
            user_id,
            jti: ulid::Ulid::new().to_string(),
            issued_at: now,
            expires_at: now + lifetime,
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Freshly issued access token plus (when issued) a refresh token
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// Create a signed token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
///
/// # Arguments
/// * `claims` - Claims to encode
/// * `secret` - HMAC secret key
pub fn sign_token(claims: &Claims, secret: &str) -> Result<String, AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let payload = serde_json::to_string(claims).map_err(|e| AppError::Internal(e.into()))?;
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a token
///
/// # Errors
/// Returns `Unauthorized` if the signature is invalid, the token is
/// malformed or expired, or it is not of the `expected` type
pub fn verify_token(token: &str, secret: &str, expected: TokenType) -> Result<Claims, AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let (payload_b64, signature_b64) = token.split_once('.').ok_or(AppError::Unauthorized)?;
    if signature_b64.contains('.') {
        return Err(AppError::Unauthorized);
    }

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Encryption(e.to_string()))?;
    mac.update(payload_b64.as_bytes());

    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::Unauthorized)?;
    mac.verify_slice(&signature)
        .map_err(|_| AppError::Unauthorized)?;

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AppError::Unauthorized)?;
    let claims: Claims = serde_json::from_slice(&payload).map_err(|_| AppError::Unauthorized)?;

    if claims.token_type != expected || claims.is_expired() {
        return Err(AppError::Unauthorized);
    }

    Ok(claims)
}

/// Issue an access token and, when `with_refresh`, a refresh token.
pub fn issue_tokens(
    user_id: i64,
    config: &AuthConfig,
    with_refresh: bool,
) -> Result<TokenPair, AppError> {
    let access = Claims::new(
        TokenType::Access,
        user_id,
        Duration::seconds(config.access_token_lifetime),
    );
    let refresh = with_refresh
        .then(|| {
            Claims::new(
                TokenType::Refresh,
                user_id,
                Duration::seconds(config.refresh_token_lifetime),
            )
        })
        .map(|claims| sign_token(&claims, &config.token_secret))
        .transpose()?;

    Ok(TokenPair {
        access: sign_token(&access, &config.token_secret)?,
        refresh,
    })
}
