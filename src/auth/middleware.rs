//! Authentication extractor
//!
//! Resolves the bearer token on a request to the calling user.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use super::token::{TokenType, verify_token};
use crate::AppState;
use crate::data::User;
use crate::error::AppError;

/// Raw bearer token from the `Authorization` header, if any.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_owned())
}

/// User id carried by a valid access token, without touching the database.
///
/// Used where only the caller's identity matters, such as rate limiting.
pub fn access_token_user_id(headers: &HeaderMap, secret: &str) -> Option<i64> {
    let token = extract_bearer_token(headers)?;
    verify_token(&token, secret, TokenType::Access)
        .ok()
        .map(|claims| claims.user_id)
}

async fn authenticate_token(token: &str, state: &AppState) -> Result<User, AppError> {
    let claims = verify_token(token, &state.config.auth.token_secret, TokenType::Access)?;

    // Deleted or deactivated accounts lose access even with an unexpired token.
    match state.db.get_user(claims.user_id).await? {
        Some(user) if user.is_active => Ok(user),
        _ => Err(AppError::Unauthorized),
    }
}

/// Extractor for current authenticated user
///
/// Use in handlers to get the caller's account row.
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", user.first_name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<User>().cloned() {
            return Ok(CurrentUser(user));
        }

        let state = AppState::from_ref(state);
        let token = extract_bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let user = authenticate_token(&token, &state).await?;
        parts.extensions.insert(user.clone());

        Ok(CurrentUser(user))
    }
}
