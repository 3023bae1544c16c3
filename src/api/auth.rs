//! Account endpoints
//!
//! Registration, login and token refresh are public. Everything else
//! requires an access token.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use super::converters::user_to_response;
use super::dto::*;
use super::extract::AppJson;
use crate::AppState;
use crate::auth::{CurrentUser, TokenPair};
use crate::error::AppError;
use crate::service::{AccountService, UserDataExport};

fn account_service(state: &AppState) -> AccountService {
    AccountService::new(state.db.clone(), state.config.clone())
}

/// POST /api/auth/register/
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let session = account_service(&state)
        .register(
            request.name.as_deref(),
            request.email.as_deref(),
            request.password.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user_to_response(&session.user),
            access: session.tokens.access,
            refresh: session.tokens.refresh,
        }),
    ))
}

/// POST /api/auth/login/
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    // A body that is not JSON at all carries no credentials.
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => LoginRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let session = account_service(&state)
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(AuthResponse {
        user: user_to_response(&session.user),
        access: session.tokens.access,
        refresh: session.tokens.refresh,
    }))
}

/// POST /api/auth/refresh/
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(request): AppJson<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let refresh = request
        .refresh
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| AppError::validation("refresh", "This field is required."))?;

    let tokens = account_service(&state).refresh(&refresh).await?;
    Ok(Json(tokens))
}

/// GET /api/auth/profile/
pub async fn profile(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user_to_response(&user))
}

/// PUT /api/auth/profile/update/
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(request): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let updated = account_service(&state)
        .update_profile(&user, request.name.as_deref(), request.email.as_deref())
        .await?;
    Ok(Json(user_to_response(&updated)))
}

/// DELETE /api/auth/delete-account/
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DeleteAccountResponse>, AppError> {
    let message = account_service(&state).delete_account(&user).await?;
    Ok(Json(DeleteAccountResponse {
        message,
        detail: "Your account and all associated data have been removed.",
    }))
}

/// GET /api/auth/export-data/
pub async fn export_data(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<UserDataExport> {
    Json(account_service(&state).export_user_data(&user))
}
