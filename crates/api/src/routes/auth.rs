//! Registration, login, and session handlers.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireUser, clear_current_user, set_current_user};
use crate::models::user::CurrentUser;
use crate::response::ApiResponse;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Request for creating an account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create an account and start a session.
///
/// # Errors
///
/// Returns an error if validation fails or the email is taken.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_owned()));
    }

    let user = AuthService::new(state.pool())
        .register(body.name.trim(), &body.email, &body.password)
        .await?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "user registered");
    Ok(ApiResponse::created(user))
}

/// Verify credentials and start a session.
///
/// # Errors
///
/// Returns 401 on bad credentials.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    // Rotate the session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(ApiResponse::ok(user))
}

/// End the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(ApiResponse::message("Logged out"))
}

/// The authenticated user's account, re-read from the database.
///
/// # Errors
///
/// Returns 404 if the account was deleted out from under the session.
pub async fn me(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let user = UserRepository::new(state.pool())
        .find_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(ApiResponse::ok(user))
}
