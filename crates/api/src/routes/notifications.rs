//! Notification handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Serialize;

use clementine_core::NotificationId;

use crate::db::notifications::NotificationRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::models::notification::Notification;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Listing envelope: the recent notifications plus the unread total.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub success: bool,
    pub count: usize,
    pub unread_count: u64,
    pub data: Vec<Notification>,
}

/// The user's most recent notifications and their unread count.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn list(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let (notifications, unread_count) = NotificationRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(NotificationListResponse {
        success: true,
        count: notifications.len(),
        unread_count,
        data: notifications,
    }))
}

/// Mark one notification read; only its recipient may.
///
/// # Errors
///
/// Returns 404 if the notification does not exist, 403 if it belongs to
/// someone else.
pub async fn mark_read(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> Result<impl IntoResponse> {
    let repo = NotificationRepository::new(state.pool());

    let notification = repo
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_owned()))?;

    if notification.user != user.id {
        return Err(AppError::Forbidden("Not authorized".to_owned()));
    }

    let notification = repo.mark_read(id).await?;

    Ok(ApiResponse::ok(notification))
}

/// Mark every notification read.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn mark_all_read(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    NotificationRepository::new(state.pool())
        .mark_all_read(user.id)
        .await?;

    Ok(ApiResponse::message("All notifications marked as read"))
}
