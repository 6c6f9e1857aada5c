//! Category handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;

use clementine_core::CategoryId;

use crate::db::categories::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireAdmin;
use crate::response::{ApiResponse, ListResponse};
use crate::state::AppState;

/// Request for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

/// Partial category update; omitted fields are untouched.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// All categories.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(ListResponse::ok(categories))
}

/// One category.
///
/// # Errors
///
/// Returns 404 if the category does not exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<impl IntoResponse> {
    let category = CategoryRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_owned()))?;

    Ok(ApiResponse::ok(category))
}

/// Create a category (admin).
///
/// # Errors
///
/// Returns 400 on a blank or duplicate name.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput(
            "Category name is required".to_owned(),
        ));
    }

    let category = CategoryRepository::new(state.pool())
        .create(name, &body.description, &body.image)
        .await?;

    Ok(ApiResponse::created(category))
}

/// Update a category (admin).
///
/// # Errors
///
/// Returns 404 if the category does not exist.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse> {
    let category = CategoryRepository::new(state.pool())
        .update(
            id,
            body.name.as_deref(),
            body.description.as_deref(),
            body.image.as_deref(),
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Category not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(ApiResponse::ok(category))
}

/// Delete a category (admin).
///
/// # Errors
///
/// Returns 404 if the category does not exist, 400 if products still
/// reference it.
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<impl IntoResponse> {
    CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Category not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(ApiResponse::message("Category deleted successfully"))
}
