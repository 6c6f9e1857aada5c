//! Wishlist handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;

use clementine_core::ProductId;

use crate::db::products::ProductRepository;
use crate::db::wishlists::WishlistRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request for adding a product to the wishlist.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

/// Own wishlist, created lazily.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let wishlist = WishlistRepository::new(state.pool())
        .get_or_create(user.id)
        .await?;

    Ok(ApiResponse::ok(wishlist))
}

/// Add a product to the wishlist.
///
/// # Errors
///
/// Returns 404 for an unknown product, 400 when it is already listed.
pub async fn add(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddToWishlistRequest>,
) -> Result<impl IntoResponse> {
    ProductRepository::new(state.pool())
        .find_by_id(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let wishlist = WishlistRepository::new(state.pool())
        .add(user.id, body.product_id)
        .await?;

    Ok(ApiResponse::ok(wishlist))
}

/// Remove a product from the wishlist.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn remove(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let wishlist = WishlistRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;

    Ok(ApiResponse::ok(wishlist))
}
