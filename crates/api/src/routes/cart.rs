//! Cart handlers.
//!
//! Stock is checked when items enter or change in the cart; the
//! authoritative check still happens again at order placement.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;

use clementine_core::{CartItemId, ProductId};

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::RequireUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request for adding a product to the cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Request for changing a cart line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

/// Ensure a product exists and has at least `quantity` units on hand.
async fn check_stock(state: &AppState, product: ProductId, quantity: u32) -> Result<()> {
    let product = ProductRepository::new(state.pool())
        .find_by_id(product)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    if i64::from(product.stock) < i64::from(quantity) {
        return Err(AppError::InvalidInput("Insufficient stock".to_owned()));
    }
    Ok(())
}

/// Own cart, created lazily.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let cart = CartRepository::new(state.pool()).get_or_create(user.id).await?;
    Ok(ApiResponse::ok(cart))
}

/// Add a product; adding one already in the cart accumulates quantity.
///
/// # Errors
///
/// Returns 404 for an unknown product, 400 when stock is short.
pub async fn add(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    if body.quantity == 0 {
        return Err(AppError::InvalidInput(
            "Quantity must be at least 1".to_owned(),
        ));
    }
    check_stock(&state, body.product_id, body.quantity).await?;

    let quantity = i32::try_from(body.quantity)
        .map_err(|_| AppError::InvalidInput("Quantity out of range".to_owned()))?;
    let cart = CartRepository::new(state.pool())
        .add_item(user.id, body.product_id, quantity)
        .await?;

    Ok(ApiResponse::ok(cart))
}

/// Replace a cart line's quantity.
///
/// # Errors
///
/// Returns 404 when the line is not in the user's cart, 400 when stock is
/// short.
pub async fn update_item(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
    Json(body): Json<UpdateCartItemRequest>,
) -> Result<impl IntoResponse> {
    if body.quantity == 0 {
        return Err(AppError::InvalidInput(
            "Quantity must be at least 1".to_owned(),
        ));
    }

    let carts = CartRepository::new(state.pool());
    let product = carts
        .item_product(user.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found in cart".to_owned()))?;

    check_stock(&state, product, body.quantity).await?;

    let quantity = i32::try_from(body.quantity)
        .map_err(|_| AppError::InvalidInput("Quantity out of range".to_owned()))?;
    let cart = carts.set_quantity(user.id, id, quantity).await?;

    Ok(ApiResponse::ok(cart))
}

/// Remove one line from the cart.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn remove_item(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<impl IntoResponse> {
    let cart = CartRepository::new(state.pool())
        .remove_item(user.id, id)
        .await?;

    Ok(ApiResponse::ok(cart))
}

/// Empty the cart.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn clear(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let cart = CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(ApiResponse::ok(cart))
}
