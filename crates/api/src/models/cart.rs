//! Cart domain types.

use serde::Serialize;

use clementine_core::{CartId, CartItemId, UserId};

use super::product::ProductSummary;

/// A user's cart: one per user, created lazily on first access.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user: UserId,
    pub items: Vec<CartItem>,
}

/// One cart line: a populated product and a quantity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    pub product: ProductSummary,
    pub quantity: i32,
}
