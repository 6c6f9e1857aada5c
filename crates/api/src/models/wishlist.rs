//! Wishlist domain type.

use serde::Serialize;

use clementine_core::{UserId, WishlistId};

use super::product::ProductSummary;

/// A user's wishlist: one per user, created lazily; a set of products.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wishlist {
    pub id: WishlistId,
    pub user: UserId,
    pub products: Vec<ProductSummary>,
}
