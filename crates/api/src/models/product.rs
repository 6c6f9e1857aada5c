//! Product catalog domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use clementine_core::{CategoryId, Money, ProductId, ReviewId, UserId};

/// A catalog product with its populated category and reviews.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: CategoryRef,
    /// Image URLs; the first one is the primary listing image.
    pub images: Vec<String>,
    /// Units on hand. Only the order workflow decrements this.
    pub stock: i32,
    pub is_featured: bool,
    /// Average review rating, 0 when unreviewed.
    pub rating: Decimal,
    pub num_reviews: i32,
    /// Populated on the detail endpoint; empty in listings.
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The populated `{ id, name }` view of a product's category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// A customer review. One per user per product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user: UserId,
    /// Reviewer display name, captured when the review is written.
    pub name: String,
    /// 1-5 stars.
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Compact product view used when populating cart and wishlist entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub stock: i32,
    pub rating: Decimal,
}
