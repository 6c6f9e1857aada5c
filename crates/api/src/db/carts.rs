//! Cart repository.
//!
//! Carts are upserted on first access and hold one row per product; adding a
//! product already in the cart accumulates its quantity.

use rust_decimal::Decimal;
use sqlx::PgPool;

use clementine_core::{CartId, CartItemId, Money, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, CartItem};
use crate::models::product::ProductSummary;

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    quantity: i32,
    product_id: ProductId,
    name: String,
    price: Money,
    images: Vec<String>,
    stock: i32,
    rating: Decimal,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            product: ProductSummary {
                id: row.product_id,
                name: row.name,
                price: row.price,
                image: row.images.first().cloned(),
                stock: row.stock,
                rating: row.rating,
            },
            quantity: row.quantity,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's cart with populated items, creating it if missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, user: UserId) -> Result<Cart, RepositoryError> {
        let id = self.cart_id(user).await?;
        self.populated(user, id).await
    }

    /// Add a product to the cart, accumulating quantity on repeat adds.
    ///
    /// The caller is responsible for the product-exists and stock checks.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_item(
        &self,
        user: UserId,
        product: ProductId,
        quantity: i32,
    ) -> Result<Cart, RepositoryError> {
        let id = self.cart_id(user).await?;

        sqlx::query(
            "INSERT INTO shop.cart_items (cart_id, product_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (cart_id, product_id)
             DO UPDATE SET quantity = shop.cart_items.quantity + EXCLUDED.quantity,
                           updated_at = now()",
        )
        .bind(id)
        .bind(product)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        self.populated(user, id).await
    }

    /// The product a cart line refers to, if the line belongs to this user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn item_product(
        &self,
        user: UserId,
        item: CartItemId,
    ) -> Result<Option<ProductId>, RepositoryError> {
        let product = sqlx::query_scalar::<_, ProductId>(
            "SELECT ci.product_id
             FROM shop.cart_items ci
             JOIN shop.carts c ON c.id = ci.cart_id
             WHERE ci.id = $1 AND c.user_id = $2",
        )
        .bind(item)
        .bind(user)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Replace a cart line's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not belong to the
    /// user's cart.
    pub async fn set_quantity(
        &self,
        user: UserId,
        item: CartItemId,
        quantity: i32,
    ) -> Result<Cart, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.cart_items ci SET quantity = $3, updated_at = now()
             FROM shop.carts c
             WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2",
        )
        .bind(item)
        .bind(user)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        let id = self.cart_id(user).await?;
        self.populated(user, id).await
    }

    /// Remove one line from the cart. Removing an absent line is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove_item(
        &self,
        user: UserId,
        item: CartItemId,
    ) -> Result<Cart, RepositoryError> {
        sqlx::query(
            "DELETE FROM shop.cart_items ci
             USING shop.carts c
             WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2",
        )
        .bind(item)
        .bind(user)
        .execute(self.pool)
        .await?;

        let id = self.cart_id(user).await?;
        self.populated(user, id).await
    }

    /// Empty the cart. Also a side effect of successful order placement,
    /// where it runs inside the order transaction instead.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn clear(&self, user: UserId) -> Result<Cart, RepositoryError> {
        let id = self.cart_id(user).await?;

        sqlx::query("DELETE FROM shop.cart_items WHERE cart_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        self.populated(user, id).await
    }

    /// Look up the user's cart id, creating the cart row if missing.
    async fn cart_id(&self, user: UserId) -> Result<CartId, RepositoryError> {
        // The ON CONFLICT upsert keeps concurrent first-touch requests from
        // violating the one-cart-per-user constraint.
        sqlx::query(
            "INSERT INTO shop.carts (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user)
        .execute(self.pool)
        .await?;

        let id = sqlx::query_scalar::<_, CartId>(
            "SELECT id FROM shop.carts WHERE user_id = $1",
        )
        .bind(user)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    async fn populated(&self, user: UserId, id: CartId) -> Result<Cart, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT ci.id, ci.quantity, p.id AS product_id, p.name, p.price,
                    p.images, p.stock, p.rating
             FROM shop.cart_items ci
             JOIN shop.products p ON p.id = ci.product_id
             WHERE ci.cart_id = $1
             ORDER BY ci.created_at",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Cart {
            id,
            user,
            items: rows.into_iter().map(Into::into).collect(),
        })
    }
}
