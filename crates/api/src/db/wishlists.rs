//! Wishlist repository.

use sqlx::PgPool;

use clementine_core::{ProductId, UserId, WishlistId};

use super::RepositoryError;
use crate::db::products::ProductRepository;
use crate::models::wishlist::Wishlist;

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's wishlist with populated products, creating it if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, user: UserId) -> Result<Wishlist, RepositoryError> {
        let id = self.wishlist_id(user).await?;
        self.populated(user, id).await
    }

    /// Add a product to the wishlist.
    ///
    /// The caller is responsible for the product-exists check.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product is already listed.
    pub async fn add(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Wishlist, RepositoryError> {
        let id = self.wishlist_id(user).await?;

        sqlx::query(
            "INSERT INTO shop.wishlist_items (wishlist_id, product_id)
             VALUES ($1, $2)",
        )
        .bind(id)
        .bind(product)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("Product already in wishlist".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        self.populated(user, id).await
    }

    /// Remove a product from the wishlist. Removing an absent product is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove(
        &self,
        user: UserId,
        product: ProductId,
    ) -> Result<Wishlist, RepositoryError> {
        let id = self.wishlist_id(user).await?;

        sqlx::query(
            "DELETE FROM shop.wishlist_items WHERE wishlist_id = $1 AND product_id = $2",
        )
        .bind(id)
        .bind(product)
        .execute(self.pool)
        .await?;

        self.populated(user, id).await
    }

    async fn wishlist_id(&self, user: UserId) -> Result<WishlistId, RepositoryError> {
        sqlx::query(
            "INSERT INTO shop.wishlists (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user)
        .execute(self.pool)
        .await?;

        let id = sqlx::query_scalar::<_, WishlistId>(
            "SELECT id FROM shop.wishlists WHERE user_id = $1",
        )
        .bind(user)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    async fn populated(
        &self,
        user: UserId,
        id: WishlistId,
    ) -> Result<Wishlist, RepositoryError> {
        let product_ids = sqlx::query_scalar::<_, ProductId>(
            "SELECT product_id FROM shop.wishlist_items
             WHERE wishlist_id = $1
             ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let products = ProductRepository::new(self.pool)
            .summaries(&product_ids)
            .await?;

        Ok(Wishlist { id, user, products })
    }
}
