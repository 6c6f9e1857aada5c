//! Product catalog repository.
//!
//! Listing supports the storefront's filter set (category, featured, search
//! substring, price range, minimum rating) with pagination; the WHERE clause
//! is assembled dynamically with `QueryBuilder`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use clementine_core::{CategoryId, Money, ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::product::{CategoryRef, Product, ProductSummary, Review};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    price: Money,
    category_id: CategoryId,
    category_name: String,
    images: Vec<String>,
    stock: i32,
    is_featured: bool,
    rating: Decimal,
    num_reviews: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, reviews: Vec<Review>) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            category: CategoryRef {
                id: self.category_id,
                name: self.category_name,
            },
            images: self.images,
            stock: self.stock,
            is_featured: self.is_featured,
            rating: self.rating,
            num_reviews: self.num_reviews,
            reviews,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    user_id: UserId,
    user_name: String,
    rating: i16,
    comment: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user: row.user_id,
            name: row.user_name,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.category_id, \
     c.name AS category_name, p.images, p.stock, p.is_featured, p.rating, p.num_reviews, \
     p.created_at, p.updated_at";

/// Sort orders accepted by the listing endpoint.
///
/// Unrecognized sort keys silently fall back to `Latest`, matching how the
/// SPA has always called this endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Latest,
    Oldest,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    /// Parse an optional query-string value.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("price_asc") => Self::PriceAsc,
            Some("price_desc") => Self::PriceDesc,
            Some("oldest") => Self::Oldest,
            _ => Self::Latest,
        }
    }

    /// The ORDER BY expression for this sort.
    #[must_use]
    pub const fn order_by(self) -> &'static str {
        match self {
            Self::Latest => "p.created_at DESC",
            Self::Oldest => "p.created_at ASC",
            Self::PriceAsc => "p.price ASC",
            Self::PriceDesc => "p.price DESC",
        }
    }
}

/// Catalog listing filters.
#[derive(Debug, Default)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub featured: bool,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_rating: Option<Decimal>,
    pub sort: ProductSort,
    pub page: u32,
    pub limit: u32,
}

impl ProductFilter {
    fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let Some(category) = self.category {
            qb.push(" AND p.category_id = ").push_bind(category);
        }
        if self.featured {
            qb.push(" AND p.is_featured");
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{search}%");
            qb.push(" AND (p.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(min) = self.min_price {
            qb.push(" AND p.price >= ").push_bind(min);
        }
        if let Some(max) = self.max_price {
            qb.push(" AND p.price <= ").push_bind(max);
        }
        if let Some(rating) = self.min_rating {
            qb.push(" AND p.rating >= ").push_bind(rating);
        }
    }
}

/// Input for creating a product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: CategoryId,
    pub images: Vec<String>,
    pub stock: i32,
    pub is_featured: bool,
}

/// Partial product update; `None` leaves a field untouched.
#[derive(Debug, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub category: Option<CategoryId>,
    pub images: Option<Vec<String>>,
    pub stock: Option<i32>,
    pub is_featured: Option<bool>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Filtered, paginated listing. Returns the page of products and the
    /// total matching count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
    ) -> Result<(Vec<Product>, u64), RepositoryError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM shop.products p
             JOIN shop.categories c ON c.id = p.category_id
             WHERE TRUE"
        ));
        filter.push_where(&mut qb);

        let limit = i64::from(filter.limit.max(1));
        let offset = i64::from(filter.page.saturating_sub(1)) * limit;
        qb.push(" ORDER BY ").push(filter.sort.order_by());
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows: Vec<ProductRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut count_qb =
            QueryBuilder::new("SELECT COUNT(*) FROM shop.products p WHERE TRUE");
        filter.push_where(&mut count_qb);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let products = rows
            .into_iter()
            .map(|row| row.into_product(Vec::new()))
            .collect();

        Ok((products, total.try_into().unwrap_or(0)))
    }

    /// Get a product with its reviews populated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM shop.products p
             JOIN shop.categories c ON c.id = p.category_id
             WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reviews = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, user_id, user_name, rating, comment, created_at
             FROM shop.product_reviews
             WHERE product_id = $1
             ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(
            row.into_product(reviews.into_iter().map(Into::into).collect()),
        ))
    }

    /// Compact summaries for a set of products, for cart/wishlist population.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summaries(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS}
             FROM shop.products p
             JOIN shop.categories c ON c.id = p.category_id
             WHERE p.id = ANY($1)"
        ))
        .bind(&uuids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductSummary {
                id: row.id,
                name: row.name,
                price: row.price,
                image: row.images.first().cloned(),
                stock: row.stock,
                rating: row.rating,
            })
            .collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category reference is
    /// invalid.
    pub async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            "INSERT INTO shop.products
                 (name, description, price, category_id, images, stock, is_featured)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.category)
        .bind(&product.images)
        .bind(product.stock)
        .bind(product.is_featured)
        .fetch_one(self.pool)
        .await
        .map_err(conflict_on_bad_category)?;

        self.find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update and return the fresh product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.products SET
                 name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 price = COALESCE($4, price),
                 category_id = COALESCE($5, category_id),
                 images = COALESCE($6, images),
                 stock = COALESCE($7, stock),
                 is_featured = COALESCE($8, is_featured),
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(update.name)
        .bind(update.description)
        .bind(update.price)
        .bind(update.category)
        .bind(update.images)
        .bind(update.stock)
        .bind(update.is_featured)
        .execute(self.pool)
        .await
        .map_err(conflict_on_bad_category)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Cart, wishlist, and review rows referencing it are
    /// removed by their ON DELETE CASCADE constraints; order snapshots keep
    /// their copies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Add a review and refresh the denormalized rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the user already reviewed it.
    pub async fn add_review(
        &self,
        product: ProductId,
        user: UserId,
        user_name: &str,
        rating: i16,
        comment: &str,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM shop.products WHERE id = $1")
                .bind(product)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            "INSERT INTO shop.product_reviews (product_id, user_id, user_name, rating, comment)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product)
        .bind(user)
        .bind(user_name)
        .bind(rating)
        .bind(comment)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("Product already reviewed".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        sqlx::query(
            "UPDATE shop.products p SET
                 num_reviews = agg.cnt,
                 rating = agg.avg_rating,
                 updated_at = now()
             FROM (
                 SELECT COUNT(*) AS cnt, COALESCE(AVG(rating), 0) AS avg_rating
                 FROM shop.product_reviews
                 WHERE product_id = $1
             ) agg
             WHERE p.id = $1",
        )
        .bind(product)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(product)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

fn conflict_on_bad_category(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict("category does not exist".to_owned());
    }
    RepositoryError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parsing_falls_back_to_latest() {
        assert_eq!(ProductSort::from_query(None), ProductSort::Latest);
        assert_eq!(ProductSort::from_query(Some("latest")), ProductSort::Latest);
        assert_eq!(
            ProductSort::from_query(Some("price_asc")),
            ProductSort::PriceAsc
        );
        assert_eq!(
            ProductSort::from_query(Some("price_desc")),
            ProductSort::PriceDesc
        );
        assert_eq!(ProductSort::from_query(Some("oldest")), ProductSort::Oldest);
        assert_eq!(
            ProductSort::from_query(Some("by_rating")),
            ProductSort::Latest
        );
    }

    #[test]
    fn test_sort_order_by_clauses() {
        assert_eq!(ProductSort::Latest.order_by(), "p.created_at DESC");
        assert_eq!(ProductSort::PriceAsc.order_by(), "p.price ASC");
    }
}
