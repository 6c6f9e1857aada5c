//! Order repository and the order-placement workflow.
//!
//! Placement runs inside a single transaction: the catalog rows are read and
//! locked, the line-item snapshot is built from authoritative prices, stock
//! is decremented conditionally, the order row is inserted, and the cart is
//! cleared. Any validation failure rolls the whole thing back, so a rejected
//! order leaves no partial state. Notification fan-out happens after commit
//! and is owned by the route layer.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;

use clementine_core::{
    Email, Money, OrderId, OrderStatus, PaymentMethod, ProductId, ShippingAddress, UserId,
};

use super::RepositoryError;
use crate::models::order::{Order, OrderCustomer, OrderItem, order_total};

/// Failures specific to order placement and transitions.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submitted item list was empty.
    #[error("No order items")]
    Empty,

    /// A referenced product does not exist.
    #[error("Product {id} not found")]
    ProductNotFound { id: ProductId },

    /// A product's stock is below the requested quantity.
    #[error("Insufficient stock for {name}")]
    InsufficientStock { name: String },

    /// The client-submitted total disagrees with the catalog prices.
    #[error("Total price mismatch: expected {expected}, submitted {submitted}")]
    TotalMismatch { expected: Money, submitted: Money },

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(e.into())
    }
}

/// One requested order line: a product reference and a quantity.
#[derive(Debug, Clone, Copy)]
pub struct LineItemRequest {
    pub product: ProductId,
    pub quantity: u32,
}

/// The authoritative catalog view of one product at placement time.
#[derive(Debug, Clone)]
struct CatalogEntry {
    name: String,
    price: Money,
    image: Option<String>,
    stock: i32,
}

/// Build the frozen line-item snapshot for an order.
///
/// Names, prices, and images come from the catalog, never from the client.
/// Fails if a product is missing or its stock is below the requested
/// quantity, before anything has been mutated.
fn build_snapshot(
    items: &[LineItemRequest],
    catalog: &HashMap<ProductId, CatalogEntry>,
) -> Result<Vec<OrderItem>, OrderError> {
    items
        .iter()
        .map(|item| {
            let entry = catalog
                .get(&item.product)
                .ok_or(OrderError::ProductNotFound { id: item.product })?;

            if i64::from(entry.stock) < i64::from(item.quantity) {
                return Err(OrderError::InsufficientStock {
                    name: entry.name.clone(),
                });
            }

            Ok(OrderItem {
                product: item.product,
                name: entry.name.clone(),
                quantity: item.quantity,
                unit_price: entry.price,
                image: entry.image.clone(),
            })
        })
        .collect()
}

/// Recompute the total from the snapshot and check it against the submitted
/// value.
fn verify_total(items: &[OrderItem], submitted: Money) -> Result<Money, OrderError> {
    let expected = order_total(items);
    if expected != submitted {
        return Err(OrderError::TotalMismatch {
            expected,
            submitted,
        });
    }
    Ok(expected)
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    user_name: String,
    user_email: Email,
    items: serde_json::Value,
    shipping_address: serde_json::Value,
    payment_method: PaymentMethod,
    total_price: Money,
    order_status: OrderStatus,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let items: Vec<OrderItem> = serde_json::from_value(row.items).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order items: {e}"))
        })?;
        let shipping_address: ShippingAddress = serde_json::from_value(row.shipping_address)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid shipping address: {e}"))
            })?;

        Ok(Self {
            id: row.id,
            user: OrderCustomer {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
            },
            items,
            shipping_address,
            payment_method: row.payment_method,
            total_price: row.total_price,
            order_status: row.order_status,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "o.id, o.user_id, u.name AS user_name, u.email AS user_email, \
     o.items, o.shipping_address, o.payment_method, o.total_price, o.order_status, \
     o.delivered_at, o.created_at, o.updated_at";

fn select_orders() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!(
        "SELECT {ORDER_COLUMNS}
         FROM shop.orders o
         JOIN shop.users u ON u.id = o.user_id
         WHERE TRUE"
    ))
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order: validate against the catalog, decrement stock, insert
    /// the order row, and clear the cart, all in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Empty`], [`OrderError::ProductNotFound`],
    /// [`OrderError::InsufficientStock`], or [`OrderError::TotalMismatch`]
    /// without having mutated anything; [`OrderError::Repository`] on
    /// database failure.
    pub async fn place(
        &self,
        user: UserId,
        items: &[LineItemRequest],
        address: &ShippingAddress,
        submitted_total: Money,
    ) -> Result<Order, OrderError> {
        if items.is_empty() {
            return Err(OrderError::Empty);
        }

        let mut tx = self.pool.begin().await?;

        // One batched read of every referenced product, locked in id order so
        // concurrent placements against overlapping products cannot deadlock.
        let ids: Vec<uuid::Uuid> = items.iter().map(|i| i.product.as_uuid()).collect();
        let catalog_rows = sqlx::query_as::<_, (ProductId, String, Money, Vec<String>, i32)>(
            "SELECT id, name, price, images, stock
             FROM shop.products
             WHERE id = ANY($1)
             ORDER BY id
             FOR UPDATE",
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

        let catalog: HashMap<ProductId, CatalogEntry> = catalog_rows
            .into_iter()
            .map(|(id, name, price, images, stock)| {
                (
                    id,
                    CatalogEntry {
                        name,
                        price,
                        image: images.first().cloned(),
                        stock,
                    },
                )
            })
            .collect();

        let snapshot = build_snapshot(items, &catalog)?;
        let total = verify_total(&snapshot, submitted_total)?;

        // Conditional decrement: the guard re-checks stock at write time, so
        // two orders racing past the snapshot check can never both succeed.
        for item in &snapshot {
            let result = sqlx::query(
                "UPDATE shop.products
                 SET stock = stock - $2, updated_at = now()
                 WHERE id = $1 AND stock >= $2",
            )
            .bind(item.product)
            .bind(i32::try_from(item.quantity).unwrap_or(i32::MAX))
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(OrderError::InsufficientStock {
                    name: item.name.clone(),
                });
            }
        }

        let items_json = serde_json::to_value(&snapshot).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable order items: {e}"))
        })?;
        let address_json = serde_json::to_value(address).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable address: {e}"))
        })?;

        let order_id = sqlx::query_scalar::<_, OrderId>(
            "INSERT INTO shop.orders (user_id, items, shipping_address, total_price)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(user)
        .bind(items_json)
        .bind(address_json)
        .bind(total)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM shop.cart_items ci
             USING shop.carts c
             WHERE ci.cart_id = c.id AND c.user_id = $1",
        )
        .bind(user)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find(order_id)
            .await?
            .ok_or(OrderError::Repository(RepositoryError::NotFound))
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored snapshot is invalid.
    pub async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut qb = select_orders();
        qb.push(" AND o.id = ").push_bind(id);

        let row: Option<OrderRow> = qb.build_query_as().fetch_optional(self.pool).await?;

        row.map(TryInto::try_into).transpose()
    }

    /// A user's orders, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user: UserId,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut qb = select_orders();
        qb.push(" AND o.user_id = ").push_bind(user);
        if let Some(status) = status {
            qb.push(" AND o.order_status = ").push_bind(status);
        }
        qb.push(" ORDER BY o.created_at DESC");

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(self.pool).await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Admin listing: every order, newest first, paginated, optionally
    /// filtered by status. Returns the page and the total matching count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        page: u32,
        limit: u32,
    ) -> Result<(Vec<Order>, u64), RepositoryError> {
        let limit_i64 = i64::from(limit.max(1));
        let offset = i64::from(page.saturating_sub(1)) * limit_i64;

        let mut qb = select_orders();
        if let Some(status) = status {
            qb.push(" AND o.order_status = ").push_bind(status);
        }
        qb.push(" ORDER BY o.created_at DESC");
        qb.push(" LIMIT ").push_bind(limit_i64);
        qb.push(" OFFSET ").push_bind(offset);

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM shop.orders o WHERE TRUE");
        if let Some(status) = status {
            count_qb.push(" AND o.order_status = ").push_bind(status);
        }
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let orders = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((orders, total.try_into().unwrap_or(0)))
    }

    /// Set an order's status. The first transition to `Delivered` stamps
    /// `delivered_at`; the stamp is never cleared or overwritten afterwards.
    ///
    /// Returns `None` if no such order exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.orders
             SET order_status = $2,
                 delivered_at = CASE
                     WHEN $3 AND delivered_at IS NULL THEN now()
                     ELSE delivered_at
                 END,
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(status.is_delivered())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn money(s: &str) -> Money {
        Money::new(s.parse::<Decimal>().unwrap()).unwrap()
    }

    fn entry(name: &str, price: &str, stock: i32) -> CatalogEntry {
        CatalogEntry {
            name: name.to_owned(),
            price: money(price),
            image: None,
            stock,
        }
    }

    #[test]
    fn test_snapshot_freezes_catalog_values() {
        let p1 = ProductId::generate();
        let catalog = HashMap::from([(p1, entry("Walnut Desk", "100", 5))]);
        let items = [LineItemRequest {
            product: p1,
            quantity: 2,
        }];

        let snapshot = build_snapshot(&items, &catalog).unwrap();
        assert_eq!(snapshot.len(), 1);
        let line = snapshot.first().unwrap();
        assert_eq!(line.name, "Walnut Desk");
        assert_eq!(line.unit_price, money("100"));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_snapshot_rejects_missing_product() {
        let known = ProductId::generate();
        let unknown = ProductId::generate();
        let catalog = HashMap::from([(known, entry("Mug", "10", 5))]);
        let items = [
            LineItemRequest {
                product: known,
                quantity: 1,
            },
            LineItemRequest {
                product: unknown,
                quantity: 1,
            },
        ];

        let err = build_snapshot(&items, &catalog).unwrap_err();
        assert!(matches!(err, OrderError::ProductNotFound { id } if id == unknown));
    }

    #[test]
    fn test_snapshot_rejects_insufficient_stock() {
        // Cart [{P2, qty 10}], P2.stock = 1: rejected before any mutation.
        let p2 = ProductId::generate();
        let catalog = HashMap::from([(p2, entry("Mug", "20", 1))]);
        let items = [LineItemRequest {
            product: p2,
            quantity: 10,
        }];

        let err = build_snapshot(&items, &catalog).unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { name } if name == "Mug"));
    }

    #[test]
    fn test_snapshot_allows_exact_stock() {
        let p = ProductId::generate();
        let catalog = HashMap::from([(p, entry("Mug", "20", 3))]);
        let items = [LineItemRequest {
            product: p,
            quantity: 3,
        }];
        assert!(build_snapshot(&items, &catalog).is_ok());
    }

    #[test]
    fn test_verify_total_accepts_matching_total() {
        let p1 = ProductId::generate();
        let catalog = HashMap::from([(p1, entry("Walnut Desk", "100", 5))]);
        let snapshot = build_snapshot(
            &[LineItemRequest {
                product: p1,
                quantity: 2,
            }],
            &catalog,
        )
        .unwrap();

        assert_eq!(verify_total(&snapshot, money("200")).unwrap(), money("200"));
    }

    #[test]
    fn test_verify_total_rejects_client_mismatch() {
        let p1 = ProductId::generate();
        let catalog = HashMap::from([(p1, entry("Walnut Desk", "100", 5))]);
        let snapshot = build_snapshot(
            &[LineItemRequest {
                product: p1,
                quantity: 2,
            }],
            &catalog,
        )
        .unwrap();

        let err = verify_total(&snapshot, money("5")).unwrap_err();
        assert!(matches!(
            err,
            OrderError::TotalMismatch { expected, submitted }
                if expected == money("200") && submitted == money("5")
        ));
    }
}
