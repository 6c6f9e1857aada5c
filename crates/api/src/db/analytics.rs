//! Sales analytics queries.
//!
//! Read-only grouped aggregations over the order log, for the admin
//! dashboard. Nothing here mutates state.

use std::collections::BTreeMap;

use chrono::{DateTime, Months, NaiveTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use clementine_core::{Email, Money, OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::order::OrderCustomer;

/// Reporting window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SalesPeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl SalesPeriod {
    /// The inclusive start of this reporting window, relative to `now`.
    ///
    /// `Day` means "since midnight UTC today"; the rest reach back a fixed
    /// span from the current instant.
    #[must_use]
    pub fn window_start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Day => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
            Self::Week => now - TimeDelta::days(7),
            Self::Month => now.checked_sub_months(Months::new(1)).unwrap_or(now),
            Self::Year => now.checked_sub_months(Months::new(12)).unwrap_or(now),
        }
    }
}

/// Order counts per status over the reporting window. Every status is
/// reported, zero or not.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusBreakdown {
    #[serde(rename = "Ordered")]
    pub ordered: u64,
    #[serde(rename = "Shipped")]
    pub shipped: u64,
    #[serde(rename = "Out for Delivery")]
    pub out_for_delivery: u64,
    #[serde(rename = "Delivered")]
    pub delivered: u64,
}

impl StatusBreakdown {
    fn from_counts(counts: &[(OrderStatus, i64)]) -> Self {
        let mut breakdown = Self::default();
        for &(status, count) in counts {
            let count = count.try_into().unwrap_or(0);
            match status {
                OrderStatus::Ordered => breakdown.ordered = count,
                OrderStatus::Shipped => breakdown.shipped = count,
                OrderStatus::OutForDelivery => breakdown.out_for_delivery = count,
                OrderStatus::Delivered => breakdown.delivered = count,
            }
        }
        breakdown
    }
}

/// One calendar day's sales in the per-day series.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DaySales {
    pub sales: Money,
    pub orders: u64,
}

/// The sales report for a reporting window.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub period: SalesPeriod,
    pub total_sales: Money,
    pub total_orders: u64,
    pub average_order_value: Decimal,
    pub status_breakdown: StatusBreakdown,
    /// Keyed by `YYYY-MM-DD` (UTC), ascending.
    pub sales_by_date: BTreeMap<String, DaySales>,
}

/// Compact order view for the dashboard's recent-orders list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub id: OrderId,
    pub user: OrderCustomer,
    pub total_price: Money,
    pub order_status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Dashboard headline numbers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub delivered_orders: u64,
    pub total_revenue: Money,
    pub recent_orders: Vec<RecentOrder>,
}

/// Repository for analytics queries.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Sales rollup for the given reporting window.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn sales(&self, period: SalesPeriod) -> Result<SalesReport, RepositoryError> {
        let since = period.window_start(Utc::now());

        let (total_sales, total_orders): (Money, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(total_price), 0), COUNT(*)
             FROM shop.orders
             WHERE created_at >= $1",
        )
        .bind(since)
        .fetch_one(self.pool)
        .await?;

        let counts: Vec<(OrderStatus, i64)> = sqlx::query_as(
            "SELECT order_status, COUNT(*)
             FROM shop.orders
             WHERE created_at >= $1
             GROUP BY order_status",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        let days: Vec<(String, Money, i64)> = sqlx::query_as(
            "SELECT to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD') AS day,
                    COALESCE(SUM(total_price), 0),
                    COUNT(*)
             FROM shop.orders
             WHERE created_at >= $1
             GROUP BY day
             ORDER BY day",
        )
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        let total_orders: u64 = total_orders.try_into().unwrap_or(0);
        let average_order_value = if total_orders == 0 {
            Decimal::ZERO
        } else {
            total_sales.amount() / Decimal::from(total_orders)
        };

        Ok(SalesReport {
            period,
            total_sales,
            total_orders,
            average_order_value,
            status_breakdown: StatusBreakdown::from_counts(&counts),
            sales_by_date: days
                .into_iter()
                .map(|(day, sales, orders)| {
                    (
                        day,
                        DaySales {
                            sales,
                            orders: orders.try_into().unwrap_or(0),
                        },
                    )
                })
                .collect(),
        })
    }

    /// Dashboard summary: headline counts, revenue, and the five most recent
    /// orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn dashboard(&self) -> Result<DashboardStats, RepositoryError> {
        let (total, pending, delivered, revenue): (i64, i64, i64, Money) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE order_status = $1),
                    COUNT(*) FILTER (WHERE order_status = $2),
                    COALESCE(SUM(total_price), 0)
             FROM shop.orders",
        )
        .bind(OrderStatus::Ordered)
        .bind(OrderStatus::Delivered)
        .fetch_one(self.pool)
        .await?;

        let recent: Vec<(OrderId, UserId, String, Email, Money, OrderStatus, DateTime<Utc>)> =
            sqlx::query_as(
                "SELECT o.id, o.user_id, u.name, u.email, o.total_price, o.order_status,
                        o.created_at
                 FROM shop.orders o
                 JOIN shop.users u ON u.id = o.user_id
                 ORDER BY o.created_at DESC
                 LIMIT 5",
            )
            .fetch_all(self.pool)
            .await?;

        Ok(DashboardStats {
            total_orders: total.try_into().unwrap_or(0),
            pending_orders: pending.try_into().unwrap_or(0),
            delivered_orders: delivered.try_into().unwrap_or(0),
            total_revenue: revenue,
            recent_orders: recent
                .into_iter()
                .map(
                    |(id, user_id, name, email, total_price, order_status, created_at)| {
                        RecentOrder {
                            id,
                            user: OrderCustomer {
                                id: user_id,
                                name,
                                email,
                            },
                            total_price,
                            order_status,
                            created_at,
                        }
                    },
                )
                .collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn at(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_day_window_starts_at_utc_midnight() {
        let now = at("2026-08-06 15:42:10");
        assert_eq!(
            SalesPeriod::Day.window_start(now),
            at("2026-08-06 00:00:00")
        );
    }

    #[test]
    fn test_week_window_reaches_back_seven_days() {
        let now = at("2026-08-06 15:42:10");
        assert_eq!(
            SalesPeriod::Week.window_start(now),
            at("2026-07-30 15:42:10")
        );
    }

    #[test]
    fn test_month_and_year_windows() {
        let now = at("2026-08-06 15:42:10");
        assert_eq!(
            SalesPeriod::Month.window_start(now),
            at("2026-07-06 15:42:10")
        );
        assert_eq!(
            SalesPeriod::Year.window_start(now),
            at("2025-08-06 15:42:10")
        );
    }

    #[test]
    fn test_default_period_is_month() {
        assert_eq!(SalesPeriod::default(), SalesPeriod::Month);
    }

    #[test]
    fn test_breakdown_reports_every_status() {
        let breakdown = StatusBreakdown::from_counts(&[
            (OrderStatus::Ordered, 3),
            (OrderStatus::Delivered, 1),
        ]);
        assert_eq!(breakdown.ordered, 3);
        assert_eq!(breakdown.shipped, 0);
        assert_eq!(breakdown.out_for_delivery, 0);
        assert_eq!(breakdown.delivered, 1);

        let json = serde_json::to_value(breakdown).unwrap();
        assert_eq!(json["Out for Delivery"], 0);
        assert_eq!(json["Ordered"], 3);
    }
}
