//! Order domain types.
//!
//! Line items and the shipping address are snapshots captured at order time:
//! they are stored as JSON documents on the order row, so later catalog or
//! address-book edits never alter a placed order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{
    Email, Money, OrderId, OrderStatus, PaymentMethod, ProductId, ShippingAddress, UserId,
};

/// One order line, frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// The catalog product this line was created from.
    pub product: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Units ordered, at least 1.
    pub quantity: u32,
    /// Per-unit price at order time.
    pub unit_price: Money,
    /// Primary product image at order time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OrderItem {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// The populated `{ id, name, email }` view of the order's owner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCustomer {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user: OrderCustomer,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_price: Money,
    pub order_status: OrderStatus,
    /// Stamped once, on the first transition to `Delivered`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compute an order's total from its line items.
#[must_use]
pub fn order_total(items: &[OrderItem]) -> Money {
    items.iter().map(OrderItem::line_total).sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn money(s: &str) -> Money {
        Money::new(s.parse::<Decimal>().unwrap()).unwrap()
    }

    fn item(name: &str, quantity: u32, unit_price: &str) -> OrderItem {
        OrderItem {
            product: ProductId::generate(),
            name: name.to_owned(),
            quantity,
            unit_price: money(unit_price),
            image: None,
        }
    }

    #[test]
    fn test_line_total_scales_by_quantity() {
        assert_eq!(item("Mug", 3, "12.50").line_total(), money("37.50"));
    }

    #[test]
    fn test_order_total_sums_lines() {
        let items = vec![item("Mug", 2, "100"), item("Tray", 1, "24.50")];
        assert_eq!(order_total(&items), money("224.50"));
        assert_eq!(order_total(&[]), Money::ZERO);
    }

    #[test]
    fn test_items_roundtrip_through_json() {
        // Items are persisted as a JSONB document; the snapshot must survive
        // serialization exactly.
        let items = vec![OrderItem {
            product: ProductId::generate(),
            name: "Mug".to_owned(),
            quantity: 2,
            unit_price: money("12.50"),
            image: Some("https://img.example/mug.jpg".to_owned()),
        }];
        let json = serde_json::to_value(&items).unwrap();
        assert!(json[0].get("unitPrice").is_some());

        let back: Vec<OrderItem> = serde_json::from_value(json).unwrap();
        assert_eq!(back, items);
    }
}
