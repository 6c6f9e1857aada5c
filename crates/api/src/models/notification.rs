//! Notification domain types and message composition.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use clementine_core::{NotificationId, NotificationKind, OrderId, OrderStatus, UserId};

/// An append-only message addressed to one user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub user: UserId,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub is_read: bool,
    /// The entity this notification is about (e.g. an order).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A notification waiting to be inserted.
///
/// All messages are server-composed here, so wording stays in one place.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user: UserId,
    pub message: String,
    pub kind: NotificationKind,
    pub related_id: Option<Uuid>,
}

impl NewNotification {
    /// Confirmation sent to the customer who placed an order.
    #[must_use]
    pub fn order_placed(user: UserId, order: OrderId) -> Self {
        Self {
            user,
            message: format!(
                "Your order #{} has been placed successfully",
                order.short_code()
            ),
            kind: NotificationKind::Order,
            related_id: Some(order.as_uuid()),
        }
    }

    /// Heads-up sent to each admin when a new order arrives.
    #[must_use]
    pub fn order_received(admin: UserId, order: OrderId, customer_name: &str) -> Self {
        Self {
            user: admin,
            message: format!(
                "New order #{} received from {customer_name}",
                order.short_code()
            ),
            kind: NotificationKind::Order,
            related_id: Some(order.as_uuid()),
        }
    }

    /// Status update sent to the order's owner.
    #[must_use]
    pub fn order_status_changed(user: UserId, order: OrderId, status: OrderStatus) -> Self {
        Self {
            user,
            message: format!(
                "Your order #{} status updated to: {status}",
                order.short_code()
            ),
            kind: NotificationKind::Order,
            related_id: Some(order.as_uuid()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order_id() -> OrderId {
        OrderId::new("f47ac10b-58cc-4372-a567-0e02b2c3d479".parse().unwrap())
    }

    #[test]
    fn test_order_placed_message_carries_short_code() {
        let n = NewNotification::order_placed(UserId::generate(), order_id());
        assert_eq!(
            n.message,
            "Your order #c3d479 has been placed successfully"
        );
        assert_eq!(n.kind, NotificationKind::Order);
        assert_eq!(n.related_id, Some(order_id().as_uuid()));
    }

    #[test]
    fn test_order_received_names_customer() {
        let n = NewNotification::order_received(UserId::generate(), order_id(), "Jane Doe");
        assert_eq!(n.message, "New order #c3d479 received from Jane Doe");
    }

    #[test]
    fn test_status_change_message_spells_out_status() {
        let n = NewNotification::order_status_changed(
            UserId::generate(),
            order_id(),
            OrderStatus::OutForDelivery,
        );
        assert_eq!(
            n.message,
            "Your order #c3d479 status updated to: Out for Delivery"
        );
    }
}
