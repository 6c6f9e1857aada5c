//! Closed enumerations for order lifecycle, roles, payment, and notifications.
//!
//! All of these are stored as TEXT in `PostgreSQL` and round-trip through
//! their wire (JSON) spelling, so `Display`/`FromStr` and the serde renames
//! must stay in lockstep.

use serde::{Deserialize, Serialize};

/// Implements `Display`, `FromStr`, and TEXT-backed sqlx support for a
/// unit-variant enum, given `variant => "wire name"` pairs.
///
/// `FromStr` is closed: anything outside the listed spellings is an error,
/// so unrecognized values are rejected at the boundary instead of being
/// persisted verbatim.
macro_rules! impl_text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $text)),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($name), ": {}"), s)),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(s.parse()?)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<sqlx::Postgres>>::encode(self.to_string(), buf)
            }
        }
    };
}

/// Order lifecycle state.
///
/// `Ordered` is the sole initial state. Reaching `Delivered` stamps the
/// order's delivery timestamp; the state machine does not otherwise restrict
/// which recognized state an admin may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    #[default]
    Ordered,
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    /// All recognized states, in lifecycle order. Used for analytics
    /// breakdowns that must report every state even when its count is zero.
    pub const ALL: [Self; 4] = [
        Self::Ordered,
        Self::Shipped,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Whether this state marks the order as delivered.
    #[must_use]
    pub const fn is_delivered(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl_text_enum!(OrderStatus {
    Ordered => "Ordered",
    Shipped => "Shipped",
    OutForDelivery => "Out for Delivery",
    Delivered => "Delivered",
});

/// User role: plain customer or store admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Customer,
    Admin,
}

impl UserRole {
    /// Whether this role grants access to admin-only operations.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl_text_enum!(UserRole {
    Customer => "customer",
    Admin => "admin",
});

/// Payment method fixed at order creation.
///
/// Only cash on delivery is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "COD")]
    CashOnDelivery,
}

impl_text_enum!(PaymentMethod {
    CashOnDelivery => "COD",
});

/// Notification category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Order,
    Product,
    System,
    #[default]
    General,
}

impl_text_enum!(NotificationKind {
    Order => "order",
    Product => "product",
    System => "system",
    General => "general",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_spelling() {
        assert_eq!(OrderStatus::OutForDelivery.to_string(), "Out for Delivery");
        assert_eq!(
            serde_json::to_string(&OrderStatus::OutForDelivery).unwrap(),
            "\"Out for Delivery\""
        );
    }

    #[test]
    fn test_order_status_from_str_closed_set() {
        assert_eq!(
            "Ordered".parse::<OrderStatus>().unwrap(),
            OrderStatus::Ordered
        );
        assert_eq!(
            "Out for Delivery".parse::<OrderStatus>().unwrap(),
            OrderStatus::OutForDelivery
        );
        assert!("Cancelled".parse::<OrderStatus>().is_err());
        assert!("delivered".parse::<OrderStatus>().is_err());
        assert!(String::new().parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_status_default_is_ordered() {
        assert_eq!(OrderStatus::default(), OrderStatus::Ordered);
    }

    #[test]
    fn test_is_delivered_only_for_terminal_state() {
        assert!(OrderStatus::Delivered.is_delivered());
        assert!(!OrderStatus::Ordered.is_delivered());
        assert!(!OrderStatus::Shipped.is_delivered());
        assert!(!OrderStatus::OutForDelivery.is_delivered());
    }

    #[test]
    fn test_user_role_parsing() {
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert_eq!("customer".parse::<UserRole>().unwrap(), UserRole::Customer);
        assert!("superuser".parse::<UserRole>().is_err());
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Customer.is_admin());
    }

    #[test]
    fn test_payment_method_cod_spelling() {
        assert_eq!(PaymentMethod::CashOnDelivery.to_string(), "COD");
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"COD\""
        );
        assert_eq!(
            "COD".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CashOnDelivery
        );
    }

    #[test]
    fn test_notification_kind_roundtrip() {
        for kind in [
            NotificationKind::Order,
            NotificationKind::Product,
            NotificationKind::System,
            NotificationKind::General,
        ] {
            assert_eq!(kind.to_string().parse::<NotificationKind>().unwrap(), kind);
        }
    }
}
