//! Shipping address value object.
//!
//! Copied by value into each order at creation; later edits to a user's
//! saved addresses never touch historical orders.

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating a [`ShippingAddress`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// A required field is empty or whitespace.
    #[error("address field '{0}' is required")]
    MissingField(&'static str),
}

/// A full shipping address. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// Check that every field is present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let fields = [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
            ("country", &self.country),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AddressError::MissingField(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> ShippingAddress {
        ShippingAddress {
            street: "12 Orchard Lane".to_owned(),
            city: "Springfield".to_owned(),
            state: "OR".to_owned(),
            zip_code: "97403".to_owned(),
            country: "USA".to_owned(),
        }
    }

    #[test]
    fn test_validate_complete_address() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut addr = sample();
        addr.city = "   ".to_owned();
        assert_eq!(addr.validate(), Err(AddressError::MissingField("city")));

        let mut addr = sample();
        addr.zip_code = String::new();
        assert_eq!(addr.validate(), Err(AddressError::MissingField("zipCode")));
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("zipCode").is_some());
        assert!(json.get("zip_code").is_none());
    }
}
