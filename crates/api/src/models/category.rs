//! Category domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use clementine_core::CategoryId;

/// A product category. Names are unique.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    /// Image URL, empty when none set.
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
