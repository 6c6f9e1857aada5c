//! Notification repository.
//!
//! Notifications are append-only; the only mutation is read-marking.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use clementine_core::{NotificationId, NotificationKind, UserId};

use super::RepositoryError;
use crate::models::notification::{NewNotification, Notification};

/// How many notifications the listing endpoint returns.
const LIST_LIMIT: i64 = 50;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRow {
    id: NotificationId,
    user_id: UserId,
    message: String,
    kind: NotificationKind,
    is_read: bool,
    related_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<NotificationRow> for Notification {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: row.id,
            user: row.user_id,
            message: row.message,
            kind: row.kind,
            is_read: row.is_read,
            related_id: row.related_id,
            created_at: row.created_at,
        }
    }
}

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, message, kind, is_read, related_id, created_at";

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Bulk-insert notifications in one statement.
    ///
    /// Inserting an empty batch is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_many(
        &self,
        notifications: &[NewNotification],
    ) -> Result<(), RepositoryError> {
        if notifications.is_empty() {
            return Ok(());
        }

        let users: Vec<Uuid> = notifications.iter().map(|n| n.user.as_uuid()).collect();
        let messages: Vec<String> = notifications.iter().map(|n| n.message.clone()).collect();
        let kinds: Vec<String> = notifications.iter().map(|n| n.kind.to_string()).collect();
        let related: Vec<Option<Uuid>> = notifications.iter().map(|n| n.related_id).collect();

        sqlx::query(
            "INSERT INTO shop.notifications (user_id, message, kind, related_id)
             SELECT * FROM UNNEST($1::uuid[], $2::text[], $3::text[], $4::uuid[])",
        )
        .bind(&users)
        .bind(&messages)
        .bind(&kinds)
        .bind(&related)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// A user's most recent notifications and their unread count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user: UserId,
    ) -> Result<(Vec<Notification>, u64), RepositoryError> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS}
             FROM shop.notifications
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2"
        ))
        .bind(user)
        .bind(LIST_LIMIT)
        .fetch_all(self.pool)
        .await?;

        let unread: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM shop.notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user)
        .fetch_one(self.pool)
        .await?;

        Ok((
            rows.into_iter().map(Into::into).collect(),
            unread.try_into().unwrap_or(0),
        ))
    }

    /// Get a notification by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, RepositoryError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM shop.notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Mark one notification read and return it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if it does not exist.
    pub async fn mark_read(
        &self,
        id: NotificationId,
    ) -> Result<Notification, RepositoryError> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "UPDATE shop.notifications SET is_read = TRUE
             WHERE id = $1
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Mark every unread notification for a user as read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_all_read(&self, user: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE shop.notifications SET is_read = TRUE
             WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
