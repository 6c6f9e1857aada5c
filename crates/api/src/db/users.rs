//! User and address repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{AddressId, Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::{Address, User};

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    name: String,
    email: Email,
    role: UserRole,
    avatar: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            avatar: row.avatar,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: AddressId,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
    is_default: bool,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: row.id,
            street: row.street,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            country: row.country,
            is_default: row.is_default,
        }
    }
}

/// Fields to change on a profile update; `None` leaves a field untouched.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub avatar: Option<String>,
    pub password_hash: Option<String>,
}

/// Input for creating or updating a saved address.
#[derive(Debug)]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub is_default: bool,
}

const USER_COLUMNS: &str = "id, name, email, role, avatar, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO shop.users (name, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM shop.users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Get a user together with their password hash, for login verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct CredentialRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM shop.users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| (r.user.into(), r.password_hash)))
    }

    /// Apply a partial profile update and return the fresh user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Conflict` if the new email is already taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE shop.users SET
                 name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 avatar = COALESCE($4, avatar),
                 password_hash = COALESCE($5, password_hash),
                 updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.email)
        .bind(update.avatar)
        .bind(update.password_hash)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// IDs of every user holding the admin role, for notification fan-out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn admin_ids(&self) -> Result<Vec<UserId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, UserId>(
            "SELECT id FROM shop.users WHERE role = $1",
        )
        .bind(UserRole::Admin)
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }

    // =========================================================================
    // Saved addresses
    // =========================================================================

    /// All saved addresses for a user, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_addresses(&self, user: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            "SELECT id, street, city, state, zip_code, country, is_default
             FROM shop.addresses
             WHERE user_id = $1
             ORDER BY is_default DESC, created_at",
        )
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Save a new address.
    ///
    /// The first saved address always becomes the default; explicitly marking
    /// a later one default clears the previous default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn add_address(
        &self,
        user: UserId,
        address: NewAddress,
    ) -> Result<Vec<Address>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM shop.addresses WHERE user_id = $1")
                .bind(user)
                .fetch_one(&mut *tx)
                .await?;

        let is_default = address.is_default || existing == 0;
        if is_default {
            sqlx::query("UPDATE shop.addresses SET is_default = FALSE WHERE user_id = $1")
                .bind(user)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "INSERT INTO shop.addresses
                 (user_id, street, city, state, zip_code, country, is_default)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(&address.country)
        .bind(is_default)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.list_addresses(user).await
    }

    /// Update an existing address, with the same default bookkeeping as
    /// [`Self::add_address`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not belong to
    /// the user.
    pub async fn update_address(
        &self,
        user: UserId,
        id: AddressId,
        address: NewAddress,
    ) -> Result<Vec<Address>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if address.is_default {
            sqlx::query("UPDATE shop.addresses SET is_default = FALSE WHERE user_id = $1")
                .bind(user)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query(
            "UPDATE shop.addresses SET
                 street = $3, city = $4, state = $5, zip_code = $6, country = $7,
                 is_default = $8, updated_at = now()
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user)
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(&address.country)
        .bind(address.is_default)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        self.list_addresses(user).await
    }

    /// Delete an address. Deleting an address that is not there is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_address(
        &self,
        user: UserId,
        id: AddressId,
    ) -> Result<Vec<Address>, RepositoryError> {
        sqlx::query("DELETE FROM shop.addresses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user)
            .execute(self.pool)
            .await?;

        self.list_addresses(user).await
    }
}
