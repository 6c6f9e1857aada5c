//! Admin user management.

use clementine_api::services::auth::{hash_password, validate_password};
use clementine_core::Email;

use super::CommandError;

/// Create a user with the admin role.
///
/// # Errors
///
/// Returns an error if the email is invalid, the password is too weak, or
/// the email is already registered.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::Invalid(e.to_string()))?;
    validate_password(password).map_err(|e| CommandError::Invalid(e.to_string()))?;
    let password_hash =
        hash_password(password).map_err(|e| CommandError::Invalid(e.to_string()))?;

    let pool = super::connect().await?;

    sqlx::query(
        "INSERT INTO shop.users (name, email, password_hash, role)
         VALUES ($1, $2, $3, 'admin')",
    )
    .bind(name)
    .bind(email.as_str())
    .bind(&password_hash)
    .execute(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return CommandError::Invalid(format!("{email} is already registered"));
        }
        CommandError::Database(e)
    })?;

    tracing::info!("Admin user {email} created");
    Ok(())
}
