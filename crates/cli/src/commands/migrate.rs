//! Database migration command.
//!
//! Runs the embedded migrations from `crates/api/migrations/`. The session
//! store's schema is managed by the API binary itself on startup.

use super::CommandError;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
