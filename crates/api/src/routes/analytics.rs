//! Admin analytics handlers.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::db::analytics::{AnalyticsRepository, SalesPeriod};
use crate::error::Result;
use crate::middleware::auth::RequireAdmin;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Reporting window query parameter.
#[derive(Debug, Deserialize, Default)]
pub struct SalesQuery {
    pub period: Option<SalesPeriod>,
}

/// Sales rollup for the selected window (default: month).
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn sales(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<SalesQuery>,
) -> Result<impl IntoResponse> {
    let report = AnalyticsRepository::new(state.pool())
        .sales(query.period.unwrap_or_default())
        .await?;

    Ok(ApiResponse::ok(report))
}

/// Dashboard summary: headline counts, revenue, recent orders.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn dashboard(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let stats = AnalyticsRepository::new(state.pool()).dashboard().await?;

    Ok(ApiResponse::ok(stats))
}
