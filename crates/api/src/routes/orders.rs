//! Order handlers: placement, listing, retrieval, and status transitions.
//!
//! Placement itself is transactional and lives in the order repository. The
//! notification fan-out here runs after the order is committed: the order row
//! is the source of truth for "the purchase happened", so a fan-out failure
//! is logged and the response stays successful.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use clementine_core::{Money, OrderId, OrderStatus, ProductId, ShippingAddress};

use crate::db::notifications::NotificationRepository;
use crate::db::orders::{LineItemRequest, OrderRepository};
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireUser};
use crate::models::notification::NewNotification;
use crate::models::order::Order;
use crate::response::{ApiResponse, ListResponse, PageResponse};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;

/// One requested order line.
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product: ProductId,
    pub quantity: u32,
}

/// Request for placing an order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub shipping_address: ShippingAddress,
    pub total_price: Money,
}

/// Own-order listing filter.
#[derive(Debug, Deserialize, Default)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

/// Admin listing filter and pagination.
#[derive(Debug, Deserialize, Default)]
pub struct AdminOrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Request for transitioning an order's status.
///
/// The value arrives as a raw string and is parsed against the closed status
/// set, so unrecognized values are rejected instead of persisted.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Place an order from the submitted cart snapshot.
///
/// # Errors
///
/// Returns 400 for an empty item list, a zero quantity, an invalid address,
/// a total that disagrees with catalog prices, or insufficient stock; 404
/// for an unknown product.
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse> {
    if body.items.is_empty() {
        return Err(AppError::InvalidInput("No order items".to_owned()));
    }
    if body.items.iter().any(|item| item.quantity == 0) {
        return Err(AppError::InvalidInput(
            "Item quantity must be at least 1".to_owned(),
        ));
    }
    body.shipping_address
        .validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let items: Vec<LineItemRequest> = body
        .items
        .iter()
        .map(|item| LineItemRequest {
            product: item.product,
            quantity: item.quantity,
        })
        .collect();

    let order = OrderRepository::new(state.pool())
        .place(user.id, &items, &body.shipping_address, body.total_price)
        .await?;

    tracing::info!(order_id = %order.id, user_id = %user.id, "order placed");
    notify_order_placed(&state, &order, &user.name).await;

    Ok(ApiResponse::created(order))
}

/// Notify the customer and every admin that an order was placed.
///
/// Best-effort: failures are logged, never surfaced, and the order stands.
async fn notify_order_placed(state: &AppState, order: &Order, customer_name: &str) {
    let result: std::result::Result<(), crate::db::RepositoryError> = async {
        let admins = UserRepository::new(state.pool()).admin_ids().await?;

        let mut batch = Vec::with_capacity(admins.len() + 1);
        batch.push(NewNotification::order_placed(order.user.id, order.id));
        batch.extend(
            admins
                .into_iter()
                .map(|admin| NewNotification::order_received(admin, order.id, customer_name)),
        );

        NotificationRepository::new(state.pool())
            .insert_many(&batch)
            .await
    }
    .await;

    if let Err(e) = result {
        tracing::warn!(
            order_id = %order.id,
            error = %e,
            "order placed but notification fan-out failed"
        );
    }
}

/// Own orders, newest first, optionally filtered by status.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn list(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id, query.status)
        .await?;

    Ok(ListResponse::ok(orders))
}

/// One order; visible to its owner and to admins only.
///
/// # Errors
///
/// Returns 404 if the order does not exist, 403 for anyone who is neither
/// the owner nor an admin.
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if order.user.id != user.id && !user.role.is_admin() {
        return Err(AppError::Forbidden(
            "Not authorized to view this order".to_owned(),
        ));
    }

    Ok(ApiResponse::ok(order))
}

/// All orders, paged (admin).
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn admin_list(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminOrderListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let (orders, total) = OrderRepository::new(state.pool())
        .list_all(query.status, page, limit)
        .await?;

    Ok(PageResponse::ok(orders, total, page, limit))
}

/// Transition an order's status (admin) and notify its owner.
///
/// # Errors
///
/// Returns 400 for an unrecognized status value, 404 if the order does not
/// exist.
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<impl IntoResponse> {
    let status: OrderStatus = body
        .status
        .parse()
        .map_err(|e: String| AppError::InvalidInput(e))?;

    let order = OrderRepository::new(state.pool())
        .set_status(id, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    let notification =
        NewNotification::order_status_changed(order.user.id, order.id, order.order_status);
    if let Err(e) = NotificationRepository::new(state.pool())
        .insert_many(std::slice::from_ref(&notification))
        .await
    {
        tracing::warn!(
            order_id = %order.id,
            error = %e,
            "status updated but owner notification failed"
        );
    }

    Ok(ApiResponse::ok(order))
}
