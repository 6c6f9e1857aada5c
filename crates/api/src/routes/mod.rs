//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (DB probe)
//!
//! # Auth
//! POST /api/auth/register           - Create an account and log in
//! POST /api/auth/login              - Log in
//! POST /api/auth/logout             - Log out
//! GET  /api/auth/me                 - Current user
//!
//! # Users
//! GET  /api/users/profile           - Own profile
//! PUT  /api/users/profile           - Update own profile
//! POST /api/users/addresses         - Add a saved address
//! PUT  /api/users/addresses/{id}    - Update a saved address
//! DELETE /api/users/addresses/{id}  - Delete a saved address
//!
//! # Catalog
//! GET  /api/products                - Filtered, paginated listing
//! GET  /api/products/{id}           - Product detail with reviews
//! POST /api/products                - Create product (admin)
//! PUT  /api/products/{id}           - Update product (admin)
//! DELETE /api/products/{id}         - Delete product (admin)
//! POST /api/products/{id}/reviews   - Add a review
//! GET  /api/categories              - All categories
//! GET  /api/categories/{id}         - One category
//! POST /api/categories              - Create category (admin)
//! PUT  /api/categories/{id}         - Update category (admin)
//! DELETE /api/categories/{id}       - Delete category (admin)
//!
//! # Cart & Wishlist
//! GET  /api/cart                    - Own cart (lazily created)
//! POST /api/cart                    - Add a product
//! PUT  /api/cart/items/{id}         - Change a line's quantity
//! DELETE /api/cart/items/{id}       - Remove a line
//! DELETE /api/cart                  - Clear the cart
//! GET  /api/wishlist                - Own wishlist (lazily created)
//! POST /api/wishlist                - Add a product
//! DELETE /api/wishlist/{productId}  - Remove a product
//!
//! # Orders
//! POST /api/orders                  - Place an order
//! GET  /api/orders?status=          - Own orders, newest first
//! GET  /api/orders/{id}             - One order (owner or admin)
//! GET  /api/orders/admin/all        - All orders, paged (admin)
//! PUT  /api/orders/{id}/status      - Transition status (admin)
//!
//! # Notifications
//! GET  /api/notifications           - Recent notifications + unread count
//! PUT  /api/notifications/{id}/read - Mark one read
//! PUT  /api/notifications/read-all  - Mark all read
//!
//! # Analytics (admin)
//! GET  /api/analytics/sales?period= - Sales rollup for a window
//! GET  /api/analytics/dashboard     - Dashboard summary
//! ```

pub mod analytics;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the user profile and address routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/addresses", post(users::add_address))
        .route(
            "/addresses/{id}",
            put(users::update_address).delete(users::delete_address),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/{id}/reviews", post(products::add_review))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::remove),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route(
            "/items/{id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show).post(wishlist::add))
        .route("/{productId}", delete(wishlist::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create).get(orders::list))
        .route("/admin/all", get(orders::admin_list))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list))
        .route("/read-all", put(notifications::mark_all_read))
        .route("/{id}/read", put(notifications::mark_read))
}

/// Create the analytics routes router.
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(analytics::sales))
        .route("/dashboard", get(analytics::dashboard))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .nest("/api/categories", category_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/notifications", notification_routes())
        .nest("/api/analytics", analytics_routes())
}
