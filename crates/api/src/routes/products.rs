//! Product catalog handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use clementine_core::{CategoryId, Money, ProductId};

use crate::db::products::{NewProduct, ProductFilter, ProductRepository, ProductSort, ProductUpdate};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireUser};
use crate::response::{ApiResponse, PageResponse};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 10;

/// Catalog listing query parameters.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    pub category: Option<CategoryId>,
    pub featured: Option<bool>,
    pub search: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub rating: Option<Decimal>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Request for creating a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub category: CategoryId,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock: u32,
    #[serde(default)]
    pub is_featured: bool,
}

/// Partial product update; omitted fields are untouched.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub category: Option<CategoryId>,
    pub images: Option<Vec<String>>,
    pub stock: Option<u32>,
    pub is_featured: Option<bool>,
}

/// Request for reviewing a product.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i16,
    pub comment: String,
}

/// Filtered, paginated catalog listing.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let filter = ProductFilter {
        category: query.category,
        featured: query.featured == Some(true),
        search: query.search,
        min_price: query.min_price,
        max_price: query.max_price,
        min_rating: query.rating,
        sort: ProductSort::from_query(query.sort.as_deref()),
        page,
        limit,
    };

    let (products, total) = ProductRepository::new(state.pool()).list(&filter).await?;

    Ok(PageResponse::ok(products, total, page, limit))
}

/// Product detail with populated category and reviews.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = ProductRepository::new(state.pool())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    Ok(ApiResponse::ok(product))
}

/// Create a product (admin).
///
/// # Errors
///
/// Returns 400 on invalid fields or an unknown category.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Product name is required".to_owned()));
    }
    if body.description.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Product description is required".to_owned(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .create(NewProduct {
            name: body.name.trim().to_owned(),
            description: body.description,
            price: body.price,
            category: body.category,
            images: body.images,
            stock: i32::try_from(body.stock)
                .map_err(|_| AppError::InvalidInput("Stock out of range".to_owned()))?,
            is_featured: body.is_featured,
        })
        .await?;

    Ok(ApiResponse::created(product))
}

/// Update a product (admin).
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse> {
    let stock = body
        .stock
        .map(i32::try_from)
        .transpose()
        .map_err(|_| AppError::InvalidInput("Stock out of range".to_owned()))?;

    let product = ProductRepository::new(state.pool())
        .update(
            id,
            ProductUpdate {
                name: body.name,
                description: body.description,
                price: body.price,
                category: body.category,
                images: body.images,
                stock,
                is_featured: body.is_featured,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(ApiResponse::ok(product))
}

/// Delete a product (admin). Cart and wishlist references go with it; order
/// snapshots are untouched.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(ApiResponse::message("Product deleted successfully"))
}

/// Add a review; one per user per product.
///
/// # Errors
///
/// Returns 400 on an out-of-range rating or a duplicate review, 404 if the
/// product does not exist.
pub async fn add_review(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<ReviewRequest>,
) -> Result<impl IntoResponse> {
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::InvalidInput(
            "Rating must be between 1 and 5".to_owned(),
        ));
    }
    if body.comment.trim().is_empty() {
        return Err(AppError::InvalidInput("Comment is required".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .add_review(id, user.id, &user.name, body.rating, body.comment.trim())
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(ApiResponse::created(product))
}
