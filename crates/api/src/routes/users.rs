//! Profile and saved-address handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;

use clementine_core::{AddressId, Email, ShippingAddress};

use crate::db::users::{NewAddress, ProfileUpdate, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireUser, set_current_user};
use crate::models::user::CurrentUser;
use crate::response::ApiResponse;
use crate::services::auth::{hash_password, validate_password};
use crate::state::AppState;

/// Partial profile update; omitted fields are untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub password: Option<String>,
}

/// A saved address payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressRequest {
    fn validated(self) -> Result<NewAddress> {
        let address = ShippingAddress {
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
        };
        address
            .validate()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;

        Ok(NewAddress {
            street: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
            country: address.country,
            is_default: self.is_default,
        })
    }
}

/// Own profile.
///
/// # Errors
///
/// Returns 404 if the account no longer exists.
pub async fn get_profile(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse> {
    let user = UserRepository::new(state.pool())
        .find_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_owned()))?;

    Ok(ApiResponse::ok(user))
}

/// Update own profile; also refreshes the session copy of the user.
///
/// # Errors
///
/// Returns 400 on invalid email or weak password, 404 if the account no
/// longer exists.
pub async fn update_profile(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse> {
    let email = body
        .email
        .map(|raw| Email::parse(&raw))
        .transpose()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let password_hash = match body.password {
        Some(password) => {
            validate_password(&password)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };

    let user = UserRepository::new(state.pool())
        .update_profile(
            current.id,
            ProfileUpdate {
                name: body.name,
                email,
                avatar: body.avatar,
                password_hash,
            },
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("User not found".to_owned())
            }
            other => other.into(),
        })?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(ApiResponse::ok(user))
}

/// Save a new address.
///
/// # Errors
///
/// Returns 400 when a required field is blank.
pub async fn add_address(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddressRequest>,
) -> Result<impl IntoResponse> {
    let addresses = UserRepository::new(state.pool())
        .add_address(current.id, body.validated()?)
        .await?;

    Ok(ApiResponse::created(addresses))
}

/// Update a saved address.
///
/// # Errors
///
/// Returns 404 if the address does not belong to the user.
pub async fn update_address(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
    Json(body): Json<AddressRequest>,
) -> Result<impl IntoResponse> {
    let addresses = UserRepository::new(state.pool())
        .update_address(current.id, id, body.validated()?)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Address not found".to_owned())
            }
            other => other.into(),
        })?;

    Ok(ApiResponse::ok(addresses))
}

/// Delete a saved address.
///
/// # Errors
///
/// Returns 500 on database failure.
pub async fn delete_address(
    RequireUser(current): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<AddressId>,
) -> Result<impl IntoResponse> {
    let addresses = UserRepository::new(state.pool())
        .delete_address(current.id, id)
        .await?;

    Ok(ApiResponse::ok(addresses))
}
