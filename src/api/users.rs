//! User administration endpoints, all gated on the Shopkeeper role.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{UpdateRoleRequest, UserResponse};
use crate::session::Session;
use crate::AppState;

use super::auth::require_shopkeeper;
use super::error::ApiError;
use super::validation::validate_role;

#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub status: String,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// List all users; the password hash never leaves the store.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<UsersListResponse>, ApiError> {
    require_shopkeeper(&session)?;

    let users: Vec<UserResponse> =
        sqlx::query_as("SELECT id, name, email, role FROM users ORDER BY created_at")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(UsersListResponse {
        status: "success".to_string(),
        users,
    }))
}

/// Change a user's role within the closed role set.
pub async fn update_user_role(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    require_shopkeeper(&session)?;

    let role = validate_role(&request.role).map_err(ApiError::bad_request)?;

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role.as_str())
        .bind(&now)
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = %id, role = %role, "User role updated");

    Ok(Json(StatusResponse {
        status: "success".to_string(),
        message: "User role updated".to_string(),
    }))
}

/// Delete a user. Callers cannot delete their own account, whatever their
/// role.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_shopkeeper(&session)?;

    if session.id == id {
        return Err(ApiError::bad_request("You cannot delete your own account."));
    }

    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = %id, deleted_by = %session.id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
