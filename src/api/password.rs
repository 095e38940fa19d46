//! Password-reset flow: token issuance delivered by email, then redemption.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::User;
use crate::reset::{issue_reset_token, verify_reset_token, ResetTokenError};
use crate::AppState;

use super::auth::hash_password;
use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordResponse {
    pub message: String,
    /// Reset link, echoed back only when SMTP is not configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Issue a reset token for the account behind an email address and send the
/// redemption link. The store reads all happen before the send, so a mail
/// failure leaves nothing to roll back.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ForgotPasswordRequest>,
) -> Result<Json<ForgotPasswordResponse>, ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::not_found("No account with that email"))?;

    let token = issue_reset_token(
        &state.config.auth.reset_secret,
        &user.id,
        state.config.auth.reset_token_minutes,
    )
    .map_err(|e| {
        tracing::error!("Failed to issue reset token: {}", e);
        ApiError::internal("Server error")
    })?;

    let reset_url = format!(
        "{}/reset-password.html?token={}",
        state.config.server.public_url.trim_end_matches('/'),
        token
    );

    let mut preview = None;
    if state.mailer.is_enabled() {
        state
            .mailer
            .send_password_reset_email(
                &user.email,
                &reset_url,
                state.config.auth.reset_token_minutes,
            )
            .await
            .map_err(|e| {
                tracing::error!(email = %user.email, "Failed to send reset email: {}", e);
                ApiError::internal("Server error")
            })?;
    } else {
        // Dev mode: no SMTP relay, hand the link back instead.
        tracing::warn!(email = %user.email, url = %reset_url, "Email not configured, returning reset link in response");
        preview = Some(reset_url);
    }

    Ok(Json(ForgotPasswordResponse {
        message: "Password reset email sent".to_string(),
        preview,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub message: String,
}

/// Redeem a reset token. Each token authorizes exactly one password change;
/// the consumed-id set rejects replays until the token would have expired
/// on its own.
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, ApiError> {
    let token = request
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Token is required"))?;
    let new_password = request
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Password is required"))?;

    let claims = verify_reset_token(&state.config.auth.reset_secret, &token).map_err(|e| {
        match e {
            ResetTokenError::Expired => ApiError::bad_request("Reset token has expired"),
            ResetTokenError::Invalid => ApiError::bad_request("Invalid token"),
        }
    })?;

    if !state.used_reset_tokens.consume(&claims) {
        return Err(ApiError::bad_request("Reset token has already been used"));
    }

    let password_hash = hash_password(&new_password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Server error")
    })?;

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(&password_hash)
        .bind(&now)
        .bind(&claims.sub)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = %claims.sub, "Password reset");

    Ok(Json(ResetPasswordResponse {
        message: "Password has been reset successfully".to_string(),
    }))
}
