//! Authentication endpoints and the request-time authorization gate.
//!
//! A login exchanges credentials for an opaque session token delivered in an
//! httpOnly cookie; every protected handler receives the session snapshot
//! through the `Session` extractor and checks its role explicitly.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    response::Redirect,
    Json,
};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{LoginRequest, RegisterRequest, Role, User};
use crate::session::Session;
use crate::AppState;

use super::error::ApiError;
use super::validation::{validate_email, validate_role};

/// Session token cookie name
pub const SESSION_COOKIE: &str = "stockr_session";

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Extractor for the current authenticated session. Rejects with 401 when
/// the cookie is absent or no live session matches it. Use
/// `Option<Session>` where anonymity is not an error.
#[async_trait]
impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        state
            .sessions
            .get(&token)
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))
    }
}

/// Require the privileged role; the snapshot taken at login is
/// authoritative until the session ends.
pub fn require_shopkeeper(session: &Session) -> Result<(), ApiError> {
    if session.role != Role::Shopkeeper {
        return Err(ApiError::forbidden("Access denied"));
    }
    Ok(())
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.auth.secure_cookies)
        .build()
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// Register endpoint
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if request.name.is_empty()
        || request.email.is_empty()
        || request.password.is_empty()
        || request.role.is_empty()
    {
        return Err(ApiError::validation("All fields required"));
    }

    validate_email(&request.email).map_err(ApiError::validation)?;
    let role = validate_role(&request.role).map_err(ApiError::validation)?;

    // Advisory fast path; the UNIQUE constraint on email is the
    // authoritative guard for racing registrations.
    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to process registration")
    })?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&request.name)
    .bind(&request.email)
    .bind(&password_hash)
    .bind(role.as_str())
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("Email already registered")
        } else {
            tracing::error!("Failed to create user: {}", e);
            ApiError::database("Failed to create user")
        }
    })?;

    tracing::info!(email = %request.email, role = %role, "User registered");

    Ok(Json(AuthResponse {
        success: true,
        message: "Registration successful".to_string(),
    }))
}

/// Login endpoint
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&request.email)
        .fetch_optional(&state.db)
        .await?;

    let user = user.ok_or_else(|| ApiError::bad_request("Email not registered"))?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(ApiError::bad_request("Incorrect password"));
    }

    // The store insert is synchronous; the session is queryable before
    // this response is sent.
    let role = user.role_enum();
    let token = state.sessions.create(Session {
        id: user.id,
        name: user.name,
        email: user.email,
        role,
    });

    let jar = jar.add(session_cookie(&state, token));

    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            message: "Login successful".to_string(),
        }),
    ))
}

/// Logout endpoint; destroying an absent session is not an error.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.destroy(cookie.value());
    }

    // The removal cookie must carry the same path as the one set at login.
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    (jar, Redirect::to("/login"))
}

#[derive(Debug, Serialize)]
pub struct CurrentUserResponse {
    pub success: bool,
    pub user: Option<Session>,
}

/// Report the caller's identity; anonymity is a result, not an error.
pub async fn current_user(session: Option<Session>) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse {
        success: session.is_some(),
        user: session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert_ne!(hash, "correct horse");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_require_shopkeeper() {
        let shopkeeper = Session {
            id: "u1".to_string(),
            name: "Ama".to_string(),
            email: "ama@example.com".to_string(),
            role: Role::Shopkeeper,
        };
        let assistant = Session {
            role: Role::Assistant,
            ..shopkeeper.clone()
        };

        assert!(require_shopkeeper(&shopkeeper).is_ok());
        let err = require_shopkeeper(&assistant).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::FORBIDDEN);
    }
}
