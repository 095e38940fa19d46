//! Browser-facing HTML page handlers.
//!
//! Pages are plain HTML served from the configured static directory; the
//! dashboard additionally requires a live session and bounces anonymous
//! visitors back to the login page.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::path::Path;
use std::sync::Arc;

use crate::session::Session;
use crate::AppState;

async fn serve_page(static_dir: &Path, file: &str) -> Response {
    match tokio::fs::read_to_string(static_dir.join(file)).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(page = %file, "Failed to read page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Page unavailable").into_response()
        }
    }
}

pub async fn login_page(State(state): State<Arc<AppState>>) -> Response {
    serve_page(&state.config.server.static_dir, "login.html").await
}

pub async fn registration_page(State(state): State<Arc<AppState>>) -> Response {
    serve_page(&state.config.server.static_dir, "registration.html").await
}

pub async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    session: Option<Session>,
) -> Response {
    if session.is_none() {
        return Redirect::to("/login").into_response();
    }
    serve_page(&state.config.server.static_dir, "dashboard.html").await
}
