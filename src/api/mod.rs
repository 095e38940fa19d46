pub mod auth;
mod error;
mod password;
mod products;
mod users;
mod validation;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{ui, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    // Browser pages and auth routes (public)
    let auth_routes = Router::new()
        .route("/login", get(ui::login_page).post(auth::login))
        .route("/registration", get(ui::registration_page))
        .route("/dashboard", get(ui::dashboard_page))
        .route("/register", post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/current-user", get(auth::current_user))
        .route("/reset-password", post(password::reset_password));

    // JSON API routes. Role checks live in the handlers; the dashboard feed
    // is public, the mutations are Shopkeeper-only.
    let api_routes = Router::new()
        // Users
        .route("/users", get(users::list_users))
        .route("/users/:id", put(users::update_user_role))
        .route("/users/:id", delete(users::delete_user))
        // Products
        .route("/products/dashboard", get(products::dashboard))
        .route("/products", post(products::create_product))
        .route("/products/:id", put(products::update_product))
        .route("/products/:id", delete(products::delete_product))
        // Password reset (phase 1: token issuance)
        .route("/forgot-password", post(password::forgot_password));

    // Static assets, including the reset-password page the emailed link
    // points at.
    let serve_static = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes)
        .nest("/api", api_routes)
        .fallback_service(serve_static)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
