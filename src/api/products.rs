//! Product catalog endpoints and the public dashboard aggregate.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::db::{
    compute_stats, CreateProductRequest, InventoryStats, Product, UpdateProductRequest,
};
use crate::session::Session;
use crate::AppState;

use super::auth::require_shopkeeper;
use super::error::ApiError;
use super::users::StatusResponse;
use super::validation::{validate_name, validate_price, validate_sku, validate_stock};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub status: String,
    pub inventory: Vec<Product>,
    pub stats: InventoryStats,
}

/// Inventory list plus aggregate stats; served without authentication.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let inventory: Vec<Product> = sqlx::query_as("SELECT * FROM products ORDER BY name")
        .fetch_all(&state.db)
        .await?;

    let stats = compute_stats(&inventory);

    Ok(Json(DashboardResponse {
        status: "success".to_string(),
        inventory,
        stats,
    }))
}

fn validate_product_fields(
    name: &str,
    sku: &str,
    stock: i64,
    price: f64,
) -> Result<(), ApiError> {
    validate_name(name).map_err(ApiError::validation)?;
    validate_sku(sku).map_err(ApiError::validation)?;
    validate_stock(stock).map_err(ApiError::validation)?;
    validate_price(price).map_err(ApiError::validation)?;
    Ok(())
}

/// Create a product
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    require_shopkeeper(&session)?;

    let (name, sku, category, stock, price) = match (
        request.name,
        request.sku,
        request.category,
        request.stock,
        request.price,
    ) {
        (Some(name), Some(sku), Some(category), Some(stock), Some(price))
            if !name.is_empty() && !sku.is_empty() && !category.is_empty() =>
        {
            (name, sku, category, stock, price)
        }
        _ => return Err(ApiError::validation("All fields are required")),
    };

    validate_product_fields(&name, &sku, stock, price)?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO products (id, name, sku, category, stock, price, reorder_level, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&name)
    .bind(&sku)
    .bind(&category)
    .bind(stock)
    .bind(price)
    .bind(request.reorder_level.unwrap_or(0))
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("A product with this SKU already exists")
        } else {
            tracing::error!("Failed to add product: {}", e);
            ApiError::database("Failed to add product")
        }
    })?;

    Ok(Json(StatusResponse {
        status: "success".to_string(),
        message: "Product added successfully".to_string(),
    }))
}

/// Update a product
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    require_shopkeeper(&session)?;

    if let Some(ref name) = request.name {
        validate_name(name).map_err(ApiError::validation)?;
    }
    if let Some(ref sku) = request.sku {
        validate_sku(sku).map_err(ApiError::validation)?;
    }
    if let Some(stock) = request.stock {
        validate_stock(stock).map_err(ApiError::validation)?;
    }
    if let Some(price) = request.price {
        validate_price(price).map_err(ApiError::validation)?;
    }

    let now = chrono::Utc::now().to_rfc3339();
    let result = sqlx::query(
        r#"
        UPDATE products SET
            name = COALESCE(?, name),
            sku = COALESCE(?, sku),
            category = COALESCE(?, category),
            stock = COALESCE(?, stock),
            price = COALESCE(?, price),
            reorder_level = COALESCE(?, reorder_level),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&request.name)
    .bind(&request.sku)
    .bind(&request.category)
    .bind(request.stock)
    .bind(request.price)
    .bind(request.reorder_level)
    .bind(&now)
    .bind(&id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            ApiError::conflict("A product with this SKU already exists")
        } else {
            tracing::error!("Failed to update product: {}", e);
            ApiError::database("Failed to update product")
        }
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Product not found"));
    }

    Ok(Json(StatusResponse {
        status: "success".to_string(),
        message: "Product updated successfully".to_string(),
    }))
}

/// Delete a product
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_shopkeeper(&session)?;

    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(&id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Product not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
