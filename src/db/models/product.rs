//! Product catalog models and dashboard aggregates.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;

/// Stock level at or below which a product counts as low stock on the
/// dashboard.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub stock: i64,
    pub price: f64,
    pub reorder_level: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub price: Option<f64>,
    pub reorder_level: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub price: Option<f64>,
    pub reorder_level: Option<i64>,
}

/// Aggregates shown on the inventory dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryStats {
    pub total_products: usize,
    pub low_stock_items: usize,
    pub total_value: f64,
    pub total_categories: usize,
}

/// Single pass over the product list.
pub fn compute_stats(inventory: &[Product]) -> InventoryStats {
    let mut low_stock_items = 0;
    let mut total_value = 0.0;
    let mut categories = HashSet::new();

    for product in inventory {
        if product.stock <= LOW_STOCK_THRESHOLD {
            low_stock_items += 1;
        }
        total_value += product.stock as f64 * product.price;
        categories.insert(product.category.as_str());
    }

    InventoryStats {
        total_products: inventory.len(),
        low_stock_items,
        total_value,
        total_categories: categories.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(sku: &str, category: &str, stock: i64, price: f64) -> Product {
        Product {
            id: format!("id-{}", sku),
            name: format!("Product {}", sku),
            sku: sku.to_string(),
            category: category.to_string(),
            stock,
            price,
            reorder_level: 0,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_products, 0);
        assert_eq!(stats.low_stock_items, 0);
        assert_eq!(stats.total_value, 0.0);
        assert_eq!(stats.total_categories, 0);
    }

    #[test]
    fn test_compute_stats() {
        let inventory = vec![
            product("A-1", "beverages", 5, 2.0),
            product("A-2", "beverages", 100, 1.5),
            product("B-1", "snacks", 10, 4.0),
        ];
        let stats = compute_stats(&inventory);

        assert_eq!(stats.total_products, 3);
        // stock of 10 counts as low, stock of 100 does not
        assert_eq!(stats.low_stock_items, 2);
        assert_eq!(stats.total_value, 5.0 * 2.0 + 100.0 * 1.5 + 10.0 * 4.0);
        assert_eq!(stats.total_categories, 2);
    }
}
