//! Input validation for API requests.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::Role;

lazy_static! {
    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+$"
    ).unwrap();

    /// Regex for validating SKUs (alphanumeric with dashes/underscores)
    static ref SKU_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9][A-Za-z0-9_-]*$"
    ).unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 100 {
        return Err("Name is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate a role against the closed role set
pub fn validate_role(role: &str) -> Result<Role, String> {
    role.parse::<Role>().map_err(|_| "Invalid role".to_string())
}

/// Validate a product SKU
pub fn validate_sku(sku: &str) -> Result<(), String> {
    if sku.is_empty() {
        return Err("SKU is required".to_string());
    }

    if sku.len() > 64 {
        return Err("SKU is too long (max 64 characters)".to_string());
    }

    if !SKU_REGEX.is_match(sku) {
        return Err("SKU must be alphanumeric with dashes or underscores".to_string());
    }

    Ok(())
}

/// Validate a product stock level
pub fn validate_stock(stock: i64) -> Result<(), String> {
    if stock < 0 {
        return Err("Stock cannot be negative".to_string());
    }

    Ok(())
}

/// Validate a product price
pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() || price < 0.0 {
        return Err("Price must be a non-negative number".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("spaces in@x.com").is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Ama Serwaa").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_role() {
        assert_eq!(validate_role("Shopkeeper").unwrap(), Role::Shopkeeper);
        assert_eq!(validate_role("Assistant").unwrap(), Role::Assistant);

        assert_eq!(validate_role("Manager").unwrap_err(), "Invalid role");
        assert!(validate_role("assistant").is_err());
        assert!(validate_role("").is_err());
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("SKU-001").is_ok());
        assert!(validate_sku("a1_b2").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("-leading").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(500).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(19.99).is_ok());

        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }
}
