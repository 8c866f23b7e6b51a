//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a mandatory text field
pub fn validate_required(field: &str, value: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    validate_max_len(field, value, max_len)
}

/// Validate the length of a text field
pub fn validate_max_len(field: &str, value: &str, max_len: usize) -> Result<(), String> {
    if value.chars().count() > max_len {
        return Err(format!(
            "{} must be at most {} characters long",
            field, max_len
        ));
    }
    Ok(())
}

/// Validate a course's total and discounted price
pub fn validate_prices(total_price: f64, discounted_price: Option<f64>) -> Result<(), String> {
    if !total_price.is_finite() || total_price <= 0.0 {
        return Err("Total price must be greater than zero".to_string());
    }

    if let Some(discounted) = discounted_price {
        if !discounted.is_finite() || discounted < 0.0 {
            return Err("Discounted price must not be negative".to_string());
        }
        if discounted > total_price {
            return Err("Discounted price must not exceed the total price".to_string());
        }
    }

    Ok(())
}

/// Validate a price range filter
pub fn validate_price_range(min_price: f64, max_price: f64) -> Result<(), String> {
    if min_price < 0.0 || max_price < 0.0 {
        return Err("Prices must not be negative".to_string());
    }
    if min_price > max_price {
        return Err("Minimum price must not exceed the maximum price".to_string());
    }
    Ok(())
}

/// Validate a payment amount
pub fn validate_amount(amount: f64) -> Result<(), String> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err("Amount must be greater than zero".to_string());
    }
    Ok(())
}

/// Validate a review rating
pub fn validate_rating(rating: i32) -> Result<(), String> {
    if !(1..=5).contains(&rating) {
        return Err("Rating must be between 1 and 5".to_string());
    }
    Ok(())
}

/// Validate a progress percentage
pub fn validate_percentage(percentage: f64) -> Result<(), String> {
    if !(0.0..=100.0).contains(&percentage) {
        return Err("Progress percentage must be between 0 and 100".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("learner@example.com").is_ok());
        assert!(validate_email("first.last+tag@school.com.au").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Title", "Manual lessons", 50).is_ok());
        assert_eq!(
            validate_required("Title", "   ", 50),
            Err("Title is required".to_string())
        );
        assert!(validate_required("Title", &"x".repeat(51), 50).is_err());
    }

    #[test]
    fn test_validate_prices() {
        assert!(validate_prices(500.0, None).is_ok());
        assert!(validate_prices(500.0, Some(450.0)).is_ok());
        assert!(validate_prices(500.0, Some(500.0)).is_ok());
        assert!(validate_prices(0.0, None).is_err());
        assert!(validate_prices(500.0, Some(-1.0)).is_err());
        assert!(validate_prices(500.0, Some(550.0)).is_err());
    }

    #[test]
    fn test_validate_price_range() {
        assert!(validate_price_range(100.0, 200.0).is_ok());
        assert!(validate_price_range(200.0, 100.0).is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_amount(49.95).is_ok());
        assert!(validate_amount(0.0).is_err());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_percentage(100.0).is_ok());
        assert!(validate_percentage(100.5).is_err());
        assert!(validate_percentage(-0.1).is_err());
    }
}
