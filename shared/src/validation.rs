//! Validation helpers for invoice and payment inputs
//!
//! These run before any storage mutation: a request that fails validation
//! never touches stock batches or the invoice store.

use rust_decimal::Decimal;

/// Invoice/sale line quantity must be strictly positive.
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Unit prices may be zero (free items) but never negative.
pub fn validate_unit_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price must not be negative");
    }
    Ok(())
}

/// Monetary amounts (discount, paid, payment amount) must be non-negative.
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount must not be negative");
    }
    Ok(())
}

/// An invoice needs at least one line item.
pub fn validate_items_not_empty(item_count: usize) -> Result<(), &'static str> {
    if item_count == 0 {
        return Err("At least one item is required");
    }
    Ok(())
}

/// Names for products, parties and categories must be non-blank.
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name is required");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_must_be_positive() {
        assert!(validate_quantity(Decimal::ONE).is_ok());
        assert!(validate_quantity(Decimal::ZERO).is_err());
        assert!(validate_quantity(Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn price_may_be_zero_but_not_negative() {
        assert!(validate_unit_price(Decimal::ZERO).is_ok());
        assert!(validate_unit_price(Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn blank_names_rejected() {
        assert!(validate_name("Rice 5kg").is_ok());
        assert!(validate_name("   ").is_err());
    }
}
