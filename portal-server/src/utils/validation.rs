//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! SQLite TEXT has no built-in length enforcement, so limits live here.

use rust_decimal::Decimal;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: service names, display names
pub const MAX_NAME_LEN: usize = 200;

/// Notes and descriptions (staff notes, payment descriptions)
pub const MAX_NOTE_LEN: usize = 500;

/// Opaque references: document refs, gateway identifiers
pub const MAX_REF_LEN: usize = 512;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Ceiling for any single money amount, in major currency units.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Money amounts carry at most two decimal places.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Validate a money amount: strictly positive, bounded, and no finer
/// than minor-unit precision. Anything past two decimal places cannot be
/// charged exactly, so it is rejected rather than silently rounded.
pub fn validate_amount(value: Decimal, field: &str) -> Result<(), AppError> {
    if value <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "{field} must be positive, got {value}"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field} exceeds the maximum of {MAX_AMOUNT}"
        )));
    }
    if value.normalize().scale() > MONEY_DECIMAL_PLACES {
        return Err(AppError::validation(format!(
            "{field} must have at most {MONEY_DECIMAL_PLACES} decimal places, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_required_text() {
        assert!(validate_required_text("  ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text("ok", "name", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn rejects_overlong_optional_text() {
        let long = Some("x".repeat(MAX_NOTE_LEN + 1));
        assert!(validate_optional_text(&long, "notes", MAX_NOTE_LEN).is_err());
        assert!(validate_optional_text(&None, "notes", MAX_NOTE_LEN).is_ok());
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(validate_amount(Decimal::ZERO, "amount").is_err());
        assert!(validate_amount(Decimal::from(-5), "amount").is_err());
        assert!(validate_amount(Decimal::from(100), "amount").is_ok());
    }

    #[test]
    fn rejects_amounts_finer_than_minor_units() {
        // A third decimal place would price half a minor unit
        assert!(validate_amount("4999.995".parse().unwrap(), "amount").is_err());
        assert!(validate_amount("4999.99".parse().unwrap(), "amount").is_ok());
        // Trailing zeros are not extra precision
        assert!(validate_amount("5000.000".parse().unwrap(), "amount").is_ok());
    }

    #[test]
    fn rejects_amounts_above_the_ceiling() {
        assert!(validate_amount(MAX_AMOUNT, "amount").is_ok());
        assert!(validate_amount("1000000.01".parse().unwrap(), "amount").is_err());
    }
}
