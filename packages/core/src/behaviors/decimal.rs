//! Fixed-point helpers for Decimal fields
//!
//! Values are parsed from strings (or JSON numbers), rounded half away from
//! zero to the field's scale and checked against its precision. Binary floats
//! are never involved: JSON numbers go through their decimal text.

use crate::models::ValidationError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

/// Parse an external decimal literal
pub fn parse_decimal(field: &str, value: &Value) -> Result<Decimal, ValidationError> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(ValidationError::invalid_value(
                field,
                format!("expected a decimal string, found {}", other),
            ))
        }
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ValidationError::invalid_value(field, format!("'{}' is not a decimal", text)))
}

/// Round to `scale` places and pad to exactly `scale` fractional digits
pub fn to_scale(value: Decimal, scale: u32) -> Decimal {
    let mut scaled = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    scaled.rescale(scale);
    if scaled.is_zero() {
        scaled.set_sign_positive(true);
    }
    scaled
}

/// Number of significant digits in the scaled mantissa
pub fn digit_count(value: &Decimal) -> u32 {
    let mut mantissa = value.mantissa().unsigned_abs();
    let mut digits = 1;
    while mantissa >= 10 {
        mantissa /= 10;
        digits += 1;
    }
    digits
}

/// Parse, scale and check precision
pub fn normalize_decimal(
    field: &str,
    value: &Value,
    precision: u32,
    scale: u32,
) -> Result<Decimal, ValidationError> {
    let scaled = to_scale(parse_decimal(field, value)?, scale);

    if scaled.scale() != scale || digit_count(&scaled) > precision {
        return Err(ValidationError::PrecisionExceeded {
            field: field.to_string(),
            precision,
            scale,
        });
    }

    Ok(scaled)
}
