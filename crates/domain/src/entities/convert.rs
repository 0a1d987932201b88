use crate::error::DomainError;
use crate::math::scaling::decimal_to_fixed;
use primitive_types::U256;
use rust_decimal::Decimal;

/// Converts a record field to fixed point with `decimals` places.
pub fn parse_fixed(field: &'static str, value: Decimal, decimals: u32) -> Result<U256, DomainError> {
    decimal_to_fixed(value, decimals).map_err(|_| DomainError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Converts a record field to 18-decimal fixed point.
pub fn parse_fixed18(field: &'static str, value: Decimal) -> Result<U256, DomainError> {
    parse_fixed(field, value, 18)
}
