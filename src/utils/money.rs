use rust_decimal::Decimal;

/// Largest figure a single form field may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xa4c6_8000, 0x0003_8d7e, 0, false, 0);

/// Validates a monetary or quantity field. The value is stored at full precision.
pub fn checked_amount(value: Decimal, field: &str) -> Result<Decimal, String> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(format!("{field} must not be negative"))
    } else if value > MAX_AMOUNT {
        Err(format!("{field} must not exceed {MAX_AMOUNT}"))
    } else {
        Ok(value)
    }
}
