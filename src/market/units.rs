//! Fixed-point conversions between whole tokens and base units.

use alloy::primitives::U256;
use rust_decimal::Decimal;

/// Decimals used by the payment token and share accounting.
pub const TOKEN_DECIMALS: u8 = 18;

/// `10^decimals` as a U256.
pub fn unit(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Convert whole tokens to base units (`amount * 10^decimals`).
pub fn to_base_units(amount: u64, decimals: u8) -> U256 {
    U256::from(amount).saturating_mul(unit(decimals))
}

/// Whole tokens in `value`, rounded down.
pub fn floor_tokens(value: U256, decimals: u8) -> U256 {
    value / unit(decimals)
}

/// Token amount truncated to `places` decimal places.
///
/// Values too large for a `Decimal` saturate to `Decimal::MAX`.
pub fn to_decimal(value: U256, decimals: u8, places: u8) -> Decimal {
    let places = places.min(decimals);
    let scaled = value / unit(decimals - places);

    match i128::try_from(scaled) {
        Ok(mantissa) => Decimal::try_from_i128_with_scale(mantissa, u32::from(places))
            .unwrap_or(Decimal::MAX),
        Err(_) => Decimal::MAX,
    }
}
